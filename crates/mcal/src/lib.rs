//! Microcontroller Abstraction Layer.
//!
//! Register map and polling driver for the USART of the ATmega32. The
//! driver owns a [`RegisterFile`] instead of poking fixed addresses, so the
//! same code runs against the real memory-mapped registers ([`Mmio`]) and,
//! with the `std` feature, against the in-memory [`sim::SimRegisters`].
#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod config;
pub mod error;
pub mod reg;
pub mod shared;
pub mod uart;

#[cfg(any(test, feature = "std"))]
pub mod sim;

pub use config::{F_CPU, LineErrors, UsartConfig};
pub use error::{ReceiveError, TransmitError};
pub use reg::{Mmio, Register, RegisterFile, RegisterMap};
pub use shared::SharedUsart;
pub use uart::Usart;
