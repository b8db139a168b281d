//! USART error types.
//!
//! The plain [`Usart::transmit`](crate::Usart::transmit) and
//! [`Usart::receive`](crate::Usart::receive) never fail: they spin until
//! the hardware is ready, however long that takes. These types only come
//! back from the bounded, cancellable and checked variants.

use core::fmt;

use crate::uart::flags::StatusA;

/// Error returned by the bounded and cancellable transmit variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitError {
    /// UDRE never came up within the poll budget.
    Timeout,
    /// The cancel callback asked to stop waiting.
    Cancelled,
}

/// Error returned by the bounded, cancellable and checked receive variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveError {
    /// FE: the stop bit of the received frame was zero.
    FramingError,
    /// DOR: a new frame arrived while the receive buffer was full.
    Overrun,
    /// PE: the received parity bit did not match.
    ParityError,
    /// RXC never came up within the poll budget.
    Timeout,
    /// The cancel callback asked to stop waiting.
    Cancelled,
}

impl ReceiveError {
    /// Maps the line error flags of a UCSRA sample to an error.
    ///
    /// When several flags are latched at once the frame error wins, then
    /// overrun, then parity. Returns `None` if none of them is set.
    pub fn from_status(status: StatusA) -> Option<Self> {
        if status.contains(StatusA::FE) {
            Some(Self::FramingError)
        } else if status.contains(StatusA::DOR) {
            Some(Self::Overrun)
        } else if status.contains(StatusA::PE) {
            Some(Self::ParityError)
        } else {
            None
        }
    }
}

impl fmt::Display for TransmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("transmit buffer never became empty"),
            Self::Cancelled => f.write_str("transmit cancelled"),
        }
    }
}

impl fmt::Display for ReceiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FramingError => f.write_str("framing error"),
            Self::Overrun => f.write_str("data overrun"),
            Self::ParityError => f.write_str("parity error"),
            Self::Timeout => f.write_str("no byte received"),
            Self::Cancelled => f.write_str("receive cancelled"),
        }
    }
}
