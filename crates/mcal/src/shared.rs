//! Single-owner access to a USART from more than one task.
//!
//! The register set has no arbitration of its own: two callers polling RXC
//! and reading UDR at the same time will steal bytes from each other, and
//! two transmitters will interleave characters. [`SharedUsart`] puts the
//! driver behind a spin mutex so every access goes through one owner at a
//! time. A plain single-threaded program can keep using [`Usart`] directly.

use spin::{Mutex, MutexGuard};

use crate::uart::Usart;

/// A [`Usart`] behind a spin lock, usable as a `static`.
pub struct SharedUsart<R> {
    inner: Mutex<Usart<R>>,
}

impl<R> SharedUsart<R> {
    pub const fn new(usart: Usart<R>) -> Self {
        Self {
            inner: Mutex::new(usart),
        }
    }

    /// Spins until the USART is free and returns exclusive access to it.
    pub fn lock(&self) -> MutexGuard<'_, Usart<R>> {
        self.inner.lock()
    }

    /// Exclusive access if nobody else holds it right now.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, Usart<R>>> {
        self.inner.try_lock()
    }

    /// Unwraps the driver.
    pub fn into_inner(self) -> Usart<R> {
        self.inner.into_inner()
    }
}
