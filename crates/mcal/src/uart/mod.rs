//! Polling USART driver.
//!
//! Every operation is a wait-then-act loop on UCSRA: spin until the flag
//! that makes the next access safe is up (UDRE before writing UDR, RXC
//! before reading it), then touch the data register exactly once. The
//! hardware guarantees the flag makes that single access safe, so there is
//! no retry.
//!
//! LIVENESS:
//!   [`Usart::transmit`] and [`Usart::receive`] have no timeout. If the
//!   peripheral is disabled, mis-clocked, or nothing is ever sent to us,
//!   they spin forever. That is the intended behaviour for a single
//!   foreground loop with nothing else to do. Callers that cannot afford
//!   it use the `_bounded` or `_until` variants.
//!
//! LINE ERRORS:
//!   UCSRA latches frame, overrun and parity errors for the byte in the
//!   receive buffer. The plain receive path never looks at them. Only
//!   [`Usart::receive_checked`] and the bounded/cancellable receives report
//!   them, and only when the driver is configured with
//!   [`LineErrors::Report`].
//!
//! No interrupts: the interrupt enable bits in UCSRB are always left clear.

pub mod flags;

use core::convert::Infallible;
use core::ffi::CStr;
use core::fmt;

use crate::config::{self, LineErrors, UsartConfig};
use crate::error::{ReceiveError, TransmitError};
use crate::reg::{Register, RegisterFile};

use self::flags::{ControlB, ControlC, StatusA};

/// A USART configured for asynchronous 8N1 frames.
///
/// Owns its register file. There is no global instance: wrap one in a
/// [`SharedUsart`](crate::SharedUsart) if more than one task needs it.
#[derive(Debug)]
pub struct Usart<R> {
    regs: R,
    config: UsartConfig,
}

impl<R> Usart<R> {
    /// Wraps `regs` with the default configuration (`F_CPU`, line errors
    /// ignored). Doesn't touch hardware; call [`init`](Self::init).
    pub const fn new(regs: R) -> Self {
        Self::with_config(regs, UsartConfig::new())
    }

    /// Wraps `regs` with an explicit configuration.
    pub const fn with_config(regs: R, config: UsartConfig) -> Self {
        Self { regs, config }
    }

    pub const fn config(&self) -> &UsartConfig {
        &self.config
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// Gives the register file back.
    pub fn into_inner(self) -> R {
        self.regs
    }
}

impl<R: RegisterFile> Usart<R> {
    /// Programs the baud rate and frame format and enables both
    /// directions.
    ///
    /// The write sequence is fixed:
    ///   1. UBRRH ← divisor bits 15:8
    ///   2. UBRRL ← divisor bits 7:0
    ///   3. UCSRB ← RXEN | TXEN                (0x18, no interrupts, no 9-bit)
    ///   4. UCSRC ← URSEL | UCSZ1 | UCSZ0      (0x86, async 8N1)
    ///
    /// UBRRH shares its address with UCSRC; step 1 relies on bit 7 of the
    /// high byte being clear, step 4 sets URSEL to reach UCSRC instead.
    ///
    /// `baud` must be non-zero and give a divisor
    /// `clock_hz / (16 * baud) - 1` that fits in 16 bits (see
    /// [`config::checked_ubrr`]). This is not checked here. Calling `init`
    /// again fully reconfigures the peripheral.
    pub fn init(&mut self, baud: u32) {
        let divisor = config::ubrr(self.config.clock_hz, baud);
        let [high, low] = divisor.to_be_bytes();
        log::debug!(
            "usart: {} baud at {} Hz, UBRR = {}",
            baud,
            self.config.clock_hz,
            divisor
        );

        self.regs.write(Register::Ubrrh, high);
        self.regs.write(Register::Ubrrl, low);
        self.regs.write(Register::Ucsrb, ControlB::ENABLE_RX_TX.bits());
        self.regs.write(Register::Ucsrc, ControlC::FRAME_8N1.bits());
    }

    /// One read of UCSRA.
    pub fn status(&mut self) -> StatusA {
        StatusA::from_bits_retain(self.regs.read(Register::Ucsra))
    }

    /// Sends one byte, spinning until UDRE is set.
    ///
    /// Returns as soon as the byte is in UDR, not when it has left the
    /// wire.
    pub fn transmit(&mut self, byte: u8) {
        self.spin_until(StatusA::UDRE);
        self.regs.write(Register::Udr, byte);
    }

    /// Receives one byte, spinning until RXC is set. Line errors are
    /// ignored.
    pub fn receive(&mut self) -> u8 {
        self.spin_until(StatusA::RXC);
        self.regs.read(Register::Udr)
    }

    /// Sends `bytes` up to, not including, the first NUL. A slice without
    /// a NUL is sent whole.
    pub fn send_string(&mut self, bytes: &[u8]) {
        for &byte in bytes.iter().take_while(|&&b| b != 0) {
            self.transmit(byte);
        }
    }

    /// Sends a C string without its terminator.
    pub fn send_cstr(&mut self, s: &CStr) {
        self.send_string(s.to_bytes());
    }

    /// Like [`transmit`](Self::transmit), but gives up after `max_polls`
    /// reads of UCSRA. A budget of zero still polls once.
    pub fn transmit_bounded(&mut self, byte: u8, max_polls: u32) -> Result<(), TransmitError> {
        let mut misses = 0u32;
        self.transmit_with(byte, || {
            misses += 1;
            if misses >= max_polls { Err(TransmitError::Timeout) } else { Ok(()) }
        })
    }

    /// Like [`transmit`](Self::transmit), but calls `cancel` after every
    /// poll that found UDRE clear and stops waiting once it returns true.
    pub fn transmit_until(
        &mut self,
        byte: u8,
        mut cancel: impl FnMut() -> bool,
    ) -> Result<(), TransmitError> {
        self.transmit_with(byte, || {
            if cancel() { Err(TransmitError::Cancelled) } else { Ok(()) }
        })
    }

    /// Like [`receive_checked`](Self::receive_checked), but gives up after
    /// `max_polls` reads of UCSRA. A budget of zero still polls once.
    pub fn receive_bounded(&mut self, max_polls: u32) -> Result<u8, ReceiveError> {
        let mut misses = 0u32;
        self.receive_with(|| {
            misses += 1;
            if misses >= max_polls { Err(ReceiveError::Timeout) } else { Ok(()) }
        })
    }

    /// Like [`receive_checked`](Self::receive_checked), but calls `cancel`
    /// after every poll that found RXC clear and stops waiting once it
    /// returns true.
    pub fn receive_until(&mut self, mut cancel: impl FnMut() -> bool) -> Result<u8, ReceiveError> {
        self.receive_with(|| {
            if cancel() { Err(ReceiveError::Cancelled) } else { Ok(()) }
        })
    }

    /// Blocking receive that reports line errors when configured with
    /// [`LineErrors::Report`].
    ///
    /// UDR is read exactly once either way, so an erroneous byte is
    /// consumed and RXC cleared before the error is returned.
    pub fn receive_checked(&mut self) -> Result<u8, ReceiveError> {
        let status = self.spin_until(StatusA::RXC);
        self.take_received(status)
    }

    /// Polls UCSRA once and reads UDR only if RXC is set.
    pub fn try_receive(&mut self) -> Option<u8> {
        if self.status().contains(StatusA::RXC) {
            Some(self.regs.read(Register::Udr))
        } else {
            None
        }
    }

    // =========================================================================
    // Wait loops
    // =========================================================================

    /// Polls UCSRA until `flag` is set. After every miss `on_miss` decides
    /// whether to keep going. Returns the sample that had `flag` set.
    fn wait_for<E>(
        &mut self,
        flag: StatusA,
        mut on_miss: impl FnMut() -> Result<(), E>,
    ) -> Result<StatusA, E> {
        loop {
            let status = self.status();
            if status.contains(flag) {
                return Ok(status);
            }
            on_miss()?;
            core::hint::spin_loop();
        }
    }

    fn spin_until(&mut self, flag: StatusA) -> StatusA {
        match self.wait_for::<Infallible>(flag, || Ok(())) {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }

    fn transmit_with(
        &mut self,
        byte: u8,
        on_miss: impl FnMut() -> Result<(), TransmitError>,
    ) -> Result<(), TransmitError> {
        if let Err(err) = self.wait_for(StatusA::UDRE, on_miss) {
            log::trace!("usart: transmit of {:#04x} abandoned: {}", byte, err);
            return Err(err);
        }
        self.regs.write(Register::Udr, byte);
        Ok(())
    }

    fn receive_with(
        &mut self,
        on_miss: impl FnMut() -> Result<(), ReceiveError>,
    ) -> Result<u8, ReceiveError> {
        match self.wait_for(StatusA::RXC, on_miss) {
            Ok(status) => self.take_received(status),
            Err(err) => {
                log::trace!("usart: receive abandoned: {}", err);
                Err(err)
            }
        }
    }

    /// Reads UDR after `status` showed RXC, applying the line error policy
    /// to the flags that came with it.
    fn take_received(&mut self, status: StatusA) -> Result<u8, ReceiveError> {
        let byte = self.regs.read(Register::Udr);
        if self.config.line_errors == LineErrors::Report {
            if let Some(err) = ReceiveError::from_status(status) {
                log::warn!("usart: {} on received byte {:#04x}", err, byte);
                return Err(err);
            }
        }
        Ok(byte)
    }
}

/// `write!` support. `\n` goes out as `\r\n` so serial terminals don't
/// staircase.
impl<R: RegisterFile> fmt::Write for Usart<R> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.transmit(b'\r');
            }
            self.transmit(byte);
        }
        Ok(())
    }
}
