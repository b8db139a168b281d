//! In-memory stand-in for the USART registers.
//!
//! [`SimRegisters`] behaves like the register set closely enough to
//! exercise the driver on a host: UDRE and RXC gate the data register,
//! reading UDR pops the receive buffer, and the UCSRC/UBRRH overlay is
//! decoded by URSEL exactly as the part does it. Every access is
//! journalled so tests can check ordering and counts.
//!
//! Not modelled: the two-read sequence the part needs to read UCSRC back
//! (a read of the shared location returns whichever register is named),
//! 9-bit frames, and anything interrupt related.

use std::collections::VecDeque;

use crate::reg::{Register, RegisterFile};
use crate::uart::flags::{ControlC, StatusA};

/// One journalled register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read(Register),
    Write(Register, u8),
}

/// Simulated USART register set.
#[derive(Debug, Default)]
pub struct SimRegisters {
    /// Writable bits of UCSRA (U2X, MPCM).
    ucsra: u8,
    ucsrb: u8,
    ucsrc: u8,
    ubrrl: u8,
    ubrrh: u8,
    /// Value UDR reads back when the receive buffer is empty.
    last_rx: u8,
    txc: bool,
    /// UCSRA polls left before UDRE reads as set.
    tx_hold: u32,
    /// Polls UDRE stays clear after each byte written to UDR.
    tx_latency: u32,
    /// UCSRA polls left before a queued byte shows up as RXC.
    rx_hold: u32,
    rx: VecDeque<(u8, StatusA)>,
    wire: Vec<u8>,
    accesses: Vec<Access>,
    tx_violations: usize,
    rx_violations: usize,
}

impl SimRegisters {
    /// An idle USART: nothing received, transmit buffer empty.
    pub const fn new() -> Self {
        Self {
            ucsra: 0,
            ucsrb: 0,
            ucsrc: 0,
            ubrrl: 0,
            ubrrh: 0,
            last_rx: 0,
            txc: false,
            tx_hold: 0,
            tx_latency: 0,
            rx_hold: 0,
            rx: VecDeque::new(),
            wire: Vec::new(),
            accesses: Vec::new(),
            tx_violations: 0,
            rx_violations: 0,
        }
    }

    // =========================================================================
    // Stimulus
    // =========================================================================

    /// Keeps UDRE clear for the next `polls` reads of UCSRA.
    pub fn hold_tx(&mut self, polls: u32) {
        self.tx_hold = polls;
    }

    /// Keeps UDRE clear for `polls` reads of UCSRA after every byte
    /// written to UDR, as if the shifter needed that long per frame.
    pub fn set_tx_latency(&mut self, polls: u32) {
        self.tx_latency = polls;
    }

    /// Keeps RXC clear for the next `polls` reads of UCSRA, whether or not
    /// a byte is queued yet. Polls made before [`push_rx`](Self::push_rx)
    /// count against the hold.
    pub fn hold_rx(&mut self, polls: u32) {
        self.rx_hold = polls;
    }

    /// Queues a cleanly received byte.
    pub fn push_rx(&mut self, byte: u8) {
        self.push_rx_with(byte, StatusA::empty());
    }

    /// Queues a received byte together with the line error flags the
    /// hardware latched for it. Only FE, DOR and PE are kept.
    pub fn push_rx_with(&mut self, byte: u8, errors: StatusA) {
        self.rx.push_back((byte, errors.line_errors()));
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn ucsrb(&self) -> u8 {
        self.ucsrb
    }

    pub fn ucsrc(&self) -> u8 {
        self.ucsrc
    }

    pub fn ubrrl(&self) -> u8 {
        self.ubrrl
    }

    pub fn ubrrh(&self) -> u8 {
        self.ubrrh
    }

    /// UBRRH:UBRRL as one divisor.
    pub fn ubrr(&self) -> u16 {
        u16::from_be_bytes([self.ubrrh, self.ubrrl])
    }

    /// Every byte written to UDR, in order.
    pub fn transmitted(&self) -> &[u8] {
        &self.wire
    }

    /// Drains the wire log.
    pub fn take_transmitted(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.wire)
    }

    /// Bytes still waiting in the receive buffer.
    pub fn pending_rx(&self) -> usize {
        self.rx.len()
    }

    /// Writes to UDR made while UDRE was clear.
    pub fn tx_violations(&self) -> usize {
        self.tx_violations
    }

    /// Reads of UDR made while RXC was clear.
    pub fn rx_violations(&self) -> usize {
        self.rx_violations
    }

    /// The access journal.
    pub fn accesses(&self) -> &[Access] {
        &self.accesses
    }

    pub fn clear_accesses(&mut self) {
        self.accesses.clear();
    }

    /// Number of journalled reads of `reg`.
    pub fn reads_of(&self, reg: Register) -> usize {
        self.accesses.iter().filter(|a| **a == Access::Read(reg)).count()
    }

    /// Values written to `reg`, in order.
    pub fn writes_to(&self, reg: Register) -> Vec<u8> {
        self.accesses
            .iter()
            .filter_map(|a| match *a {
                Access::Write(r, v) if r == reg => Some(v),
                _ => None,
            })
            .collect()
    }

    // =========================================================================
    // Hardware behaviour
    // =========================================================================

    fn rx_ready(&self) -> bool {
        self.rx_hold == 0 && !self.rx.is_empty()
    }

    /// One poll of UCSRA. Counts down the hold timers.
    fn poll_status(&mut self) -> u8 {
        let udre = self.tx_hold == 0;
        if !udre {
            self.tx_hold -= 1;
        }

        let mut status = StatusA::from_bits_retain(self.ucsra) & (StatusA::U2X | StatusA::MPCM);
        status.set(StatusA::UDRE, udre);
        status.set(StatusA::TXC, self.txc && udre);

        if self.rx_hold > 0 {
            self.rx_hold -= 1;
        } else if let Some(&(_, errors)) = self.rx.front() {
            status |= StatusA::RXC | errors;
        }
        status.bits()
    }

    fn read_data(&mut self) -> u8 {
        if !self.rx_ready() {
            self.rx_violations += 1;
            return self.last_rx;
        }
        if let Some((byte, _)) = self.rx.pop_front() {
            self.last_rx = byte;
        }
        self.last_rx
    }

    fn write_data(&mut self, value: u8) {
        if self.tx_hold > 0 {
            self.tx_violations += 1;
        }
        self.wire.push(value);
        self.txc = true;
        self.tx_hold = self.tx_latency;
    }

    fn write_status(&mut self, value: u8) {
        let written = StatusA::from_bits_retain(value);
        // TXC is cleared by writing a one to it.
        if written.contains(StatusA::TXC) {
            self.txc = false;
        }
        self.ucsra = (written & (StatusA::U2X | StatusA::MPCM)).bits();
    }

    /// The UCSRC/UBRRH location: URSEL in the value picks the target.
    fn write_shared(&mut self, value: u8) {
        if ControlC::from_bits_retain(value).contains(ControlC::URSEL) {
            self.ucsrc = value;
        } else {
            self.ubrrh = value;
        }
    }
}

impl RegisterFile for SimRegisters {
    fn read(&mut self, reg: Register) -> u8 {
        self.accesses.push(Access::Read(reg));
        match reg {
            Register::Udr => self.read_data(),
            Register::Ucsra => self.poll_status(),
            Register::Ucsrb => self.ucsrb,
            Register::Ucsrc => self.ucsrc,
            Register::Ubrrl => self.ubrrl,
            Register::Ubrrh => self.ubrrh,
        }
    }

    fn write(&mut self, reg: Register, value: u8) {
        self.accesses.push(Access::Write(reg, value));
        match reg {
            Register::Udr => self.write_data(value),
            Register::Ucsra => self.write_status(value),
            Register::Ucsrb => self.ucsrb = value,
            Register::Ubrrl => self.ubrrl = value,
            Register::Ucsrc | Register::Ubrrh => self.write_shared(value),
        }
    }
}
