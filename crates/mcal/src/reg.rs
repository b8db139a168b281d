//! USART register map and the register-file seam.
//!
//! The ATmega32 USART is five 8-bit locations in the data address space:
//!
//!   Register │ Read                     │ Write
//!   ─────────┼──────────────────────────┼──────────────────────────
//!   UDR      │ last received byte       │ byte to transmit
//!   UCSRA    │ status flags             │ U2X / MPCM, clears TXC
//!   UCSRB    │ enables, 9th data bit    │ enables, 9th data bit
//!   UBRRL    │ divisor bits 7:0         │ divisor bits 7:0
//!   UCSRC    │ frame format             │ frame format  (URSEL = 1)
//!   UBRRH    │ divisor bits 15:8        │ divisor bits 15:8 (URSEL = 0)
//!
//! UCSRC and UBRRH sit at the SAME address. The part tells them apart by
//! bit 7 of the written value (URSEL). The map below keeps that overlay as
//! a single `shared` address instead of pretending there are six cells.

use core::ptr;

#[cfg(test)]
use mockall::automock;

/// The logical USART registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// USART I/O Data Register.
    Udr,
    /// Control and Status Register A.
    Ucsra,
    /// Control and Status Register B.
    Ucsrb,
    /// Control and Status Register C (overlaid with UBRRH).
    Ucsrc,
    /// Baud Rate Register, low byte.
    Ubrrl,
    /// Baud Rate Register, high byte (overlaid with UCSRC).
    Ubrrh,
}

/// Data-space addresses of one USART instance.
///
/// This is the peripheral description of the target part. Nothing in the
/// driver assumes a particular layout beyond what a map provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMap {
    pub udr: usize,
    pub ucsra: usize,
    pub ucsrb: usize,
    pub ubrrl: usize,
    /// The location decoded as UCSRC or UBRRH depending on URSEL.
    pub shared: usize,
}

impl RegisterMap {
    /// ATmega32 (and ATmega16/8535) USART.
    pub const ATMEGA32: RegisterMap = RegisterMap {
        udr: 0x2C,
        ucsra: 0x2B,
        ucsrb: 0x2A,
        ubrrl: 0x29,
        shared: 0x40,
    };

    /// Resolves a register to its address. `Ucsrc` and `Ubrrh` resolve
    /// to the same location.
    pub const fn address(&self, reg: Register) -> usize {
        match reg {
            Register::Udr => self.udr,
            Register::Ucsra => self.ucsra,
            Register::Ucsrb => self.ucsrb,
            Register::Ubrrl => self.ubrrl,
            Register::Ucsrc | Register::Ubrrh => self.shared,
        }
    }
}

/// Byte-wide access to the USART registers.
///
/// Both directions take `&mut self` because both have side effects on the
/// hardware: writing UDR starts a transmission, reading UDR pops the
/// receive buffer and clears RXC.
#[cfg_attr(test, automock)]
pub trait RegisterFile {
    /// Reads one register.
    fn read(&mut self, reg: Register) -> u8;

    /// Writes one register.
    fn write(&mut self, reg: Register, value: u8);
}

impl<T: RegisterFile + ?Sized> RegisterFile for &mut T {
    fn read(&mut self, reg: Register) -> u8 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Register, value: u8) {
        (**self).write(reg, value)
    }
}

/// The real memory-mapped USART registers.
#[derive(Debug)]
pub struct Mmio {
    map: RegisterMap,
}

impl Mmio {
    /// Creates a handle to the registers described by `map`.
    ///
    /// # Safety
    ///
    /// Every address in `map` must be the USART register it claims to be
    /// on the running part, and this must be the only handle to them:
    /// two owners can interleave a read of UDR with a poll of RXC and
    /// lose a byte.
    pub const unsafe fn new(map: RegisterMap) -> Self {
        Self { map }
    }

    /// The map this handle was created with.
    pub const fn map(&self) -> &RegisterMap {
        &self.map
    }
}

impl RegisterFile for Mmio {
    #[inline]
    fn read(&mut self, reg: Register) -> u8 {
        let addr = self.map.address(reg) as *const u8;
        // SAFETY: `Mmio::new` made the caller vouch for the address.
        unsafe { ptr::read_volatile(addr) }
    }

    #[inline]
    fn write(&mut self, reg: Register, value: u8) {
        let addr = self.map.address(reg) as *mut u8;
        // SAFETY: `Mmio::new` made the caller vouch for the address.
        unsafe { ptr::write_volatile(addr, value) }
    }
}
