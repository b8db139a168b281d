// =============================================================================
// hello — USART demo firmware
// =============================================================================
//
// The whole program:
//   1. Configure the USART for 19200 baud, 8N1
//   2. Install the USART logger
//   3. Send "Hello, World!\r\n"
//   4. Spin forever
//
// There is no OS underneath and nothing else to run, so the final loop is
// the idle task. The USART lives in a `SharedUsart` because two parties
// use it: this program and the logger.
//
// =============================================================================

#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]

use log::LevelFilter;
use mcal::{RegisterFile, SharedUsart};
use mlog::UartLogger;

/// Line speed. 16 MHz / (16 * 19200) - 1 = 51.
const BAUD: u32 = 19_200;

/// The greeting, NUL-terminated like the string the driver is built for.
const GREETING: &[u8] = b"Hello, World!\r\n\0";

const LOG_LEVEL: LevelFilter = if cfg!(feature = "verbose") {
    LevelFilter::Debug
} else {
    LevelFilter::Warn
};

/// Brings the USART up, installs the logger on it and sends the greeting.
fn run<R: RegisterFile + Send + 'static>(uart: &'static SharedUsart<R>, logger: &'static UartLogger<R>) {
    uart.lock().init(BAUD);

    // Only fails if a logger is already installed, in which case that one
    // keeps going.
    let _ = mlog::init(logger);
    log::debug!("usart up at {} baud", BAUD);

    uart.lock().send_string(GREETING);
}

// =============================================================================
// AVR entry point
// =============================================================================

#[cfg(target_arch = "avr")]
mod board {
    use core::panic::PanicInfo;

    use mcal::{Mmio, RegisterMap, SharedUsart, Usart};
    use mlog::UartLogger;

    // SAFETY: this image is built for the ATmega32 and UART is the only
    // handle to its USART registers.
    static UART: SharedUsart<Mmio> =
        SharedUsart::new(Usart::new(unsafe { Mmio::new(RegisterMap::ATMEGA32) }));

    static LOGGER: UartLogger<Mmio> = UartLogger::new(&UART, super::LOG_LEVEL);

    #[unsafe(no_mangle)]
    pub extern "C" fn main() -> ! {
        super::run(&UART, &LOGGER);
        loop {
            core::hint::spin_loop();
        }
    }

    /// Nothing to report to and nobody to report it to. Stop here.
    #[panic_handler]
    fn panic(_info: &PanicInfo) -> ! {
        loop {
            core::hint::spin_loop();
        }
    }
}

// =============================================================================
// Host entry point
// =============================================================================

#[cfg(not(target_arch = "avr"))]
mod host {
    use std::io::{self, Write};

    use mcal::sim::SimRegisters;
    use mcal::{SharedUsart, Usart};
    use mlog::UartLogger;

    static UART: SharedUsart<SimRegisters> = SharedUsart::new(Usart::new(SimRegisters::new()));
    static LOGGER: UartLogger<SimRegisters> = UartLogger::new(&UART, super::LOG_LEVEL);

    /// Runs the firmware against the simulator and copies the wire to stdout.
    pub fn main() -> io::Result<()> {
        super::run(&UART, &LOGGER);

        let wire = UART.lock().registers_mut().take_transmitted();
        let mut stdout = io::stdout().lock();
        stdout.write_all(&wire)?;
        stdout.flush()
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() -> std::io::Result<()> {
    host::main()
}
