//! USART logging backend.
//!
//! Implements [`log::Log`] on top of a [`SharedUsart`], one line per record:
//!
//! ```text
//! \x1b[32m[ INFO]\x1b[0m firmware: greeting sent\r\n
//! ```
//!
//! The logger never blocks on the USART lock. If the USART is already held
//! (the driver itself logging from inside a locked section, or another
//! task in the middle of a transfer) the record is dropped instead of
//! deadlocking.
#![cfg_attr(not(test), no_std)]

use core::fmt::Write;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use mcal::{RegisterFile, SharedUsart};

/// Fixed-width tag for a level.
pub fn tag(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRACE",
        Level::Debug => "DEBUG",
        Level::Info => " INFO",
        Level::Warn => " WARN",
        Level::Error => "ERROR",
    }
}

/// ANSI colour for a level.
pub fn color(level: Level) -> &'static str {
    match level {
        Level::Trace => "\x1b[90m", // Gray
        Level::Debug => "\x1b[36m", // Cyan
        Level::Info => "\x1b[32m",  // Green
        Level::Warn => "\x1b[33m",  // Yellow
        Level::Error => "\x1b[31m", // Red
    }
}

const RESET: &str = "\x1b[0m";

/// A logger writing to a shared USART.
pub struct UartLogger<R: 'static> {
    uart: &'static SharedUsart<R>,
    filter: LevelFilter,
}

impl<R: 'static> UartLogger<R> {
    pub const fn new(uart: &'static SharedUsart<R>, filter: LevelFilter) -> Self {
        Self { uart, filter }
    }

    pub const fn filter(&self) -> LevelFilter {
        self.filter
    }
}

impl<R: RegisterFile + Send + 'static> Log for UartLogger<R> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Some(mut uart) = self.uart.try_lock() else {
            return;
        };
        let level = record.level();
        // Usart's fmt::Write never fails; `\n` goes out as CRLF.
        let _ = writeln!(
            uart,
            "{}[{}]{} {}: {}",
            color(level),
            tag(level),
            RESET,
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// Installs `logger` as the global logger and applies its filter.
///
/// Fails if a logger was already installed.
pub fn init<R: RegisterFile + Send + 'static>(logger: &'static UartLogger<R>) -> Result<(), SetLoggerError> {
    #[cfg(target_has_atomic = "ptr")]
    log::set_logger(logger)?;

    // SAFETY: without pointer-width atomics the only supported setup is a
    // single core calling this once before anything logs, which is how
    // the firmware uses it.
    #[cfg(not(target_has_atomic = "ptr"))]
    unsafe {
        log::set_logger_racy(logger)?;
    }

    log::set_max_level(logger.filter);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcal::Usart;
    use mcal::sim::SimRegisters;

    fn leak_uart() -> &'static SharedUsart<SimRegisters> {
        Box::leak(Box::new(SharedUsart::new(Usart::new(SimRegisters::new()))))
    }

    fn wire(uart: &SharedUsart<SimRegisters>) -> Vec<u8> {
        uart.lock().registers_mut().take_transmitted()
    }

    #[test]
    fn record_is_one_crlf_terminated_line() {
        let uart = leak_uart();
        let logger = UartLogger::new(uart, LevelFilter::Info);

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("firmware")
                .args(format_args!("greeting sent"))
                .build(),
        );

        assert_eq!(wire(uart), b"\x1b[32m[ INFO]\x1b[0m firmware: greeting sent\r\n");
    }

    #[test]
    fn records_below_the_filter_are_dropped() {
        let uart = leak_uart();
        let logger = UartLogger::new(uart, LevelFilter::Warn);

        let debug = Metadata::builder().level(Level::Debug).build();
        assert!(!logger.enabled(&debug));
        logger.log(&Record::builder().level(Level::Debug).args(format_args!("x")).build());
        assert!(wire(uart).is_empty());

        logger.log(&Record::builder().level(Level::Error).args(format_args!("x")).build());
        assert!(wire(uart).starts_with(b"\x1b[31m[ERROR]"));
    }

    #[test]
    fn busy_uart_drops_the_record() {
        let uart = leak_uart();
        let logger = UartLogger::new(uart, LevelFilter::Trace);

        let guard = uart.lock();
        logger.log(&Record::builder().level(Level::Warn).args(format_args!("lost")).build());
        drop(guard);

        assert!(wire(uart).is_empty());
    }

    #[test]
    fn multi_line_messages_get_crlf() {
        let uart = leak_uart();
        let logger = UartLogger::new(uart, LevelFilter::Trace);
        logger.log(
            &Record::builder()
                .level(Level::Trace)
                .target("t")
                .args(format_args!("a\nb"))
                .build(),
        );
        assert_eq!(wire(uart), b"\x1b[90m[TRACE]\x1b[0m t: a\r\nb\r\n");
    }

    /// Builds a logger for any register file, the way firmware does.
    fn logger_for<R: RegisterFile + Send + 'static>(
        uart: &'static SharedUsart<R>,
    ) -> &'static UartLogger<R> {
        Box::leak(Box::new(UartLogger::new(uart, LevelFilter::Debug)))
    }

    #[test]
    fn generic_logger_over_a_static_usart() {
        let uart = leak_uart();
        let logger = logger_for(uart);
        assert_eq!(logger.filter(), LevelFilter::Debug);

        logger.log(&Record::builder().level(Level::Debug).target("g").args(format_args!("up")).build());
        assert_eq!(wire(uart), b"\x1b[36m[DEBUG]\x1b[0m g: up\r\n");
    }

    #[test]
    fn tags_are_fixed_width() {
        for level in [Level::Trace, Level::Debug, Level::Info, Level::Warn, Level::Error] {
            assert_eq!(tag(level).len(), 5);
        }
    }

    #[test]
    fn init_installs_once() {
        static UART: SharedUsart<SimRegisters> = SharedUsart::new(Usart::new(SimRegisters::new()));
        static LOGGER: UartLogger<SimRegisters> = UartLogger::new(&UART, LevelFilter::Info);

        assert!(init(&LOGGER).is_ok());
        assert_eq!(log::max_level(), LevelFilter::Info);
        assert!(init(&LOGGER).is_err());

        UART.lock().registers_mut().take_transmitted();
        log::info!(target: "mlog-test", "through the facade");
        let sent = UART.lock().registers_mut().take_transmitted();
        assert!(sent.ends_with(b"mlog-test: through the facade\r\n"), "{sent:?}");
    }
}
