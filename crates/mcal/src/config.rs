//! Build-time and runtime configuration for the USART.
//!
//! The oscillator frequency is baked in by `build.rs` (see the crate
//! manifest). Everything else a caller can choose lives in
//! [`UsartConfig`].

include!(concat!(env!("OUT_DIR"), "/f_cpu.rs"));

/// Computes the UBRR divisor for `baud` at `clock_hz`.
///
/// `clock_hz / (16 * baud) - 1`, integer division, truncated to 16 bits.
/// This is the unchecked form used by [`Usart::init`](crate::Usart::init):
/// a zero baud rate or a divisor outside `u16` is a caller bug and
/// produces a garbage divisor rather than an error. Use [`checked_ubrr`]
/// to validate a baud rate up front.
pub const fn ubrr(clock_hz: u32, baud: u32) -> u16 {
    let prescaled = 16u32.wrapping_mul(baud);
    if prescaled == 0 {
        return u16::MAX;
    }
    (clock_hz / prescaled).wrapping_sub(1) as u16
}

/// Computes the UBRR divisor, or `None` if `baud` cannot be generated
/// from `clock_hz` with a 16-bit divisor.
pub const fn checked_ubrr(clock_hz: u32, baud: u32) -> Option<u16> {
    if baud == 0 {
        return None;
    }
    let prescaled = match 16u32.checked_mul(baud) {
        Some(p) => p,
        None => return None,
    };
    let quotient = clock_hz / prescaled;
    if quotient == 0 || quotient - 1 > u16::MAX as u32 {
        return None;
    }
    Some((quotient - 1) as u16)
}

/// What to do with the frame, overrun and parity flags latched in UCSRA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineErrors {
    /// Never look at them. Every received byte is returned as-is.
    #[default]
    Ignore,
    /// Surface them from [`Usart::receive_checked`](crate::Usart::receive_checked).
    Report,
}

/// Runtime configuration of a [`Usart`](crate::Usart).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsartConfig {
    /// Oscillator frequency feeding the baud-rate generator, in Hz.
    pub clock_hz: u32,
    /// Line error policy for checked receives.
    pub line_errors: LineErrors,
}

impl UsartConfig {
    /// `F_CPU` clock with line errors ignored.
    pub const fn new() -> Self {
        Self {
            clock_hz: F_CPU,
            line_errors: LineErrors::Ignore,
        }
    }

    /// Same configuration with a different clock.
    pub const fn with_clock(self, clock_hz: u32) -> Self {
        Self { clock_hz, ..self }
    }

    /// Same configuration with a different line error policy.
    pub const fn with_line_errors(self, line_errors: LineErrors) -> Self {
        Self { line_errors, ..self }
    }
}

impl Default for UsartConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divisor_for_19200_at_16mhz() {
        assert_eq!(ubrr(16_000_000, 19_200), 51);
        assert_eq!(checked_ubrr(16_000_000, 19_200), Some(51));
    }

    #[test]
    fn divisor_for_common_rates() {
        assert_eq!(ubrr(16_000_000, 9_600), 103);
        assert_eq!(ubrr(8_000_000, 9_600), 51);
        assert_eq!(ubrr(16_000_000, 1_000_000), 0);
        assert_eq!(ubrr(16_000_000, 250), 3_999);
    }

    #[test]
    fn checked_rejects_zero_baud() {
        assert_eq!(checked_ubrr(16_000_000, 0), None);
    }

    #[test]
    fn checked_rejects_rates_above_clock_over_16() {
        // 16 MHz / (16 * 2 Mbaud) == 0, the divisor would underflow.
        assert_eq!(checked_ubrr(16_000_000, 2_000_000), None);
    }

    #[test]
    fn checked_rejects_divisor_wider_than_16_bits() {
        // 16 MHz / (16 * 10) - 1 == 99_999.
        assert_eq!(checked_ubrr(16_000_000, 10), None);
        assert_eq!(checked_ubrr(u32::MAX, u32::MAX), None);
    }

    #[test]
    fn checked_matches_unchecked_in_range() {
        for baud in [2_400, 4_800, 9_600, 14_400, 19_200, 38_400, 57_600, 115_200] {
            assert_eq!(checked_ubrr(16_000_000, baud), Some(ubrr(16_000_000, baud)), "baud {baud}");
        }
    }

    mod build_setting {
        include!(concat!(env!("CARGO_MANIFEST_DIR"), "/f_cpu.rs"));

        #[test]
        fn accepts_plain_and_separated_decimal() {
            assert_eq!(parse_f_cpu("16000000"), Ok(16_000_000));
            assert_eq!(parse_f_cpu(" 8_000_000\n"), Ok(8_000_000));
        }

        #[test]
        fn rejects_zero() {
            assert!(parse_f_cpu("0").is_err());
            assert!(parse_f_cpu("0_000").is_err());
        }

        #[test]
        fn rejects_non_numeric() {
            assert!(parse_f_cpu("16MHz").is_err());
            assert!(parse_f_cpu("").is_err());
            assert!(parse_f_cpu("-1").is_err());
            assert!(parse_f_cpu("99999999999").is_err());
        }
    }

    #[test]
    fn default_config_uses_build_clock_and_ignores_errors() {
        let cfg = UsartConfig::default();
        assert_eq!(cfg.clock_hz, F_CPU);
        assert_eq!(cfg.line_errors, LineErrors::Ignore);

        let cfg = cfg.with_clock(8_000_000).with_line_errors(LineErrors::Report);
        assert_eq!(cfg.clock_hz, 8_000_000);
        assert_eq!(cfg.line_errors, LineErrors::Report);
    }
}
