// Parsing of the `MCAL_F_CPU` build setting. Shared by `build.rs` and the
// tests in `src/config.rs`, so it only uses what both have in scope.

/// Parses a decimal frequency in Hz. `_` digit separators and surrounding
/// whitespace are accepted; zero is not.
fn parse_f_cpu(raw: &str) -> Result<u32, String> {
	match raw.trim().replace('_', "").parse::<u32>() {
		Ok(0) => Err("MCAL_F_CPU must be non-zero".to_string()),
		Ok(hz) => Ok(hz),
		Err(e) => Err(format!("MCAL_F_CPU={raw:?} is not a frequency in Hz: {e}")),
	}
}
