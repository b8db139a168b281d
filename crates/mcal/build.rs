use std::env;
use std::fs;
use std::path::Path;

include!("f_cpu.rs");

/// Oscillator frequency used when `MCAL_F_CPU` is not set.
const DEFAULT_F_CPU: u32 = 16_000_000;

fn main() {
	println!("cargo:rerun-if-env-changed=MCAL_F_CPU");
	println!("cargo:rerun-if-changed=build.rs");
	println!("cargo:rerun-if-changed=f_cpu.rs");

	let f_cpu = match env::var("MCAL_F_CPU") {
		Ok(raw) => parse_f_cpu(&raw).unwrap_or_else(|msg| panic!("{msg}")),
		Err(_) => DEFAULT_F_CPU,
	};

	let out_dir = env::var("OUT_DIR").expect("cargo always sets OUT_DIR for build scripts");
	let generated = format!(
		"/// Oscillator frequency in Hz, fixed at build time (`MCAL_F_CPU`).\n\
		 pub const F_CPU: u32 = {f_cpu};\n"
	);
	fs::write(Path::new(&out_dir).join("f_cpu.rs"), generated)
		.expect("failed to write generated clock configuration");
}
