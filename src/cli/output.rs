//! Output mode helpers shared by all subcommands.
//!
//! The global CLI flags are stashed in environment variables by `main`
//! so every module can check them without threading flags around.

/// True when `--json` was passed.
pub fn is_json() -> bool {
    std::env::var("SCARAB_JSON").is_ok()
}

/// True when `--quiet` was passed.
pub fn is_quiet() -> bool {
    std::env::var("SCARAB_QUIET").is_ok()
}

/// Print a machine-readable JSON document to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}
