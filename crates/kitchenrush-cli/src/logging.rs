//! Logging initialization for the CLI host.
//!
//! Logs go to stderr so stdout stays a clean stream of JSON lines.
//! `KITCHENRUSH_LOG` (an `EnvFilter` directive) overrides `-v`.

use tracing_subscriber::EnvFilter;

/// Maps a verbosity level to a tracing directive string.
///
/// - 0 → `"warn"`
/// - 1 → `"info"`
/// - 2 → `"debug"`
/// - 3+ → `"trace"` (saturates)
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initializes the global tracing subscriber.
///
/// Uses `try_init()` so calling this more than once is harmless.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_env("KITCHENRUSH_LOG")
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .try_init();
}
