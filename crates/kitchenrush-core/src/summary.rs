//! End-of-round report shown on the game-over screen.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub successful_deliveries: u32,
    pub elapsed_secs: f64,
    /// `elapsed_secs` as `MM:SS`.
    pub elapsed_display: String,
}

impl SessionSummary {
    pub fn new(successful_deliveries: u32, elapsed_secs: f64) -> Self {
        Self {
            successful_deliveries,
            elapsed_secs,
            elapsed_display: format_clock(elapsed_secs),
        }
    }
}

/// Format seconds as zero-padded `MM:SS`, truncating fractions.
///
/// Minutes are not wrapped, so 100 minutes reads `100:00`.
pub fn format_clock(secs: f64) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
    let minutes = (secs / 60.0).floor() as u64;
    let seconds = (secs % 60.0).floor() as u64;
    format!("{minutes:02}:{seconds:02}")
}
