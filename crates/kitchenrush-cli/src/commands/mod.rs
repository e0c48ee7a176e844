pub mod config;
pub mod play;
pub mod simulate;

use std::path::Path;

use kitchenrush_core::{Config, Event, Session, SessionSummary};
use serde::Serialize;

/// Summary line written when a round ends, tagged like the core events.
#[derive(Serialize)]
struct SummaryLine<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    summary: &'a SessionSummary,
}

/// Explicit file if given, otherwise the user config (created on first use).
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

/// Fresh session whose notifications are written to stdout as JSON lines.
pub fn printing_session(config: &Config) -> Result<Session, Box<dyn std::error::Error>> {
    let mut session = Session::new(config)?;
    session.subscribe(|event: &Event| {
        if let Err(e) = print_json(event) {
            tracing::warn!(error = %e, "failed to write event");
        }
    });
    Ok(session)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

pub fn print_summary(summary: &SessionSummary) -> Result<(), serde_json::Error> {
    print_json(&SummaryLine {
        kind: "SessionSummary",
        summary,
    })
}
