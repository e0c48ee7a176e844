//! # Kitchen Rush Core Library
//!
//! Session timing and scoring core of a real-time cooking/delivery game.
//! Rendering, input handling, plate mechanics and recipe matching live
//! elsewhere; they feed discrete signals in and read state back out.
//!
//! ## Architecture
//!
//! - **Session Timer**: A delta-driven phase state machine with an escalating
//!   time-decay schedule. The host calls `advance()` once per tick.
//! - **Delivery Scoring**: Turns upstream success/failure outcomes into a fixed
//!   bonus or penalty on the remaining play time and counts successes.
//! - **Session Host**: Explicit owner of one timer and one bridge, with a
//!   locked handle for multi-threaded hosts.
//! - **Configuration**: TOML tuning file for durations and magnitudes.
//!
//! ## Key Components
//!
//! - [`SessionTimer`]: Core phase state machine
//! - [`DeliveryScoreBridge`]: Delivery outcome to timer mutation
//! - [`Session`]: Owner of one round
//! - [`Config`]: Tuning options

pub mod config;
pub mod delivery;
pub mod error;
pub mod events;
pub mod session;
pub mod summary;
pub mod timer;

pub use config::{Config, DeliveryConfig, TimerConfig};
pub use delivery::{DeliveryOutcome, DeliveryScoreBridge};
pub use error::{ConfigError, CoreError, Result, ValidationError};
pub use events::Event;
pub use session::{Session, SharedSession};
pub use summary::{format_clock, SessionSummary};
pub use timer::{Escalation, ObserverId, PlayClock, SessionObserver, SessionPhase, SessionState, SessionTimer};
