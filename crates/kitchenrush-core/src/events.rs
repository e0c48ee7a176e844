use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::SessionPhase;

/// Every externally observable change of the session produces an Event.
/// Observers receive them synchronously; hosts may also forward the value
/// returned by the mutator that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The session moved to a new phase. Receivers re-query whatever they need.
    PhaseChanged {
        phase: SessionPhase,
        at: DateTime<Utc>,
    },
    GamePaused {
        at: DateTime<Utc>,
    },
    GameUnpaused {
        at: DateTime<Utc>,
    },
    /// Full read-only view for presentation layers. Never sent to observers.
    StateSnapshot {
        phase: SessionPhase,
        paused: bool,
        countdown_remaining: f64,
        play_remaining: f64,
        play_fraction_elapsed: f64,
        elapsed_secs: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn phase_changed(phase: SessionPhase) -> Self {
        Event::PhaseChanged {
            phase,
            at: Utc::now(),
        }
    }

    pub fn pause_changed(paused: bool) -> Self {
        let at = Utc::now();
        if paused {
            Event::GamePaused { at }
        } else {
            Event::GameUnpaused { at }
        }
    }

    /// Wire name of the variant, as written in the `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::PhaseChanged { .. } => "PhaseChanged",
            Event::GamePaused { .. } => "GamePaused",
            Event::GameUnpaused { .. } => "GameUnpaused",
            Event::StateSnapshot { .. } => "StateSnapshot",
        }
    }
}
