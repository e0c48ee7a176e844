use serde::{Deserialize, Serialize};

/// Coarse-grained session phase.
///
/// Phases only ever move forward:
/// `WaitingToStart -> CountdownToStart -> Playing -> Over`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    WaitingToStart,
    CountdownToStart,
    Playing,
    Over,
}

impl SessionPhase {
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::WaitingToStart => "waiting_to_start",
            SessionPhase::CountdownToStart => "countdown_to_start",
            SessionPhase::Playing => "playing",
            SessionPhase::Over => "over",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Late-game time pressure: how long since the last automatic deduction and
/// how large the next one will be.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Escalation {
    /// Playing time accumulated since the last deduction.
    pub interval_elapsed: f64,
    /// Multiplier applied to the base step on the next deduction. Starts at 1.
    pub step_multiplier: u32,
}

impl Default for Escalation {
    fn default() -> Self {
        Self {
            interval_elapsed: 0.0,
            step_multiplier: 1,
        }
    }
}

/// Clock of the `Playing` phase.
///
/// `remaining` counts down and is moved by deliveries and decay;
/// `elapsed` counts up and is only moved by ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayClock {
    pub remaining: f64,
    pub elapsed: f64,
    pub escalation: Escalation,
}

impl PlayClock {
    /// Fresh clock for a round of `duration` time units.
    pub fn fresh(duration: f64) -> Self {
        Self {
            remaining: duration,
            elapsed: 0.0,
            escalation: Escalation::default(),
        }
    }
}

/// Session state with the clock data that is valid for each phase.
///
/// `Over` keeps the final play clock frozen so the elapsed time can still be
/// reported after the round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionState {
    WaitingToStart,
    CountdownToStart { remaining: f64 },
    Playing(PlayClock),
    Over(PlayClock),
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::WaitingToStart => SessionPhase::WaitingToStart,
            SessionState::CountdownToStart { .. } => SessionPhase::CountdownToStart,
            SessionState::Playing(_) => SessionPhase::Playing,
            SessionState::Over(_) => SessionPhase::Over,
        }
    }

    /// The play clock, live or frozen, once the round has started.
    pub fn play_clock(&self) -> Option<&PlayClock> {
        match self {
            SessionState::Playing(clock) | SessionState::Over(clock) => Some(clock),
            _ => None,
        }
    }
}
