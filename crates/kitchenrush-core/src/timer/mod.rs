mod engine;
mod observer;
mod state;

pub use engine::SessionTimer;
pub use observer::{ObserverId, SessionObserver};
pub use state::{Escalation, PlayClock, SessionPhase, SessionState};
