//! Session host.
//!
//! [`Session`] is the single owner of one round: the timer and the delivery
//! bridge. Collaborators get a reference (or a [`SharedSession`] handle)
//! from whoever drives the frame loop.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::Config;
use crate::delivery::{DeliveryOutcome, DeliveryScoreBridge};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::summary::SessionSummary;
use crate::timer::{ObserverId, SessionObserver, SessionPhase, SessionTimer};

#[derive(Debug, Default)]
pub struct Session {
    timer: SessionTimer,
    scoring: DeliveryScoreBridge,
}

impl Session {
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            timer: SessionTimer::new(config.timer)?,
            scoring: DeliveryScoreBridge::new(config.delivery)?,
        })
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn scoring(&self) -> &DeliveryScoreBridge {
        &self.scoring
    }

    pub fn subscribe(&mut self, observer: impl SessionObserver + 'static) -> ObserverId {
        self.timer.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.timer.unsubscribe(id)
    }

    // ── Inbound signals ──────────────────────────────────────────────

    pub fn interact(&mut self) -> Option<Event> {
        self.timer.on_interact_signal()
    }

    /// # Errors
    ///
    /// Returns `ValidationError::InvalidArgument` for a negative or non-finite delta.
    pub fn tick(&mut self, delta_secs: f64) -> Result<Option<Event>> {
        self.timer.advance(delta_secs)
    }

    pub fn deliver(&mut self, outcome: DeliveryOutcome) {
        self.scoring.record(outcome, &mut self.timer);
    }

    pub fn toggle_pause(&mut self) -> Event {
        self.timer.toggle_pause()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        self.timer.phase()
    }

    pub fn is_playing(&self) -> bool {
        self.timer.is_playing()
    }

    pub fn is_countdown_active(&self) -> bool {
        self.timer.is_countdown_active()
    }

    pub fn is_over(&self) -> bool {
        self.timer.is_over()
    }

    pub fn is_paused(&self) -> bool {
        self.timer.is_paused()
    }

    pub fn countdown_remaining(&self) -> f64 {
        self.timer.countdown_remaining()
    }

    pub fn play_fraction_elapsed(&self) -> f64 {
        self.timer.play_fraction_elapsed()
    }

    pub fn elapsed_time(&self) -> f64 {
        self.timer.elapsed_secs()
    }

    pub fn successful_deliveries(&self) -> u32 {
        self.scoring.successful_deliveries()
    }

    pub fn snapshot(&self) -> Event {
        self.timer.snapshot()
    }

    /// Report for the game-over screen. Valid at any time; final once over.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary::new(self.successful_deliveries(), self.elapsed_time())
    }
}

/// Session handle for multi-threaded hosts.
///
/// Every operation holds the one lock for its whole duration, so transitions
/// never interleave.
#[derive(Debug, Clone, Default)]
pub struct SharedSession(Arc<Mutex<Session>>);

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Session>> {
        self.0.lock().map_err(|_| CoreError::LockPoisoned)
    }

    /// Run `f` with exclusive access to the session.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::LockPoisoned` if a previous holder panicked.
    pub fn with<T>(&self, f: impl FnOnce(&mut Session) -> T) -> Result<T> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }

    /// # Errors
    ///
    /// Returns `CoreError::LockPoisoned` if a previous holder panicked.
    pub fn interact(&self) -> Result<Option<Event>> {
        self.with(Session::interact)
    }

    /// # Errors
    ///
    /// Returns the tick error, or `CoreError::LockPoisoned`.
    pub fn tick(&self, delta_secs: f64) -> Result<Option<Event>> {
        self.with(|s| s.tick(delta_secs))?
    }

    /// # Errors
    ///
    /// Returns `CoreError::LockPoisoned` if a previous holder panicked.
    pub fn deliver(&self, outcome: DeliveryOutcome) -> Result<()> {
        self.with(|s| s.deliver(outcome))
    }

    /// # Errors
    ///
    /// Returns `CoreError::LockPoisoned` if a previous holder panicked.
    pub fn toggle_pause(&self) -> Result<Event> {
        self.with(Session::toggle_pause)
    }

    /// # Errors
    ///
    /// Returns `CoreError::LockPoisoned` if a previous holder panicked.
    pub fn snapshot(&self) -> Result<Event> {
        self.with(|s| s.snapshot())
    }

    /// # Errors
    ///
    /// Returns `CoreError::LockPoisoned` if a previous holder panicked.
    pub fn summary(&self) -> Result<SessionSummary> {
        self.with(|s| s.summary())
    }
}
