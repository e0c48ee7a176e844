//! Session timer implementation.
//!
//! The session timer is a delta-driven state machine. It does not read the
//! wall clock or spawn threads - the host calls `advance()` once per
//! simulation tick with the time elapsed since the previous tick.
//!
//! ## State Transitions
//!
//! ```text
//! WaitingToStart -(interact)-> CountdownToStart -(countdown < 0)-> Playing -(remaining < 0)-> Over
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = SessionTimer::new(TimerConfig::default())?;
//! timer.on_interact_signal();
//! // In the frame loop:
//! timer.advance(frame_delta * timer.time_scale())?; // Some(Event) on transition
//! ```

use chrono::Utc;
use tracing::{debug, info, trace};

use super::observer::{ObserverId, ObserverRegistry, SessionObserver};
use super::state::{Escalation, PlayClock, SessionPhase, SessionState};
use crate::config::TimerConfig;
use crate::error::{Result, ValidationError};
use crate::events::Event;

/// Core session timer.
///
/// Owns the countdown and play clocks, the escalating decay schedule and
/// the phase state machine. Out-of-phase signals are ignored, never errors.
#[derive(Debug)]
pub struct SessionTimer {
    config: TimerConfig,
    state: SessionState,
    paused: bool,
    observers: ObserverRegistry,
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::from_validated(TimerConfig::default())
    }
}

impl SessionTimer {
    /// Create a timer in `WaitingToStart`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: TimerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: TimerConfig) -> Self {
        Self {
            config,
            state: SessionState::WaitingToStart,
            paused: false,
            observers: ObserverRegistry::default(),
        }
    }

    // ── Observers ────────────────────────────────────────────────────

    pub fn subscribe(&mut self, observer: impl SessionObserver + 'static) -> ObserverId {
        self.observers.subscribe(Box::new(observer))
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    pub fn is_waiting_to_start(&self) -> bool {
        self.phase() == SessionPhase::WaitingToStart
    }

    pub fn is_countdown_active(&self) -> bool {
        self.phase() == SessionPhase::CountdownToStart
    }

    pub fn is_playing(&self) -> bool {
        self.phase() == SessionPhase::Playing
    }

    pub fn is_over(&self) -> bool {
        self.phase() == SessionPhase::Over
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Multiplier the host applies to its frame delta: 0 while paused.
    pub fn time_scale(&self) -> f64 {
        if self.paused {
            0.0
        } else {
            1.0
        }
    }

    /// Countdown before play starts. Full duration while waiting, 0 once playing.
    pub fn countdown_remaining(&self) -> f64 {
        match self.state {
            SessionState::WaitingToStart => self.config.countdown_duration,
            SessionState::CountdownToStart { remaining } => remaining,
            SessionState::Playing(_) | SessionState::Over(_) => 0.0,
        }
    }

    /// Remaining play time. Full round before play starts; may be negative once over.
    pub fn play_remaining(&self) -> f64 {
        self.state
            .play_clock()
            .map(|c| c.remaining)
            .unwrap_or(self.config.play_duration_max)
    }

    /// 0.0 .. 1.0 fraction of the round used up, for progress displays.
    pub fn play_fraction_elapsed(&self) -> f64 {
        (1.0 - self.play_remaining() / self.config.play_duration_max).clamp(0.0, 1.0)
    }

    /// Playing-phase time, unaffected by bonuses and penalties. Frozen once over.
    pub fn elapsed_secs(&self) -> f64 {
        self.state.play_clock().map(|c| c.elapsed).unwrap_or(0.0)
    }

    pub fn escalation(&self) -> Option<Escalation> {
        self.state.play_clock().map(|c| c.escalation)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase(),
            paused: self.paused,
            countdown_remaining: self.countdown_remaining(),
            play_remaining: self.play_remaining(),
            play_fraction_elapsed: self.play_fraction_elapsed(),
            elapsed_secs: self.elapsed_secs(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Interact input. Starts the countdown from `WaitingToStart`; ignored otherwise.
    pub fn on_interact_signal(&mut self) -> Option<Event> {
        match self.state {
            SessionState::WaitingToStart if !self.paused => {
                let next = SessionState::CountdownToStart {
                    remaining: self.config.countdown_duration,
                };
                Some(self.transition(next))
            }
            _ => {
                trace!(phase = %self.phase(), paused = self.paused, "interact ignored");
                None
            }
        }
    }

    /// Call once per tick. Returns `Some(Event::PhaseChanged)` on a transition.
    ///
    /// Applies at most one decay step per call. Does nothing while paused.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidArgument` if `delta_secs` is negative
    /// or not finite. State is untouched in that case.
    pub fn advance(&mut self, delta_secs: f64) -> Result<Option<Event>> {
        if !delta_secs.is_finite() || delta_secs < 0.0 {
            return Err(ValidationError::InvalidArgument {
                name: "delta_secs".into(),
                message: format!("must be a finite number >= 0, got {delta_secs}"),
            }
            .into());
        }
        if self.paused {
            trace!("advance ignored while paused");
            return Ok(None);
        }

        let next = match &mut self.state {
            SessionState::WaitingToStart | SessionState::Over(_) => None,
            SessionState::CountdownToStart { remaining } => {
                *remaining -= delta_secs;
                if *remaining < 0.0 {
                    Some(SessionState::Playing(PlayClock::fresh(
                        self.config.play_duration_max,
                    )))
                } else {
                    None
                }
            }
            SessionState::Playing(clock) => {
                clock.remaining -= delta_secs;
                clock.elapsed += delta_secs;
                clock.escalation.interval_elapsed += delta_secs;

                if clock.escalation.interval_elapsed >= self.config.decay_interval {
                    let deduction =
                        self.config.decay_base_step * f64::from(clock.escalation.step_multiplier);
                    clock.remaining -= deduction;
                    debug!(
                        deduction,
                        step = clock.escalation.step_multiplier,
                        remaining = clock.remaining,
                        "time decay applied"
                    );
                    clock.escalation.step_multiplier =
                        clock.escalation.step_multiplier.saturating_add(1);
                    clock.escalation.interval_elapsed = 0.0;
                }

                // No clamp here: going below zero ends the round.
                if clock.remaining < 0.0 {
                    Some(SessionState::Over(*clock))
                } else {
                    None
                }
            }
        };

        Ok(next.map(|state| self.transition(state)))
    }

    /// Add play time, capped at the round length. Only while playing.
    ///
    /// Negative or non-finite amounts are ignored.
    pub fn add_bonus(&mut self, amount: f64) {
        let max = self.config.play_duration_max;
        if !is_valid_amount(amount) {
            trace!(amount, "bonus ignored: invalid amount");
            return;
        }
        if let SessionState::Playing(clock) = &mut self.state {
            clock.remaining = (clock.remaining + amount).min(max);
            debug!(amount, remaining = clock.remaining, "bonus applied");
        } else {
            trace!(amount, phase = %self.phase(), "bonus ignored");
        }
    }

    /// Remove play time, floored at zero. Only while playing.
    ///
    /// Never ends the round by itself; the next tick does. Negative or
    /// non-finite amounts are ignored.
    pub fn apply_penalty(&mut self, amount: f64) {
        if !is_valid_amount(amount) {
            trace!(amount, "penalty ignored: invalid amount");
            return;
        }
        if let SessionState::Playing(clock) = &mut self.state {
            clock.remaining = (clock.remaining - amount).max(0.0);
            debug!(amount, remaining = clock.remaining, "penalty applied");
        } else {
            trace!(amount, phase = %self.phase(), "penalty ignored");
        }
    }

    /// Flip the pause flag. Clock fields are left as they are.
    pub fn toggle_pause(&mut self) -> Event {
        self.paused = !self.paused;
        info!(paused = self.paused, "pause toggled");
        let event = Event::pause_changed(self.paused);
        self.observers.notify(&event);
        event
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn transition(&mut self, next: SessionState) -> Event {
        let from = self.phase();
        let to = next.phase();
        debug_assert!(to > from, "phase transitions only move forward");
        info!(%from, %to, "session phase changed");
        self.state = next;
        let event = Event::phase_changed(to);
        self.observers.notify(&event);
        event
    }
}

fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::sync::{Arc, Mutex};

    fn recorder(timer: &mut SessionTimer) -> Arc<Mutex<Vec<Event>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        timer.subscribe(move |e: &Event| sink.lock().unwrap().push(e.clone()));
        seen
    }

    fn playing_timer() -> SessionTimer {
        let mut timer = SessionTimer::default();
        timer.on_interact_signal();
        timer.advance(3.5).unwrap();
        assert!(timer.is_playing());
        timer
    }

    fn playing_with_remaining(remaining: f64) -> SessionTimer {
        let mut timer = playing_timer();
        timer.apply_penalty(timer.config().play_duration_max - remaining);
        assert_eq!(timer.play_remaining(), remaining);
        timer
    }

    #[test]
    fn starts_waiting() {
        let timer = SessionTimer::default();
        assert!(timer.is_waiting_to_start());
        assert!(!timer.is_paused());
        assert_eq!(timer.play_fraction_elapsed(), 0.0);
        assert_eq!(timer.elapsed_secs(), 0.0);
    }

    #[test]
    fn interact_starts_countdown() {
        let mut timer = SessionTimer::default();
        let event = timer.on_interact_signal();
        assert!(matches!(
            event,
            Some(Event::PhaseChanged {
                phase: SessionPhase::CountdownToStart,
                ..
            })
        ));
        assert!(timer.is_countdown_active());
        assert_eq!(timer.countdown_remaining(), 3.0);
    }

    #[test]
    fn interact_outside_waiting_is_ignored() {
        let mut timer = SessionTimer::default();
        timer.on_interact_signal();
        let seen = recorder(&mut timer);
        assert!(timer.on_interact_signal().is_none());
        assert_eq!(timer.countdown_remaining(), 3.0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn countdown_reaching_exactly_zero_keeps_counting() {
        let mut timer = SessionTimer::default();
        timer.on_interact_signal();
        assert!(timer.advance(3.0).unwrap().is_none());
        assert!(timer.is_countdown_active());
        assert!(timer.advance(0.25).unwrap().is_some());
        assert!(timer.is_playing());
    }

    #[test]
    fn countdown_expiry_enters_playing_with_fresh_clock() {
        let mut timer = SessionTimer::default();
        timer.on_interact_signal();
        let event = timer.advance(3.5).unwrap();
        assert!(matches!(
            event,
            Some(Event::PhaseChanged {
                phase: SessionPhase::Playing,
                ..
            })
        ));
        assert_eq!(timer.play_remaining(), 60.0);
        assert_eq!(timer.elapsed_secs(), 0.0);
        assert_eq!(timer.escalation(), Some(Escalation::default()));
    }

    #[test]
    fn waiting_ignores_ticks() {
        let mut timer = SessionTimer::default();
        assert!(timer.advance(100.0).unwrap().is_none());
        assert!(timer.is_waiting_to_start());
    }

    #[test]
    fn first_decay_step_after_one_interval() {
        let mut timer = playing_timer();
        for _ in 0..40 {
            timer.advance(0.25).unwrap();
        }
        assert_eq!(timer.play_remaining(), 47.0);
        assert_eq!(timer.elapsed_secs(), 10.0);
        let escalation = timer.escalation().unwrap();
        assert_eq!(escalation.step_multiplier, 2);
        assert_eq!(escalation.interval_elapsed, 0.0);
    }

    #[test]
    fn second_decay_step_doubles() {
        let mut timer = playing_timer();
        timer.advance(10.0).unwrap();
        assert_eq!(timer.play_remaining(), 47.0);
        timer.advance(10.0).unwrap();
        // 47 - 10 tick-down - 6 second step
        assert_eq!(timer.play_remaining(), 31.0);
        assert_eq!(timer.escalation().unwrap().step_multiplier, 3);
    }

    #[test]
    fn large_tick_applies_single_decay_step() {
        let mut timer = playing_timer();
        timer.advance(25.0).unwrap();
        // 60 - 25 - 3, no catch-up for the second interval
        assert_eq!(timer.play_remaining(), 32.0);
        assert_eq!(timer.escalation().unwrap().step_multiplier, 2);
    }

    #[test]
    fn running_out_ends_round() {
        let mut timer = playing_with_remaining(2.0);
        let seen = recorder(&mut timer);
        let event = timer.advance(3.0).unwrap();
        assert!(timer.is_over());
        assert!(matches!(
            event,
            Some(Event::PhaseChanged {
                phase: SessionPhase::Over,
                ..
            })
        ));
        assert_eq!(seen.lock().unwrap().len(), 1);
        // Not clamped at the transition.
        assert_eq!(timer.play_remaining(), -1.0);
        assert_eq!(timer.play_fraction_elapsed(), 1.0);
    }

    #[test]
    fn decay_step_alone_pushes_below_zero() {
        let mut timer = playing_timer();
        timer.advance(9.0).unwrap();
        timer.apply_penalty(49.0);
        assert_eq!(timer.play_remaining(), 2.0);
        // 2.0 - 1.0 tick - 3.0 decay = -2.0
        timer.advance(1.0).unwrap();
        assert!(timer.is_over());
        assert_eq!(timer.play_remaining(), -2.0);
    }

    #[test]
    fn zero_remaining_survives_zero_delta() {
        let mut timer = playing_with_remaining(0.0);
        assert!(timer.advance(0.0).unwrap().is_none());
        assert!(timer.is_playing());
        assert!(timer.advance(0.25).unwrap().is_some());
        assert!(timer.is_over());
    }

    #[test]
    fn bonus_caps_at_round_length() {
        let mut timer = playing_with_remaining(55.0);
        timer.add_bonus(10.0);
        assert_eq!(timer.play_remaining(), 60.0);
    }

    #[test]
    fn penalty_floors_at_zero() {
        let mut timer = playing_with_remaining(5.0);
        timer.apply_penalty(12.0);
        assert_eq!(timer.play_remaining(), 0.0);
        assert!(timer.is_playing());
    }

    #[test]
    fn negative_and_non_finite_amounts_are_ignored() {
        let mut timer = playing_with_remaining(30.0);
        let max = timer.config().play_duration_max;

        timer.add_bonus(-100.0);
        timer.apply_penalty(-100.0);
        timer.add_bonus(f64::NAN);
        timer.apply_penalty(f64::NAN);
        timer.add_bonus(f64::INFINITY);
        timer.apply_penalty(f64::INFINITY);

        assert!(timer.is_playing());
        assert_eq!(timer.play_remaining(), 30.0);
        assert!((0.0..=max).contains(&timer.play_remaining()));
    }

    #[test]
    fn bonus_and_penalty_never_touch_elapsed() {
        let mut timer = playing_timer();
        timer.advance(4.0).unwrap();
        timer.apply_penalty(20.0);
        timer.add_bonus(5.0);
        assert_eq!(timer.elapsed_secs(), 4.0);
    }

    #[test]
    fn bonus_and_penalty_ignored_outside_playing() {
        let mut timer = SessionTimer::default();
        let seen = recorder(&mut timer);
        timer.add_bonus(10.0);
        timer.apply_penalty(12.0);
        assert_eq!(timer.state(), &SessionState::WaitingToStart);

        timer.on_interact_signal();
        timer.add_bonus(10.0);
        timer.apply_penalty(12.0);
        assert_eq!(timer.countdown_remaining(), 3.0);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn over_is_terminal() {
        let mut timer = playing_with_remaining(1.0);
        timer.advance(2.0).unwrap();
        assert!(timer.is_over());
        let frozen = *timer.state();

        assert!(timer.on_interact_signal().is_none());
        assert!(timer.advance(50.0).unwrap().is_none());
        timer.add_bonus(10.0);
        timer.apply_penalty(10.0);
        assert_eq!(timer.state(), &frozen);
        assert_eq!(timer.elapsed_secs(), 2.0);
    }

    #[test]
    fn negative_delta_is_rejected() {
        let mut timer = playing_timer();
        let err = timer.advance(-0.5).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidArgument { .. })
        ));
        assert_eq!(timer.play_remaining(), 60.0);
    }

    #[test]
    fn nan_delta_is_rejected() {
        let mut timer = playing_timer();
        assert!(timer.advance(f64::NAN).is_err());
        assert!(timer.advance(f64::INFINITY).is_err());
        assert!(timer.is_playing());
    }

    #[test]
    fn double_toggle_restores_pause_state() {
        let mut timer = playing_timer();
        timer.advance(1.5).unwrap();
        let before = *timer.state();
        let seen = recorder(&mut timer);

        assert_eq!(timer.toggle_pause().kind(), "GamePaused");
        assert!(timer.is_paused());
        assert_eq!(timer.time_scale(), 0.0);
        assert_eq!(timer.toggle_pause().kind(), "GameUnpaused");
        assert!(!timer.is_paused());
        assert_eq!(timer.time_scale(), 1.0);

        assert_eq!(timer.state(), &before);
        let kinds: Vec<_> = seen.lock().unwrap().iter().map(Event::kind).collect();
        assert_eq!(kinds, vec!["GamePaused", "GameUnpaused"]);
    }

    #[test]
    fn paused_timer_does_not_advance_or_transition() {
        let mut timer = SessionTimer::default();
        timer.toggle_pause();
        assert!(timer.on_interact_signal().is_none());
        assert!(timer.is_waiting_to_start());

        timer.toggle_pause();
        timer.on_interact_signal();
        timer.toggle_pause();
        assert!(timer.advance(5.0).unwrap().is_none());
        assert_eq!(timer.countdown_remaining(), 3.0);
    }

    #[test]
    fn custom_config_is_honoured() {
        let config = TimerConfig {
            play_duration_max: 30.0,
            countdown_duration: 1.0,
            decay_interval: 5.0,
            decay_base_step: 2.0,
        };
        let mut timer = SessionTimer::new(config).unwrap();
        timer.on_interact_signal();
        assert_eq!(timer.countdown_remaining(), 1.0);
        timer.advance(1.5).unwrap();
        assert_eq!(timer.play_remaining(), 30.0);
        timer.advance(5.0).unwrap();
        assert_eq!(timer.play_remaining(), 23.0);
        assert_eq!(timer.play_fraction_elapsed(), 1.0 - 23.0 / 30.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = TimerConfig {
            decay_interval: 0.0,
            ..TimerConfig::default()
        };
        assert!(SessionTimer::new(config).is_err());
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let timer = playing_with_remaining(45.0);
        match timer.snapshot() {
            Event::StateSnapshot {
                phase,
                paused,
                play_remaining,
                play_fraction_elapsed,
                ..
            } => {
                assert_eq!(phase, SessionPhase::Playing);
                assert!(!paused);
                assert_eq!(play_remaining, 45.0);
                assert_eq!(play_fraction_elapsed, 0.25);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }
}
