//! Observer registration for session notifications.
//!
//! Presentation collaborators (countdown display, game-over screen, pause
//! menu) register here instead of reaching for a process-wide instance.
//! Delivery is synchronous and in transition order.

use crate::events::Event;

/// Receiver of session notifications.
///
/// Implemented for any `FnMut(&Event) + Send` closure.
pub trait SessionObserver: Send {
    fn on_event(&mut self, event: &Event);
}

impl<F> SessionObserver for F
where
    F: FnMut(&Event) + Send,
{
    fn on_event(&mut self, event: &Event) {
        self(event)
    }
}

/// Handle returned by [`SessionTimer::subscribe`](super::SessionTimer::subscribe), used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    observers: Vec<(ObserverId, Box<dyn SessionObserver>)>,
}

impl ObserverRegistry {
    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn notify(&mut self, event: &Event) {
        for (_, observer) in self.observers.iter_mut() {
            observer.on_event(event);
        }
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::SessionPhase;
    use std::sync::{Arc, Mutex};

    #[test]
    fn notifies_in_subscription_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ObserverRegistry::default();
        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            registry.subscribe(Box::new(move |_: &Event| seen.lock().unwrap().push(tag)));
        }

        registry.notify(&Event::phase_changed(SessionPhase::CountdownToStart));
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Arc::new(Mutex::new(0));
        let mut registry = ObserverRegistry::default();
        let c = Arc::clone(&count);
        let id = registry.subscribe(Box::new(move |_: &Event| *c.lock().unwrap() += 1));

        registry.notify(&Event::pause_changed(true));
        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        registry.notify(&Event::pause_changed(false));

        assert_eq!(*count.lock().unwrap(), 1);
    }
}
