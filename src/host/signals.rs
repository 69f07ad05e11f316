//! Process-level lifecycle events
//!
//! Window visibility and the first user gesture belong to the process, not to
//! whichever scene the controller is bound to. [`HostSignals`] is owned by the
//! [`MusicHandle`](crate::MusicHandle) and outlives every host binding; the
//! embedding application forwards its events here.

use super::{InteractionObserver, VisibilityObserver};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct Observers {
    visibility: Vec<VisibilityObserver>,
    interaction: Vec<InteractionObserver>,
}

/// Cloneable source of visibility and first-interaction events
#[derive(Clone, Default)]
pub struct HostSignals {
    observers: Arc<Mutex<Observers>>,
}

impl HostSignals {
    /// Create a source with no observers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer called on every visibility change
    pub fn watch_visibility(&self, observer: VisibilityObserver) {
        self.observers.lock().visibility.push(observer);
    }

    /// Register an observer called on the next interaction only
    pub fn watch_first_interaction(&self, observer: InteractionObserver) {
        self.observers.lock().interaction.push(observer);
    }

    /// Report that the game window was hidden (`true`) or shown again
    pub fn notify_visibility(&self, hidden: bool) {
        // Observers lock the controller; never call them with our lock held.
        let mut observers = std::mem::take(&mut self.observers.lock().visibility);
        for observer in observers.iter_mut() {
            observer(hidden);
        }
        let mut guard = self.observers.lock();
        observers.append(&mut guard.visibility);
        guard.visibility = observers;
    }

    /// Report a user interaction; pending first-interaction observers fire once
    pub fn notify_interaction(&self) {
        let observers = std::mem::take(&mut self.observers.lock().interaction);
        for observer in observers {
            observer();
        }
    }

    /// Registered visibility observers
    pub fn visibility_observers(&self) -> usize {
        self.observers.lock().visibility.len()
    }

    /// First-interaction observers that have not fired yet
    pub fn interaction_observers(&self) -> usize {
        self.observers.lock().interaction.len()
    }
}
