//! State transition history tracking.
//!
//! Committed transitions are reported to [`TransitionObserver`]s. The
//! in-memory [`HistoryRecorder`] keeps them as an immutable
//! [`StateHistory`]; durable storage is left to other observers.

use super::state::StateValue;
use super::transition::StateChange;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Record of a single committed state transition.
///
/// # Example
///
/// ```rust
/// use statewise::core::{StateChange, StateTransition};
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     change: StateChange {
///         attribute: "state".to_string(),
///         event: Some("ignite".to_string()),
///         from: Some("parked"),
///         to: Some("idling"),
///     },
///     timestamp: Utc::now(),
///     attempt: 1,
/// };
/// assert_eq!(transition.change.to, Some("idling"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition<V> {
    /// The committed change
    pub change: StateChange<V>,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
    /// Which candidate (1-based) was committed
    pub attempt: usize,
}

/// Ordered history of state transitions.
///
/// History is immutable - the `record` method returns a new history
/// with the transition added.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateHistory<V> {
    transitions: Vec<StateTransition<V>>,
}

impl<V: StateValue> Default for StateHistory<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: StateValue> StateHistory<V> {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: StateTransition<V>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Append in place. Used by owners that already hold the history exclusively.
    pub(crate) fn push(&mut self, transition: StateTransition<V>) {
        self.transitions.push(transition);
    }

    /// Values traversed by `attribute`: the first from-value, then every to-value.
    pub fn get_path(&self, attribute: &str) -> Vec<&Option<V>> {
        let mut relevant = self
            .transitions
            .iter()
            .filter(|t| t.change.attribute == attribute)
            .peekable();

        let mut path = Vec::new();
        if let Some(first) = relevant.peek().copied() {
            path.push(&first.change.from);
        }
        for transition in relevant {
            path.push(&transition.change.to);
        }
        path
    }

    /// Time between the first and last recorded transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[StateTransition<V>] {
        &self.transitions
    }
}

/// Receives every committed transition.
///
/// Observers are notified only after an attempt has fully succeeded; a
/// rejected attempt is never reported.
pub trait TransitionObserver<V: StateValue>: Send + Sync {
    fn record_transition(&self, transition: &StateTransition<V>);
}

/// Observer keeping an in-memory [`StateHistory`].
pub struct HistoryRecorder<V> {
    history: Mutex<StateHistory<V>>,
}

impl<V: StateValue> Default for HistoryRecorder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: StateValue> HistoryRecorder<V> {
    pub fn new() -> Self {
        Self {
            history: Mutex::new(StateHistory::new()),
        }
    }

    /// Copy of everything recorded so far.
    pub fn snapshot(&self) -> StateHistory<V> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Serialize the recorded history as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error>
    where
        V: Serialize,
    {
        serde_json::to_string(&self.snapshot())
    }
}

impl<V: StateValue> TransitionObserver<V> for HistoryRecorder<V> {
    fn record_transition(&self, transition: &StateTransition<V>) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(transition.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(from: &'static str, to: &'static str) -> StateTransition<&'static str> {
        StateTransition {
            change: StateChange {
                attribute: "state".to_string(),
                event: Some("go".to_string()),
                from: Some(from),
                to: Some(to),
            },
            timestamp: Utc::now(),
            attempt: 1,
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history: StateHistory<&str> = StateHistory::new();
        assert_eq!(history.transitions().len(), 0);
        assert!(history.get_path("state").is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let history = StateHistory::new();
        let new_history = history.record(transition("parked", "idling"));

        assert_eq!(history.transitions().len(), 0);
        assert_eq!(new_history.transitions().len(), 1);
    }

    #[test]
    fn get_path_returns_value_sequence() {
        let history = StateHistory::new()
            .record(transition("parked", "idling"))
            .record(transition("idling", "first_gear"));

        assert_eq!(
            history.get_path("state"),
            vec![&Some("parked"), &Some("idling"), &Some("first_gear")]
        );
    }

    #[test]
    fn get_path_filters_by_attribute() {
        let mut alarm = transition("active", "off");
        alarm.change.attribute = "alarm_state".to_string();

        let history = StateHistory::new()
            .record(transition("parked", "idling"))
            .record(alarm);

        assert_eq!(history.get_path("state").len(), 2);
        assert_eq!(history.get_path("alarm_state"), vec![&Some("active"), &Some("off")]);
    }

    #[test]
    fn single_transition_has_duration_zero() {
        let history = StateHistory::new().record(transition("parked", "idling"));
        assert_eq!(history.duration(), Some(Duration::from_secs(0)));
    }

    #[test]
    fn recorder_accumulates_transitions() {
        let recorder = HistoryRecorder::new();
        recorder.record_transition(&transition("parked", "idling"));
        recorder.record_transition(&transition("idling", "parked"));

        assert_eq!(recorder.snapshot().transitions().len(), 2);
    }

    #[test]
    fn recorder_keeps_commit_order_and_detaches_snapshots() {
        let recorder = HistoryRecorder::new();
        let states = ["parked", "idling", "first_gear", "second_gear", "parked"];
        for pair in states.windows(2) {
            recorder.record_transition(&transition(pair[0], pair[1]));
        }
        let before = recorder.snapshot();

        recorder.record_transition(&transition("parked", "idling"));

        let expected: Vec<Option<&str>> = states.iter().map(|s| Some(*s)).collect();
        assert_eq!(before.transitions().len(), 4);
        assert_eq!(before.get_path("state"), expected.iter().collect::<Vec<_>>());
        assert_eq!(recorder.snapshot().transitions().len(), 5);
        assert_eq!(recorder.snapshot().transitions()[..4], before.transitions()[..]);
    }

    #[test]
    fn recorder_exports_json() {
        let recorder: HistoryRecorder<String> = HistoryRecorder::new();
        recorder.record_transition(&StateTransition {
            change: StateChange {
                attribute: "state".to_string(),
                event: Some("ignite".to_string()),
                from: Some("parked".to_string()),
                to: Some("idling".to_string()),
            },
            timestamp: Utc::now(),
            attempt: 2,
        });

        let json = recorder.to_json().unwrap();
        let restored: StateHistory<String> = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.transitions(), recorder.snapshot().transitions());
    }
}
