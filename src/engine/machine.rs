//! A machine driving one attribute of its subjects.

use super::collection::{EventCollection, IndexKind};
use super::event::Event;
use super::perform::{ParallelMachine, Perform};
use crate::builder::MachineBuilder;
use crate::core::{Guard, StateChange, StateTransition, StateValue, Subject, Transition, TransitionObserver};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

/// When a callback runs relative to the attribute write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackKind {
    /// Before the attribute is written. Returning `false` halts the attempt.
    Before,
    /// After the attribute is written. Returning `false` rolls the write back.
    After,
}

/// Side effect run around a transition; `false` rejects the attempt.
pub type CallbackAction<O, V> = Arc<dyn Fn(&mut O, &StateChange<V>) -> bool + Send + Sync>;

/// A guarded side effect attached to a machine.
///
/// The guard is checked with the full `{from, to, on}` context of the
/// change being performed.
pub struct Callback<O, V> {
    kind: CallbackKind,
    guard: Guard<O, V>,
    action: CallbackAction<O, V>,
}

impl<O, V: StateValue> Callback<O, V> {
    pub fn new(kind: CallbackKind, guard: Guard<O, V>, action: CallbackAction<O, V>) -> Self {
        Self {
            kind,
            guard,
            action,
        }
    }

    pub fn kind(&self) -> CallbackKind {
        self.kind
    }

    pub fn guard(&self) -> &Guard<O, V> {
        &self.guard
    }

    /// Run the action if the guard accepts `change`. Skipped callbacks pass.
    fn run(&self, object: &mut O, change: &StateChange<V>) -> bool {
        if !self.guard.matches(object, &change.query()) {
            return true;
        }
        (self.action)(object, change)
    }
}

/// One attribute's machine definition.
///
/// Owns the events for the attribute, the callbacks performed around each
/// transition and the observers told about committed transitions. A machine
/// is both the performer its events fire through and a [`ParallelMachine`]
/// other machines' events can drive.
///
/// # Example
///
/// ```rust
/// use statewise::builder::EventBuilder;
/// use statewise::core::Subject;
/// use statewise::engine::Machine;
///
/// struct Vehicle {
///     state: Option<&'static str>,
/// }
///
/// impl Subject<&'static str> for Vehicle {
///     fn read_state(&self, _attribute: &str) -> Option<&'static str> {
///         self.state
///     }
///
///     fn write_state(&mut self, _attribute: &str, value: Option<&'static str>) {
///         self.state = value;
///     }
/// }
///
/// let machine = Machine::builder("state")
///     .event(EventBuilder::new("ignite").transition(Some("parked"), Some("idling")))
///     .unwrap()
///     .build();
///
/// let mut vehicle = Vehicle { state: Some("parked") };
/// assert!(machine.fire(&mut vehicle, "ignite"));
/// assert_eq!(vehicle.state, Some("idling"));
/// assert!(!machine.fire(&mut vehicle, "ignite"));
/// ```
pub struct Machine<O, V> {
    events: EventCollection<O, V>,
    callbacks: Vec<Callback<O, V>>,
    observers: Vec<Arc<dyn TransitionObserver<V>>>,
}

impl<O, V: StateValue> Machine<O, V> {
    pub fn builder(attribute: &str) -> MachineBuilder<O, V> {
        MachineBuilder::new(attribute)
    }

    pub(crate) fn from_parts(
        events: EventCollection<O, V>,
        callbacks: Vec<Callback<O, V>>,
        observers: Vec<Arc<dyn TransitionObserver<V>>>,
    ) -> Self {
        Self {
            events,
            callbacks,
            observers,
        }
    }

    /// Attribute this machine drives.
    pub fn attribute(&self) -> &str {
        self.events.attribute()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.events.namespace()
    }

    /// Registered events, in definition order.
    pub fn events(&self) -> &EventCollection<O, V> {
        &self.events
    }

    pub fn callbacks(&self) -> &[Callback<O, V>] {
        &self.callbacks
    }

    /// Look up an event by name, falling back to its qualified name.
    pub fn event(&self, name: &str) -> Option<&Event<O, V>> {
        self.events
            .get(name)
            .or_else(|| self.events.get_by(name, IndexKind::QualifiedName))
    }

    /// Every state value named by this machine's events.
    pub fn states(&self) -> Vec<Option<V>> {
        self.events.known_states()
    }
}

impl<O: Subject<V>, V: StateValue> Machine<O, V> {
    /// Fire the event called `name` on `object`. Unknown events fail.
    pub fn fire(&self, object: &mut O, name: &str) -> bool {
        let Some(event) = self.event(name) else {
            warn!(attribute = %self.attribute(), event = name, "unknown event");
            return false;
        };
        event.fire(object, self)
    }

    /// Whether the event called `name` has a transition from `object`'s current value.
    pub fn can_fire(&self, object: &O, name: &str) -> bool {
        self.event(name).is_some_and(|event| event.valid_for(object))
    }

    /// Events that can fire for `object`, in definition order.
    pub fn valid_events(&self, object: &O) -> Vec<&Event<O, V>> {
        self.events.valid_for(object)
    }

    /// Every transition available from `object`'s current value.
    ///
    /// With `include_loopback`, a transition back to the current value is
    /// listed first unless some event already provides one.
    pub fn transitions_for<'a>(
        &self,
        object: &'a O,
        include_loopback: bool,
    ) -> Vec<Transition<'a, O, V>> {
        self.events.transitions_for(object, include_loopback)
    }

    fn run_callbacks(&self, kind: CallbackKind, object: &mut O, change: &StateChange<V>) -> bool {
        self.callbacks
            .iter()
            .filter(|callback| callback.kind == kind)
            .all(|callback| callback.run(object, change))
    }
}

impl<O: Subject<V>, V: StateValue> Perform<O, V> for Machine<O, V> {
    fn perform(&self, object: &mut O, change: &StateChange<V>, attempt: usize) -> bool {
        let attribute = self.attribute();

        if !self.run_callbacks(CallbackKind::Before, object, change) {
            debug!(
                attribute,
                event = ?change.event,
                to = ?change.to,
                "transition halted before write"
            );
            return false;
        }

        object.write_state(attribute, change.to.clone());

        if !self.run_callbacks(CallbackKind::After, object, change) {
            object.write_state(attribute, change.from.clone());
            debug!(
                attribute,
                event = ?change.event,
                from = ?change.from,
                "transition halted after write, value restored"
            );
            return false;
        }

        let transition = StateTransition {
            change: change.clone(),
            timestamp: Utc::now(),
            attempt,
        };
        for observer in &self.observers {
            observer.record_transition(&transition);
        }
        true
    }
}

impl<O: Subject<V>, V: StateValue> ParallelMachine<O> for Machine<O, V> {
    fn name(&self) -> &str {
        self.attribute()
    }

    fn attempt(&self, object: &mut O, event: &str) -> bool {
        self.fire(object, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::EventBuilder;
    use crate::core::HistoryRecorder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct Vehicle {
        state: Option<&'static str>,
        alarm_state: Option<&'static str>,
        seatbelt_on: bool,
        log: Vec<String>,
    }

    impl Subject<&'static str> for Vehicle {
        fn read_state(&self, attribute: &str) -> Option<&'static str> {
            match attribute {
                "state" => self.state,
                "alarm_state" => self.alarm_state,
                _ => None,
            }
        }

        fn write_state(&mut self, attribute: &str, value: Option<&'static str>) {
            match attribute {
                "state" => self.state = value,
                "alarm_state" => self.alarm_state = value,
                _ => {}
            }
        }
    }

    fn parked() -> Vehicle {
        Vehicle {
            state: Some("parked"),
            alarm_state: Some("active"),
            seatbelt_on: true,
            log: Vec::new(),
        }
    }

    fn alarm() -> Arc<Machine<Vehicle, &'static str>> {
        Arc::new(
            Machine::builder("alarm_state")
                .namespace("alarm")
                .event(EventBuilder::new("disable").transition(Some("active"), Some("off")))
                .unwrap()
                .event(EventBuilder::new("ignite").transition(Some("active"), Some("off")))
                .unwrap()
                .build(),
        )
    }

    #[test]
    fn fire_writes_attribute() {
        let machine: Machine<Vehicle, &str> = Machine::builder("state")
            .event(EventBuilder::new("ignite").transition(Some("parked"), Some("idling")))
            .unwrap()
            .build();
        let mut vehicle = parked();

        assert!(machine.fire(&mut vehicle, "ignite"));
        assert_eq!(vehicle.state, Some("idling"));
    }

    #[test]
    fn fire_unknown_event_fails() {
        let machine: Machine<Vehicle, &str> = Machine::builder("state").build();
        let mut vehicle = parked();

        assert!(!machine.fire(&mut vehicle, "teleport"));
        assert_eq!(vehicle.state, Some("parked"));
    }

    #[test]
    fn event_lookup_falls_back_to_qualified_name() {
        let machine = alarm();

        assert_eq!(machine.event("disable_alarm").unwrap().name(), "disable");
        assert_eq!(machine.event("disable").unwrap().qualified_name(), "disable_alarm");

        let mut vehicle = parked();
        assert!(machine.fire(&mut vehicle, "disable_alarm"));
        assert_eq!(vehicle.alarm_state, Some("off"));
    }

    #[test]
    fn before_callback_can_halt() {
        let machine: Machine<Vehicle, &str> = Machine::builder("state")
            .event(EventBuilder::new("ignite").transition(Some("parked"), Some("idling")))
            .unwrap()
            .before(Guard::builder().on([Some("ignite")]).build(), |v: &mut Vehicle, _| {
                v.seatbelt_on
            })
            .build();
        let mut vehicle = parked();
        vehicle.seatbelt_on = false;

        assert!(!machine.fire(&mut vehicle, "ignite"));
        assert_eq!(vehicle.state, Some("parked"));
    }

    #[test]
    fn after_callback_failure_restores_value() {
        let machine: Machine<Vehicle, &str> = Machine::builder("state")
            .event(EventBuilder::new("ignite").transition(Some("parked"), Some("idling")))
            .unwrap()
            .after(Guard::allow_all(), |v: &mut Vehicle, change| {
                v.log.push(format!("saw {:?}", v.state));
                change.to != Some("idling")
            })
            .build();
        let mut vehicle = parked();

        assert!(!machine.fire(&mut vehicle, "ignite"));
        assert_eq!(vehicle.state, Some("parked"));
        assert_eq!(vehicle.log, vec!["saw Some(\"idling\")".to_string()]);
    }

    #[test]
    fn callbacks_only_run_when_guard_matches() {
        let machine: Machine<Vehicle, &str> = Machine::builder("state")
            .event(EventBuilder::new("ignite").transition(Some("parked"), Some("idling")))
            .unwrap()
            .event(EventBuilder::new("park").transition_from_any(Some("parked")))
            .unwrap()
            .before(Guard::builder().to([Some("parked")]).build(), |v: &mut Vehicle, _| {
                v.log.push("parking".to_string());
                true
            })
            .after(Guard::builder().from([Some("parked")]).build(), |v: &mut Vehicle, change| {
                v.log.push(format!("left parked via {:?}", change.event));
                true
            })
            .build();
        let mut vehicle = parked();

        assert!(machine.fire(&mut vehicle, "ignite"));
        assert!(machine.fire(&mut vehicle, "park"));
        assert_eq!(
            vehicle.log,
            vec![
                "left parked via Some(\"ignite\")".to_string(),
                "parking".to_string()
            ]
        );
    }

    #[test]
    fn rejected_candidate_moves_to_next() {
        let machine: Machine<Vehicle, &str> = Machine::builder("state")
            .event(
                EventBuilder::new("shift_up")
                    .transition(Some("parked"), Some("first_gear"))
                    .transition(Some("parked"), Some("idling")),
            )
            .unwrap()
            .before(Guard::builder().to([Some("first_gear")]).build(), |_: &mut Vehicle, _| {
                false
            })
            .build();
        let mut vehicle = parked();

        assert!(machine.fire(&mut vehicle, "shift_up"));
        assert_eq!(vehicle.state, Some("idling"));
    }

    #[test]
    fn observers_see_committed_transitions_only() {
        let recorder: Arc<HistoryRecorder<&str>> = Arc::new(HistoryRecorder::new());
        let machine: Machine<Vehicle, &str> = Machine::builder("state")
            .event(
                EventBuilder::new("shift_up")
                    .transition(Some("parked"), Some("first_gear"))
                    .transition(Some("parked"), Some("idling")),
            )
            .unwrap()
            .before(Guard::builder().to([Some("first_gear")]).build(), |_: &mut Vehicle, _| {
                false
            })
            .observe(recorder.clone())
            .build();
        let mut vehicle = parked();

        assert!(machine.fire(&mut vehicle, "shift_up"));

        let history = recorder.snapshot();
        assert_eq!(history.transitions().len(), 1);
        let committed = &history.transitions()[0];
        assert_eq!(committed.change.to, Some("idling"));
        assert_eq!(committed.change.event.as_deref(), Some("shift_up"));
        assert_eq!(committed.attempt, 2);
    }

    #[test]
    fn parallel_machine_fires_with_same_event_name() {
        let alarm = alarm();
        let machine: Machine<Vehicle, &str> = Machine::builder("state")
            .event(
                EventBuilder::new("ignite")
                    .transition(Some("parked"), Some("idling"))
                    .parallel(alarm.clone(), None),
            )
            .unwrap()
            .build();
        let mut vehicle = parked();

        assert!(machine.fire(&mut vehicle, "ignite"));
        assert_eq!(vehicle.state, Some("idling"));
        assert_eq!(vehicle.alarm_state, Some("off"));
    }

    #[test]
    fn parallel_machine_fires_explicit_trigger() {
        let machine: Machine<Vehicle, &str> = Machine::builder("state")
            .event(
                EventBuilder::new("tow")
                    .transition_from_any(Some("parked"))
                    .parallel(alarm(), Some("disable")),
            )
            .unwrap()
            .build();
        let mut vehicle = parked();
        vehicle.state = Some("stalled");

        assert!(machine.fire(&mut vehicle, "tow"));
        assert_eq!(vehicle.alarm_state, Some("off"));
    }

    #[test]
    fn parallel_failure_fails_fire_but_keeps_primary() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let alarm: Arc<Machine<Vehicle, &str>> = Arc::new(
            Machine::builder("alarm_state")
                .event(EventBuilder::new("disable").transition(Some("active"), Some("off")))
                .unwrap()
                .before(Guard::allow_all(), move |_: &mut Vehicle, _| {
                    counted.fetch_add(1, Ordering::SeqCst);
                    true
                })
                .build(),
        );
        let machine: Machine<Vehicle, &str> = Machine::builder("state")
            .event(
                EventBuilder::new("ignite")
                    .transition(Some("parked"), Some("idling"))
                    .parallel(alarm.clone(), Some("disable"))
                    .parallel(alarm.clone(), Some("disable")),
            )
            .unwrap()
            .build();
        let mut vehicle = parked();

        // The second disable finds the alarm already off and fails.
        assert!(!machine.fire(&mut vehicle, "ignite"));
        assert_eq!(vehicle.state, Some("idling"));
        assert_eq!(vehicle.alarm_state, Some("off"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn can_fire_and_valid_events() {
        let machine: Machine<Vehicle, &str> = Machine::builder("state")
            .event(EventBuilder::new("ignite").transition(Some("parked"), Some("idling")))
            .unwrap()
            .event(EventBuilder::new("shift_up").transition(Some("idling"), Some("first_gear")))
            .unwrap()
            .build();
        let vehicle = parked();

        assert!(machine.can_fire(&vehicle, "ignite"));
        assert!(!machine.can_fire(&vehicle, "shift_up"));
        assert!(!machine.can_fire(&vehicle, "teleport"));

        let names: Vec<_> = machine
            .valid_events(&vehicle)
            .into_iter()
            .map(Event::name)
            .collect();
        assert_eq!(names, vec!["ignite"]);
        assert_eq!(machine.states(), vec![Some("parked"), Some("idling"), Some("first_gear")]);
    }
}
