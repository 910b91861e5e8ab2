//! Named events and the firing protocol.

use super::perform::{ParallelTarget, Perform, SharedMachine};
use super::rule::{FromMatcher, TransitionRule};
use crate::core::{StateChange, StateValue, Subject, Transition};
use tracing::{debug, trace, warn};

/// A named trigger owning an ordered list of transition rules.
///
/// # Example
///
/// ```rust
/// use statewise::core::Subject;
/// use statewise::engine::{Event, TransitionRule};
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
/// let mut ignite = Event::new("state", "ignite", None);
/// ignite
///     .transition(TransitionRule::between(Some("parked"), Some("idling")))
///     .transition(TransitionRule::between(Some("stalled"), Some("idling")));
///
/// let vehicle = Vehicle { state: Some("parked") };
/// let transitions = ignite.transitions_for(&vehicle);
/// assert_eq!(transitions.len(), 1);
/// assert_eq!(transitions[0].to(), &Some("idling"));
///
/// assert!(!ignite.valid_for(&Vehicle { state: Some("idling") }));
/// ```
pub struct Event<O, V> {
    name: String,
    namespace: Option<String>,
    qualified_name: String,
    attribute: String,
    rules: Vec<TransitionRule<O, V>>,
    parallel: Vec<ParallelTarget<O>>,
}

impl<O, V: StateValue> Event<O, V> {
    /// Create an event on `attribute`. With a namespace, the qualified
    /// name is `name_namespace`.
    pub fn new(attribute: &str, name: &str, namespace: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
            qualified_name: qualify(name, namespace),
            attribute: attribute.to_string(),
            rules: Vec::new(),
            parallel: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Name used by the qualified index: `name_namespace`, or the bare name.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn rules(&self) -> &[TransitionRule<O, V>] {
        &self.rules
    }

    pub fn parallel_targets(&self) -> &[ParallelTarget<O>] {
        &self.parallel
    }

    pub(crate) fn set_namespace(&mut self, namespace: Option<&str>) {
        self.namespace = namespace.map(str::to_string);
        self.qualified_name = qualify(&self.name, namespace);
    }

    /// Append a rule. Rules are consulted in registration order.
    pub fn transition(&mut self, rule: TransitionRule<O, V>) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Register a machine to fire after this event succeeds.
    ///
    /// The machine is fired with `trigger` when given, else with this
    /// event's name.
    pub fn parallel(&mut self, machine: SharedMachine<O>, trigger: Option<&str>) -> &mut Self {
        self.parallel.push(ParallelTarget::new(machine, trigger));
        self
    }

    /// Every concrete value named by the rules, first-seen order.
    pub fn known_states(&self) -> Vec<Option<V>> {
        let mut states: Vec<Option<V>> = Vec::new();
        for rule in &self.rules {
            if let FromMatcher::Concrete(from) = rule.from_matcher() {
                if !states.contains(from) {
                    states.push(from.clone());
                }
            }
            if !states.contains(rule.to_value()) {
                states.push(rule.to_value().clone());
            }
        }
        states
    }
}

fn qualify(name: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(namespace) => format!("{name}_{namespace}"),
        None => name.to_string(),
    }
}

impl<O: Subject<V>, V: StateValue> Event<O, V> {
    /// Transitions this event could perform from `object`'s current value.
    ///
    /// Every matching rule contributes one descriptor, in rule order.
    pub fn transitions_for<'a>(&self, object: &'a O) -> Vec<Transition<'a, O, V>> {
        let current = object.read_state(&self.attribute);

        self.rules
            .iter()
            .filter(|rule| rule.matches(object, &self.name, &current))
            .map(|rule| {
                Transition::new(
                    object,
                    &self.attribute,
                    Some(&self.name),
                    current.clone(),
                    rule.to_value().clone(),
                )
            })
            .collect()
    }

    pub fn valid_for(&self, object: &O) -> bool {
        !self.transitions_for(object).is_empty()
    }

    /// Fire this event on `object`.
    ///
    /// Candidates are attempted in order through `performer` until one is
    /// accepted. After that every parallel target is attempted, even when
    /// an earlier one failed. Returns `true` only when the primary
    /// transition and every parallel target succeeded.
    pub fn fire<P>(&self, object: &mut O, performer: &P) -> bool
    where
        P: Perform<O, V> + ?Sized,
    {
        let candidates: Vec<StateChange<V>> = self
            .transitions_for(object)
            .iter()
            .map(|transition| transition.change())
            .collect();

        if candidates.is_empty() {
            debug!(
                event = %self.name,
                attribute = %self.attribute,
                current = ?object.read_state(&self.attribute),
                "no matching transition"
            );
            return false;
        }

        let committed = candidates.iter().enumerate().find(|(index, change)| {
            let accepted = performer.perform(object, change, index + 1);
            if !accepted {
                trace!(
                    event = %self.name,
                    from = ?change.from,
                    to = ?change.to,
                    "transition attempt rejected"
                );
            }
            accepted
        });

        let Some((_, change)) = committed else {
            debug!(
                event = %self.name,
                candidates = candidates.len(),
                "every candidate transition was rejected"
            );
            return false;
        };

        debug!(
            event = %self.name,
            attribute = %self.attribute,
            from = ?change.from,
            to = ?change.to,
            "transition committed"
        );

        self.parallel.iter().fold(true, |success, target| {
            let accepted = target.attempt(object, &self.name);
            if !accepted {
                warn!(
                    event = %self.name,
                    machine = target.machine().name(),
                    trigger = target.trigger_for(&self.name),
                    "parallel machine failed"
                );
            }
            success && accepted
        })
    }
}
