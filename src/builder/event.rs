//! Builder for events.

use crate::core::{Guard, StateValue};
use crate::engine::{Event, SharedMachine, TransitionRule};

/// Fluent builder for an [`Event`], finished by a machine or collection
/// that supplies the attribute and namespace.
pub struct EventBuilder<O, V> {
    name: String,
    rules: Vec<TransitionRule<O, V>>,
    parallel: Vec<(SharedMachine<O>, Option<String>)>,
}

impl<O, V: StateValue> EventBuilder<O, V> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rules: Vec::new(),
            parallel: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a rule from one concrete value to another.
    pub fn transition(self, from: Option<V>, to: Option<V>) -> Self {
        self.rule(TransitionRule::between(from, to))
    }

    /// Add a rule from any value to `to`.
    pub fn transition_from_any(self, to: Option<V>) -> Self {
        self.rule(TransitionRule::from_any(to))
    }

    /// Add a rule from `from` to `to`, restricted by `condition`.
    pub fn guarded_transition(self, from: Option<V>, to: Option<V>, condition: Guard<O, V>) -> Self {
        self.rule(TransitionRule::between(from, to).with_condition(condition))
    }

    pub fn rule(mut self, rule: TransitionRule<O, V>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Drive `machine` after this event succeeds, with `trigger` or this event's name.
    pub fn parallel(mut self, machine: SharedMachine<O>, trigger: Option<&str>) -> Self {
        self.parallel.push((machine, trigger.map(str::to_string)));
        self
    }

    pub fn build(self, attribute: &str, namespace: Option<&str>) -> Event<O, V> {
        let mut event = Event::new(attribute, &self.name, namespace);
        for rule in self.rules {
            event.transition(rule);
        }
        for (machine, trigger) in self.parallel {
            event.parallel(machine, trigger.as_deref());
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FromMatcher;

    struct Vehicle;

    #[test]
    fn build_keeps_rule_order() {
        let event: Event<Vehicle, &str> = EventBuilder::new("park")
            .transition(Some("idling"), Some("parked"))
            .transition_from_any(Some("parked"))
            .build("state", None);

        assert_eq!(event.name(), "park");
        assert_eq!(event.rules().len(), 2);
        assert_eq!(
            event.rules()[0].from_matcher(),
            &FromMatcher::Concrete(Some("idling"))
        );
        assert_eq!(event.rules()[1].from_matcher(), &FromMatcher::Any);
    }

    #[test]
    fn build_applies_namespace() {
        let event: Event<Vehicle, &str> = EventBuilder::new("enable").build("alarm_state", Some("alarm"));

        assert_eq!(event.attribute(), "alarm_state");
        assert_eq!(event.qualified_name(), "enable_alarm");
    }

    #[test]
    fn guarded_transition_attaches_condition() {
        let event: Event<Vehicle, &str> = EventBuilder::new("ignite")
            .guarded_transition(
                Some("parked"),
                Some("idling"),
                Guard::builder().when(|_: &Vehicle| false).build(),
            )
            .build("state", None);

        assert!(event.rules()[0].condition().is_some());
        assert!(!event.rules()[0].matches(&Vehicle, "ignite", &Some("parked")));
    }
}
