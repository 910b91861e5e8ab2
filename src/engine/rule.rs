//! Transition rules owned by events.

use crate::core::{Guard, Query, StateValue};

/// Which current values a rule applies to.
#[derive(Clone, Debug, PartialEq)]
pub enum FromMatcher<V> {
    /// Any current value, including none.
    Any,
    /// Exactly this value.
    Concrete(Option<V>),
}

impl<V: PartialEq> FromMatcher<V> {
    pub fn matches(&self, current: &Option<V>) -> bool {
        match self {
            Self::Any => true,
            Self::Concrete(value) => value == current,
        }
    }
}

/// A from-matcher paired with the value it leads to.
///
/// A rule may carry an extra condition guard. The guard is queried with
/// the current value as `from`, the rule's target as `to` and the event
/// name as `on`, so it can express `if`, `unless` or `except_from` style
/// restrictions.
///
/// # Example
///
/// ```rust
/// use statewise::engine::{FromMatcher, TransitionRule};
///
/// struct Vehicle;
///
/// let rule: TransitionRule<Vehicle, &str> = TransitionRule::between(Some("parked"), Some("idling"));
/// assert!(rule.matches(&Vehicle, "ignite", &Some("parked")));
/// assert!(!rule.matches(&Vehicle, "ignite", &Some("stalled")));
///
/// let park: TransitionRule<Vehicle, &str> = TransitionRule::from_any(Some("parked"));
/// assert_eq!(park.from_matcher(), &FromMatcher::Any);
/// ```
pub struct TransitionRule<O, V> {
    from: FromMatcher<V>,
    to: Option<V>,
    condition: Option<Guard<O, V>>,
}

impl<O, V: StateValue> TransitionRule<O, V> {
    pub fn new(from: FromMatcher<V>, to: Option<V>) -> Self {
        Self {
            from,
            to,
            condition: None,
        }
    }

    /// Rule leading from one concrete value to another.
    pub fn between(from: Option<V>, to: Option<V>) -> Self {
        Self::new(FromMatcher::Concrete(from), to)
    }

    /// Rule leading from any value to `to`.
    pub fn from_any(to: Option<V>) -> Self {
        Self::new(FromMatcher::Any, to)
    }

    /// Restrict the rule further with `condition`.
    pub fn with_condition(mut self, condition: Guard<O, V>) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn from_matcher(&self) -> &FromMatcher<V> {
        &self.from
    }

    pub fn to_value(&self) -> &Option<V> {
        &self.to
    }

    pub fn condition(&self) -> Option<&Guard<O, V>> {
        self.condition.as_ref()
    }

    /// Whether this rule applies to `subject` sitting at `current` for `event`.
    pub fn matches(&self, subject: &O, event: &str, current: &Option<V>) -> bool {
        if !self.from.matches(current) {
            return false;
        }

        self.condition.as_ref().is_none_or(|guard| {
            let query = Query::new()
                .from(current.clone())
                .to(self.to.clone())
                .on(Some(event));
            guard.matches(subject, &query)
        })
    }
}

impl<O, V: Clone> Clone for TransitionRule<O, V> {
    fn clone(&self) -> Self {
        Self {
            from: self.from.clone(),
            to: self.to.clone(),
            condition: self.condition.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Vehicle {
        seatbelt_on: bool,
    }

    const BUCKLED: Vehicle = Vehicle { seatbelt_on: true };

    #[test]
    fn concrete_matcher_requires_equal_value() {
        let matcher = FromMatcher::Concrete(Some("parked"));

        assert!(matcher.matches(&Some("parked")));
        assert!(!matcher.matches(&Some("idling")));
        assert!(!matcher.matches(&None));
    }

    #[test]
    fn concrete_matcher_can_match_none() {
        let matcher: FromMatcher<&str> = FromMatcher::Concrete(None);

        assert!(matcher.matches(&None));
        assert!(!matcher.matches(&Some("parked")));
    }

    #[test]
    fn any_matcher_matches_everything() {
        let matcher: FromMatcher<&str> = FromMatcher::Any;

        assert!(matcher.matches(&Some("parked")));
        assert!(matcher.matches(&None));
    }

    #[test]
    fn condition_restricts_rule() {
        let rule = TransitionRule::between(Some("idling"), Some("first_gear"))
            .with_condition(Guard::builder().when(|v: &Vehicle| v.seatbelt_on).build());

        assert!(rule.matches(&BUCKLED, "shift_up", &Some("idling")));
        assert!(!rule.matches(&Vehicle { seatbelt_on: false }, "shift_up", &Some("idling")));
    }

    #[test]
    fn condition_sees_from_to_and_event() {
        let rule = TransitionRule::from_any(Some("parked")).with_condition(
            Guard::builder()
                .except_from([Some("parked")])
                .to([Some("parked")])
                .on([Some("park")])
                .build(),
        );

        assert!(rule.matches(&BUCKLED, "park", &Some("idling")));
        assert!(!rule.matches(&BUCKLED, "park", &Some("parked")));
        assert!(!rule.matches(&BUCKLED, "tow", &Some("idling")));
    }
}
