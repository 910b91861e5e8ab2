//! Guards deciding whether a transition context is allowed.
//!
//! A guard combines three [`Requirement`]s (`to`, `from`, `on`) with two
//! optional predicates over the subject (`if`, `unless`). The same guard
//! serves strict checks, where the query names all three attributes, and
//! loose checks, where only some of them are queried.

use super::requirement::{dedup, Requirement};
use super::state::StateValue;
use crate::builder::GuardBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Boolean predicate over the subject object.
pub type Predicate<O> = Arc<dyn Fn(&O) -> bool + Send + Sync>;

/// Transition context handed to [`Guard::matches`].
///
/// An attribute left unset is not enforced at all. An attribute set to
/// `None` is enforced against the "no value" state.
///
/// # Example
///
/// ```rust
/// use statewise::core::Query;
///
/// let query: Query<&str> = Query::new().from(Some("parked")).on(Some("ignite"));
/// assert_eq!(query.from_value(), Some(&Some("parked")));
/// assert_eq!(query.to_value(), None);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Query<V> {
    to: Option<Option<V>>,
    from: Option<Option<V>>,
    on: Option<Option<String>>,
}

impl<V> Default for Query<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Query<V> {
    /// Query that enforces nothing.
    pub fn new() -> Self {
        Self {
            to: None,
            from: None,
            on: None,
        }
    }

    /// Enforce the `to` requirement against `value`.
    pub fn to(mut self, value: Option<V>) -> Self {
        self.to = Some(value);
        self
    }

    /// Enforce the `from` requirement against `value`.
    pub fn from(mut self, value: Option<V>) -> Self {
        self.from = Some(value);
        self
    }

    /// Enforce the `on` requirement against the event `name`.
    pub fn on(mut self, name: Option<&str>) -> Self {
        self.on = Some(name.map(str::to_string));
        self
    }

    /// The `to` value to enforce, `None` when `to` is not queried.
    pub fn to_value(&self) -> Option<&Option<V>> {
        self.to.as_ref()
    }

    /// The `from` value to enforce, `None` when `from` is not queried.
    pub fn from_value(&self) -> Option<&Option<V>> {
        self.from.as_ref()
    }

    /// The event name to enforce, `None` when `on` is not queried.
    pub fn on_value(&self) -> Option<&Option<String>> {
        self.on.as_ref()
    }
}

/// One explicit `(from, to)` pair produced by [`Guard::edges`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge<V> {
    pub from: Option<V>,
    pub to: Option<V>,
    pub event: String,
}

/// Requirement set plus predicates controlling a transition.
///
/// Build guards with [`Guard::builder`] or, from a string-keyed option
/// map, with [`Guard::from_options`].
///
/// # Example
///
/// ```rust
/// use statewise::core::{Guard, Query};
///
/// struct Switch;
///
/// let guard: Guard<Switch, &str> = Guard::builder()
///     .to([Some("on")])
///     .from([Some("off")])
///     .build();
///
/// // `to` is not queried, so it is not enforced
/// assert!(guard.matches(&Switch, &Query::new().from(Some("off"))));
/// assert!(!guard.matches(&Switch, &Query::new().from(Some("on"))));
/// ```
pub struct Guard<O, V> {
    pub(crate) to: Requirement<Option<V>>,
    pub(crate) from: Requirement<Option<V>>,
    pub(crate) on: Requirement<Option<String>>,
    pub(crate) if_cond: Option<Predicate<O>>,
    pub(crate) unless_cond: Option<Predicate<O>>,
}

impl<O, V: StateValue> Guard<O, V> {
    /// Start building a guard. Every requirement defaults to match-all.
    pub fn builder() -> GuardBuilder<O, V> {
        GuardBuilder::new()
    }

    /// Guard that allows everything.
    pub fn allow_all() -> Self {
        Self {
            to: Requirement::All,
            from: Requirement::All,
            on: Requirement::All,
            if_cond: None,
            unless_cond: None,
        }
    }

    /// Requirement on the value being written.
    pub fn to_requirement(&self) -> &Requirement<Option<V>> {
        &self.to
    }

    /// Requirement on the value being left.
    pub fn from_requirement(&self) -> &Requirement<Option<V>> {
        &self.from
    }

    /// Requirement on the triggering event name.
    pub fn on_requirement(&self) -> &Requirement<Option<String>> {
        &self.on
    }

    /// Check whether `query` satisfies this guard for `subject`.
    ///
    /// Only attributes present in the query are enforced. Predicates are
    /// evaluated after all attribute checks pass: `if` is decisive when
    /// configured, otherwise `unless` must return `false`.
    pub fn matches(&self, subject: &O, query: &Query<V>) -> bool {
        self.matches_attributes(query) && self.matches_conditions(subject)
    }

    fn matches_attributes(&self, query: &Query<V>) -> bool {
        query.to.as_ref().is_none_or(|to| self.to.matches(to))
            && query.from.as_ref().is_none_or(|from| self.from.matches(from))
            && query.on.as_ref().is_none_or(|on| self.on.matches(on))
    }

    fn matches_conditions(&self, subject: &O) -> bool {
        match (&self.if_cond, &self.unless_cond) {
            (Some(if_cond), _) => if_cond(subject),
            (None, Some(unless_cond)) => !unless_cond(subject),
            (None, None) => true,
        }
    }

    /// Every state value referenced by the `to` and `from` requirements.
    ///
    /// `to` values come first, then unseen `from` values. Event names are
    /// never included.
    pub fn known_states(&self) -> Vec<Option<V>> {
        dedup(
            self.to
                .values()
                .iter()
                .chain(self.from.values())
                .cloned(),
        )
    }

    /// Expand this guard into explicit edges over `universe`.
    ///
    /// Each accepted from-state maps to the first whitelisted `to` value.
    /// When `to` is not a whitelist, each from-state loops back to itself.
    pub fn edges(&self, event: &str, universe: &[Option<V>]) -> Vec<Edge<V>> {
        let target = match &self.to {
            Requirement::Whitelist(values) => values.first().cloned(),
            Requirement::All | Requirement::Blacklist(_) => None,
        };

        self.from
            .filter(universe)
            .into_iter()
            .map(|from| Edge {
                to: target.clone().unwrap_or_else(|| from.clone()),
                from,
                event: event.to_string(),
            })
            .collect()
    }
}

impl<O, V: Clone> Clone for Guard<O, V> {
    fn clone(&self) -> Self {
        Self {
            to: self.to.clone(),
            from: self.from.clone(),
            on: self.on.clone(),
            if_cond: self.if_cond.clone(),
            unless_cond: self.unless_cond.clone(),
        }
    }
}

impl<O, V: fmt::Debug> fmt::Debug for Guard<O, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("to", &self.to)
            .field("from", &self.from)
            .field("on", &self.on)
            .field("if", &self.if_cond.is_some())
            .field("unless", &self.unless_cond.is_some())
            .finish()
    }
}
