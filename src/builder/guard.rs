//! Builders for guards, typed or from a string-keyed option map.

use crate::builder::error::{GuardError, OptionError};
use crate::core::{Guard, Predicate, Requirement, StateValue};
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Value of one entry in a guard option map.
pub enum OptionValue<O, V> {
    /// State values, for `to`, `from`, `except_to`, `except_from`.
    States(Vec<Option<V>>),
    /// Event names, for `on` and `except_on`.
    Events(Vec<Option<String>>),
    /// Subject predicate, for `if` and `unless`.
    Predicate(Predicate<O>),
}

impl<O, V> OptionValue<O, V> {
    pub fn state(value: Option<V>) -> Self {
        Self::States(vec![value])
    }

    pub fn states(values: impl IntoIterator<Item = Option<V>>) -> Self {
        Self::States(values.into_iter().collect())
    }

    pub fn event(name: Option<&str>) -> Self {
        Self::Events(vec![name.map(str::to_string)])
    }

    pub fn events<'a>(names: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        Self::Events(names.into_iter().map(|n| n.map(str::to_string)).collect())
    }

    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&O) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(predicate))
    }
}

/// Fluent builder for [`Guard`].
///
/// When both a positive option and its `except_` counterpart are given for
/// the same attribute, the positive one wins and the negative one is
/// discarded. When both `when` and `unless` are given, only `when` is
/// consulted.
pub struct GuardBuilder<O, V> {
    to: Option<Vec<Option<V>>>,
    from: Option<Vec<Option<V>>>,
    on: Option<Vec<Option<String>>>,
    except_to: Option<Vec<Option<V>>>,
    except_from: Option<Vec<Option<V>>>,
    except_on: Option<Vec<Option<String>>>,
    if_cond: Option<Predicate<O>>,
    unless_cond: Option<Predicate<O>>,
}

impl<O, V: StateValue> GuardBuilder<O, V> {
    pub fn new() -> Self {
        Self {
            to: None,
            from: None,
            on: None,
            except_to: None,
            except_from: None,
            except_on: None,
            if_cond: None,
            unless_cond: None,
        }
    }

    pub fn to(mut self, values: impl IntoIterator<Item = Option<V>>) -> Self {
        self.to = Some(values.into_iter().collect());
        self
    }

    pub fn from(mut self, values: impl IntoIterator<Item = Option<V>>) -> Self {
        self.from = Some(values.into_iter().collect());
        self
    }

    pub fn on<'a>(mut self, names: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        self.on = Some(names.into_iter().map(|n| n.map(str::to_string)).collect());
        self
    }

    pub fn except_to(mut self, values: impl IntoIterator<Item = Option<V>>) -> Self {
        self.except_to = Some(values.into_iter().collect());
        self
    }

    pub fn except_from(mut self, values: impl IntoIterator<Item = Option<V>>) -> Self {
        self.except_from = Some(values.into_iter().collect());
        self
    }

    pub fn except_on<'a>(mut self, names: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        self.except_on = Some(names.into_iter().map(|n| n.map(str::to_string)).collect());
        self
    }

    /// Set the `if` predicate.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&O) -> bool + Send + Sync + 'static,
    {
        self.if_cond = Some(Arc::new(predicate));
        self
    }

    /// Set the `unless` predicate.
    pub fn unless<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&O) -> bool + Send + Sync + 'static,
    {
        self.unless_cond = Some(Arc::new(predicate));
        self
    }

    /// Apply one named option. Unknown keys and mismatched values are rejected.
    pub fn option(
        &mut self,
        key: &str,
        value: OptionValue<O, V>,
    ) -> Validation<(), NonEmptyVec<OptionError>> {
        match (key, value) {
            ("to", OptionValue::States(values)) => self.to = Some(values),
            ("from", OptionValue::States(values)) => self.from = Some(values),
            ("except_to", OptionValue::States(values)) => self.except_to = Some(values),
            ("except_from", OptionValue::States(values)) => self.except_from = Some(values),
            ("on", OptionValue::Events(names)) => self.on = Some(names),
            ("except_on", OptionValue::Events(names)) => self.except_on = Some(names),
            ("if", OptionValue::Predicate(predicate)) => self.if_cond = Some(predicate),
            ("unless", OptionValue::Predicate(predicate)) => self.unless_cond = Some(predicate),
            ("to" | "from" | "except_to" | "except_from", _) => {
                return invalid_value(key, "state values")
            }
            ("on" | "except_on", _) => return invalid_value(key, "event names"),
            ("if" | "unless", _) => return invalid_value(key, "a predicate"),
            _ => {
                return Validation::fail(OptionError::InvalidOption {
                    key: key.to_string(),
                })
            }
        }
        Validation::success(())
    }

    pub fn build(self) -> Guard<O, V> {
        Guard {
            to: requirement(self.to, self.except_to),
            from: requirement(self.from, self.except_from),
            on: requirement(self.on, self.except_on),
            if_cond: self.if_cond,
            unless_cond: self.unless_cond,
        }
    }
}

impl<O, V: StateValue> Default for GuardBuilder<O, V> {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_value(key: &str, expected: &'static str) -> Validation<(), NonEmptyVec<OptionError>> {
    Validation::fail(OptionError::InvalidValue {
        key: key.to_string(),
        expected,
    })
}

fn requirement<T: Clone + PartialEq>(
    positive: Option<Vec<T>>,
    negative: Option<Vec<T>>,
) -> Requirement<T> {
    match (positive, negative) {
        (Some(values), _) => Requirement::whitelist(values),
        (None, Some(values)) => Requirement::blacklist(values),
        (None, None) => Requirement::All,
    }
}

impl<O, V: StateValue> Guard<O, V> {
    /// Build a guard from a string-keyed option map.
    ///
    /// Recognized keys are `to`, `from`, `on`, `except_to`, `except_from`,
    /// `except_on`, `if` and `unless`. Every rejected entry is reported.
    ///
    /// # Example
    ///
    /// ```rust
    /// use statewise::builder::{OptionError, OptionValue};
    /// use statewise::core::{Guard, Query};
    ///
    /// struct Switch;
    ///
    /// let guard = Guard::<Switch, &str>::from_options([
    ///     ("to", OptionValue::states([Some("on"), Some("off")])),
    /// ])
    /// .unwrap();
    /// assert!(!guard.matches(&Switch, &Query::new().to(Some("maybe"))));
    ///
    /// let error = Guard::<Switch, &str>::from_options([
    ///     ("invalid", OptionValue::state(Some("on"))),
    /// ])
    /// .unwrap_err();
    /// assert_eq!(
    ///     error.errors(),
    ///     &[OptionError::InvalidOption { key: "invalid".to_string() }]
    /// );
    /// ```
    pub fn from_options<I, K>(options: I) -> Result<Self, GuardError>
    where
        I: IntoIterator<Item = (K, OptionValue<O, V>)>,
        K: AsRef<str>,
    {
        let mut builder = GuardBuilder::new();
        let checks: Vec<_> = options
            .into_iter()
            .map(|(key, value)| builder.option(key.as_ref(), value))
            .collect();

        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(builder.build()),
            Validation::Failure(errors) => {
                Err(GuardError::InvalidOptions(errors.iter().cloned().collect()))
            }
        }
    }
}
