//! Insertion-ordered registry of events.

use super::event::Event;
use crate::builder::BuildError;
use crate::core::{StateValue, Subject, Transition};
use std::collections::HashMap;
use tracing::trace;

/// Which key a lookup uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndexKind {
    /// The bare event name.
    #[default]
    Name,
    /// The event name suffixed with the collection's namespace.
    QualifiedName,
}

/// Events of one machine, indexed by name and by qualified name.
///
/// Iteration and every aggregate query follow insertion order.
pub struct EventCollection<O, V> {
    attribute: String,
    namespace: Option<String>,
    events: Vec<Event<O, V>>,
    by_name: HashMap<String, usize>,
    by_qualified_name: HashMap<String, usize>,
}

impl<O, V: StateValue> EventCollection<O, V> {
    /// Empty collection for `attribute`, qualifying names with `namespace`.
    pub fn new(attribute: &str, namespace: Option<&str>) -> Self {
        Self {
            attribute: attribute.to_string(),
            namespace: namespace.map(str::to_string),
            events: Vec::new(),
            by_name: HashMap::new(),
            by_qualified_name: HashMap::new(),
        }
    }

    /// Attribute every event in the collection drives.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Switch the namespace and requalify every registered event.
    ///
    /// Qualified names stay unique because bare names already are.
    pub(crate) fn set_namespace(&mut self, namespace: Option<&str>) {
        self.namespace = namespace.map(str::to_string);
        self.by_qualified_name.clear();
        for (index, event) in self.events.iter_mut().enumerate() {
            event.set_namespace(namespace);
            self.by_qualified_name
                .insert(event.qualified_name().to_string(), index);
        }
    }

    /// Create and register an empty event on this collection's attribute.
    pub fn define(&mut self, name: &str) -> Result<&mut Event<O, V>, BuildError> {
        let event = Event::new(&self.attribute, name, self.namespace.as_deref());
        self.insert(event)
    }

    /// Register `event` under its name and qualified name.
    ///
    /// Fails if either key is taken, or the event drives another attribute
    /// or was qualified with another namespace.
    pub fn insert(&mut self, event: Event<O, V>) -> Result<&mut Event<O, V>, BuildError> {
        if event.attribute() != self.attribute {
            return Err(BuildError::AttributeMismatch {
                event: event.name().to_string(),
                expected: self.attribute.clone(),
                found: event.attribute().to_string(),
            });
        }
        if event.namespace() != self.namespace() {
            return Err(BuildError::NamespaceMismatch {
                event: event.name().to_string(),
                expected: self.namespace.clone(),
                found: event.namespace().map(str::to_string),
            });
        }
        if self.by_name.contains_key(event.name()) {
            return Err(BuildError::DuplicateEvent {
                name: event.name().to_string(),
            });
        }
        if self.by_qualified_name.contains_key(event.qualified_name()) {
            return Err(BuildError::DuplicateEvent {
                name: event.qualified_name().to_string(),
            });
        }

        trace!(
            attribute = %self.attribute,
            event = event.name(),
            qualified_name = event.qualified_name(),
            "registering event"
        );

        let index = self.events.len();
        self.by_name.insert(event.name().to_string(), index);
        self.by_qualified_name
            .insert(event.qualified_name().to_string(), index);
        self.events.push(event);
        Ok(&mut self.events[index])
    }

    /// Look up an event by name.
    pub fn get(&self, key: &str) -> Option<&Event<O, V>> {
        self.get_by(key, IndexKind::Name)
    }

    /// Look up an event by either index.
    pub fn get_by(&self, key: &str, kind: IndexKind) -> Option<&Event<O, V>> {
        self.index(kind).get(key).map(|&index| &self.events[index])
    }

    /// Mutable lookup, for adding rules or parallel targets after registration.
    pub fn get_mut(&mut self, key: &str, kind: IndexKind) -> Option<&mut Event<O, V>> {
        let index = *self.index(kind).get(key)?;
        self.events.get_mut(index)
    }

    fn index(&self, kind: IndexKind) -> &HashMap<String, usize> {
        match kind {
            IndexKind::Name => &self.by_name,
            IndexKind::QualifiedName => &self.by_qualified_name,
        }
    }

    /// Events in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Event<O, V>> {
        self.events.iter()
    }

    /// Number of registered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Union of every event's known states, first-seen order.
    pub fn known_states(&self) -> Vec<Option<V>> {
        let mut states: Vec<Option<V>> = Vec::new();
        for state in self.events.iter().flat_map(Event::known_states) {
            if !states.contains(&state) {
                states.push(state);
            }
        }
        states
    }
}

impl<O: Subject<V>, V: StateValue> EventCollection<O, V> {
    /// Events that can fire for `object`, in insertion order.
    pub fn valid_for(&self, object: &O) -> Vec<&Event<O, V>> {
        self.events
            .iter()
            .filter(|event| event.valid_for(object))
            .collect()
    }

    /// Every transition the events could perform for `object`, in insertion order.
    ///
    /// With `include_loopback`, a synthetic `current -> current` transition
    /// without an event is put first, unless one of the events already
    /// provides a loopback on the current value.
    pub fn transitions_for<'a>(
        &self,
        object: &'a O,
        include_loopback: bool,
    ) -> Vec<Transition<'a, O, V>> {
        let mut transitions: Vec<_> = self
            .events
            .iter()
            .flat_map(|event| event.transitions_for(object))
            .collect();

        if include_loopback {
            let current = object.read_state(&self.attribute);
            let has_loopback = transitions
                .iter()
                .any(|t| t.from() == &current && t.to() == &current);

            if !has_loopback {
                transitions.insert(
                    0,
                    Transition::new(object, &self.attribute, None, current.clone(), current),
                );
            }
        }

        transitions
    }
}

impl<'c, O, V> IntoIterator for &'c EventCollection<O, V> {
    type Item = &'c Event<O, V>;
    type IntoIter = std::slice::Iter<'c, Event<O, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
