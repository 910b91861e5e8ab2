//! Resolved state changes.

use super::guard::Query;
use super::state::StateValue;
use serde::{Deserialize, Serialize};
use std::{fmt, mem, ptr};

/// Immutable description of one resolved state change on one object.
///
/// Descriptors are produced on demand by resolution queries and never
/// stored by the engine. Two descriptors are equal when they refer to the
/// same object (by identity) and agree on attribute, event, from and to.
///
/// Values of a zero-sized subject type have no identity of their own and
/// may share an address, so for such types every object counts as the same
/// one and only the remaining fields are compared.
pub struct Transition<'a, O, V> {
    object: &'a O,
    attribute: String,
    event: Option<String>,
    from: Option<V>,
    to: Option<V>,
}

impl<'a, O, V: StateValue> Transition<'a, O, V> {
    pub fn new(
        object: &'a O,
        attribute: &str,
        event: Option<&str>,
        from: Option<V>,
        to: Option<V>,
    ) -> Self {
        Self {
            object,
            attribute: attribute.to_string(),
            event: event.map(str::to_string),
            from,
            to,
        }
    }

    /// The object whose attribute would change.
    pub fn object(&self) -> &'a O {
        self.object
    }

    /// Attribute the change applies to.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Name of the event, `None` for a synthetic loopback.
    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    /// Value read before the change.
    pub fn from(&self) -> &Option<V> {
        &self.from
    }

    /// Value the change writes.
    pub fn to(&self) -> &Option<V> {
        &self.to
    }

    /// Whether the change leaves the value as it was.
    pub fn is_loopback(&self) -> bool {
        self.from == self.to
    }

    /// Owned copy of everything except the object reference.
    pub fn change(&self) -> StateChange<V> {
        StateChange {
            attribute: self.attribute.clone(),
            event: self.event.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

impl<O, V: PartialEq> PartialEq for Transition<'_, O, V> {
    fn eq(&self, other: &Self) -> bool {
        same_object(self.object, other.object)
            && self.attribute == other.attribute
            && self.event == other.event
            && self.from == other.from
            && self.to == other.to
    }
}

fn same_object<O>(a: &O, b: &O) -> bool {
    mem::size_of::<O>() == 0 || ptr::eq(a, b)
}

impl<O, V: Clone> Clone for Transition<'_, O, V> {
    fn clone(&self) -> Self {
        Self {
            object: self.object,
            attribute: self.attribute.clone(),
            event: self.event.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

impl<O, V: fmt::Debug> fmt::Debug for Transition<'_, O, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("object", &(self.object as *const O))
            .field("attribute", &self.attribute)
            .field("event", &self.event)
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

/// A state change detached from its object.
///
/// This is what performers, callbacks and observers receive: the descriptor
/// minus the borrow of the object being changed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateChange<V> {
    /// Attribute being changed
    pub attribute: String,
    /// Triggering event, `None` for a loopback
    pub event: Option<String>,
    /// Value before the change
    pub from: Option<V>,
    /// Value after the change
    pub to: Option<V>,
}

impl<V: StateValue> StateChange<V> {
    /// Query enforcing `from`, `to` and `on` for this change.
    pub fn query(&self) -> Query<V> {
        Query::new()
            .from(self.from.clone())
            .to(self.to.clone())
            .on(self.event.as_deref())
    }
}
