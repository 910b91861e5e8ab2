//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::builder::event::EventBuilder;
use crate::core::{Guard, StateChange, StateValue, TransitionObserver};
use crate::engine::{Callback, CallbackKind, EventCollection, Machine};
use std::sync::Arc;

/// Builder for a [`Machine`] with a fluent API.
///
/// Events are registered as they are added, so a name collision is
/// reported by the [`event`](Self::event) call that causes it.
pub struct MachineBuilder<O, V> {
    events: EventCollection<O, V>,
    callbacks: Vec<Callback<O, V>>,
    observers: Vec<Arc<dyn TransitionObserver<V>>>,
}

impl<O, V: StateValue> MachineBuilder<O, V> {
    /// Create a builder for a machine driving `attribute`.
    pub fn new(attribute: &str) -> Self {
        Self {
            events: EventCollection::new(attribute, None),
            callbacks: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Set the namespace used for qualified event names.
    ///
    /// Applies to every event, including those added before this call.
    pub fn namespace(mut self, namespace: &str) -> Self {
        self.events.set_namespace(Some(namespace));
        self
    }

    /// Add an event. Fails if its name or qualified name is already taken.
    pub fn event(mut self, builder: EventBuilder<O, V>) -> Result<Self, BuildError> {
        let event = builder.build(self.events.attribute(), self.events.namespace());
        self.events.insert(event)?;
        Ok(self)
    }

    /// Run `action` before writing the attribute, for changes `guard` accepts.
    pub fn before<F>(self, guard: Guard<O, V>, action: F) -> Self
    where
        F: Fn(&mut O, &StateChange<V>) -> bool + Send + Sync + 'static,
    {
        self.callback(CallbackKind::Before, guard, action)
    }

    /// Run `action` after writing the attribute, for changes `guard` accepts.
    pub fn after<F>(self, guard: Guard<O, V>, action: F) -> Self
    where
        F: Fn(&mut O, &StateChange<V>) -> bool + Send + Sync + 'static,
    {
        self.callback(CallbackKind::After, guard, action)
    }

    fn callback<F>(mut self, kind: CallbackKind, guard: Guard<O, V>, action: F) -> Self
    where
        F: Fn(&mut O, &StateChange<V>) -> bool + Send + Sync + 'static,
    {
        self.callbacks
            .push(Callback::new(kind, guard, Arc::new(action)));
        self
    }

    /// Notify `observer` of every committed transition.
    pub fn observe(mut self, observer: Arc<dyn TransitionObserver<V>>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Finish the machine.
    pub fn build(self) -> Machine<O, V> {
        Machine::from_parts(self.events, self.callbacks, self.observers)
    }
}
