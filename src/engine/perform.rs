//! Seams used by the firing protocol.

use crate::core::{StateChange, StateValue};
use std::fmt;
use std::sync::Arc;

/// Applies one candidate state change to an object.
///
/// Returning `false` rejects the candidate; the firing protocol then moves
/// on to the next one. A rejected attempt must leave the attribute as it
/// found it.
pub trait Perform<O, V: StateValue> {
    /// `attempt` is the 1-based position of `change` among the candidates.
    fn perform(&self, object: &mut O, change: &StateChange<V>, attempt: usize) -> bool;
}

/// A state machine that can be driven alongside another machine's event.
pub trait ParallelMachine<O>: Send + Sync {
    /// Identifier used in diagnostics.
    fn name(&self) -> &str;

    /// Fire `event` on `object`, reporting whether it succeeded.
    fn attempt(&self, object: &mut O, event: &str) -> bool;
}

pub type SharedMachine<O> = Arc<dyn ParallelMachine<O>>;

/// A parallel machine registered on an event, with an optional trigger name.
pub struct ParallelTarget<O> {
    machine: SharedMachine<O>,
    trigger: Option<String>,
}

impl<O> ParallelTarget<O> {
    pub fn new(machine: SharedMachine<O>, trigger: Option<&str>) -> Self {
        Self {
            machine,
            trigger: trigger.map(str::to_string),
        }
    }

    pub fn machine(&self) -> &SharedMachine<O> {
        &self.machine
    }

    /// Event fired on the parallel machine: the explicit trigger, else `primary`.
    pub fn trigger_for<'a>(&'a self, primary: &'a str) -> &'a str {
        self.trigger.as_deref().unwrap_or(primary)
    }

    pub fn attempt(&self, object: &mut O, primary: &str) -> bool {
        self.machine.attempt(object, self.trigger_for(primary))
    }
}

impl<O> Clone for ParallelTarget<O> {
    fn clone(&self) -> Self {
        Self {
            machine: Arc::clone(&self.machine),
            trigger: self.trigger.clone(),
        }
    }
}

impl<O> fmt::Debug for ParallelTarget<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelTarget")
            .field("machine", &self.machine.name())
            .field("trigger", &self.trigger)
            .finish()
    }
}
