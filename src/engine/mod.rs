//! Event resolution and firing.
//!
//! This module is the imperative shell around [`crate::core`]:
//!
//! - **Rules**: from-matcher and target value pairs owned by an event
//! - **Events**: resolve candidate transitions and run the firing protocol
//! - **Collections**: index a machine's events by name and qualified name
//! - **Machines**: perform transitions with callbacks and observers, and
//!   act as parallel machines for other events
//!
//! Firing is synchronous. Candidates are attempted one at a time and
//! parallel machines run in registration order.

mod collection;
mod event;
mod machine;
mod perform;
mod rule;

pub use collection::{EventCollection, IndexKind};
pub use event::Event;
pub use machine::{Callback, CallbackAction, CallbackKind, Machine};
pub use perform::{ParallelMachine, ParallelTarget, Perform, SharedMachine};
pub use rule::{FromMatcher, TransitionRule};
