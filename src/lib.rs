//! Statewise: guarded event and transition resolution for state machines
//!
//! Statewise decides which events an object may fire given the current
//! value of one of its attributes, resolves the transitions those events
//! would perform, and fires them while coordinating parallel machines that
//! must also accept the change. Matching is pure; only firing writes to the
//! object, and only through the [`Subject`](crate::core::Subject) trait.
//!
//! # Core Concepts
//!
//! - **Guards**: whitelist/blacklist requirements on `to`, `from` and `on`
//!   plus `if`/`unless` predicates
//! - **Events**: ordered transition rules resolved against a current value
//! - **Machines**: event collections that perform transitions with
//!   callbacks, observers and parallel machines
//!
//! # Example
//!
//! ```rust
//! use statewise::builder::EventBuilder;
//! use statewise::core::Subject;
//! use statewise::engine::Machine;
//!
//! struct Vehicle {
//!     state: Option<&'static str>,
//! }
//!
//! impl Subject<&'static str> for Vehicle {
//!     fn read_state(&self, _attribute: &str) -> Option<&'static str> {
//!         self.state
//!     }
//!
//!     fn write_state(&mut self, _attribute: &str, value: Option<&'static str>) {
//!         self.state = value;
//!     }
//! }
//!
//! let machine = Machine::builder("state")
//!     .event(
//!         EventBuilder::new("ignite")
//!             .transition(Some("parked"), Some("idling"))
//!             .transition(Some("stalled"), Some("idling")),
//!     )
//!     .unwrap()
//!     .event(EventBuilder::new("park").transition_from_any(Some("parked")))
//!     .unwrap()
//!     .build();
//!
//! let mut vehicle = Vehicle { state: Some("parked") };
//! assert_eq!(machine.transitions_for(&vehicle, true).len(), 2);
//!
//! assert!(machine.fire(&mut vehicle, "ignite"));
//! assert_eq!(vehicle.state, Some("idling"));
//! ```

pub mod builder;
pub mod core;
pub mod engine;

// Re-export commonly used types
pub use crate::builder::{BuildError, EventBuilder, GuardError, MachineBuilder};
pub use crate::core::{Guard, Query, StateValue, Subject, Transition};
pub use crate::engine::{Event, EventCollection, Machine};
