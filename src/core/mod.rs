//! Core matching types.
//!
//! This module contains the pure part of the engine:
//! - State values and the `Subject` access trait
//! - Requirements and guards deciding whether a transition context is allowed
//! - Transition descriptors and the history of committed changes
//!
//! Nothing here mutates a subject; firing lives in [`crate::engine`].

mod guard;
mod history;
mod requirement;
mod state;
mod transition;

pub use guard::{Edge, Guard, Predicate, Query};
pub use history::{HistoryRecorder, StateHistory, StateTransition, TransitionObserver};
pub use requirement::Requirement;
pub use state::{StateValue, Subject};
pub use transition::{StateChange, Transition};
