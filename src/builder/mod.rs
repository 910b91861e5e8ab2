//! Builder API for setting up guards, events and machines.
//!
//! Definitions are ordinary values built at setup time. The builders here
//! are the only way they are assembled; nothing is registered globally.

pub mod error;
pub mod event;
pub mod guard;
pub mod machine;

pub use error::{BuildError, GuardError, OptionError};
pub use event::EventBuilder;
pub use guard::{GuardBuilder, OptionValue};
pub use machine::MachineBuilder;
