//! Errors raised while defining guards, events and machines.

use thiserror::Error;

/// A single rejected guard option.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OptionError {
    #[error("Invalid key: '{key}'")]
    InvalidOption { key: String },

    #[error("Option '{key}' expects {expected}")]
    InvalidValue { key: String, expected: &'static str },
}

/// Guard construction failed. Carries every rejected option, not just the first.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GuardError {
    #[error("Invalid guard options: {}", join_errors(.0))]
    InvalidOptions(Vec<OptionError>),
}

impl GuardError {
    pub fn errors(&self) -> &[OptionError] {
        match self {
            Self::InvalidOptions(errors) => errors,
        }
    }
}

fn join_errors(errors: &[OptionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur when building events and machines.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Event '{name}' is already defined")]
    DuplicateEvent { name: String },

    #[error("Event '{event}' drives attribute '{found}', collection drives '{expected}'")]
    AttributeMismatch {
        event: String,
        expected: String,
        found: String,
    },

    #[error("Event '{event}' has namespace {found:?}, collection uses {expected:?}")]
    NamespaceMismatch {
        event: String,
        expected: Option<String>,
        found: Option<String>,
    },

    #[error(transparent)]
    InvalidGuard(#[from] GuardError),
}
