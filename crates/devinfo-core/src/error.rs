//! Error types for the devinfo core library.

use thiserror::Error;

use crate::property::Action;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when querying a property.
#[derive(Error, Debug)]
pub enum Error {
    /// The caller did not name a property.
    #[error("Missing property argument")]
    MissingProperty,

    /// The property name is not part of the property table.
    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    /// The action name is not one of get, has, monitor.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// The action is not implemented for this property.
    #[error("{action} is not supported for property '{property}'")]
    NotSupported { action: Action, property: String },

    /// A platform source could not be read.
    #[error("{source_name} unavailable: {reason}")]
    SourceUnavailable {
        source_name: &'static str,
        reason: String,
    },

    /// I/O error while reading a platform source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds a `SourceUnavailable` error for the named source.
    pub fn unavailable(source_name: &'static str, reason: impl Into<String>) -> Self {
        Error::SourceUnavailable {
            source_name,
            reason: reason.into(),
        }
    }
}
