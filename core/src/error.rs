//! Error types for the todo client and the synchronization core.
//!
//! # Design
//! Three layers, each narrower than the one below it:
//! - `ApiError` describes what went wrong with one request. It never leaves
//!   the remote client except through logs.
//! - `RemoteError` is the uniform failure signal of the remote client. It
//!   names the operation and nothing else, so callers cannot branch on
//!   "not found" versus "network down".
//! - `SyncError` is what intents report and what the error banner shows.
//!   Its `Display` output is the user-visible message.

use std::fmt;

use thiserror::Error;

/// Failure of the host transport to complete a round-trip.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("transport failed: {0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors produced while building a request or interpreting a response.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned a status outside `200..=299`.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// The four calls the remote client can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// A remote call did not succeed.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("remote {operation} request failed")]
pub struct RemoteError {
    operation: Operation,
}

impl RemoteError {
    pub(crate) fn new(operation: Operation) -> Self {
        Self { operation }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }
}

/// Failures reported by the synchronization core.
///
/// At most one of these is shown at a time; the latest one wins.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SyncError {
    /// The title was empty after trimming. Never reaches the remote store.
    #[error("Title should not be empty")]
    EmptyTitle,

    #[error("Unable to load todos")]
    Load,

    #[error("Unable to add a todo")]
    Add,

    #[error("Unable to delete a todo")]
    Delete,

    #[error("Unable to update a todo")]
    Update,

    /// At least one delete of a clear-completed batch failed.
    #[error("Unable to delete a todo")]
    Clear,

    /// At least one update of a toggle-all batch failed.
    #[error("Unable to update todos")]
    Toggle,
}
