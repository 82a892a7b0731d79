//! Error types for binding and dispatch.

use thiserror::Error;

use crate::handler::HandlerError;

/// Why a dispatch did not run to completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No binding matches a completed key sequence.
    #[error("{keys} is not a command")]
    UnresolvedChord { keys: String },
    /// A command-line name has neither an exact nor a wildcard registration.
    #[error("{name}: not a command")]
    UnresolvedCommand { name: String },
    /// A handler reported an error, or its owner released it.
    #[error("{target}: {error}")]
    HandlerInvocationFailure { target: String, error: HandlerError },
}

/// Failure to register a binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("cannot bind an empty key sequence")]
    EmptySequence,
    /// Enter always resolves the pending input, so it cannot be part of a binding.
    #[error("{0}: Enter cannot be part of a binding")]
    ContainsEnter(String),
    #[error(transparent)]
    InvalidKey(#[from] KeyParseError),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

/// Failure to parse a key description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("empty key description")]
    Empty,
    #[error("not a control key: {0}")]
    NotControl(String),
    #[error("unknown key: {0}")]
    Unknown(String),
}
