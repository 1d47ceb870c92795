//! Error types for zero-bolt.

use thiserror::Error;

use crate::protocol::status;

/// Result type for zero-bolt operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Failure reported by the execution engine.
///
/// Carries a Bolt status code (e.g. `Neo.ClientError.Statement.SyntaxError`)
/// and a human readable message. Both are forwarded verbatim to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({status})")]
pub struct TransactionError {
    /// Status code reported to the client
    pub status: String,
    /// Primary error message
    pub message: String,
}

impl TransactionError {
    /// Create a new transaction error.
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }
}

/// Error type for zero-bolt.
#[derive(Debug, Error)]
pub enum Error {
    /// Message not allowed in the current connection state
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// Failure raised by the execution engine (query error, commit conflict, ...)
    #[error("Transaction failed: {0}")]
    Transaction(#[from] TransactionError),

    /// A transition was invoked without its preconditions (e.g. COMMIT with no transaction)
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    /// The response handler could not deliver a response
    #[error("Response handler failed: {0}")]
    Handler(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection is broken and cannot be reused
    #[error("Connection is broken")]
    ConnectionBroken,

    /// A worker queue is at capacity
    #[error("Worker queue is full")]
    QueueFull,
}

impl Error {
    /// Returns true if the error ends the session.
    ///
    /// Fatal errors move the connection to `Defunct`; everything else moves it
    /// to `Failed` and can be cleared with RESET.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::InvalidUsage(_) | Error::Handler(_) | Error::Io(_) | Error::ConnectionBroken
        )
    }

    /// Get the status code sent to the client with a FAILURE response.
    pub fn status(&self) -> &str {
        match self {
            Error::Protocol(_) => status::REQUEST_INVALID,
            Error::Transaction(e) => &e.status,
            Error::InvalidUsage(_)
            | Error::Handler(_)
            | Error::Io(_)
            | Error::ConnectionBroken
            | Error::QueueFull => status::GENERAL_UNKNOWN_ERROR,
        }
    }

    /// Get the message sent to the client with a FAILURE response.
    pub fn client_message(&self) -> String {
        match self {
            Error::Transaction(e) => e.message.clone(),
            Error::Protocol(msg) | Error::InvalidUsage(msg) | Error::Handler(msg) => msg.clone(),
            Error::Io(_) | Error::ConnectionBroken | Error::QueueFull => self.to_string(),
        }
    }
}
