//! Server → Client responses.

use crate::bookmark::Bookmark;
use crate::value::{Metadata, Value};

/// Response message signature bytes.
pub mod msg_type {
    /// SUCCESS
    pub const SUCCESS: u8 = 0x70;
    /// RECORD
    pub const RECORD: u8 = 0x71;
    /// IGNORED
    pub const IGNORED: u8 = 0x7E;
    /// FAILURE
    pub const FAILURE: u8 = 0x7F;
}

/// An owned response, as collected by [`crate::handler::CollectHandler`].
///
/// Bookmarks travel inside SUCCESS metadata on the wire; they are kept as a
/// separate event here so the network layer can track them.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Request completed successfully
    Success(Metadata),
    /// Request failed
    Failure {
        /// Status code
        status: String,
        /// Error message
        message: String,
    },
    /// Request was not executed (connection awaits RESET)
    Ignored,
    /// One result record
    Record(Vec<Value>),
    /// A transaction committed
    Bookmark(Bookmark),
}

impl Response {
    /// Get the signature byte of the wire message carrying this response.
    ///
    /// Returns `None` for `Bookmark`, which has no message of its own.
    pub fn signature(&self) -> Option<u8> {
        match self {
            Response::Success(_) => Some(msg_type::SUCCESS),
            Response::Failure { .. } => Some(msg_type::FAILURE),
            Response::Ignored => Some(msg_type::IGNORED),
            Response::Record(_) => Some(msg_type::RECORD),
            Response::Bookmark(_) => None,
        }
    }

    /// Returns true if this is a `Failure`.
    pub fn is_failure(&self) -> bool {
        matches!(self, Response::Failure { .. })
    }
}
