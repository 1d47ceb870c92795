//! Bolt protocol model.
//!
//! Messages arrive here already decoded; this module only defines their
//! typed shape.
//!
//! # Structure
//!
//! - `message`: Client → Server requests
//! - `response`: Server → Client responses
//! - `status`: Status codes sent with FAILURE
//! - `types`: Common protocol types (FetchSize, AccessMode)

pub mod message;
pub mod response;
pub mod status;
pub mod types;

pub use message::{HelloMessage, Message, MessageKind, RunMessage, TransactionConfig};
pub use response::Response;
pub use types::{AccessMode, FetchSize};
