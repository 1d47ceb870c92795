//! Status codes sent with FAILURE responses.

/// Message is malformed or not allowed in the current state
pub const REQUEST_INVALID: &str = "Neo.ClientError.Request.Invalid";
/// Unclassified server failure
pub const GENERAL_UNKNOWN_ERROR: &str = "Neo.DatabaseError.General.UnknownError";
