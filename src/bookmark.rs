//! Causal consistency bookmarks.

use std::fmt;
use std::sync::Arc;

/// Opaque token produced by a successful commit.
///
/// A client that observes a bookmark is guaranteed the writes of the
/// corresponding transaction are durable. The contents are never interpreted
/// here; they are passed back to the engine by later BEGIN/RUN messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bookmark(Arc<str>);

impl Bookmark {
    /// Create a bookmark from its textual form.
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Self(value.into())
    }

    /// Get the textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Bookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Bookmark {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Bookmark {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Bookmark {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl PartialEq<str> for Bookmark {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Bookmark {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}
