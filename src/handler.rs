//! Response handlers.

use crate::bookmark::Bookmark;
use crate::error::Result;
use crate::protocol::response::Response;
use crate::value::{Metadata, Value};

/// Sink for the responses of one connection.
///
/// Callback patterns by request:
/// - BEGIN / COMMIT / ROLLBACK / RESET / HELLO: `on_success` or `on_failure`
/// - COMMIT: `on_bookmark` → `on_success`
/// - RUN: `on_success` (fields) or `on_failure`
/// - PULL: `on_record*` → `on_success` (summary or `has_more`)
/// - PULL exhausting an auto-commit result: `on_record*` → `on_bookmark` → `on_success`
/// - any request while the connection awaits RESET: `on_ignored`
///
/// Responses are emitted in the order their requests were processed. An error
/// returned from any callback is fatal for the connection.
pub trait ResponseHandler {
    /// Called when a request completed.
    fn on_success(&mut self, metadata: Metadata) -> Result<()>;

    /// Called when a request failed.
    fn on_failure(&mut self, status: &str, message: &str) -> Result<()>;

    /// Called when a request was not executed.
    fn on_ignored(&mut self) -> Result<()>;

    /// Called for each result record.
    fn on_record(&mut self, fields: Vec<Value>) -> Result<()>;

    /// Called when a transaction committed, before the SUCCESS carrying it.
    fn on_bookmark(&mut self, bookmark: &Bookmark) -> Result<()> {
        let _ = bookmark;
        Ok(())
    }
}

impl<H: ResponseHandler + ?Sized> ResponseHandler for &mut H {
    fn on_success(&mut self, metadata: Metadata) -> Result<()> {
        (**self).on_success(metadata)
    }

    fn on_failure(&mut self, status: &str, message: &str) -> Result<()> {
        (**self).on_failure(status, message)
    }

    fn on_ignored(&mut self) -> Result<()> {
        (**self).on_ignored()
    }

    fn on_record(&mut self, fields: Vec<Value>) -> Result<()> {
        (**self).on_record(fields)
    }

    fn on_bookmark(&mut self, bookmark: &Bookmark) -> Result<()> {
        (**self).on_bookmark(bookmark)
    }
}

/// A handler that discards all responses.
#[derive(Debug, Default)]
pub struct DropHandler {
    last_bookmark: Option<Bookmark>,
}

impl DropHandler {
    /// Create a new drop handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the most recent bookmark (if any transaction committed).
    pub fn last_bookmark(&self) -> Option<&Bookmark> {
        self.last_bookmark.as_ref()
    }
}

impl ResponseHandler for DropHandler {
    fn on_success(&mut self, _metadata: Metadata) -> Result<()> {
        Ok(())
    }

    fn on_failure(&mut self, _status: &str, _message: &str) -> Result<()> {
        Ok(())
    }

    fn on_ignored(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_record(&mut self, _fields: Vec<Value>) -> Result<()> {
        Ok(())
    }

    fn on_bookmark(&mut self, bookmark: &Bookmark) -> Result<()> {
        self.last_bookmark = Some(bookmark.clone());
        Ok(())
    }
}

/// Handler that collects every response in order.
///
/// # Example
///
/// ```ignore
/// let mut handler = CollectHandler::new();
/// machine.process(&mut handler, Message::Commit);
/// for response in handler.take() {
///     encoder.write(response)?;
/// }
/// ```
#[derive(Debug, Default)]
pub struct CollectHandler {
    responses: Vec<Response>,
}

impl CollectHandler {
    /// Create a new collect handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get collected responses.
    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    /// Take collected responses, leaving the handler empty.
    pub fn take(&mut self) -> Vec<Response> {
        std::mem::take(&mut self.responses)
    }

    /// Get the number of collected responses.
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Check if no responses were collected.
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

impl ResponseHandler for CollectHandler {
    fn on_success(&mut self, metadata: Metadata) -> Result<()> {
        self.responses.push(Response::Success(metadata));
        Ok(())
    }

    fn on_failure(&mut self, status: &str, message: &str) -> Result<()> {
        self.responses.push(Response::Failure {
            status: status.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    fn on_ignored(&mut self) -> Result<()> {
        self.responses.push(Response::Ignored);
        Ok(())
    }

    fn on_record(&mut self, fields: Vec<Value>) -> Result<()> {
        self.responses.push(Response::Record(fields));
        Ok(())
    }

    fn on_bookmark(&mut self, bookmark: &Bookmark) -> Result<()> {
        self.responses.push(Response::Bookmark(bookmark.clone()));
        Ok(())
    }
}
