//! Transaction abstraction over the execution engine.
//!
//! The engine implements [`TransactionManager`], [`Transaction`] and
//! [`Cursor`]. The state machine wraps each engine transaction in an
//! [`ActiveTransaction`] that tracks its [`TransactionStatus`] and its open
//! result cursor.

use std::time::Instant;

use crate::bookmark::Bookmark;
use crate::error::{Error, Result, TransactionError};
use crate::protocol::message::TransactionConfig;
use crate::protocol::types::FetchSize;
use crate::value::{Metadata, Value};

/// Whether a transaction was opened by BEGIN or implicitly by RUN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Opened by BEGIN, closed by COMMIT/ROLLBACK
    Explicit,
    /// Opened by RUN outside a transaction, committed when its result is consumed
    Implicit,
}

/// Lifecycle of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionStatus {
    /// No transaction has been started
    #[default]
    NotStarted,
    /// Open and accepting queries
    Active,
    /// Committed; a bookmark was produced
    Committed,
    /// Rolled back or terminated
    RolledBack,
    /// Failed; released without a bookmark
    Failed,
}

impl TransactionStatus {
    /// Returns true if the transaction is open.
    pub fn is_active(self) -> bool {
        matches!(self, TransactionStatus::Active)
    }
}

/// Factory for engine transactions. Shared by every connection.
pub trait TransactionManager: Send + Sync {
    /// Start a transaction.
    ///
    /// The engine must not return before it has caught up with every bookmark
    /// in `config.bookmarks`.
    fn begin(
        &self,
        config: &TransactionConfig,
        kind: TransactionKind,
    ) -> core::result::Result<Box<dyn Transaction>, TransactionError>;
}

/// One server-side transactional execution context.
///
/// Owned by exactly one connection. Every call may block.
pub trait Transaction: Send {
    /// Compile and start a query, returning its result cursor.
    fn run(
        &mut self,
        query: &str,
        params: &Metadata,
    ) -> core::result::Result<Box<dyn Cursor>, TransactionError>;

    /// Commit. Called at most once; never retried.
    fn commit(&mut self) -> core::result::Result<Bookmark, TransactionError>;

    /// Roll back.
    fn rollback(&mut self) -> core::result::Result<(), TransactionError>;

    /// Abort without reporting errors. Must be safe to call in any state.
    fn terminate(&mut self);
}

/// Server-side iterator over the records of one query.
pub trait Cursor: Send {
    /// Result column names.
    fn fields(&self) -> &[String];

    /// Fetch up to `n` records.
    fn pull(&mut self, n: FetchSize) -> core::result::Result<Pulled, TransactionError>;

    /// Drop every remaining record and return the result summary.
    fn discard(&mut self) -> core::result::Result<Metadata, TransactionError>;
}

/// Records returned by [`Cursor::pull`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pulled {
    /// Records in result order
    pub records: Vec<Vec<Value>>,
    /// Whether records remain
    pub state: CursorState,
}

/// Cursor state after a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorState {
    /// More records remain
    HasMore,
    /// The cursor is exhausted; carries the result summary
    Exhausted(Metadata),
}

impl Default for CursorState {
    fn default() -> Self {
        CursorState::Exhausted(Metadata::new())
    }
}

/// Open result stream of the active transaction.
pub(crate) struct OpenResult {
    pub(crate) cursor: Box<dyn Cursor>,
    pub(crate) qid: i64,
    pub(crate) opened_at: Instant,
}

/// Engine transaction plus the bookkeeping the state machine needs.
pub(crate) struct ActiveTransaction {
    inner: Box<dyn Transaction>,
    kind: TransactionKind,
    status: TransactionStatus,
    result: Option<OpenResult>,
    next_qid: i64,
}

impl ActiveTransaction {
    pub(crate) fn new(inner: Box<dyn Transaction>, kind: TransactionKind) -> Self {
        Self {
            inner,
            kind,
            status: TransactionStatus::Active,
            result: None,
            next_qid: 0,
        }
    }

    pub(crate) fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub(crate) fn status(&self) -> TransactionStatus {
        self.status
    }

    fn ensure_active(&self, operation: &str) -> Result<()> {
        if self.status.is_active() {
            Ok(())
        } else {
            Err(Error::InvalidUsage(format!(
                "cannot {} a transaction in status {:?}",
                operation, self.status
            )))
        }
    }

    /// Run a query and keep its cursor open. Returns the query id.
    pub(crate) fn run(&mut self, query: &str, params: &Metadata) -> Result<&OpenResult> {
        self.ensure_active("run")?;
        let opened_at = Instant::now();
        let cursor = self.inner.run(query, params).map_err(|e| self.fail(e))?;
        let qid = self.next_qid;
        self.next_qid += 1;
        Ok(self.result.insert(OpenResult {
            cursor,
            qid,
            opened_at,
        }))
    }

    pub(crate) fn result_mut(&mut self) -> Option<&mut OpenResult> {
        self.result.as_mut()
    }

    /// Close the open result (if any) and forget it.
    pub(crate) fn close_result(&mut self) -> Result<()> {
        if let Some(mut result) = self.result.take() {
            result.cursor.discard().map_err(|e| self.fail(e))?;
        }
        Ok(())
    }

    /// Mark the transaction failed and convert the engine error.
    pub(crate) fn fail(&mut self, err: TransactionError) -> Error {
        self.status = TransactionStatus::Failed;
        Error::Transaction(err)
    }

    /// Commit. On failure the transaction is `Failed` and no bookmark exists.
    pub(crate) fn commit(&mut self) -> Result<Bookmark> {
        self.ensure_active("commit")?;
        self.close_result()?;
        match self.inner.commit() {
            Ok(bookmark) => {
                self.status = TransactionStatus::Committed;
                Ok(bookmark)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub(crate) fn rollback(&mut self) -> Result<()> {
        self.ensure_active("roll back")?;
        self.result = None;
        match self.inner.rollback() {
            Ok(()) => {
                self.status = TransactionStatus::RolledBack;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Abort the transaction. A still-active transaction ends up `RolledBack`.
    pub(crate) fn terminate(&mut self) {
        self.result = None;
        self.inner.terminate();
        if self.status.is_active() {
            self.status = TransactionStatus::RolledBack;
        }
    }

    /// Abort after a failure. A still-active transaction ends up `Failed`.
    pub(crate) fn abort(&mut self) {
        if self.status.is_active() {
            self.status = TransactionStatus::Failed;
        }
        self.terminate();
    }

    /// Forget the open result without touching its cursor.
    pub(crate) fn take_result(&mut self) -> Option<OpenResult> {
        self.result.take()
    }
}
