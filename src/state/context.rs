//! Per-connection data shared by every transition.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::handler::ResponseHandler;
use crate::protocol::message::TransactionConfig;
use crate::transaction::{ActiveTransaction, TransactionKind, TransactionManager, TransactionStatus};

use super::connection::ConnectionState;
use super::interrupt::InterruptHandle;

/// Data owned by one connection, outliving individual transitions.
pub(crate) struct Session {
    pub(crate) connection_id: String,
    pub(crate) server_agent: String,
    pub(crate) user_agent: Option<String>,
    pub(crate) manager: Arc<dyn TransactionManager>,
    pub(crate) transaction: Option<ActiveTransaction>,
    pub(crate) transaction_status: TransactionStatus,
    pub(crate) interrupt: InterruptHandle,
}

impl Session {
    /// Start a transaction. At most one may exist at a time.
    pub(crate) fn begin(&mut self, config: &TransactionConfig, kind: TransactionKind) -> Result<()> {
        if self.transaction.is_some() {
            return Err(Error::InvalidUsage(
                "a transaction is already open on this connection".into(),
            ));
        }
        let inner = self.manager.begin(config, kind)?;
        self.transaction = Some(ActiveTransaction::new(inner, kind));
        self.transaction_status = TransactionStatus::Active;
        Ok(())
    }

    /// Get the open transaction.
    pub(crate) fn transaction_mut(&mut self) -> Result<&mut ActiveTransaction> {
        self.transaction
            .as_mut()
            .ok_or_else(|| Error::InvalidUsage("no open transaction on this connection".into()))
    }

    /// Drop the transaction, remembering how it ended.
    pub(crate) fn release_transaction(&mut self) {
        if let Some(tx) = self.transaction.take() {
            self.transaction_status = tx.status();
        }
    }

    /// Roll back the open transaction, terminating it if the rollback fails.
    ///
    /// Never fails: used by RESET, GOODBYE and teardown.
    pub(crate) fn discard_transaction(&mut self) {
        let Some(tx) = self.transaction.as_mut() else {
            return;
        };
        if tx.status().is_active() {
            if let Err(e) = tx.rollback() {
                tracing::warn!(
                    connection_id = %self.connection_id,
                    "rollback failed while discarding transaction: {}",
                    e
                );
                tx.terminate();
            }
        } else {
            tx.terminate();
        }
        self.release_transaction();
    }

    /// Abort the open transaction after a failure and release it.
    pub(crate) fn abort_transaction(&mut self) {
        if let Some(tx) = self.transaction.as_mut() {
            tx.abort();
        }
        self.release_transaction();
    }
}

/// Everything a transition may act on while handling one message.
pub(crate) struct Context<'a> {
    /// State the message was received in
    pub(crate) state: ConnectionState,
    pub(crate) session: &'a mut Session,
    pub(crate) handler: &'a mut dyn ResponseHandler,
}
