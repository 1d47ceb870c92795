//! Connection state machine.

use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::handler::ResponseHandler;
use crate::protocol::message::Message;
use crate::transaction::{TransactionManager, TransactionStatus};

use super::context::{Context, Session};
use super::interrupt::InterruptHandle;
use super::transition::{self, StateTransition};

/// Session state of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Handshake done, waiting for HELLO
    Connected,
    /// Idle, no transaction
    Ready,
    /// Auto-commit result open
    Streaming,
    /// Explicit transaction open, no result
    TxReady,
    /// Explicit transaction open with a result
    TxStreaming,
    /// A request failed; waiting for RESET
    Failed,
    /// A request failed while an interrupt was pending.
    ///
    /// The interrupt is still pending, so the next message always takes the
    /// interrupt path and leaves this state.
    Interrupted,
    /// Session ended
    Defunct,
}

impl ConnectionState {
    /// Every connection state.
    pub const ALL: [ConnectionState; 8] = [
        ConnectionState::Connected,
        ConnectionState::Ready,
        ConnectionState::Streaming,
        ConnectionState::TxReady,
        ConnectionState::TxStreaming,
        ConnectionState::Failed,
        ConnectionState::Interrupted,
        ConnectionState::Defunct,
    ];

    /// Returns true inside an explicit transaction.
    pub fn in_transaction(self) -> bool {
        matches!(self, ConnectionState::TxReady | ConnectionState::TxStreaming)
    }

    /// Returns true if the connection awaits RESET.
    pub fn is_failed(self) -> bool {
        matches!(self, ConnectionState::Failed | ConnectionState::Interrupted)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Connected => "CONNECTED",
            ConnectionState::Ready => "READY",
            ConnectionState::Streaming => "STREAMING",
            ConnectionState::TxReady => "TX_READY",
            ConnectionState::TxStreaming => "TX_STREAMING",
            ConnectionState::Failed => "FAILED",
            ConnectionState::Interrupted => "INTERRUPTED",
            ConnectionState::Defunct => "DEFUNCT",
        };
        f.write_str(name)
    }
}

/// Bolt session state machine.
///
/// Owns the current state and the optional open transaction of one
/// connection. [`process`](Self::process) handles one decoded message and
/// never fails: every error becomes a response plus a state change.
pub struct ConnectionStateMachine {
    state: ConnectionState,
    session: Session,
}

impl ConnectionStateMachine {
    /// Create a new state machine in `Connected`.
    pub fn new(
        connection_id: impl Into<String>,
        server_agent: impl Into<String>,
        manager: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            state: ConnectionState::Connected,
            session: Session {
                connection_id: connection_id.into(),
                server_agent: server_agent.into(),
                user_agent: None,
                manager,
                transaction: None,
                transaction_status: TransactionStatus::NotStarted,
                interrupt: InterruptHandle::new(),
            },
        }
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Get the connection id reported to the client.
    pub fn connection_id(&self) -> &str {
        &self.session.connection_id
    }

    /// Get the user agent sent with HELLO.
    pub fn user_agent(&self) -> Option<&str> {
        self.session.user_agent.as_deref()
    }

    /// Get the status of the current or most recent transaction.
    pub fn transaction_status(&self) -> TransactionStatus {
        self.session
            .transaction
            .as_ref()
            .map_or(self.session.transaction_status, |tx| tx.status())
    }

    /// Check if a transaction is open.
    pub fn has_transaction(&self) -> bool {
        self.session.transaction.is_some()
    }

    /// Get a handle that interrupts this connection from any thread.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.session.interrupt.clone()
    }

    /// Request an interrupt.
    pub fn interrupt(&self) {
        self.session.interrupt.interrupt();
    }

    /// Process one message and return the resulting state.
    ///
    /// A pending interrupt takes precedence over the legality table in every
    /// state but `Defunct`: the open transaction is discarded and the
    /// connection moves to `Ready` (`Defunct` for GOODBYE). This holds in
    /// `Connected` too, so an interrupt before HELLO skips the handshake and
    /// no user agent is recorded.
    pub fn process(
        &mut self,
        handler: &mut dyn ResponseHandler,
        message: Message,
    ) -> ConnectionState {
        let from = self.state;
        let kind = message.kind();

        let transition = if from != ConnectionState::Defunct && self.session.interrupt.is_pending()
        {
            Some(&transition::INTERRUPT)
        } else {
            transition::lookup(from, kind)
        };

        let Some(transition) = transition else {
            self.state = self.reject(handler, message);
            return self.state;
        };

        self.state = self.apply(transition, handler, message);
        tracing::debug!(
            connection_id = %self.session.connection_id,
            message = %kind,
            transition = transition.name(),
            "{} -> {}",
            from,
            self.state
        );
        self.state
    }

    fn apply(
        &mut self,
        transition: &StateTransition,
        handler: &mut dyn ResponseHandler,
        message: Message,
    ) -> ConnectionState {
        let mut ctx = Context {
            state: self.state,
            session: &mut self.session,
            handler: &mut *handler,
        };
        match transition.apply(&mut ctx, message) {
            Ok(next) => next,
            Err(e) => self.fail(handler, e),
        }
    }

    /// Answer a message that is not legal in the current state.
    fn reject(&mut self, handler: &mut dyn ResponseHandler, message: Message) -> ConnectionState {
        let err = Error::Protocol(format!(
            "{} is not allowed in state {}",
            message.kind(),
            self.state
        ));
        tracing::warn!(connection_id = %self.session.connection_id, "{}", err);
        if let Err(e) = handler.on_failure(err.status(), &err.client_message()) {
            return self.defunct(e);
        }
        match self.state {
            ConnectionState::Defunct => ConnectionState::Defunct,
            _ => ConnectionState::Failed,
        }
    }

    /// Route a transition error to the client and pick the next state.
    fn fail(&mut self, handler: &mut dyn ResponseHandler, err: Error) -> ConnectionState {
        if err.is_fatal() {
            if !matches!(err, Error::Handler(_) | Error::Io(_)) {
                // best effort, the session ends either way
                let _ = handler.on_failure(err.status(), &err.client_message());
            }
            return self.defunct(err);
        }

        tracing::debug!(
            connection_id = %self.session.connection_id,
            status = err.status(),
            "request failed: {}",
            err
        );
        self.session.abort_transaction();
        if let Err(e) = handler.on_failure(err.status(), &err.client_message()) {
            return self.defunct(e);
        }
        if self.session.interrupt.is_pending() {
            ConnectionState::Interrupted
        } else {
            ConnectionState::Failed
        }
    }

    fn defunct(&mut self, err: Error) -> ConnectionState {
        tracing::error!(
            connection_id = %self.session.connection_id,
            "closing connection: {}",
            err
        );
        self.session.abort_transaction();
        ConnectionState::Defunct
    }

    /// Tear the session down, discarding any open transaction.
    ///
    /// Used when the client disappears without GOODBYE.
    pub fn close(&mut self) {
        self.session.discard_transaction();
        self.state = ConnectionState::Defunct;
    }
}

impl Drop for ConnectionStateMachine {
    fn drop(&mut self) {
        if self.session.transaction.is_some() {
            tracing::debug!(
                connection_id = %self.session.connection_id,
                "terminating transaction of dropped connection"
            );
            self.session.abort_transaction();
        }
    }
}
