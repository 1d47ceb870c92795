//! Client connections.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::handler::ResponseHandler;
use crate::opts::Opts;
use crate::protocol::message::Message;
use crate::state::{ConnectionState, ConnectionStateMachine, InterruptHandle};
use crate::transaction::{TransactionManager, TransactionStatus};

/// Creates connections sharing one transaction manager.
pub struct Connector {
    opts: Arc<Opts>,
    manager: Arc<dyn TransactionManager>,
    next_id: AtomicU64,
}

impl Connector {
    /// Create a connector.
    pub fn new(opts: Opts, manager: Arc<dyn TransactionManager>) -> Self {
        Self {
            opts: Arc::new(opts),
            manager,
            next_id: AtomicU64::new(0),
        }
    }

    /// Get the options.
    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    /// Create a connection for a client that completed the handshake.
    pub fn connect<H: ResponseHandler>(&self, handler: H) -> Connection<H> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let machine = ConnectionStateMachine::new(
            format!("{}{}", self.opts.connection_id_prefix, id),
            self.opts.server_agent.as_str(),
            Arc::clone(&self.manager),
        );
        Connection::new(machine, handler)
    }
}

/// A client session: one state machine and one response handler.
///
/// Messages must be processed one at a time, in arrival order. Only
/// [`interrupt`](Self::interrupt) (or an [`InterruptHandle`]) may be used
/// from other threads.
pub struct Connection<H> {
    machine: ConnectionStateMachine,
    handler: H,
}

impl<H: ResponseHandler> Connection<H> {
    /// Wrap a state machine and its response handler.
    pub fn new(machine: ConnectionStateMachine, handler: H) -> Self {
        Self { machine, handler }
    }

    /// Process one decoded message and return the resulting state.
    pub fn process(&mut self, message: Message) -> ConnectionState {
        self.machine.process(&mut self.handler, message)
    }

    /// Request an interrupt; the next message resets the connection.
    pub fn interrupt(&self) {
        self.machine.interrupt();
    }

    /// Get a handle that interrupts this connection from any thread.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.machine.interrupt_handle()
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.machine.state()
    }

    /// Check if the session has ended.
    pub fn is_defunct(&self) -> bool {
        self.machine.state() == ConnectionState::Defunct
    }

    /// Get the connection id.
    pub fn id(&self) -> &str {
        self.machine.connection_id()
    }

    /// Get the status of the current or most recent transaction.
    pub fn transaction_status(&self) -> TransactionStatus {
        self.machine.transaction_status()
    }

    /// Get the state machine.
    pub fn machine(&self) -> &ConnectionStateMachine {
        &self.machine
    }

    /// Get the response handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Get the response handler mutably.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// End the session after the socket went away, discarding any open transaction.
    pub fn close(&mut self) {
        self.machine.close();
    }

    /// Split into the state machine and the response handler.
    pub fn into_parts(self) -> (ConnectionStateMachine, H) {
        (self.machine, self.handler)
    }
}
