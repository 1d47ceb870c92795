//! Task-per-connection worker for Tokio.

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::{self, JoinHandle};

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::handler::ResponseHandler;
use crate::opts::Opts;
use crate::protocol::message::Message;
use crate::state::{ConnectionState, InterruptHandle};

/// Drives one connection on a Tokio task.
///
/// Engine calls block, so every message is processed on the blocking pool.
/// Messages are still processed one at a time, in the order they are sent.
pub struct Worker;

impl Worker {
    /// Start a worker task for `connection`.
    ///
    /// At most `opts.worker_queue_capacity` messages are buffered; `send`
    /// waits beyond that. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUsage` for a zero capacity.
    pub fn spawn<H>(connection: Connection<H>, opts: &Opts) -> Result<WorkerHandle<H>>
    where
        H: ResponseHandler + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(opts.queue_capacity()?);
        let interrupt = connection.interrupt_handle();
        let task = tokio::spawn(run(connection, receiver));
        Ok(WorkerHandle {
            sender,
            interrupt,
            task,
        })
    }
}

async fn run<H>(
    mut connection: Connection<H>,
    mut receiver: mpsc::Receiver<Message>,
) -> Result<Connection<H>>
where
    H: ResponseHandler + Send + 'static,
{
    while let Some(message) = receiver.recv().await {
        let (returned, state) = task::spawn_blocking(move || {
            let state = connection.process(message);
            (connection, state)
        })
        .await
        .map_err(|e| {
            tracing::error!("connection worker panicked: {}", e);
            Error::ConnectionBroken
        })?;
        connection = returned;
        if state == ConnectionState::Defunct {
            tracing::debug!(connection_id = %connection.id(), "worker finished");
            return Ok(connection);
        }
    }

    // every sender is gone: the client disconnected without GOODBYE
    task::spawn_blocking(move || {
        connection.close();
        connection
    })
    .await
    .map_err(|_| Error::ConnectionBroken)
}

/// Handle to a running [`Worker`].
pub struct WorkerHandle<H> {
    sender: mpsc::Sender<Message>,
    interrupt: InterruptHandle,
    task: JoinHandle<Result<Connection<H>>>,
}

impl<H> WorkerHandle<H> {
    /// Queue a message for processing.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConnectionBroken` if the connection has ended.
    pub async fn send(&self, message: Message) -> Result<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| Error::ConnectionBroken)
    }

    /// Queue a message without waiting.
    ///
    /// # Errors
    ///
    /// Returns `Error::QueueFull` if the queue is at capacity and
    /// `Error::ConnectionBroken` if the connection has ended.
    pub fn try_send(&self, message: Message) -> Result<()> {
        self.sender.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => Error::QueueFull,
            TrySendError::Closed(_) => Error::ConnectionBroken,
        })
    }

    /// Interrupt the connection; takes effect at the next queued message.
    pub fn interrupt(&self) {
        self.interrupt.interrupt();
    }

    /// Get a handle that interrupts the connection from any thread.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    /// Stop accepting messages, wait for the queued ones, and return the connection.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConnectionBroken` if the worker panicked.
    pub async fn join(self) -> Result<Connection<H>> {
        drop(self.sender);
        self.task.await.map_err(|_| Error::ConnectionBroken)?
    }
}
