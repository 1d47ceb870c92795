//! Thread-per-connection worker.

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::handler::ResponseHandler;
use crate::opts::Opts;
use crate::protocol::message::Message;
use crate::state::{ConnectionState, InterruptHandle};

/// Drives one connection on a dedicated thread.
///
/// Messages are processed strictly in the order they are sent. Engine calls
/// block only this connection's thread.
pub struct Worker;

impl Worker {
    /// Start a worker thread for `connection`.
    ///
    /// At most `opts.worker_queue_capacity` messages are buffered; `send`
    /// blocks beyond that.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUsage` for a zero capacity and `Error::Io` if
    /// the thread cannot be spawned.
    pub fn spawn<H>(connection: Connection<H>, opts: &Opts) -> Result<WorkerHandle<H>>
    where
        H: ResponseHandler + Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel(opts.queue_capacity()?);
        let interrupt = connection.interrupt_handle();
        let thread = thread::Builder::new()
            .name(format!("bolt-worker-{}", connection.id()))
            .spawn(move || run(connection, receiver))?;
        Ok(WorkerHandle {
            sender,
            interrupt,
            thread,
        })
    }
}

fn run<H: ResponseHandler>(mut connection: Connection<H>, receiver: Receiver<Message>) -> Connection<H> {
    for message in receiver {
        if connection.process(message) == ConnectionState::Defunct {
            tracing::debug!(connection_id = %connection.id(), "worker finished");
            return connection;
        }
    }
    // every sender is gone: the client disconnected without GOODBYE
    connection.close();
    connection
}

/// Handle to a running [`Worker`].
pub struct WorkerHandle<H> {
    sender: SyncSender<Message>,
    interrupt: InterruptHandle,
    thread: JoinHandle<Connection<H>>,
}

impl<H> WorkerHandle<H> {
    /// Queue a message for processing.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConnectionBroken` if the connection has ended.
    pub fn send(&self, message: Message) -> Result<()> {
        self.sender
            .send(message)
            .map_err(|_| Error::ConnectionBroken)
    }

    /// Queue a message without blocking.
    ///
    /// # Errors
    ///
    /// Returns `Error::QueueFull` if the queue is at capacity and
    /// `Error::ConnectionBroken` if the connection has ended.
    pub fn try_send(&self, message: Message) -> Result<()> {
        self.sender.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => Error::QueueFull,
            TrySendError::Disconnected(_) => Error::ConnectionBroken,
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
    /// Returns `Error::ConnectionBroken` if the worker thread panicked.
    pub fn join(self) -> Result<Connection<H>> {
        drop(self.sender);
        self.thread.join().map_err(|_| Error::ConnectionBroken)
    }
}
