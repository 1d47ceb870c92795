//! Server-side Bolt session protocol engine.
//!
//! # Features
//!
//! - **Sans-I/O state machine**: Session logic is separated from framing and sockets
//! - **Pluggable execution engine**: Queries run through [`TransactionManager`]
//! - **Sync and async drivers**: Thread-per-connection or Tokio task-per-connection
//! - **Interrupts**: Any thread can abort the running request of a connection
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use zero_bolt::handler::CollectHandler;
//! use zero_bolt::{Connector, Message, Opts, TransactionManager};
//!
//! fn serve(manager: Arc<dyn TransactionManager>) -> zero_bolt::Result<()> {
//!     let opts = Opts::try_from("server_agent=example/1.0")?;
//!     let connector = Connector::new(opts, manager);
//!
//!     let mut conn = connector.connect(CollectHandler::new());
//!     conn.process(Message::hello("client/1.0"));
//!     conn.process(Message::begin());
//!     conn.process(Message::run("RETURN 1"));
//!     conn.process(Message::pull_all());
//!     conn.process(Message::Commit);
//!
//!     for response in conn.handler_mut().take() {
//!         println!("{:?}", response);
//!     }
//!     conn.process(Message::Goodbye);
//!     Ok(())
//! }
//! ```

pub mod bookmark;
pub mod connection;
pub mod error;
pub mod handler;
pub mod opts;
pub mod protocol;
pub mod state;
pub mod transaction;
pub mod value;

#[cfg(feature = "sync")]
pub mod sync;

#[cfg(feature = "tokio")]
pub mod tokio;

pub use bookmark::Bookmark;
pub use connection::{Connection, Connector};
pub use error::{Error, Result, TransactionError};
pub use handler::{CollectHandler, DropHandler, ResponseHandler};
pub use opts::Opts;
pub use protocol::{AccessMode, FetchSize, Message, MessageKind, Response, TransactionConfig};
pub use state::{ConnectionState, ConnectionStateMachine, InterruptHandle, StateTransition};
pub use transaction::{
    Cursor, CursorState, Pulled, Transaction, TransactionKind, TransactionManager,
    TransactionStatus,
};
pub use value::{Metadata, Value};
