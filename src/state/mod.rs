//! Sans-I/O Bolt session state machine.
//!
//! The state machine performs no I/O. Decoded messages go in; responses come
//! out through a [`ResponseHandler`](crate::handler::ResponseHandler), and
//! transactional work is delegated to a
//! [`TransactionManager`](crate::transaction::TransactionManager).

mod context;
pub mod connection;
pub mod interrupt;
pub mod transition;

pub use connection::{ConnectionState, ConnectionStateMachine};
pub use interrupt::InterruptHandle;
pub use transition::StateTransition;
