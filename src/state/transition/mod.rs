//! State transitions and the legality table.
//!
//! Every legal `(state, message kind)` pair maps to one immutable
//! [`StateTransition`]. A transition is a plain function: it acts on the
//! session and the response handler and reports the next state. Pairs missing
//! from the table are protocol violations.

mod reset;
mod session;
mod streaming;
mod transaction;

use crate::error::{Error, Result};
use crate::protocol::message::{Message, MessageKind};

use super::connection::ConnectionState;
use super::context::Context;

pub use reset::{INTERRUPT, RESET};
pub use session::{GOODBYE, HELLO, IGNORE};
pub use streaming::{DISCARD, PULL, RUN_AUTOCOMMIT, RUN_IN_TRANSACTION};
pub use transaction::{BEGIN, COMMIT, ROLLBACK};

type TransitionFn = for<'a, 'b> fn(&'a mut Context<'b>, Message) -> Result<ConnectionState>;

/// Handler for one kind of legal `(state, message kind)` combination.
pub struct StateTransition {
    name: &'static str,
    apply: TransitionFn,
}

impl StateTransition {
    const fn new(name: &'static str, apply: TransitionFn) -> Self {
        Self { name, apply }
    }

    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the transition. Called exactly once per dispatched message.
    pub(crate) fn apply(&self, ctx: &mut Context<'_>, message: Message) -> Result<ConnectionState> {
        (self.apply)(ctx, message)
    }
}

impl std::fmt::Debug for StateTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateTransition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

use ConnectionState as S;
use MessageKind as K;

/// Every legal `(state, message kind)` pair.
///
/// The `Interrupted` rows only apply once the interrupt flag is clear; while
/// it is pending [`INTERRUPT`] handles the message instead.
pub static LEGALITY: &[(ConnectionState, MessageKind, &StateTransition)] = &[
    (S::Connected, K::Hello, &HELLO),
    (S::Connected, K::Reset, &RESET),
    (S::Connected, K::Goodbye, &GOODBYE),
    (S::Ready, K::Begin, &BEGIN),
    (S::Ready, K::Run, &RUN_AUTOCOMMIT),
    (S::Ready, K::Reset, &RESET),
    (S::Ready, K::Goodbye, &GOODBYE),
    (S::Streaming, K::Pull, &PULL),
    (S::Streaming, K::Discard, &DISCARD),
    (S::Streaming, K::Reset, &RESET),
    (S::Streaming, K::Goodbye, &GOODBYE),
    (S::TxReady, K::Run, &RUN_IN_TRANSACTION),
    (S::TxReady, K::Commit, &COMMIT),
    (S::TxReady, K::Rollback, &ROLLBACK),
    (S::TxReady, K::Reset, &RESET),
    (S::TxReady, K::Goodbye, &GOODBYE),
    (S::TxStreaming, K::Pull, &PULL),
    (S::TxStreaming, K::Discard, &DISCARD),
    (S::TxStreaming, K::Commit, &COMMIT),
    (S::TxStreaming, K::Rollback, &ROLLBACK),
    (S::TxStreaming, K::Reset, &RESET),
    (S::TxStreaming, K::Goodbye, &GOODBYE),
    (S::Failed, K::Hello, &IGNORE),
    (S::Failed, K::Begin, &IGNORE),
    (S::Failed, K::Run, &IGNORE),
    (S::Failed, K::Pull, &IGNORE),
    (S::Failed, K::Discard, &IGNORE),
    (S::Failed, K::Commit, &IGNORE),
    (S::Failed, K::Rollback, &IGNORE),
    (S::Failed, K::Reset, &RESET),
    (S::Failed, K::Goodbye, &GOODBYE),
    (S::Interrupted, K::Hello, &IGNORE),
    (S::Interrupted, K::Begin, &IGNORE),
    (S::Interrupted, K::Run, &IGNORE),
    (S::Interrupted, K::Pull, &IGNORE),
    (S::Interrupted, K::Discard, &IGNORE),
    (S::Interrupted, K::Commit, &IGNORE),
    (S::Interrupted, K::Rollback, &IGNORE),
    (S::Interrupted, K::Reset, &RESET),
    (S::Interrupted, K::Goodbye, &GOODBYE),
    (S::Defunct, K::Goodbye, &GOODBYE),
];

/// Find the transition for a message received in `state`.
pub fn lookup(state: ConnectionState, kind: MessageKind) -> Option<&'static StateTransition> {
    LEGALITY
        .iter()
        .find(|(s, k, _)| *s == state && *k == kind)
        .map(|(_, _, transition)| *transition)
}

/// Returns true if `kind` may be sent in `state`.
pub fn is_legal(state: ConnectionState, kind: MessageKind) -> bool {
    lookup(state, kind).is_some()
}

/// Error for a message routed to a transition that does not handle it.
fn unexpected(transition: &str, message: &Message) -> Error {
    Error::InvalidUsage(format!(
        "{} transition cannot handle {}",
        transition,
        message.kind()
    ))
}
