//! Explicit transaction transitions.
//!
//! BEGIN opens a transaction; COMMIT and ROLLBACK complete it. Completion
//! always happens in the same order: engine call, bookmark emission (commit
//! only), acknowledgement, release. A client that sees a bookmark can rely on
//! the transaction's writes being durable.

use crate::error::Result;
use crate::metadata;
use crate::protocol::message::Message;
use crate::state::connection::ConnectionState;
use crate::state::context::Context;
use crate::transaction::TransactionKind;

use super::{StateTransition, unexpected};

/// `Ready` + BEGIN → `TxReady`.
pub static BEGIN: StateTransition = StateTransition::new("begin", begin);

/// `TxReady`/`TxStreaming` + COMMIT → `Ready`.
pub static COMMIT: StateTransition = StateTransition::new("commit", commit);

/// `TxReady`/`TxStreaming` + ROLLBACK → `Ready`.
pub static ROLLBACK: StateTransition = StateTransition::new("rollback", rollback);

fn begin(ctx: &mut Context<'_>, message: Message) -> Result<ConnectionState> {
    let Message::Begin(config) = message else {
        return Err(unexpected(BEGIN.name(), &message));
    };
    ctx.session.begin(&config, TransactionKind::Explicit)?;
    ctx.handler.on_success(metadata!())?;
    Ok(ConnectionState::TxReady)
}

fn commit(ctx: &mut Context<'_>, message: Message) -> Result<ConnectionState> {
    if !matches!(message, Message::Commit) {
        return Err(unexpected(COMMIT.name(), &message));
    }
    let bookmark = ctx.session.transaction_mut()?.commit()?;
    ctx.handler.on_bookmark(&bookmark)?;
    ctx.handler.on_success(metadata! { "bookmark" => &bookmark })?;
    ctx.session.release_transaction();
    Ok(ConnectionState::Ready)
}

fn rollback(ctx: &mut Context<'_>, message: Message) -> Result<ConnectionState> {
    if !matches!(message, Message::Rollback) {
        return Err(unexpected(ROLLBACK.name(), &message));
    }
    ctx.session.transaction_mut()?.rollback()?;
    ctx.handler.on_success(metadata!())?;
    ctx.session.release_transaction();
    Ok(ConnectionState::Ready)
}
