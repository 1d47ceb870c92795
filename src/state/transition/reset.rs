//! Recovery transitions.

use crate::error::Result;
use crate::metadata;
use crate::protocol::message::Message;
use crate::state::connection::ConnectionState;
use crate::state::context::Context;

use super::StateTransition;

/// any but `Defunct` + RESET → `Ready`.
pub static RESET: StateTransition = StateTransition::new("reset", reset);

/// Pending interrupt + any message → `Ready` (or `Defunct` for GOODBYE).
///
/// Not part of the legality table: the state machine selects it whenever an
/// interrupt is pending, whatever the message.
pub static INTERRUPT: StateTransition = StateTransition::new("interrupt", interrupt);

/// Discard the transaction and any open result, clear the interrupt flag.
fn recover(ctx: &mut Context<'_>) {
    ctx.session.discard_transaction();
    ctx.session.interrupt.clear();
}

fn reset(ctx: &mut Context<'_>, _message: Message) -> Result<ConnectionState> {
    recover(ctx);
    ctx.handler.on_success(metadata!())?;
    Ok(ConnectionState::Ready)
}

fn interrupt(ctx: &mut Context<'_>, message: Message) -> Result<ConnectionState> {
    tracing::debug!(
        connection_id = %ctx.session.connection_id,
        message = %message.kind(),
        "interrupt pending, resetting connection"
    );
    recover(ctx);
    match message {
        Message::Reset => ctx.handler.on_success(metadata!())?,
        Message::Goodbye => return Ok(ConnectionState::Defunct),
        _ => ctx.handler.on_ignored()?,
    }
    Ok(ConnectionState::Ready)
}
