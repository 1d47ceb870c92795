//! Session lifecycle transitions.

use crate::error::Result;
use crate::metadata;
use crate::protocol::message::Message;
use crate::state::connection::ConnectionState;
use crate::state::context::Context;

use super::{StateTransition, unexpected};

/// `Connected` + HELLO → `Ready`.
pub static HELLO: StateTransition = StateTransition::new("hello", hello);

/// any + GOODBYE → `Defunct`.
pub static GOODBYE: StateTransition = StateTransition::new("goodbye", goodbye);

/// `Failed`/`Interrupted` + anything but RESET and GOODBYE: answer IGNORED.
pub static IGNORE: StateTransition = StateTransition::new("ignore", ignore);

fn hello(ctx: &mut Context<'_>, message: Message) -> Result<ConnectionState> {
    let Message::Hello(hello) = message else {
        return Err(unexpected(HELLO.name(), &message));
    };
    tracing::debug!(
        connection_id = %ctx.session.connection_id,
        user_agent = %hello.user_agent,
        "client said hello"
    );
    ctx.session.user_agent = Some(hello.user_agent);
    ctx.handler.on_success(metadata! {
        "server" => ctx.session.server_agent.as_str(),
        "connection_id" => ctx.session.connection_id.as_str(),
    })?;
    Ok(ConnectionState::Ready)
}

fn goodbye(ctx: &mut Context<'_>, _message: Message) -> Result<ConnectionState> {
    // GOODBYE has no response; the client closes the socket right after it
    ctx.session.discard_transaction();
    Ok(ConnectionState::Defunct)
}

fn ignore(ctx: &mut Context<'_>, _message: Message) -> Result<ConnectionState> {
    ctx.handler.on_ignored()?;
    Ok(ctx.state)
}
