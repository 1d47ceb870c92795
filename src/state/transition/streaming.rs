//! Query and result streaming transitions.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::protocol::message::{Message, RunMessage};
use crate::state::connection::ConnectionState;
use crate::state::context::Context;
use crate::transaction::{CursorState, OpenResult, TransactionKind};
use crate::value::{Metadata, Value};

use super::{StateTransition, unexpected};

/// `Ready` + RUN → `Streaming`, inside an implicit transaction.
pub static RUN_AUTOCOMMIT: StateTransition = StateTransition::new("run_autocommit", run_autocommit);

/// `TxReady` + RUN → `TxStreaming`.
pub static RUN_IN_TRANSACTION: StateTransition =
    StateTransition::new("run_in_transaction", run_in_transaction);

/// `Streaming`/`TxStreaming` + PULL → same state while records remain, else
/// `Ready`/`TxReady`.
pub static PULL: StateTransition = StateTransition::new("pull", pull);

/// `Streaming`/`TxStreaming` + DISCARD → `Ready`/`TxReady`.
pub static DISCARD: StateTransition = StateTransition::new("discard", discard);

fn millis(elapsed: Duration) -> i64 {
    i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
}

/// SUCCESS metadata for RUN.
fn run_metadata(result: &OpenResult, include_qid: bool) -> Metadata {
    let fields: Vec<Value> = result
        .cursor
        .fields()
        .iter()
        .map(|f| Value::from(f.as_str()))
        .collect();
    let mut metadata = Metadata::new();
    metadata.insert("fields".into(), Value::List(fields));
    metadata.insert("t_first".into(), Value::Integer(millis(result.opened_at.elapsed())));
    if include_qid {
        metadata.insert("qid".into(), Value::Integer(result.qid));
    }
    metadata
}

fn run_autocommit(ctx: &mut Context<'_>, message: Message) -> Result<ConnectionState> {
    let Message::Run(RunMessage {
        query,
        params,
        config,
    }) = message
    else {
        return Err(unexpected(RUN_AUTOCOMMIT.name(), &message));
    };
    ctx.session.begin(&config, TransactionKind::Implicit)?;
    let result = ctx.session.transaction_mut()?.run(&query, &params)?;
    ctx.handler.on_success(run_metadata(result, false))?;
    Ok(ConnectionState::Streaming)
}

fn run_in_transaction(ctx: &mut Context<'_>, message: Message) -> Result<ConnectionState> {
    let Message::Run(run) = message else {
        return Err(unexpected(RUN_IN_TRANSACTION.name(), &message));
    };
    let result = ctx.session.transaction_mut()?.run(&run.query, &run.params)?;
    ctx.handler.on_success(run_metadata(result, true))?;
    Ok(ConnectionState::TxStreaming)
}

fn pull(ctx: &mut Context<'_>, message: Message) -> Result<ConnectionState> {
    let Message::Pull { n } = message else {
        return Err(unexpected(PULL.name(), &message));
    };
    let tx = ctx.session.transaction_mut()?;
    let Some(result) = tx.result_mut() else {
        return Err(Error::InvalidUsage("PULL without an open result".into()));
    };
    let pulled = match result.cursor.pull(n) {
        Ok(pulled) => pulled,
        Err(e) => return Err(tx.fail(e)),
    };

    for record in pulled.records {
        ctx.handler.on_record(record)?;
    }

    match pulled.state {
        CursorState::HasMore => {
            let mut metadata = Metadata::new();
            metadata.insert("has_more".into(), Value::Boolean(true));
            ctx.handler.on_success(metadata)?;
            Ok(ctx.state)
        }
        CursorState::Exhausted(summary) => complete(ctx, summary),
    }
}

fn discard(ctx: &mut Context<'_>, message: Message) -> Result<ConnectionState> {
    if !matches!(message, Message::Discard { .. }) {
        return Err(unexpected(DISCARD.name(), &message));
    }
    let tx = ctx.session.transaction_mut()?;
    let Some(result) = tx.result_mut() else {
        return Err(Error::InvalidUsage("DISCARD without an open result".into()));
    };
    let summary = match result.cursor.discard() {
        Ok(summary) => summary,
        Err(e) => return Err(tx.fail(e)),
    };
    complete(ctx, summary)
}

/// Finish an exhausted result.
///
/// Inside an explicit transaction the transaction stays open. An implicit
/// transaction is committed and its bookmark emitted before the summary.
fn complete(ctx: &mut Context<'_>, mut summary: Metadata) -> Result<ConnectionState> {
    let tx = ctx.session.transaction_mut()?;
    if let Some(result) = tx.take_result() {
        summary.insert("t_last".into(), Value::Integer(millis(result.opened_at.elapsed())));
    }

    match tx.kind() {
        TransactionKind::Explicit => {
            ctx.handler.on_success(summary)?;
            Ok(ConnectionState::TxReady)
        }
        TransactionKind::Implicit => {
            let bookmark = tx.commit()?;
            ctx.handler.on_bookmark(&bookmark)?;
            summary.insert("bookmark".into(), Value::from(&bookmark));
            ctx.handler.on_success(summary)?;
            ctx.session.release_transaction();
            Ok(ConnectionState::Ready)
        }
    }
}
