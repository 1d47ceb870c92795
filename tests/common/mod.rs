//! Fake execution engine and recording handler shared by the integration tests.
//!
//! Engine calls and responses land in one ordered log so tests can assert on
//! interleaving (e.g. commit before bookmark before success).

#![allow(dead_code)]

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use zero_bolt::error::Result;
use zero_bolt::{
    Bookmark, Connection, Connector, Cursor, CursorState, Error, FetchSize, InterruptHandle,
    Message, MessageKind, Metadata, Opts, Pulled, ResponseHandler, Transaction,
    TransactionConfig, TransactionError, TransactionKind, TransactionManager, Value, metadata,
};

pub const BOOKMARK: &str = "test-bookmark-1234";
pub const SYNTAX_ERROR: &str = "Neo.ClientError.Statement.SyntaxError";
pub const CONFLICT: &str = "Neo.TransientError.Transaction.Outdated";

/// One entry of the shared log.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    // engine
    Begin(TransactionKind),
    Run(String),
    Pull(FetchSize),
    Discard,
    Commit,
    Rollback,
    Terminate,
    // responses
    Success(Metadata),
    Failure(String),
    Ignored,
    Record(Vec<Value>),
    Bookmark(String),
}

impl Call {
    pub fn is_response(&self) -> bool {
        matches!(
            self,
            Call::Success(_) | Call::Failure(_) | Call::Ignored | Call::Record(_) | Call::Bookmark(_)
        )
    }
}

pub type Log = Arc<Mutex<Vec<Call>>>;

fn push(log: &Log, call: Call) {
    log.lock().unwrap().push(call);
}

/// How the fake engine behaves.
#[derive(Debug, Clone)]
pub struct Behavior {
    /// Records produced by every query (`[1]`, `[2]`, ...)
    pub records: i64,
    pub bookmark: String,
    pub begin_error: Option<TransactionError>,
    pub run_error: Option<TransactionError>,
    pub pull_error: Option<TransactionError>,
    pub discard_error: Option<TransactionError>,
    pub commit_error: Option<TransactionError>,
    pub rollback_error: Option<TransactionError>,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            records: 3,
            bookmark: BOOKMARK.to_string(),
            begin_error: None,
            run_error: None,
            pull_error: None,
            discard_error: None,
            commit_error: None,
            rollback_error: None,
        }
    }
}

pub fn syntax_error() -> TransactionError {
    TransactionError::new(SYNTAX_ERROR, "Invalid input 'RETRUN'")
}

pub fn conflict() -> TransactionError {
    TransactionError::new(CONFLICT, "transaction conflicts with a concurrent write")
}

/// Engine recording every call into the shared log.
pub struct FakeEngine {
    log: Log,
    behavior: Mutex<Behavior>,
    interrupt_on_run: Mutex<Option<InterruptHandle>>,
    gate: Mutex<Option<Gate>>,
}

/// Holds the next BEGIN until released.
struct Gate {
    entered: Sender<()>,
    release: Receiver<()>,
}

impl FakeEngine {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            log: Log::default(),
            behavior: Mutex::new(behavior),
            interrupt_on_run: Mutex::new(None),
            gate: Mutex::new(None),
        })
    }

    pub fn log(&self) -> Log {
        Arc::clone(&self.log)
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Fire `handle` from inside the next RUN, as a client would mid-query.
    pub fn interrupt_on_run(&self, handle: InterruptHandle) {
        *self.interrupt_on_run.lock().unwrap() = Some(handle);
    }

    /// Block the next BEGIN inside the engine.
    ///
    /// Returns a receiver signalled once BEGIN is entered and a sender that
    /// lets it continue.
    pub fn hold_next_begin(&self) -> (Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *self.gate.lock().unwrap() = Some(Gate {
            entered: entered_tx,
            release: release_rx,
        });
        (entered_rx, release_tx)
    }

    fn context(&self) -> EngineContext {
        EngineContext {
            log: self.log(),
            behavior: self.behavior.lock().unwrap().clone(),
            interrupt_on_run: self.interrupt_on_run.lock().unwrap().take(),
        }
    }
}

struct EngineContext {
    log: Log,
    behavior: Behavior,
    interrupt_on_run: Option<InterruptHandle>,
}

impl TransactionManager for FakeEngine {
    fn begin(
        &self,
        _config: &TransactionConfig,
        kind: TransactionKind,
    ) -> std::result::Result<Box<dyn Transaction>, TransactionError> {
        if let Some(gate) = self.gate.lock().unwrap().take() {
            gate.entered.send(()).unwrap();
            gate.release.recv().unwrap();
        }
        let ctx = self.context();
        push(&ctx.log, Call::Begin(kind));
        if let Some(e) = ctx.behavior.begin_error.clone() {
            return Err(e);
        }
        Ok(Box::new(FakeTransaction { ctx }))
    }
}

struct FakeTransaction {
    ctx: EngineContext,
}

impl Transaction for FakeTransaction {
    fn run(
        &mut self,
        query: &str,
        _params: &Metadata,
    ) -> std::result::Result<Box<dyn Cursor>, TransactionError> {
        push(&self.ctx.log, Call::Run(query.to_string()));
        if let Some(handle) = self.ctx.interrupt_on_run.take() {
            handle.interrupt();
        }
        if let Some(e) = self.ctx.behavior.run_error.clone() {
            return Err(e);
        }
        Ok(Box::new(FakeCursor {
            log: Arc::clone(&self.ctx.log),
            fields: vec!["n".to_string()],
            next: 1,
            last: self.ctx.behavior.records,
            pull_error: self.ctx.behavior.pull_error.clone(),
            discard_error: self.ctx.behavior.discard_error.clone(),
        }))
    }

    fn commit(&mut self) -> std::result::Result<Bookmark, TransactionError> {
        push(&self.ctx.log, Call::Commit);
        match self.ctx.behavior.commit_error.clone() {
            Some(e) => Err(e),
            None => Ok(Bookmark::new(self.ctx.behavior.bookmark.as_str())),
        }
    }

    fn rollback(&mut self) -> std::result::Result<(), TransactionError> {
        push(&self.ctx.log, Call::Rollback);
        match self.ctx.behavior.rollback_error.clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn terminate(&mut self) {
        push(&self.ctx.log, Call::Terminate);
    }
}

struct FakeCursor {
    log: Log,
    fields: Vec<String>,
    next: i64,
    last: i64,
    pull_error: Option<TransactionError>,
    discard_error: Option<TransactionError>,
}

impl Cursor for FakeCursor {
    fn fields(&self) -> &[String] {
        &self.fields
    }

    fn pull(&mut self, n: FetchSize) -> std::result::Result<Pulled, TransactionError> {
        push(&self.log, Call::Pull(n));
        if let Some(e) = self.pull_error.take() {
            return Err(e);
        }
        let mut records = Vec::new();
        while self.next <= self.last && n.limit().is_none_or(|limit| records.len() < limit) {
            records.push(vec![Value::Integer(self.next)]);
            self.next += 1;
        }
        let state = if self.next > self.last {
            CursorState::Exhausted(metadata! { "type" => "r" })
        } else {
            CursorState::HasMore
        };
        Ok(Pulled { records, state })
    }

    fn discard(&mut self) -> std::result::Result<Metadata, TransactionError> {
        push(&self.log, Call::Discard);
        if let Some(e) = self.discard_error.take() {
            return Err(e);
        }
        self.next = self.last + 1;
        Ok(metadata! { "type" => "r" })
    }
}

/// Handler writing every response into the shared log.
pub struct RecordingHandler {
    log: Log,
    fail_on_bookmark: bool,
    fail_all: bool,
}

impl RecordingHandler {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            fail_on_bookmark: false,
            fail_all: false,
        }
    }

    /// Make `on_bookmark` fail as if the socket broke.
    pub fn fail_on_bookmark(mut self) -> Self {
        self.fail_on_bookmark = true;
        self
    }

    /// Make every callback fail.
    pub fn set_fail_all(&mut self, fail: bool) {
        self.fail_all = fail;
    }

    fn record(&mut self, call: Call) -> Result<()> {
        if self.fail_all {
            return Err(Error::Handler("socket closed".into()));
        }
        push(&self.log, call);
        Ok(())
    }
}

impl ResponseHandler for RecordingHandler {
    fn on_success(&mut self, metadata: Metadata) -> Result<()> {
        self.record(Call::Success(metadata))
    }

    fn on_failure(&mut self, status: &str, _message: &str) -> Result<()> {
        self.record(Call::Failure(status.to_string()))
    }

    fn on_ignored(&mut self) -> Result<()> {
        self.record(Call::Ignored)
    }

    fn on_record(&mut self, fields: Vec<Value>) -> Result<()> {
        self.record(Call::Record(fields))
    }

    fn on_bookmark(&mut self, bookmark: &Bookmark) -> Result<()> {
        if self.fail_on_bookmark {
            return Err(Error::Handler("socket closed".into()));
        }
        self.record(Call::Bookmark(bookmark.to_string()))
    }
}

/// Connection over `engine` that has not said HELLO yet.
pub fn connect(engine: &Arc<FakeEngine>) -> Connection<RecordingHandler> {
    let manager: Arc<dyn TransactionManager> = engine.clone();
    Connector::new(Opts::default(), manager).connect(RecordingHandler::new(engine.log()))
}

/// Connection in `Ready` with an empty log.
pub fn ready(engine: &Arc<FakeEngine>) -> Connection<RecordingHandler> {
    let mut conn = connect(engine);
    conn.process(Message::hello("test/1.0"));
    take(&engine.log());
    conn
}

/// Drain the log.
pub fn take(log: &Log) -> Vec<Call> {
    std::mem::take(&mut *log.lock().unwrap())
}

/// Count the responses (not engine calls) in `calls`.
pub fn responses(calls: &[Call]) -> Vec<&Call> {
    calls.iter().filter(|c| c.is_response()).collect()
}

/// A representative message of each kind.
pub fn message(kind: MessageKind) -> Message {
    match kind {
        MessageKind::Hello => Message::hello("test/1.0"),
        MessageKind::Goodbye => Message::Goodbye,
        MessageKind::Reset => Message::Reset,
        MessageKind::Run => Message::run("RETURN 1"),
        MessageKind::Begin => Message::begin(),
        MessageKind::Commit => Message::Commit,
        MessageKind::Rollback => Message::Rollback,
        MessageKind::Discard => Message::discard_all(),
        MessageKind::Pull => Message::pull_all(),
    }
}

pub fn bookmark_of(metadata: &Metadata) -> Option<&str> {
    metadata.get("bookmark").and_then(Value::as_str)
}
