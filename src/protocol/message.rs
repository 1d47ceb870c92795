//! Client → Server request messages.

use std::fmt;
use std::time::Duration;

use crate::bookmark::Bookmark;
use crate::value::Metadata;

use super::types::{AccessMode, FetchSize};

/// Request message signature bytes.
pub mod msg_type {
    /// HELLO
    pub const HELLO: u8 = 0x01;
    /// GOODBYE
    pub const GOODBYE: u8 = 0x02;
    /// RESET
    pub const RESET: u8 = 0x0F;
    /// RUN
    pub const RUN: u8 = 0x10;
    /// BEGIN
    pub const BEGIN: u8 = 0x11;
    /// COMMIT
    pub const COMMIT: u8 = 0x12;
    /// ROLLBACK
    pub const ROLLBACK: u8 = 0x13;
    /// DISCARD
    pub const DISCARD: u8 = 0x2F;
    /// PULL
    pub const PULL: u8 = 0x3F;
}

/// Kind of a request message, without its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Hello,
    Begin,
    Run,
    Pull,
    Discard,
    Commit,
    Rollback,
    Reset,
    Goodbye,
}

impl MessageKind {
    /// Every message kind.
    pub const ALL: [MessageKind; 9] = [
        MessageKind::Hello,
        MessageKind::Begin,
        MessageKind::Run,
        MessageKind::Pull,
        MessageKind::Discard,
        MessageKind::Commit,
        MessageKind::Rollback,
        MessageKind::Reset,
        MessageKind::Goodbye,
    ];

    /// Create a MessageKind from a signature byte.
    pub fn from_signature(signature: u8) -> Option<Self> {
        match signature {
            msg_type::HELLO => Some(MessageKind::Hello),
            msg_type::GOODBYE => Some(MessageKind::Goodbye),
            msg_type::RESET => Some(MessageKind::Reset),
            msg_type::RUN => Some(MessageKind::Run),
            msg_type::BEGIN => Some(MessageKind::Begin),
            msg_type::COMMIT => Some(MessageKind::Commit),
            msg_type::ROLLBACK => Some(MessageKind::Rollback),
            msg_type::DISCARD => Some(MessageKind::Discard),
            msg_type::PULL => Some(MessageKind::Pull),
            _ => None,
        }
    }

    /// Get the signature byte.
    pub fn signature(self) -> u8 {
        match self {
            MessageKind::Hello => msg_type::HELLO,
            MessageKind::Goodbye => msg_type::GOODBYE,
            MessageKind::Reset => msg_type::RESET,
            MessageKind::Run => msg_type::RUN,
            MessageKind::Begin => msg_type::BEGIN,
            MessageKind::Commit => msg_type::COMMIT,
            MessageKind::Rollback => msg_type::ROLLBACK,
            MessageKind::Discard => msg_type::DISCARD,
            MessageKind::Pull => msg_type::PULL,
        }
    }

    /// Protocol name of the message (e.g. `"COMMIT"`).
    pub fn name(self) -> &'static str {
        match self {
            MessageKind::Hello => "HELLO",
            MessageKind::Begin => "BEGIN",
            MessageKind::Run => "RUN",
            MessageKind::Pull => "PULL",
            MessageKind::Discard => "DISCARD",
            MessageKind::Commit => "COMMIT",
            MessageKind::Rollback => "ROLLBACK",
            MessageKind::Reset => "RESET",
            MessageKind::Goodbye => "GOODBYE",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// HELLO fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HelloMessage {
    /// Client identification (e.g. `"neo4j-java/5.0"`)
    pub user_agent: String,
    /// Remaining fields, passed through untouched
    pub extra: Metadata,
}

/// Transaction settings carried by BEGIN, and by RUN outside an explicit transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionConfig {
    /// Bookmarks the engine must catch up with before the transaction starts
    pub bookmarks: Vec<Bookmark>,
    /// Transaction timeout, enforced by the engine
    pub tx_timeout: Option<Duration>,
    /// Access mode
    pub mode: AccessMode,
    /// Target database (`None` = default database)
    pub database: Option<String>,
    /// User metadata attached to the transaction
    pub tx_metadata: Metadata,
}

impl TransactionConfig {
    /// Set the bookmarks to await.
    pub fn with_bookmarks<I, B>(mut self, bookmarks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bookmark>,
    {
        self.bookmarks = bookmarks.into_iter().map(Into::into).collect();
        self
    }

    /// Set the access mode.
    pub fn with_mode(mut self, mode: AccessMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the target database.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }
}

/// RUN fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunMessage {
    /// Query text
    pub query: String,
    /// Named parameters
    pub params: Metadata,
    /// Settings for the implicit transaction (ignored inside an explicit one)
    pub config: TransactionConfig,
}

impl RunMessage {
    /// Create a RUN message without parameters.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Set the query parameters.
    pub fn with_params(mut self, params: Metadata) -> Self {
        self.params = params;
        self
    }

    /// Set the implicit transaction settings.
    pub fn with_config(mut self, config: TransactionConfig) -> Self {
        self.config = config;
        self
    }
}

/// A decoded client request.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Hello(HelloMessage),
    Begin(TransactionConfig),
    Run(RunMessage),
    Pull { n: FetchSize },
    Discard { n: FetchSize },
    Commit,
    Rollback,
    Reset,
    Goodbye,
}

impl Message {
    /// Get the message kind.
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Hello(_) => MessageKind::Hello,
            Message::Begin(_) => MessageKind::Begin,
            Message::Run(_) => MessageKind::Run,
            Message::Pull { .. } => MessageKind::Pull,
            Message::Discard { .. } => MessageKind::Discard,
            Message::Commit => MessageKind::Commit,
            Message::Rollback => MessageKind::Rollback,
            Message::Reset => MessageKind::Reset,
            Message::Goodbye => MessageKind::Goodbye,
        }
    }

    /// PULL every remaining record.
    pub fn pull_all() -> Self {
        Message::Pull { n: FetchSize::All }
    }

    /// PULL at most `n` records.
    pub fn pull(n: u64) -> Self {
        Message::Pull {
            n: FetchSize::Limited(n),
        }
    }

    /// DISCARD every remaining record.
    pub fn discard_all() -> Self {
        Message::Discard { n: FetchSize::All }
    }

    /// RUN without parameters.
    pub fn run(query: impl Into<String>) -> Self {
        Message::Run(RunMessage::new(query))
    }

    /// BEGIN with default settings.
    pub fn begin() -> Self {
        Message::Begin(TransactionConfig::default())
    }

    /// HELLO with the given user agent.
    pub fn hello(user_agent: impl Into<String>) -> Self {
        Message::Hello(HelloMessage {
            user_agent: user_agent.into(),
            extra: Metadata::new(),
        })
    }
}
