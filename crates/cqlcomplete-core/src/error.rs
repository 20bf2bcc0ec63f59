//! Error types for grammar construction and schema access.
//!
//! # Error Handling Strategy
//!
//! This crate uses three complementary error handling patterns:
//!
//! - [`GrammarError`]: wiring bugs in the grammar or completer tables. These can only
//!   happen while the grammar and registry are being built at startup, never while
//!   resolving completions against a frozen grammar.
//!
//! - [`SchemaError`]: failures raised by a [`crate::schema::SchemaAccessor`] (unknown
//!   keyspace, table or index, or a server-side error). The completion resolver
//!   catches these per branch, so one failing lookup only empties its own branch.
//!
//! - [`crate::schema::Diagnostic`]: non-fatal problems found while decoding schema
//!   rows. They are returned next to a best-effort [`crate::schema::TableDef`]
//!   instead of being raised.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use thiserror::Error;

/// Errors raised while building a grammar or a completer registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// A rule was referenced (or looked up) but never registered.
    #[error("unknown grammar rule <{0}>")]
    UnknownRule(String),

    /// A rule body could not be parsed.
    #[error("syntax error in rule <{rule}> at offset {offset}: {message}")]
    Syntax {
        rule: String,
        offset: usize,
        message: String,
    },

    /// A `/pattern/` terminal is not a valid regular expression.
    #[error("invalid pattern /{pattern}/ in rule <{rule}>: {message}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        message: String,
    },

    /// Two completers or hints were registered for the same binding.
    #[error("completer already registered for <{production}> binding '{binding}'")]
    DuplicateCompleter { production: String, binding: String },
}

/// What kind of schema object a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaObject {
    Keyspace,
    Table,
    Index,
}

impl fmt::Display for SchemaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyspace => write!(f, "keyspace"),
            Self::Table => write!(f, "table"),
            Self::Index => write!(f, "index"),
        }
    }
}

/// Errors raised by schema accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The named keyspace, table or index does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: SchemaObject, name: String },

    /// The server rejected a metadata request.
    #[error("server error {code} ({value:#06x}): {message}", value = .code.value())]
    Server { code: ErrorCode, message: String },
}

impl SchemaError {
    pub fn keyspace_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: SchemaObject::Keyspace,
            name: name.into(),
        }
    }

    pub fn table_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: SchemaObject::Table,
            name: name.into(),
        }
    }
}

/// Error codes of the native protocol, as reported in server error frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ServerError,
    ProtocolError,

    // 0x1xxx: problem during request execution
    Unavailable,
    Overloaded,
    IsBootstrapping,
    TruncateError,
    WriteTimeout,
    ReadTimeout,

    // 0x2xxx: problem validating the request
    SyntaxError,
    Unauthorized,
    Invalid,
    ConfigError,
    AlreadyExists,
}

/// An error code value that does not correspond to any [`ErrorCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown error code {0:#06x}")]
pub struct UnknownErrorCode(pub i32);

impl ErrorCode {
    pub const ALL: [ErrorCode; 13] = [
        Self::ServerError,
        Self::ProtocolError,
        Self::Unavailable,
        Self::Overloaded,
        Self::IsBootstrapping,
        Self::TruncateError,
        Self::WriteTimeout,
        Self::ReadTimeout,
        Self::SyntaxError,
        Self::Unauthorized,
        Self::Invalid,
        Self::ConfigError,
        Self::AlreadyExists,
    ];

    /// Wire value of this code.
    pub const fn value(self) -> i32 {
        match self {
            Self::ServerError => 0x0000,
            Self::ProtocolError => 0x000A,
            Self::Unavailable => 0x1000,
            Self::Overloaded => 0x1001,
            Self::IsBootstrapping => 0x1002,
            Self::TruncateError => 0x1003,
            Self::WriteTimeout => 0x1100,
            Self::ReadTimeout => 0x1200,
            Self::SyntaxError => 0x2000,
            Self::Unauthorized => 0x2100,
            Self::Invalid => 0x2200,
            Self::ConfigError => 0x2300,
            Self::AlreadyExists => 0x2400,
        }
    }

    /// Look up a code by its wire value.
    pub fn from_value(value: i32) -> Result<Self, UnknownErrorCode> {
        static BY_VALUE: OnceLock<HashMap<i32, ErrorCode>> = OnceLock::new();
        let by_value = BY_VALUE.get_or_init(|| {
            Self::ALL
                .iter()
                .map(|code| (code.value(), *code))
                .collect()
        });

        by_value
            .get(&value)
            .copied()
            .ok_or(UnknownErrorCode(value))
    }

    /// Protocol name of the code, e.g. `READ_TIMEOUT`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ServerError => "SERVER_ERROR",
            Self::ProtocolError => "PROTOCOL_ERROR",
            Self::Unavailable => "UNAVAILABLE",
            Self::Overloaded => "OVERLOADED",
            Self::IsBootstrapping => "IS_BOOTSTRAPPING",
            Self::TruncateError => "TRUNCATE_ERROR",
            Self::WriteTimeout => "WRITE_TIMEOUT",
            Self::ReadTimeout => "READ_TIMEOUT",
            Self::SyntaxError => "SYNTAX_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Invalid => "INVALID",
            Self::ConfigError => "CONFIG_ERROR",
            Self::AlreadyExists => "ALREADY_EXISTS",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
