use crate::query::Operator;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A single corpus record could not be turned into a document.
///
/// These are local to the record: the build logs them and carries on.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed record at {location}: {source}")]
    Malformed {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("record {url:?} does not contain decodable text")]
    Undecodable { url: String },

    #[error("document id space exhausted after {0} documents")]
    IdSpaceExhausted(usize),
}

/// The persisted index could not be opened. Fatal for a retrieval session.
#[derive(Debug, Error)]
pub enum IndexLoadError {
    #[error("no index found at {0}")]
    Missing(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("index file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("index at {path} does not match the expected schema: {reason}")]
    SchemaMismatch { path: PathBuf, reason: String },
}

/// A query that cannot be parsed or evaluated. Reported per query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedQuery {
    #[error("unmatched '(' in query")]
    UnmatchedOpenParen,

    #[error("unmatched ')' in query")]
    UnmatchedCloseParen,

    #[error("parenthesis left in postfix expression")]
    UnexpectedParen,

    #[error("operator {operator} is missing an operand")]
    MissingOperand { operator: Operator },

    #[error("query is empty")]
    EmptyQuery,

    #[error("query leaves {count} operands without an operator joining them")]
    DanglingOperands { count: usize },
}
