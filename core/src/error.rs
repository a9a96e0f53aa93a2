//! Error types for log ingestion.
//!
//! Stream access problems, structural problems inside a text log, and XML
//! stream problems are kept apart so callers can tell "the file could not be
//! read" from "the file is not what we expected".

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while splitting a text log into blocks.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("could not read log stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("log ended in the middle of a block (line {line})")]
    UnexpectedEndOfStream { line: usize },

    #[error("line {line} is {length} characters long, the log stream looks corrupt")]
    LineTooLong { line: usize, length: usize },
}

/// Failures of a whole text-log parse.
///
/// Every variant carries the last turn that was successfully folded into the
/// session, so batch callers can tell the user roughly where it went wrong.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{source} (last parsed turn: {last_turn})")]
    Read {
        #[source]
        source: ReadError,
        last_turn: u32,
    },

    #[error("malformed log near turn {last_turn}: {message}")]
    Structure { last_turn: u32, message: String },
}

impl ParseError {
    pub fn last_turn(&self) -> u32 {
        match self {
            Self::Read { last_turn, .. } | Self::Structure { last_turn, .. } => *last_turn,
        }
    }
}

/// Failures of the XML session reader.
#[derive(Debug, Error)]
pub enum XmlReadError {
    /// The file could not be opened or read at all.
    #[error("could not open XML log: {0}")]
    Io(#[from] std::io::Error),

    /// The byte stream is not well-formed XML.
    #[error("malformed XML at byte {position}: {source}")]
    Xml {
        #[source]
        source: quick_xml::Error,
        position: u64,
    },

    #[error("XML log ended inside <{element}>")]
    Truncated { element: String },

    #[error("unsupported XML log version {0:?}")]
    UnsupportedVersion(String),

    #[error("element <{element}> has invalid content {value:?}")]
    Content { element: String, value: String },
}

/// Failure record collected by the batch driver, one per log file.
#[derive(Debug, Error)]
#[error("{} failed near turn {last_turn}: {cause}", path.display())]
pub struct LogLoadError {
    pub path: PathBuf,
    pub last_turn: u32,
    pub cause: String,
}
