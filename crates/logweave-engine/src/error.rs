use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Per-source failures. These never abort a merge; the orchestrator drops
/// the offending source and records the failure in its report.
#[derive(Debug, Error)]
pub enum CursorError {
    /// The source could not be opened or its first line could not be read.
    #[error("failed to open {name}: {source}")]
    Open {
        name: String,
        #[source]
        source: io::Error,
    },

    /// The first line carries no recognisable timestamp.
    #[error("no timestamp found in first line of {name}")]
    NoTimestampFound { name: String },

    /// An already-admitted source failed mid-stream.
    #[error("read failure in {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
}

pub type CursorResult<T> = Result<T, CursorError>;

/// Errors that abort a merge run. Everything already written stays in the sink.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Writing to the output sink failed.
    #[error("failed to write merged output: {0}")]
    Sink(#[source] io::Error),

    /// The destination file could not be created or truncated.
    #[error("failed to prepare destination {path}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type MergeResult<T> = Result<T, MergeError>;
