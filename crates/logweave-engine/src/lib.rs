//! Chronological merge engine for logweave.
//!
//! Merges independently written, append-only log files into one stream
//! ordered by the timestamp that opens each record, reading every source
//! forward exactly once.
//!
//! # Key Types
//!
//! - [`SourceCursor`] -- per-source scanner yielding one record of lookahead
//! - [`LogMerger`] -- admits sources under a common format and runs the k-way merge
//! - [`LogInput`] / [`LineSource`] -- what the engine reads from
//! - [`ProgressSink`] -- progress reporting and cooperative cancellation
//! - [`MergeReport`] -- per-source outcome of a run

pub mod config;
pub mod cursor;
pub mod error;
pub mod input;
pub mod merger;
pub mod progress;
pub mod report;

#[cfg(test)]
mod testing;

pub use config::{MergeConfig, RecordFraming, ScanMode};
pub use cursor::SourceCursor;
pub use error::{CursorError, CursorResult, MergeError, MergeResult};
pub use input::{FileInput, LineReader, LineSource, LogInput, MemoryInput};
pub use merger::{write_record, LogMerger};
pub use progress::{CancelFlag, NullProgress, ProgressSink};
pub use report::{MergeReport, SourceReport, SourceStatus};
