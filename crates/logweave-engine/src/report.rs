use std::fmt;

use logweave_types::TimestampFormat;
use serde::Serialize;

use crate::error::CursorError;

/// Outcome of a merge run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Format shared by every admitted source.
    pub common_format: Option<TimestampFormat>,
    /// One entry per input, in input order.
    pub sources: Vec<SourceReport>,
    /// Records written to the sink.
    pub records_written: u64,
    /// The run stopped early on a cancellation request.
    pub cancelled: bool,
}

impl MergeReport {
    /// `true` if every source merged cleanly and the run was not cancelled.
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.sources.iter().all(|s| s.status.is_ok())
    }

    /// Sources that were dropped or failed mid-stream.
    pub fn failures(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|s| !s.status.is_ok())
    }
}

/// Per-source outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub name: String,
    pub component_id: String,
    pub status: SourceStatus,
    /// Records this source contributed to the output.
    pub records: u64,
    /// Bytes read from this source.
    pub bytes: u64,
}

impl SourceReport {
    pub(crate) fn new(name: &str, status: SourceStatus) -> Self {
        Self {
            name: name.to_string(),
            component_id: logweave_types::component_id(name).to_string(),
            status,
            records: 0,
            bytes: 0,
        }
    }
}

/// What happened to one source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SourceStatus {
    /// Every record was merged.
    Merged,
    /// The source is the merge destination itself.
    SameAsDestination,
    /// The source could not be opened.
    OpenFailed { reason: String },
    /// The first line carries no recognisable timestamp.
    NoTimestampFound,
    /// The detected format differs from the run's common format.
    FormatMismatch {
        expected: TimestampFormat,
        found: TimestampFormat,
    },
    /// The source failed mid-stream; records read before the failure were merged.
    ReadFailed { reason: String },
}

impl SourceStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Merged)
    }
}

impl From<&CursorError> for SourceStatus {
    fn from(err: &CursorError) -> Self {
        match err {
            CursorError::Open { source, .. } => Self::OpenFailed {
                reason: source.to_string(),
            },
            CursorError::NoTimestampFound { .. } => Self::NoTimestampFound,
            CursorError::Read { source, .. } => Self::ReadFailed {
                reason: source.to_string(),
            },
        }
    }
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merged => write!(f, "merged"),
            Self::SameAsDestination => write!(f, "skipped: same file as destination"),
            Self::OpenFailed { reason } => write!(f, "open failed: {reason}"),
            Self::NoTimestampFound => write!(f, "no timestamp in first line"),
            Self::FormatMismatch { expected, found } => {
                write!(f, "format mismatch: expected {expected}, found {found}")
            }
            Self::ReadFailed { reason } => write!(f, "read failed: {reason}"),
        }
    }
}
