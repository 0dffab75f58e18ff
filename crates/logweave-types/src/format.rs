use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use regex::bytes::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{FormatError, FormatResult};

const DATE_TIME_PATTERN: &str = r"[0-9]{4}/[A-Za-z]{3}/[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{6}";
const TIME_PATTERN: &str = r"[0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{6}";
const SECOND_PATTERN: &str = r"[0-9]\.[0-9]{6}";

/// Matches the timestamp-like shape shared by every format, with the date
/// and time-of-day prefixes optional. Only used to locate a candidate on the
/// first line of a source; [`FormatCatalog::classify`] decides the format.
const LOOSE_PATTERN: &str =
    r"(?:[0-9]{4}/[A-Za-z]{3}/[0-9]{2} )?(?:[0-9]{2}:[0-9]{2}:)?[0-9]+\.[0-9]{6}";

/// A fixed-width timestamp encoding recognised at the start of log records.
///
/// All formats are zero-padded and fixed-width, so byte-wise comparison of
/// two timestamps of the same format is chronological comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimestampFormat {
    /// `YYYY/Mon/DD HH:MM:SS.ssssss`
    DateTime,
    /// `HH:MM:SS.ssssss`
    Time,
    /// `S.ssssss`
    Second,
}

impl TimestampFormat {
    /// Every format, most specific first. Detection must try them in this
    /// order because a `Second` match is a suffix of the other two shapes.
    pub const ALL: [TimestampFormat; 3] = [Self::DateTime, Self::Time, Self::Second];

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DateTime => "date-time",
            Self::Time => "time",
            Self::Second => "second",
        }
    }

    /// Exact character width of a timestamp in this format.
    pub fn width(&self) -> usize {
        match self {
            Self::DateTime => 27,
            Self::Time => 15,
            Self::Second => 8,
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            Self::DateTime => DATE_TIME_PATTERN,
            Self::Time => TIME_PATTERN,
            Self::Second => SECOND_PATTERN,
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::DateTime => 0,
            Self::Time => 1,
            Self::Second => 2,
        }
    }
}

impl fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimestampFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> FormatResult<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| FormatError::UnknownName(s.to_string()))
    }
}

/// Compiled patterns for every [`TimestampFormat`].
///
/// Built once by the caller and shared by reference with every cursor of a
/// merge run. Holds no mutable state.
#[derive(Clone, Debug)]
pub struct FormatCatalog {
    loose: Regex,
    exact: [Regex; 3],
    scan: [Regex; 3],
}

impl FormatCatalog {
    /// Compile the built-in catalog.
    pub fn new() -> Self {
        let compile = |src: &str| Regex::new(src).expect("built-in timestamp pattern is valid");
        let exact = TimestampFormat::ALL.map(|f| compile(&format!("^(?:{})$", f.pattern())));
        let scan = TimestampFormat::ALL.map(|f| compile(f.pattern()));
        Self {
            loose: compile(LOOSE_PATTERN),
            exact,
            scan,
        }
    }

    /// Return the format whose pattern matches the whole of `candidate`,
    /// testing the most specific format first.
    pub fn classify(&self, candidate: &str) -> Option<TimestampFormat> {
        TimestampFormat::ALL
            .into_iter()
            .find(|f| self.exact[f.index()].is_match(candidate.as_bytes()))
    }

    /// Like [`classify`](Self::classify), but reports the rejected candidate.
    pub fn try_classify(&self, candidate: &str) -> FormatResult<TimestampFormat> {
        self.classify(candidate)
            .ok_or_else(|| FormatError::Unclassified(candidate.to_string()))
    }

    /// Locate the first timestamp-like substring in `haystack`, whatever its
    /// format. The result still has to go through [`classify`](Self::classify).
    pub fn find_candidate(&self, haystack: &[u8]) -> Option<Range<usize>> {
        self.loose.find(haystack).map(|m| m.range())
    }

    /// Find the first timestamp of `format` starting at or after `start`.
    pub fn find_at(
        &self,
        format: TimestampFormat,
        haystack: &[u8],
        start: usize,
    ) -> Option<Range<usize>> {
        if start > haystack.len() {
            return None;
        }
        self.scan[format.index()]
            .find_at(haystack, start)
            .map(|m| m.range())
    }
}

impl Default for FormatCatalog {
    fn default() -> Self {
        Self::new()
    }
}
