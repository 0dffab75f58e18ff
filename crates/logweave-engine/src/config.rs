use serde::{Deserialize, Serialize};

/// Where a cursor resumes its timestamp search after appending a line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Search only the freshly appended text. Misses a timestamp split
    /// across two reads; safe for line-buffered sources.
    Fast,
    /// Rewind the search by one timestamp width on every retry so a
    /// timestamp straddling two reads is still found.
    #[default]
    Precise,
}

/// How a merged record is written to the sink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFraming {
    /// `<timestamp>[' ' <component>]<text>`. The timestamp appears twice,
    /// once as a sortable leading column and once inside the text.
    #[default]
    Echoed,
    /// `[<component> ' ']<text>`.
    Labelled,
}

/// Configuration for a merge run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Boundary scanning policy used by every cursor.
    pub scan_mode: ScanMode,
    /// Output framing for each record.
    pub framing: RecordFraming,
    /// Total progress units reported when the admitted sources hold more
    /// bytes than this. Smaller inputs report one unit per byte.
    pub progress_units: u64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            scan_mode: ScanMode::default(),
            framing: RecordFraming::default(),
            progress_units: 1000,
        }
    }
}

impl MergeConfig {
    /// Fast scanning, everything else default.
    pub fn fast() -> Self {
        Self {
            scan_mode: ScanMode::Fast,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = MergeConfig::default();
        assert_eq!(c.scan_mode, ScanMode::Precise);
        assert_eq!(c.framing, RecordFraming::Echoed);
        assert_eq!(c.progress_units, 1000);
    }

    #[test]
    fn fast_preset() {
        let c = MergeConfig::fast();
        assert_eq!(c.scan_mode, ScanMode::Fast);
        assert_eq!(c.progress_units, 1000);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: MergeConfig = serde_json::from_str(r#"{"framing":"labelled"}"#).unwrap();
        assert_eq!(c.framing, RecordFraming::Labelled);
        assert_eq!(c.scan_mode, ScanMode::Precise);
    }
}
