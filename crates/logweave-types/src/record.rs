use std::borrow::Cow;

/// One timestamped unit of log text.
///
/// `text` is the verbatim content of the record: its own timestamp, the rest
/// of its line and any continuation lines, up to but excluding the next
/// record's timestamp. Records are immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    timestamp: String,
    text: Vec<u8>,
}

impl Record {
    pub fn new(timestamp: impl Into<String>, text: impl Into<Vec<u8>>) -> Self {
        Self {
            timestamp: timestamp.into(),
            text: text.into(),
        }
    }

    /// The timestamp that opens this record. Used as the merge sort key.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Raw record bytes.
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Record text decoded as UTF-8, replacing invalid sequences.
    pub fn text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }

    /// Returns `true` if the text already ends with a line terminator.
    pub fn ends_with_newline(&self) -> bool {
        self.text.last() == Some(&b'\n')
    }

    pub fn into_parts(self) -> (String, Vec<u8>) {
        (self.timestamp, self.text)
    }
}
