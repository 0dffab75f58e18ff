//! Per-source record scanner.
//!
//! A [`SourceCursor`] turns one forward-only byte stream into a sequence of
//! [`Record`]s. It keeps exactly one record of lookahead ([`current_record`])
//! and a tail buffer holding the text of the record being accumulated,
//! starting at its timestamp. Each [`advance`] searches the tail for the
//! next timestamp, pulling one more line from the source whenever the search
//! comes up empty.
//!
//! [`current_record`]: SourceCursor::current_record
//! [`advance`]: SourceCursor::advance

use std::fmt;

use logweave_types::{component_id, FormatCatalog, Record, TimestampFormat};
use tracing::{debug, warn};

use crate::config::ScanMode;
use crate::error::{CursorError, CursorResult};
use crate::input::{LineSource, LogInput};

/// Stateful reader producing timestamp-delimited records from one source.
pub struct SourceCursor<'c> {
    name: String,
    component_id: String,
    catalog: &'c FormatCatalog,
    format: TimestampFormat,
    scan_mode: ScanMode,
    /// Dropped as soon as the stream ends or fails.
    reader: Option<Box<dyn LineSource>>,
    /// Text of the record being accumulated.
    buffer: Vec<u8>,
    /// Timestamp opening `buffer`; `None` once the final record was emitted.
    pending: Option<String>,
    /// Offset in `buffer` where the next timestamp search starts.
    scan_from: usize,
    current: Option<Record>,
    exhausted: bool,
    failure: Option<CursorError>,
    bytes_read: u64,
    records: u64,
}

impl<'c> SourceCursor<'c> {
    /// Open a cursor over `input` and position it on its first record.
    pub fn from_input(
        input: &dyn LogInput,
        catalog: &'c FormatCatalog,
        scan_mode: ScanMode,
    ) -> CursorResult<Self> {
        let name = input.display_name();
        let reader = input.open().map_err(|source| CursorError::Open {
            name: name.to_string(),
            source,
        })?;
        Self::open(reader, name, catalog, scan_mode)
    }

    /// Detect the timestamp format from the first line of `reader` and
    /// position the cursor on its first record.
    ///
    /// Any text preceding the first timestamp on that line is kept as the
    /// head of the first record.
    pub fn open(
        mut reader: Box<dyn LineSource>,
        name: &str,
        catalog: &'c FormatCatalog,
        scan_mode: ScanMode,
    ) -> CursorResult<Self> {
        let mut buffer = Vec::new();
        let read = reader
            .next_line(&mut buffer)
            .map_err(|source| CursorError::Open {
                name: name.to_string(),
                source,
            })?;

        let no_timestamp = || CursorError::NoTimestampFound {
            name: name.to_string(),
        };
        let candidate = catalog.find_candidate(&buffer).ok_or_else(no_timestamp)?;
        let candidate = std::str::from_utf8(&buffer[candidate]).map_err(|_| no_timestamp())?;
        let format = catalog.classify(candidate).ok_or_else(no_timestamp)?;
        let first = catalog.find_at(format, &buffer, 0).ok_or_else(no_timestamp)?;
        let timestamp = String::from_utf8_lossy(&buffer[first.clone()]).into_owned();

        debug!(source = %name, format = %format, ?scan_mode, "opened log source");

        let mut cursor = Self {
            name: name.to_string(),
            component_id: component_id(name).to_string(),
            catalog,
            format,
            scan_mode,
            reader: Some(reader),
            buffer,
            pending: Some(timestamp),
            scan_from: first.end,
            current: None,
            exhausted: false,
            failure: None,
            bytes_read: read as u64,
            records: 0,
        };
        cursor.advance();
        Ok(cursor)
    }

    /// The record ready for consumption, `None` once exhausted.
    pub fn current_record(&self) -> Option<&Record> {
        self.current.as_ref()
    }

    /// Replace the current record with the next one from the source.
    ///
    /// A no-op once the cursor is exhausted. After the last record has been
    /// handed out, one more call marks the cursor exhausted.
    pub fn advance(&mut self) {
        self.current = None;
        if self.exhausted {
            return;
        }
        let Some(timestamp) = self.pending.take() else {
            self.exhausted = true;
            debug!(source = %self.name, records = self.records, "log source exhausted");
            return;
        };

        loop {
            if let Some(found) = self.catalog.find_at(self.format, &self.buffer, self.scan_from) {
                let next = String::from_utf8_lossy(&self.buffer[found.clone()]).into_owned();
                let tail = self.buffer.split_off(found.start);
                let text = std::mem::replace(&mut self.buffer, tail);
                self.scan_from = found.len();
                self.pending = Some(next);
                self.emit(Record::new(timestamp, text));
                return;
            }

            self.scan_from = match self.scan_mode {
                ScanMode::Fast => self.buffer.len(),
                ScanMode::Precise => self
                    .buffer
                    .len()
                    .saturating_sub(self.format.width())
                    .max(self.scan_from),
            };

            match self.read_line() {
                Ok(0) => {
                    let text = std::mem::take(&mut self.buffer);
                    self.reader = None;
                    self.emit(Record::new(timestamp, text));
                    return;
                }
                Ok(_) => {}
                Err(source) => {
                    warn!(
                        source = %self.name,
                        error = %source,
                        dropped_bytes = self.buffer.len(),
                        "read failure; source stops yielding records"
                    );
                    self.buffer.clear();
                    self.reader = None;
                    self.exhausted = true;
                    self.failure = Some(CursorError::Read {
                        name: self.name.clone(),
                        source,
                    });
                    return;
                }
            }
        }
    }

    fn read_line(&mut self) -> std::io::Result<usize> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(0);
        };
        let read = reader.next_line(&mut self.buffer)?;
        self.bytes_read += read as u64;
        Ok(read)
    }

    fn emit(&mut self, record: Record) {
        self.records += 1;
        self.current = Some(record);
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Returns `true` if the source failed mid-stream.
    pub fn is_erroneous(&self) -> bool {
        self.failure.is_some()
    }

    /// The mid-stream failure, if any.
    pub fn failure(&self) -> Option<&CursorError> {
        self.failure.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    pub fn format(&self) -> TimestampFormat {
        self.format
    }

    pub fn scan_mode(&self) -> ScanMode {
        self.scan_mode
    }

    /// Bytes pulled from the underlying source so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Records produced so far, including the current one.
    pub fn records_produced(&self) -> u64 {
        self.records
    }

    /// Release the underlying reader.
    pub fn close(self) {
        debug!(
            source = %self.name,
            records = self.records,
            bytes = self.bytes_read,
            "closed log source"
        );
    }
}

impl fmt::Debug for SourceCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceCursor")
            .field("name", &self.name)
            .field("component_id", &self.component_id)
            .field("format", &self.format)
            .field("scan_mode", &self.scan_mode)
            .field("buffered", &self.buffer.len())
            .field("current", &self.current)
            .field("exhausted", &self.exhausted)
            .field("erroneous", &self.is_erroneous())
            .finish()
    }
}
