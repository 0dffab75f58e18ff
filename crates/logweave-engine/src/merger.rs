//! Chronological k-way merge of log sources.
//!
//! Each admitted source contributes exactly one lookahead record. Every
//! iteration writes the earliest of those records and advances its source,
//! so memory use is bounded by the records in flight, not the input sizes.
//!
//! # Admission
//!
//! The first source whose format is recognised fixes the run's common
//! format. Later sources in another format are dropped, as are sources that
//! cannot be opened, carry no timestamp on their first line, or are the
//! destination file itself. Dropped sources fail the run but never stop it.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use logweave_types::{FormatCatalog, Record, TimestampFormat};
use tracing::{debug, info, warn};

use crate::config::{MergeConfig, RecordFraming};
use crate::cursor::SourceCursor;
use crate::error::{MergeError, MergeResult};
use crate::input::{same_location, LogInput};
use crate::progress::{ProgressScale, ProgressSink};
use crate::report::{MergeReport, SourceReport, SourceStatus};

/// An admitted source and the index of its entry in the report.
struct Slot<'c> {
    cursor: SourceCursor<'c>,
    report: usize,
    written: u64,
}

/// Merges timestamped log sources into one chronologically ordered stream.
#[derive(Clone, Debug)]
pub struct LogMerger<'c> {
    catalog: &'c FormatCatalog,
    config: MergeConfig,
}

impl<'c> LogMerger<'c> {
    pub fn new(catalog: &'c FormatCatalog, config: MergeConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Merge `inputs` into `sink`.
    ///
    /// Per-source problems are recorded in the returned report; only a
    /// failing sink aborts the run.
    pub fn merge<I, W, P>(
        &self,
        inputs: &[I],
        sink: &mut W,
        progress: &mut P,
    ) -> MergeResult<MergeReport>
    where
        I: LogInput,
        W: Write + ?Sized,
        P: ProgressSink + ?Sized,
    {
        self.run(inputs, sink, None, progress)
    }

    /// Merge `inputs` into a freshly created or truncated file.
    ///
    /// Inputs that resolve to `destination` are skipped. A failed run
    /// leaves the partial output in place.
    pub fn merge_to_file<I, P>(
        &self,
        inputs: &[I],
        destination: &Path,
        progress: &mut P,
    ) -> MergeResult<MergeReport>
    where
        I: LogInput,
        P: ProgressSink + ?Sized,
    {
        let file = File::create(destination).map_err(|source| MergeError::Destination {
            path: destination.to_path_buf(),
            source,
        })?;
        let mut sink = BufWriter::new(file);
        let report = self.run(inputs, &mut sink, Some(destination), progress)?;
        sink.flush().map_err(MergeError::Sink)?;
        Ok(report)
    }

    fn run<I, W, P>(
        &self,
        inputs: &[I],
        sink: &mut W,
        destination: Option<&Path>,
        progress: &mut P,
    ) -> MergeResult<MergeReport>
    where
        I: LogInput,
        W: Write + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let mut report = MergeReport::default();
        let (mut slots, total_bytes) = self.admit(inputs, destination, &mut report);

        let scale = ProgressScale::new(total_bytes, self.config.progress_units);
        let mut consumed: u64 = slots.iter().map(|s| s.cursor.bytes_read()).sum();
        let mut reported = 0;

        debug!(
            admitted = slots.len(),
            total_bytes,
            format = ?report.common_format,
            "starting merge"
        );

        loop {
            if progress.is_cancelled() {
                info!(records = report.records_written, "merge cancelled");
                report.cancelled = true;
                break;
            }

            let Some(index) = earliest(&slots) else {
                break;
            };

            let slot = &mut slots[index];
            if let Some(record) = slot.cursor.current_record() {
                write_record(sink, record, slot.cursor.component_id(), self.config.framing)
                    .map_err(MergeError::Sink)?;
            }
            slot.written += 1;
            report.records_written += 1;

            let before = slot.cursor.bytes_read();
            slot.cursor.advance();
            consumed += slot.cursor.bytes_read() - before;

            let units = scale.units_for(consumed);
            if units > reported {
                progress.advance(units - reported);
                reported = units;
            }
        }

        for slot in slots {
            let entry = &mut report.sources[slot.report];
            entry.records = slot.written;
            entry.bytes = slot.cursor.bytes_read();
            if let Some(failure) = slot.cursor.failure() {
                entry.status = SourceStatus::from(failure);
            }
            slot.cursor.close();
        }

        if report.is_success() {
            debug!(records = report.records_written, "merge complete");
        } else {
            warn!(
                records = report.records_written,
                failed = report.failures().count(),
                cancelled = report.cancelled,
                "merge finished with problems"
            );
        }
        Ok(report)
    }

    /// Open every input and keep those sharing the first detected format.
    fn admit<I: LogInput>(
        &self,
        inputs: &[I],
        destination: Option<&Path>,
        report: &mut MergeReport,
    ) -> (Vec<Slot<'c>>, u64) {
        let mut slots = Vec::new();
        let mut total_bytes = 0u64;

        for input in inputs {
            let name = input.display_name();

            if let (Some(dest), Some(location)) = (destination, input.location()) {
                if same_location(dest, location) {
                    warn!(source = %name, "source is the merge destination; skipping");
                    report
                        .sources
                        .push(SourceReport::new(name, SourceStatus::SameAsDestination));
                    continue;
                }
            }

            let cursor = match SourceCursor::from_input(input, self.catalog, self.config.scan_mode) {
                Ok(cursor) => cursor,
                Err(err) => {
                    warn!(source = %name, error = %err, "dropping log source");
                    report
                        .sources
                        .push(SourceReport::new(name, SourceStatus::from(&err)));
                    continue;
                }
            };

            let format = cursor.format();
            if let Some(expected) = report.common_format {
                if expected != format {
                    warn!(
                        source = %name,
                        expected = %expected,
                        found = %format,
                        "timestamp format mismatch; dropping log source"
                    );
                    report.sources.push(mismatch(name, expected, format));
                    cursor.close();
                    continue;
                }
            } else {
                report.common_format = Some(format);
            }

            debug!(source = %name, component = cursor.component_id(), "admitted log source");
            total_bytes += input.size_hint();
            slots.push(Slot {
                cursor,
                report: report.sources.len(),
                written: 0,
            });
            report
                .sources
                .push(SourceReport::new(name, SourceStatus::Merged));
        }

        (slots, total_bytes)
    }
}

fn mismatch(name: &str, expected: TimestampFormat, found: TimestampFormat) -> SourceReport {
    SourceReport::new(name, SourceStatus::FormatMismatch { expected, found })
}

/// Index of the slot holding the earliest pending record. Ties go to the
/// slot admitted first.
fn earliest(slots: &[Slot<'_>]) -> Option<usize> {
    let mut best: Option<(usize, &str)> = None;
    for (index, slot) in slots.iter().enumerate() {
        let Some(record) = slot.cursor.current_record() else {
            continue;
        };
        let timestamp = record.timestamp();
        match best {
            Some((_, smallest)) if timestamp >= smallest => {}
            _ => best = Some((index, timestamp)),
        }
    }
    best.map(|(index, _)| index)
}

/// Write one record using the configured framing, terminating it with a
/// newline if its text does not already end with one.
pub fn write_record<W: Write + ?Sized>(
    sink: &mut W,
    record: &Record,
    component: &str,
    framing: RecordFraming,
) -> io::Result<()> {
    match framing {
        RecordFraming::Echoed => {
            sink.write_all(record.timestamp().as_bytes())?;
            if !component.is_empty() {
                sink.write_all(b" ")?;
                sink.write_all(component.as_bytes())?;
            }
        }
        RecordFraming::Labelled => {
            if !component.is_empty() {
                sink.write_all(component.as_bytes())?;
                sink.write_all(b" ")?;
            }
        }
    }
    sink.write_all(record.text())?;
    if !record.ends_with_newline() {
        sink.write_all(b"\n")?;
    }
    Ok(())
}


#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::*;
    use crate::input::MemoryInput;
    use crate::progress::NullProgress;

    /// Sorted Second-format timestamps for one source, each tagged with the
    /// source and its position so the output can be traced back.
    fn source_lines() -> impl Strategy<Value = Vec<u32>> {
        prop::collection::vec(0u32..40, 0..12).prop_map(|mut v| {
            v.sort_unstable();
            v
        })
    }

    fn render(source: usize, stamps: &[u32]) -> String {
        stamps
            .iter()
            .enumerate()
            .map(|(pos, ts)| format!("1.{ts:06} s{source} p{pos}\n"))
            .collect()
    }

    fn run(sources: &[Vec<u32>]) -> Vec<String> {
        let inputs: Vec<MemoryInput> = sources
            .iter()
            .enumerate()
            .filter(|(_, stamps)| !stamps.is_empty())
            .map(|(i, stamps)| MemoryInput::new(format!("x-s{i}.log"), render(i, stamps)))
            .collect();
        let catalog = FormatCatalog::new();
        let merger = LogMerger::new(
            &catalog,
            MergeConfig {
                framing: RecordFraming::Labelled,
                ..Default::default()
            },
        );
        let mut out: Vec<u8> = Vec::new();
        let report = merger.merge(&inputs, &mut out, &mut NullProgress).unwrap();
        assert!(report.is_success());
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Parse `s<i> 1.<ts> s<i> p<pos>` back into (ts, source, pos).
    fn parse(line: &str) -> (String, usize, usize) {
        let fields: Vec<&str> = line.split(' ').collect();
        let source = fields[2][1..].parse().unwrap();
        let pos = fields[3][1..].parse().unwrap();
        (fields[1].to_string(), source, pos)
    }

    proptest! {
        #[test]
        fn output_is_ordered_complete_and_stable(
            sources in prop::collection::vec(source_lines(), 1..5)
        ) {
            let lines = run(&sources);
            let parsed: Vec<_> = lines.iter().map(|l| parse(l)).collect();

            let expected: usize = sources.iter().map(Vec::len).sum();
            prop_assert_eq!(parsed.len(), expected);

            for pair in parsed.windows(2) {
                let (ts_a, src_a, pos_a) = &pair[0];
                let (ts_b, src_b, pos_b) = &pair[1];
                prop_assert!(ts_a <= ts_b);
                if ts_a == ts_b && src_a != src_b {
                    prop_assert!(src_a < src_b);
                }
                if src_a == src_b {
                    prop_assert!(pos_a < pos_b);
                }
            }
        }
    }
}
