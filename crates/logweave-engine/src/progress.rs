use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Receives merge progress and signals cooperative cancellation.
///
/// The merge loop checks [`is_cancelled`](Self::is_cancelled) once per
/// record, so a cancellation request takes effect within one record.
pub trait ProgressSink {
    fn is_cancelled(&self) -> bool;
    fn advance(&mut self, units: u64);
}

impl<P: ProgressSink + ?Sized> ProgressSink for &mut P {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }

    fn advance(&mut self, units: u64) {
        (**self).advance(units)
    }
}

/// Discards progress and is never cancelled.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn is_cancelled(&self) -> bool {
        false
    }

    fn advance(&mut self, _units: u64) {}
}

/// Shared cancellation handle that also tallies progress units.
///
/// Clones share state, so one clone can be handed to the merge while
/// another cancels it from a different thread.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
    units: Arc<AtomicU64>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the merge stop before writing its next record.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Total units reported so far.
    pub fn units(&self) -> u64 {
        self.units.load(Ordering::SeqCst)
    }
}

impl ProgressSink for CancelFlag {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn advance(&mut self, units: u64) {
        self.units.fetch_add(units, Ordering::SeqCst);
    }
}

/// Maps bytes consumed onto progress units: one unit per byte when the
/// total fits in `max_units`, otherwise rescaled so the run reports
/// exactly `max_units` in total.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ProgressScale {
    total_bytes: u64,
    max_units: u64,
}

impl ProgressScale {
    pub(crate) fn new(total_bytes: u64, max_units: u64) -> Self {
        Self {
            total_bytes,
            max_units,
        }
    }

    /// Cumulative units for `consumed` bytes.
    pub(crate) fn units_for(&self, consumed: u64) -> u64 {
        let consumed = consumed.min(self.total_bytes);
        if self.total_bytes <= self.max_units {
            return consumed;
        }
        (consumed as u128 * self.max_units as u128 / self.total_bytes as u128) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_totals_are_one_to_one() {
        let scale = ProgressScale::new(600, 1000);
        assert_eq!(scale.units_for(0), 0);
        assert_eq!(scale.units_for(250), 250);
        assert_eq!(scale.units_for(600), 600);
        assert_eq!(scale.units_for(900), 600);
    }

    #[test]
    fn large_totals_are_rescaled() {
        let scale = ProgressScale::new(10_000, 1000);
        assert_eq!(scale.units_for(5), 0);
        assert_eq!(scale.units_for(5_000), 500);
        assert_eq!(scale.units_for(10_000), 1000);
        assert_eq!(scale.units_for(u64::MAX), 1000);
    }

    #[test]
    fn zero_total_reports_nothing() {
        let scale = ProgressScale::new(0, 1000);
        assert_eq!(scale.units_for(42), 0);
    }

    #[test]
    fn cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let mut handle = flag.clone();
        assert!(!handle.is_cancelled());

        handle.advance(3);
        handle.advance(4);
        assert_eq!(flag.units(), 7);

        flag.cancel();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn cancel_from_another_thread() {
        let flag = CancelFlag::new();
        let remote = flag.clone();
        std::thread::spawn(move || remote.cancel()).join().unwrap();
        assert!(flag.is_cancelled());
    }
}
