// Validation model: mismatch entries and the report they accumulate into
//
// A validation run never fails a program; every finding is a MismatchEntry
// appended to a ValidationReport, and the report's emptiness is the only
// pass/fail signal.

mod comparator;
mod reference_file;
mod report;

pub use comparator::{
    compare_datasets, compare_reference_records, Comparator, FullComparator, ScalarComparator,
    Tolerances,
};
pub use reference_file::{load_reference_file, parse_reference_lines, ReferenceRecord};
pub use report::ReportSink;

use crate::topology::WireAddress;

/// Kind of discrepancy found by a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    /// Means differ by more than the mean tolerance
    MeanMismatch,
    /// Spreads differ by more than the spread tolerance
    SpreadMismatch,
    /// The reference has a record the actual dataset lacks
    MissingChannel,
    /// A reference or actual record could not be retrieved or parsed
    ReadError,
}

/// One discrepancy between reference and actual
///
/// Carries enough detail to reproduce the finding from the report alone.
/// `address` is absent only for reference lines that did not parse; actual
/// values are absent for missing channels and read failures.
#[derive(Debug, Clone, PartialEq)]
pub struct MismatchEntry {
    pub address: Option<WireAddress>,
    pub expected_mean: Option<f64>,
    pub expected_spread: Option<f64>,
    pub actual_mean: Option<f64>,
    pub actual_spread: Option<f64>,
    pub kind: MismatchKind,
    /// Failure description for read errors
    pub detail: Option<String>,
}

impl MismatchEntry {
    pub fn mean_mismatch(
        address: WireAddress,
        expected_mean: f64,
        expected_spread: f64,
        actual_mean: f64,
        actual_spread: f64,
    ) -> Self {
        Self {
            address: Some(address),
            expected_mean: Some(expected_mean),
            expected_spread: Some(expected_spread),
            actual_mean: Some(actual_mean),
            actual_spread: Some(actual_spread),
            kind: MismatchKind::MeanMismatch,
            detail: None,
        }
    }

    pub fn spread_mismatch(
        address: WireAddress,
        expected_mean: f64,
        expected_spread: f64,
        actual_mean: f64,
        actual_spread: f64,
    ) -> Self {
        Self {
            address: Some(address),
            expected_mean: Some(expected_mean),
            expected_spread: Some(expected_spread),
            actual_mean: Some(actual_mean),
            actual_spread: Some(actual_spread),
            kind: MismatchKind::SpreadMismatch,
            detail: None,
        }
    }

    pub fn missing_channel(address: WireAddress, expected_mean: f64, expected_spread: f64) -> Self {
        Self {
            address: Some(address),
            expected_mean: Some(expected_mean),
            expected_spread: Some(expected_spread),
            actual_mean: None,
            actual_spread: None,
            kind: MismatchKind::MissingChannel,
            detail: None,
        }
    }

    pub fn read_error(address: Option<WireAddress>, detail: String) -> Self {
        Self {
            address,
            expected_mean: None,
            expected_spread: None,
            actual_mean: None,
            actual_spread: None,
            kind: MismatchKind::ReadError,
            detail: Some(detail),
        }
    }
}

/// Ordered accumulation of mismatch entries from one validation run
#[derive(Debug, Default)]
pub struct ValidationReport {
    entries: Vec<MismatchEntry>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: MismatchEntry) {
        self.entries.push(entry);
    }

    /// True iff no mismatch was recorded
    pub fn passed(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[MismatchEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_passes() {
        let report = ValidationReport::new();
        assert!(report.passed());
        assert_eq!(report.len(), 0);
    }

    #[test]
    fn test_any_entry_fails_report() {
        let mut report = ValidationReport::new();
        report.push(MismatchEntry::missing_channel(
            WireAddress::new(0, 1, 3, 2, 1, 0),
            850.0,
            12.3,
        ));
        assert!(!report.passed());
        assert_eq!(report.entries()[0].kind, MismatchKind::MissingChannel);
    }

    #[test]
    fn test_entries_preserve_insertion_order() {
        let addr = WireAddress::new(0, 1, 3, 2, 1, 0);
        let mut report = ValidationReport::new();
        report.push(MismatchEntry::mean_mismatch(addr, 850.0, 12.3, 850.02, 12.31));
        report.push(MismatchEntry::spread_mismatch(addr, 850.0, 12.3, 850.02, 12.31));
        let kinds: Vec<MismatchKind> = report.entries().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![MismatchKind::MeanMismatch, MismatchKind::SpreadMismatch]);
    }
}
