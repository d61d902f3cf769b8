// Tolerance-based comparison of calibration datasets
//
// Two comparator variants sit behind the same trait: the full-record
// comparator checks mean and spread (legacy format), the scalar comparator
// checks mean only (current format, where the stored spread carries no
// meaning). Comparisons are strict: a difference exactly equal to the
// tolerance is not a mismatch.

use crate::dataset::CalibrationDataset;
use crate::error::{log_validation_error, ValidationError};
use crate::topology::WireAddress;

use super::reference_file::ReferenceRecord;
use super::{MismatchEntry, ValidationReport};

/// Absolute comparison tolerances, in the dataset's native unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub mean: f64,
    /// None disables the spread check even for the full comparator
    pub spread: Option<f64>,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            mean: 0.01,
            spread: Some(0.0001),
        }
    }
}

/// Element-wise comparison of one reference record against the actual dataset
///
/// Implementations append zero or more entries per record; the driver
/// functions below run them over a whole reference side.
pub trait Comparator {
    fn compare_entry(
        &self,
        address: WireAddress,
        expected_mean: f64,
        expected_spread: f64,
        actual: &CalibrationDataset,
        report: &mut ValidationReport,
    );
}

/// Full-record comparator: mean and spread against their tolerances
pub struct FullComparator {
    tolerances: Tolerances,
}

impl FullComparator {
    pub fn new(tolerances: Tolerances) -> Self {
        Self { tolerances }
    }
}

impl Comparator for FullComparator {
    fn compare_entry(
        &self,
        address: WireAddress,
        expected_mean: f64,
        expected_spread: f64,
        actual: &CalibrationDataset,
        report: &mut ValidationReport,
    ) {
        let record = match actual.get(&address, actual.unit()) {
            Ok(Some(record)) => record,
            Ok(None) => {
                report.push(MismatchEntry::missing_channel(
                    address,
                    expected_mean,
                    expected_spread,
                ));
                return;
            }
            Err(err) => {
                log_validation_error(&err, &address.to_string());
                report.push(MismatchEntry::read_error(Some(address), err.to_string()));
                return;
            }
        };

        if (record.mean - expected_mean).abs() > self.tolerances.mean {
            report.push(MismatchEntry::mean_mismatch(
                address,
                expected_mean,
                expected_spread,
                record.mean,
                record.spread,
            ));
        }
        if let Some(spread_tolerance) = self.tolerances.spread {
            if (record.spread - expected_spread).abs() > spread_tolerance {
                report.push(MismatchEntry::spread_mismatch(
                    address,
                    expected_mean,
                    expected_spread,
                    record.mean,
                    record.spread,
                ));
            }
        }
    }
}

/// Scalar comparator: mean only, spread parsed but ignored
pub struct ScalarComparator {
    mean_tolerance: f64,
}

impl ScalarComparator {
    pub fn new(mean_tolerance: f64) -> Self {
        Self { mean_tolerance }
    }
}

impl Comparator for ScalarComparator {
    fn compare_entry(
        &self,
        address: WireAddress,
        expected_mean: f64,
        expected_spread: f64,
        actual: &CalibrationDataset,
        report: &mut ValidationReport,
    ) {
        let record = match actual.get(&address, actual.unit()) {
            Ok(Some(record)) => record,
            Ok(None) => {
                report.push(MismatchEntry::missing_channel(
                    address,
                    expected_mean,
                    expected_spread,
                ));
                return;
            }
            Err(err) => {
                log_validation_error(&err, &address.to_string());
                report.push(MismatchEntry::read_error(Some(address), err.to_string()));
                return;
            }
        };

        if (record.mean - expected_mean).abs() > self.mean_tolerance {
            report.push(MismatchEntry::mean_mismatch(
                address,
                expected_mean,
                expected_spread,
                record.mean,
                record.spread,
            ));
        }
    }
}

/// Compare two datasets, treating `reference` as ground truth
///
/// A unit disagreement between the two sides makes every comparison
/// meaningless, so it is recorded as a single ReadError entry up front.
pub fn compare_datasets(
    comparator: &dyn Comparator,
    reference: &CalibrationDataset,
    actual: &CalibrationDataset,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    if reference.unit() != actual.unit() {
        let err = ValidationError::UnitMismatch {
            requested: reference.unit().to_string(),
            stored: actual.unit().to_string(),
        };
        report.push(MismatchEntry::read_error(None, err.to_string()));
        return report;
    }

    for (address, expected) in reference.iter() {
        comparator.compare_entry(*address, expected.mean, expected.spread, actual, &mut report);
    }
    report
}

/// Compare parsed reference-file records against the actual dataset
///
/// Unparseable lines arrive as `Err` records and become ReadError entries;
/// the remaining comparisons still run.
pub fn compare_reference_records(
    comparator: &dyn Comparator,
    records: &[Result<ReferenceRecord, ValidationError>],
    actual: &CalibrationDataset,
) -> ValidationReport {
    let mut report = ValidationReport::new();
    for record in records {
        match record {
            Ok(record) => comparator.compare_entry(
                record.address,
                record.mean,
                record.spread,
                actual,
                &mut report,
            ),
            Err(err) => report.push(MismatchEntry::read_error(None, err.to_string())),
        }
    }
    report
}
