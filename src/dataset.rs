// Calibration dataset containers
//
// This module holds the per-wire calibration records: the (mean, spread)
// constant of each wire, tagged with the unit the whole dataset is expressed
// in and a format version. A dataset is immutable once published; correction
// runs accumulate into a DatasetBuilder and convert it to a dataset at the
// end, so partially built state is never observable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ValidationError;
use crate::topology::WireAddress;

/// Unit a dataset's constants are expressed in
///
/// Readers must request the unit that was stored; there is no implicit
/// conversion between raw TDC counts and nanoseconds here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    Counts,
    Nanoseconds,
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeUnit::Counts => write!(f, "Counts"),
            TimeUnit::Nanoseconds => write!(f, "Nanoseconds"),
        }
    }
}

/// Calibration constant of one wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    pub mean: f64,
    /// Uncertainty of the mean; never negative
    pub spread: f64,
}

impl CalibrationRecord {
    pub fn new(mean: f64, spread: f64) -> Self {
        debug_assert!(spread >= 0.0, "record spread must be non-negative");
        Self { mean, spread }
    }

    /// Check the record invariants: finite mean, finite non-negative spread
    ///
    /// Every path into a dataset goes through this check, so a published or
    /// loaded dataset never holds a record that violates them.
    fn check(&self, address: &WireAddress) -> Result<(), ValidationError> {
        if !self.mean.is_finite() || !self.spread.is_finite() || self.spread < 0.0 {
            return Err(ValidationError::InvalidRecord {
                context: address.to_string(),
                mean: self.mean,
                spread: self.spread,
            });
        }
        Ok(())
    }
}

/// Immutable, versioned mapping from wire address to calibration record
///
/// All records in one dataset share the same unit. BTreeMap storage keeps
/// iteration in address order, which keeps diagnostics deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DatasetRepr", into = "DatasetRepr")]
pub struct CalibrationDataset {
    version: u32,
    unit: TimeUnit,
    records: BTreeMap<WireAddress, CalibrationRecord>,
}

/// Serialized form of a dataset
///
/// JSON object keys must be strings, so the wire map is stored as an entry
/// list and rebuilt on load.
#[derive(Serialize, Deserialize)]
struct DatasetRepr {
    version: u32,
    unit: TimeUnit,
    records: Vec<(WireAddress, CalibrationRecord)>,
}

impl TryFrom<DatasetRepr> for CalibrationDataset {
    type Error = ValidationError;

    /// Rebuild the wire map, rejecting records that violate the dataset
    /// invariants; a hand-edited or corrupted file must not load
    fn try_from(repr: DatasetRepr) -> Result<Self, ValidationError> {
        let mut records = BTreeMap::new();
        for (address, record) in repr.records {
            record.check(&address)?;
            records.insert(address, record);
        }
        Ok(Self {
            version: repr.version,
            unit: repr.unit,
            records,
        })
    }
}

impl From<CalibrationDataset> for DatasetRepr {
    fn from(ds: CalibrationDataset) -> Self {
        Self {
            version: ds.version,
            unit: ds.unit,
            records: ds.records.into_iter().collect(),
        }
    }
}

impl CalibrationDataset {
    /// Dataset format version tag
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Unit every record in this dataset is expressed in
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Look up the record for a wire
    ///
    /// # Returns
    /// * `Ok(Some(record))` - Record stored for this address
    /// * `Ok(None)` - No record for this address (not an error)
    /// * `Err(ValidationError::UnitMismatch)` - Requested unit differs from
    ///   the stored one; no conversion is performed
    pub fn get(
        &self,
        address: &WireAddress,
        unit: TimeUnit,
    ) -> Result<Option<&CalibrationRecord>, ValidationError> {
        if unit != self.unit {
            return Err(ValidationError::UnitMismatch {
                requested: unit.to_string(),
                stored: self.unit.to_string(),
            });
        }
        Ok(self.records.get(address))
    }

    /// Number of wires with a stored record
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in address order
    pub fn iter(&self) -> impl Iterator<Item = (&WireAddress, &CalibrationRecord)> {
        self.records.iter()
    }
}

/// Accumulator for a dataset under construction
///
/// Correction runs write here wire by wire; `build` converts the accumulated
/// state into an immutable dataset in one step, which is the single
/// publication point of a run.
#[derive(Debug)]
pub struct DatasetBuilder {
    version: u32,
    unit: TimeUnit,
    records: BTreeMap<WireAddress, CalibrationRecord>,
}

impl DatasetBuilder {
    pub fn new(version: u32, unit: TimeUnit) -> Self {
        Self {
            version,
            unit,
            records: BTreeMap::new(),
        }
    }

    /// Insert or overwrite the record for a wire
    ///
    /// Only affects the dataset being built, never a published one. Writing
    /// the same address twice keeps the last value.
    ///
    /// # Returns
    /// * `Ok(())` - Record stored
    /// * `Err(ValidationError::InvalidRecord)` - Non-finite mean or spread,
    ///   or negative spread; nothing is stored
    pub fn set(
        &mut self,
        address: WireAddress,
        record: CalibrationRecord,
    ) -> Result<(), ValidationError> {
        record.check(&address)?;
        self.records.insert(address, record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Publish the accumulated records as an immutable dataset
    pub fn build(self) -> CalibrationDataset {
        CalibrationDataset {
            version: self.version,
            unit: self.unit,
            records: self.records,
        }
    }
}
