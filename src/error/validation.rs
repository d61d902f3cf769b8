// Topology and validation error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Topology and validation error code constants
///
/// Error code ranges: 2001-2002 (topology), 2101-2104 (validation reads)
pub struct ValidationErrorCodes {}

impl ValidationErrorCodes {
    /// A wire range in the topology has first > last
    pub const INVALID_RANGE: i32 = 2001;

    /// The topology describes no chambers at all
    pub const EMPTY_TOPOLOGY: i32 = 2002;

    /// I/O failure while reading a reference or dataset file
    pub const IO: i32 = 2101;

    /// A reference file line did not parse
    pub const PARSE_LINE: i32 = 2102;

    /// A record was requested in a unit other than the stored one
    pub const UNIT_MISMATCH: i32 = 2103;

    /// A record carries a non-finite value or a negative spread
    pub const INVALID_RECORD: i32 = 2104;
}

/// Log a validation read error with structured context
pub fn log_validation_error(err: &ValidationError, context: &str) {
    error!(
        "Validation error in {}: code={}, component=Comparator, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Malformed channel hierarchy
///
/// Fatal to enumeration: a topology that cannot be walked deterministically
/// must never drive a correction run.
#[derive(Debug, Clone, PartialEq)]
pub enum TopologyError {
    /// A wire range with first > last
    InvalidRange {
        context: String,
        first: i32,
        last: i32,
    },

    /// No chambers described at all
    Empty,
}

impl ErrorCode for TopologyError {
    fn code(&self) -> i32 {
        match self {
            TopologyError::InvalidRange { .. } => ValidationErrorCodes::INVALID_RANGE,
            TopologyError::Empty => ValidationErrorCodes::EMPTY_TOPOLOGY,
        }
    }

    fn message(&self) -> String {
        match self {
            TopologyError::InvalidRange {
                context,
                first,
                last,
            } => {
                format!("Invalid wire range in {}: first {} > last {}", context, first, last)
            }
            TopologyError::Empty => "Topology describes no chambers".to_string(),
        }
    }
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TopologyError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for TopologyError {}

/// Read-side validation errors
///
/// Inside a comparison loop these are recorded as `ReadError` mismatch
/// entries and never abort the remaining comparisons.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// I/O failure while reading a reference or dataset file
    Io { path: String, reason: String },

    /// A reference file line did not parse
    ParseLine { line: usize, content: String },

    /// A record was requested in a unit other than the stored one
    UnitMismatch { requested: String, stored: String },

    /// A record carries a non-finite value or a negative spread
    InvalidRecord {
        context: String,
        mean: f64,
        spread: f64,
    },
}

impl ErrorCode for ValidationError {
    fn code(&self) -> i32 {
        match self {
            ValidationError::Io { .. } => ValidationErrorCodes::IO,
            ValidationError::ParseLine { .. } => ValidationErrorCodes::PARSE_LINE,
            ValidationError::UnitMismatch { .. } => ValidationErrorCodes::UNIT_MISMATCH,
            ValidationError::InvalidRecord { .. } => ValidationErrorCodes::INVALID_RECORD,
        }
    }

    fn message(&self) -> String {
        match self {
            ValidationError::Io { path, reason } => {
                format!("I/O error reading {}: {}", path, reason)
            }
            ValidationError::ParseLine { line, content } => {
                format!("Cannot parse reference line {}: '{}'", line, content)
            }
            ValidationError::UnitMismatch { requested, stored } => {
                format!("Unit mismatch: requested {}, stored {}", requested, stored)
            }
            ValidationError::InvalidRecord {
                context,
                mean,
                spread,
            } => {
                format!(
                    "Invalid record for {}: mean {}, spread {}",
                    context, mean, spread
                )
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ValidationError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_error_codes() {
        assert_eq!(
            TopologyError::InvalidRange {
                context: "wheel 0 station 1".to_string(),
                first: 5,
                last: 2
            }
            .code(),
            ValidationErrorCodes::INVALID_RANGE
        );
        assert_eq!(TopologyError::Empty.code(), ValidationErrorCodes::EMPTY_TOPOLOGY);
    }

    #[test]
    fn test_validation_error_codes() {
        assert_eq!(
            ValidationError::Io {
                path: "ref.txt".to_string(),
                reason: "not found".to_string()
            }
            .code(),
            ValidationErrorCodes::IO
        );
        assert_eq!(
            ValidationError::ParseLine {
                line: 3,
                content: "garbage".to_string()
            }
            .code(),
            ValidationErrorCodes::PARSE_LINE
        );
        assert_eq!(
            ValidationError::UnitMismatch {
                requested: "Nanoseconds".to_string(),
                stored: "Counts".to_string()
            }
            .code(),
            ValidationErrorCodes::UNIT_MISMATCH
        );
        assert_eq!(
            ValidationError::InvalidRecord {
                context: "Wh:0 St:1 Se:1 Sl:1 La:1 Wi:5".to_string(),
                mean: 100.0,
                spread: -5.0
            }
            .code(),
            ValidationErrorCodes::INVALID_RECORD
        );
    }

    #[test]
    fn test_error_messages() {
        let err = TopologyError::InvalidRange {
            context: "wheel -1 station 2 sector 4 superlayer 1 layer 3".to_string(),
            first: 10,
            last: 4,
        };
        assert!(err.message().contains("first 10 > last 4"));

        let err = ValidationError::ParseLine {
            line: 12,
            content: "0 1 x".to_string(),
        };
        assert!(err.message().contains("line 12"));
        assert!(err.message().contains("0 1 x"));
    }
}
