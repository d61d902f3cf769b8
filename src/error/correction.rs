// Correction error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Correction error code constants
///
/// These constants provide a single source of truth for the codes emitted
/// in structured log lines by the correction side of the job.
///
/// Error code ranges: 1001-1002 (configuration), 1101-1104 (per-wire)
pub struct CorrectionErrorCodes {}

impl CorrectionErrorCodes {
    /// No strategy registered under the requested algorithm name
    pub const UNKNOWN_ALGORITHM: i32 = 1001;

    /// A strategy configuration parameter is missing or out of range
    pub const INVALID_PARAMETER: i32 = 1002;

    /// Too few samples available to fit the wire
    pub const INSUFFICIENT_STATISTICS: i32 = 1101;

    /// The fit produced a non-finite or otherwise degenerate result
    pub const FIT_FAILED: i32 = 1102;

    /// The reference delta table has no entry for the wire
    pub const MISSING_REFERENCE: i32 = 1103;

    /// The strategy needs a prior record and none was stored
    pub const NO_PRIOR_VALUE: i32 = 1104;
}

/// Log a per-wire correction error with structured context
///
/// Logs with the numeric error code so failed wires can be grepped out of a
/// large run's output and grouped by failure reason.
pub fn log_correction_error(err: &CorrectionError, context: &str) {
    error!(
        "Correction error in {}: code={}, component=CorrectionPipeline, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Fatal configuration errors
///
/// These abort the whole job before any wire is processed: an unusable
/// algorithm selection must never produce a partially corrected dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// No strategy registered under this name
    UnknownAlgorithm { name: String },

    /// A configuration parameter is missing or out of range
    InvalidParameter { name: String, reason: String },
}

impl ErrorCode for ConfigurationError {
    fn code(&self) -> i32 {
        match self {
            ConfigurationError::UnknownAlgorithm { .. } => CorrectionErrorCodes::UNKNOWN_ALGORITHM,
            ConfigurationError::InvalidParameter { .. } => CorrectionErrorCodes::INVALID_PARAMETER,
        }
    }

    fn message(&self) -> String {
        match self {
            ConfigurationError::UnknownAlgorithm { name } => {
                format!("Unknown correction algorithm: {}", name)
            }
            ConfigurationError::InvalidParameter { name, reason } => {
                format!("Invalid parameter {}: {}", name, reason)
            }
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigurationError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for ConfigurationError {}

/// Per-wire correction errors
///
/// These are recoverable by design: the pipeline answers every one of them
/// with the fallback-to-prior policy and moves on to the next wire.
///
/// Error code range: 1101-1104
#[derive(Debug, Clone, PartialEq)]
pub enum CorrectionError {
    /// Too few samples to fit the wire
    InsufficientStatistics { required: usize, collected: usize },

    /// The fit converged to a non-finite or degenerate result
    FitFailed { reason: String },

    /// No delta entry for the wire in the reference table
    MissingReference,

    /// The strategy requires a prior record and none was stored
    NoPriorValue,
}

impl ErrorCode for CorrectionError {
    fn code(&self) -> i32 {
        match self {
            CorrectionError::InsufficientStatistics { .. } => {
                CorrectionErrorCodes::INSUFFICIENT_STATISTICS
            }
            CorrectionError::FitFailed { .. } => CorrectionErrorCodes::FIT_FAILED,
            CorrectionError::MissingReference => CorrectionErrorCodes::MISSING_REFERENCE,
            CorrectionError::NoPriorValue => CorrectionErrorCodes::NO_PRIOR_VALUE,
        }
    }

    fn message(&self) -> String {
        match self {
            CorrectionError::InsufficientStatistics {
                required,
                collected,
            } => {
                format!("Insufficient statistics: need {}, got {}", required, collected)
            }
            CorrectionError::FitFailed { reason } => {
                format!("Fit failed: {}", reason)
            }
            CorrectionError::MissingReference => "No reference delta for wire".to_string(),
            CorrectionError::NoPriorValue => "No prior record to correct".to_string(),
        }
    }
}

impl fmt::Display for CorrectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CorrectionError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for CorrectionError {}
