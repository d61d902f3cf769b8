// Error types for the wirecal calibration jobs
//
// This module defines custom error types for the correction and validation
// sides of the job, providing structured error handling with numeric codes
// suitable for log scraping and operator tooling.

mod correction;
mod validation;

pub use correction::{
    log_correction_error, ConfigurationError, CorrectionError, CorrectionErrorCodes,
};
pub use validation::{log_validation_error, TopologyError, ValidationError, ValidationErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the job's log output.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
