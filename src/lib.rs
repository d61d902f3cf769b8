// Wirecal - per-wire calibration constant maintenance
//
// Correction: recompute the calibration constant of every wire in the
// topology with a pluggable strategy, keeping the prior value when a single
// wire fails. Validation: compare a persisted dataset against an
// independently produced reference within configured tolerances.

// Module declarations
pub mod config;
pub mod correction;
pub mod dataset;
pub mod error;
pub mod store;
pub mod tables;
pub mod topology;
pub mod validation;

// Re-exports for convenience
pub use config::JobConfig;
pub use correction::{create_strategy, CorrectionContext, CorrectionPipeline, CorrectionRun};
pub use dataset::{CalibrationDataset, CalibrationRecord, DatasetBuilder, TimeUnit};
pub use store::DatasetStore;
pub use topology::{Topology, WireAddress};
pub use validation::{ReportSink, ValidationReport};
