// CorrectionPipeline - per-wire correction with isolated failures
//
// Drives one correction pass: enumerate every wire of the topology, ask the
// strategy for a corrected value, and commit it to a fresh dataset. A wire
// whose correction fails keeps its prior value when one exists; a wire with
// neither stays absent from the new dataset. A single wire can never abort
// the run. Only configuration and topology problems are fatal, and both
// surface before any wire is processed.

use std::fmt;

use log::{error, info, warn};

use crate::dataset::{CalibrationDataset, CalibrationRecord, DatasetBuilder};
use crate::error::{
    log_correction_error, log_validation_error, ConfigurationError, CorrectionError, ErrorCode,
    TopologyError,
};
use crate::topology::Topology;

use super::{CorrectionContext, CorrectionStrategy};

/// Fatal pipeline errors
///
/// Everything per-wire is recovered inside the loop; these two are the only
/// ways a run can fail, and both happen before the first wire.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    Configuration(ConfigurationError),
    Topology(TopologyError),
}

impl From<ConfigurationError> for PipelineError {
    fn from(err: ConfigurationError) -> Self {
        PipelineError::Configuration(err)
    }
}

impl From<TopologyError> for PipelineError {
    fn from(err: TopologyError) -> Self {
        PipelineError::Topology(err)
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Configuration(err) => write!(f, "{}", err),
            PipelineError::Topology(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for PipelineError {}

/// Outcome of one correction pass
#[derive(Debug)]
pub struct CorrectionRun {
    /// The freshly built dataset, ready for publication
    pub dataset: CalibrationDataset,
    /// Wires the strategy corrected
    pub corrected: usize,
    /// Wires that kept their prior value after a failed correction
    pub fallbacks: usize,
    /// Wires that failed correction with no prior value to keep
    pub dropped: usize,
}

/// One-pass correction driver
pub struct CorrectionPipeline<'a> {
    topology: &'a Topology,
    strategy: Box<dyn CorrectionStrategy>,
}

impl<'a> CorrectionPipeline<'a> {
    pub fn new(topology: &'a Topology, strategy: Box<dyn CorrectionStrategy>) -> Self {
        Self { topology, strategy }
    }

    /// Run the correction pass and build the output dataset
    ///
    /// # Arguments
    /// * `prior` - The published dataset the run corrects; read-only
    /// * `context` - Shared inputs for the strategy, built at entry
    /// * `output_version` - Version tag of the dataset being built
    ///
    /// # Returns
    /// * `Ok(CorrectionRun)` - The new dataset and per-wire outcome counts
    /// * `Err(PipelineError)` - Configuration or topology failure, before
    ///   any wire was processed
    pub fn run(
        &mut self,
        prior: &CalibrationDataset,
        context: &CorrectionContext,
        output_version: u32,
    ) -> Result<CorrectionRun, PipelineError> {
        self.strategy.configure(context)?;
        let wires = self.topology.wires()?;

        info!(
            "[CorrectionPipeline] Starting '{}' pass over {} wires, prior version {}",
            self.strategy.name(),
            wires.len(),
            prior.version()
        );

        let mut builder = DatasetBuilder::new(output_version, prior.unit());
        let mut corrected = 0usize;
        let mut fallbacks = 0usize;
        let mut dropped = 0usize;

        for address in &wires {
            // The prior dataset is read in its own unit, so the lookup
            // cannot fail on a unit mismatch.
            let prior_record = prior.get(address, prior.unit()).ok().flatten();

            // A corrected value that violates the record invariants is a
            // failed correction, not a reason to abort or to commit garbage.
            let result = self.strategy.correct(address, prior_record).and_then(|value| {
                if !value.mean.is_finite() || !value.spread.is_finite() || value.spread < 0.0 {
                    Err(CorrectionError::FitFailed {
                        reason: format!(
                            "invalid corrected value: mean {}, spread {}",
                            value.mean, value.spread
                        ),
                    })
                } else {
                    Ok(value)
                }
            });

            match result {
                Ok(value) => {
                    match builder.set(*address, CalibrationRecord::new(value.mean, value.spread)) {
                        Ok(()) => {
                            corrected += 1;
                            match prior_record {
                                Some(old) => info!(
                                    "[CorrectionPipeline] New value for {}: mean {} -> {}, spread {} -> {}",
                                    address, old.mean, value.mean, old.spread, value.spread
                                ),
                                None => info!(
                                    "[CorrectionPipeline] New value for {}: mean {}, spread {} (no prior)",
                                    address, value.mean, value.spread
                                ),
                            }
                        }
                        Err(err) => {
                            // Unreachable while the invariant check above
                            // matches the builder's.
                            log_validation_error(&err, &address.to_string());
                            dropped += 1;
                        }
                    }
                }
                Err(err) => {
                    log_correction_error(&err, &address.to_string());
                    match prior_record {
                        Some(old) => match builder.set(*address, *old) {
                            Ok(()) => {
                                fallbacks += 1;
                                info!(
                                    "[CorrectionPipeline] Keep old value for {}: mean {}, spread {}",
                                    address, old.mean, old.spread
                                );
                            }
                            Err(err) => {
                                // Unreachable: prior records come from a
                                // published dataset, which only holds
                                // records that passed the same check.
                                log_validation_error(&err, &address.to_string());
                                dropped += 1;
                            }
                        },
                        None => {
                            dropped += 1;
                            warn!(
                                "[CorrectionPipeline] No prior value for {}, wire left out of new dataset (code {})",
                                address,
                                err.code()
                            );
                        }
                    }
                }
            }
        }

        if corrected + fallbacks + dropped != wires.len() {
            // Counting is per-wire and exhaustive; this would mean a wire
            // was processed twice or skipped.
            error!(
                "[CorrectionPipeline] Outcome counts do not add up: {} + {} + {} != {}",
                corrected,
                fallbacks,
                dropped,
                wires.len()
            );
        }

        info!(
            "[CorrectionPipeline] Pass complete: {} corrected, {} kept prior, {} dropped",
            corrected, fallbacks, dropped
        );

        Ok(CorrectionRun {
            dataset: builder.build(),
            corrected,
            fallbacks,
            dropped,
        })
    }
}
