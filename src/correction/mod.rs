// Correction strategies and their registry
//
// A correction strategy computes an updated calibration value for one wire
// from the wire's address, its prior record and an immutable context built
// at pipeline entry. Strategies are selected by name through a registry so
// jobs can switch algorithm from configuration alone.

mod fit;
mod pipeline;
mod reference;

pub use fit::FitCorrection;
pub use pipeline::{CorrectionPipeline, CorrectionRun, PipelineError};
pub use reference::ReferenceCorrection;

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use crate::config::CorrectionConfig;
use crate::dataset::CalibrationRecord;
use crate::error::{ConfigurationError, CorrectionError};
use crate::topology::WireAddress;

/// Result of correcting one wire, before it is committed to a dataset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectedValue {
    pub mean: f64,
    pub spread: f64,
}

/// Shared read-only inputs for a correction run
///
/// Built once at pipeline entry from whatever files the job loaded; the
/// per-wire loop never touches I/O. Which tables a given strategy uses is
/// its own business; unused tables stay empty.
#[derive(Debug, Clone, Default)]
pub struct CorrectionContext {
    /// Per-wire measurement samples, consumed by the fit strategy
    pub samples: BTreeMap<WireAddress, Vec<f64>>,
    /// Per-wire correction deltas, consumed by the reference strategy
    pub deltas: BTreeMap<WireAddress, f64>,
}

/// Pluggable per-wire correction algorithm
///
/// `configure` runs once before any wire is processed and is the only
/// fallible setup step; after it, `correct` must be a pure function of
/// `(address, prior)` so wires can be processed in any order and one wire's
/// failure cannot leak into another's result.
pub trait CorrectionStrategy {
    /// One-time setup from the shared context; fatal on failure
    fn configure(&mut self, context: &CorrectionContext) -> Result<(), ConfigurationError>;

    /// Compute the corrected value for one wire
    fn correct(
        &self,
        address: &WireAddress,
        prior: Option<&CalibrationRecord>,
    ) -> Result<CorrectedValue, CorrectionError>;

    /// Registered name, for diagnostics
    fn name(&self) -> &'static str;
}

type StrategyConstructor = fn(&CorrectionConfig) -> Box<dyn CorrectionStrategy>;

/// Registry mapping algorithm names to constructors
static STRATEGY_REGISTRY: Lazy<BTreeMap<&'static str, StrategyConstructor>> = Lazy::new(|| {
    let mut map: BTreeMap<&'static str, StrategyConstructor> = BTreeMap::new();
    map.insert("fit", |config| Box::new(FitCorrection::new(config)));
    map.insert("reference", |config| {
        Box::new(ReferenceCorrection::new(config))
    });
    map
});

/// Create the strategy registered under `name`
///
/// # Returns
/// * `Ok(strategy)` - Unconfigured strategy; call `configure` before use
/// * `Err(ConfigurationError::UnknownAlgorithm)` - No such registration
pub fn create_strategy(
    name: &str,
    config: &CorrectionConfig,
) -> Result<Box<dyn CorrectionStrategy>, ConfigurationError> {
    match STRATEGY_REGISTRY.get(name) {
        Some(constructor) => Ok(constructor(config)),
        None => Err(ConfigurationError::UnknownAlgorithm {
            name: name.to_string(),
        }),
    }
}

/// Names of all registered strategies, for CLI help and error messages
pub fn registered_strategies() -> Vec<&'static str> {
    STRATEGY_REGISTRY.keys().copied().collect()
}
