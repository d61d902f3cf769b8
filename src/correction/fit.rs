// Distribution-fit correction strategy
//
// Computes the corrected constant of a wire from that wire's measurement
// samples: the new mean is the sample mean (plus a configurable offset) and
// the new spread is the sample standard deviation. Wires with too few
// samples fail with InsufficientStatistics and are handled by the pipeline's
// fallback policy.

use std::collections::BTreeMap;

use crate::config::CorrectionConfig;
use crate::dataset::CalibrationRecord;
use crate::error::{ConfigurationError, CorrectionError};
use crate::topology::WireAddress;

use super::{CorrectedValue, CorrectionContext, CorrectionStrategy};

/// Sample-distribution fit strategy
pub struct FitCorrection {
    min_entries: usize,
    mean_offset: f64,
    samples: BTreeMap<WireAddress, Vec<f64>>,
}

impl FitCorrection {
    pub fn new(config: &CorrectionConfig) -> Self {
        Self {
            min_entries: config.min_entries,
            mean_offset: config.mean_offset,
            samples: BTreeMap::new(),
        }
    }
}

impl CorrectionStrategy for FitCorrection {
    fn configure(&mut self, context: &CorrectionContext) -> Result<(), ConfigurationError> {
        if self.min_entries == 0 {
            return Err(ConfigurationError::InvalidParameter {
                name: "min_entries".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.mean_offset.is_finite() {
            return Err(ConfigurationError::InvalidParameter {
                name: "mean_offset".to_string(),
                reason: format!("must be finite, got {}", self.mean_offset),
            });
        }
        self.samples = context.samples.clone();
        log::info!(
            "[FitCorrection] Configured with {} sampled wires, min_entries={}",
            self.samples.len(),
            self.min_entries
        );
        Ok(())
    }

    fn correct(
        &self,
        address: &WireAddress,
        _prior: Option<&CalibrationRecord>,
    ) -> Result<CorrectedValue, CorrectionError> {
        let samples = self.samples.get(address).map(Vec::as_slice).unwrap_or(&[]);
        if samples.len() < self.min_entries {
            return Err(CorrectionError::InsufficientStatistics {
                required: self.min_entries,
                collected: samples.len(),
            });
        }

        let n = samples.len() as f64;
        let mean: f64 = samples.iter().sum::<f64>() / n;
        let variance: f64 = samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n;
        let spread = variance.sqrt();

        if !mean.is_finite() || !spread.is_finite() {
            return Err(CorrectionError::FitFailed {
                reason: format!("non-finite fit result: mean {}, spread {}", mean, spread),
            });
        }

        Ok(CorrectedValue {
            mean: mean + self.mean_offset,
            spread,
        })
    }

    fn name(&self) -> &'static str {
        "fit"
    }
}
