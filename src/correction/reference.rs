// Reference-table correction strategy
//
// Shifts each wire's prior mean by a delta looked up in an externally
// supplied table, keeping the prior spread. Wires without a delta or without
// a prior record fail and are handled by the pipeline's fallback policy.

use std::collections::BTreeMap;

use crate::config::CorrectionConfig;
use crate::dataset::CalibrationRecord;
use crate::error::{ConfigurationError, CorrectionError};
use crate::topology::WireAddress;

use super::{CorrectedValue, CorrectionContext, CorrectionStrategy};

/// Reference-delta-table strategy
pub struct ReferenceCorrection {
    deltas: BTreeMap<WireAddress, f64>,
}

impl ReferenceCorrection {
    pub fn new(_config: &CorrectionConfig) -> Self {
        Self {
            deltas: BTreeMap::new(),
        }
    }
}

impl CorrectionStrategy for ReferenceCorrection {
    fn configure(&mut self, context: &CorrectionContext) -> Result<(), ConfigurationError> {
        for (address, delta) in &context.deltas {
            if !delta.is_finite() {
                return Err(ConfigurationError::InvalidParameter {
                    name: "deltas".to_string(),
                    reason: format!("non-finite delta {} for {}", delta, address),
                });
            }
        }
        self.deltas = context.deltas.clone();
        log::info!(
            "[ReferenceCorrection] Configured with {} delta entries",
            self.deltas.len()
        );
        Ok(())
    }

    fn correct(
        &self,
        address: &WireAddress,
        prior: Option<&CalibrationRecord>,
    ) -> Result<CorrectedValue, CorrectionError> {
        let prior = prior.ok_or(CorrectionError::NoPriorValue)?;
        let delta = self
            .deltas
            .get(address)
            .copied()
            .ok_or(CorrectionError::MissingReference)?;
        Ok(CorrectedValue {
            mean: prior.mean + delta,
            spread: prior.spread,
        })
    }

    fn name(&self) -> &'static str {
        "reference"
    }
}
