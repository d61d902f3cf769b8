//! Integration tests for the correction pipeline
//!
//! These tests drive the public crate surface the way the CLI does:
//! topology -> strategy -> pipeline -> store, checking the fallback-to-prior
//! policy and the publication round trip end to end.

use std::collections::BTreeMap;

use wirecal::config::CorrectionConfig;
use wirecal::correction::{
    create_strategy, CorrectedValue, CorrectionContext, CorrectionPipeline, CorrectionStrategy,
};
use wirecal::dataset::{CalibrationRecord, DatasetBuilder, TimeUnit};
use wirecal::error::{ConfigurationError, CorrectionError};
use wirecal::store::DatasetStore;
use wirecal::topology::{ChamberSpec, IndexRange, LayerSpec, Topology, WireAddress};

/// Two-wire topology: one chamber, one layer, wires 1 and 2
fn two_wire_topology() -> Topology {
    Topology {
        chambers: vec![ChamberSpec {
            wheels: IndexRange { first: 0, last: 0 },
            stations: IndexRange { first: 1, last: 1 },
            sectors: IndexRange { first: 1, last: 1 },
            superlayers: IndexRange { first: 1, last: 1 },
            layers: vec![LayerSpec {
                layer: 1,
                first_wire: 1,
                last_wire: 2,
            }],
        }],
    }
}

fn addr(wire: i32) -> WireAddress {
    WireAddress::new(0, 1, 1, 1, 1, wire)
}

/// Strategy scripted for the canonical two-wire scenario: succeeds for
/// wire 1 with (101.0, 2.1), fails for every other wire
struct ScriptedStrategy;

impl CorrectionStrategy for ScriptedStrategy {
    fn configure(&mut self, _context: &CorrectionContext) -> Result<(), ConfigurationError> {
        Ok(())
    }

    fn correct(
        &self,
        address: &WireAddress,
        _prior: Option<&CalibrationRecord>,
    ) -> Result<CorrectedValue, CorrectionError> {
        if address.wire == 1 {
            Ok(CorrectedValue {
                mean: 101.0,
                spread: 2.1,
            })
        } else {
            Err(CorrectionError::FitFailed {
                reason: "scripted failure".to_string(),
            })
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Wire A succeeds and commits the strategy's value verbatim; wire B fails
/// with no prior record and stays absent from the output.
#[test]
fn test_success_commits_and_no_prior_failure_drops() {
    let topology = two_wire_topology();
    let mut prior = DatasetBuilder::new(1, TimeUnit::Counts);
    prior.set(addr(1), CalibrationRecord::new(100.0, 2.0)).unwrap();
    let prior = prior.build();

    let mut pipeline = CorrectionPipeline::new(&topology, Box::new(ScriptedStrategy));
    let run = pipeline
        .run(&prior, &CorrectionContext::default(), 2)
        .unwrap();

    let rec = run
        .dataset
        .get(&addr(1), TimeUnit::Counts)
        .unwrap()
        .unwrap();
    assert_eq!(rec.mean, 101.0);
    assert_eq!(rec.spread, 2.1);
    assert!(run
        .dataset
        .get(&addr(2), TimeUnit::Counts)
        .unwrap()
        .is_none());
    assert_eq!(run.corrected, 1);
    assert_eq!(run.fallbacks, 0);
    assert_eq!(run.dropped, 1);
}

/// A failed wire with a prior record keeps that record exactly.
#[test]
fn test_failure_with_prior_keeps_old_record() {
    let topology = two_wire_topology();
    let mut prior = DatasetBuilder::new(1, TimeUnit::Counts);
    prior.set(addr(2), CalibrationRecord::new(77.7, 0.9)).unwrap();
    let prior = prior.build();

    let mut pipeline = CorrectionPipeline::new(&topology, Box::new(ScriptedStrategy));
    let run = pipeline
        .run(&prior, &CorrectionContext::default(), 2)
        .unwrap();

    let rec = run
        .dataset
        .get(&addr(2), TimeUnit::Counts)
        .unwrap()
        .unwrap();
    assert_eq!(*rec, CalibrationRecord::new(77.7, 0.9));
    assert_eq!(run.fallbacks, 1);
}

/// The fit strategy built through the registry corrects wires from the
/// sample table and falls back on unsampled ones, like a real job run.
#[test]
fn test_fit_strategy_end_to_end() {
    let topology = two_wire_topology();
    let mut prior = DatasetBuilder::new(4, TimeUnit::Counts);
    prior.set(addr(1), CalibrationRecord::new(100.0, 2.0)).unwrap();
    prior.set(addr(2), CalibrationRecord::new(200.0, 3.0)).unwrap();
    let prior = prior.build();

    let config = CorrectionConfig {
        algo: "fit".to_string(),
        min_entries: 3,
        mean_offset: 0.0,
    };
    let strategy = create_strategy("fit", &config).unwrap();

    // Wire 1 has enough samples to fit; wire 2 has only one.
    let mut samples = BTreeMap::new();
    samples.insert(addr(1), vec![101.0, 102.0, 103.0]);
    samples.insert(addr(2), vec![42.0]);
    let context = CorrectionContext {
        samples,
        ..Default::default()
    };

    let mut pipeline = CorrectionPipeline::new(&topology, strategy);
    let run = pipeline.run(&prior, &context, 5).unwrap();

    assert_eq!(run.corrected, 1);
    assert_eq!(run.fallbacks, 1);
    assert_eq!(run.dropped, 0);
    assert_eq!(run.dataset.version(), 5);

    let fitted = run
        .dataset
        .get(&addr(1), TimeUnit::Counts)
        .unwrap()
        .unwrap();
    assert!((fitted.mean - 102.0).abs() < 1e-9);
    let kept = run
        .dataset
        .get(&addr(2), TimeUnit::Counts)
        .unwrap()
        .unwrap();
    assert_eq!(*kept, CalibrationRecord::new(200.0, 3.0));
}

/// Publishing the output dataset through the store and reading it back
/// yields an identical dataset.
#[test]
fn test_publish_roundtrip_through_store() {
    let topology = two_wire_topology();
    let mut prior = DatasetBuilder::new(1, TimeUnit::Counts);
    prior.set(addr(1), CalibrationRecord::new(100.0, 2.0)).unwrap();
    prior.set(addr(2), CalibrationRecord::new(50.0, 1.0)).unwrap();
    let prior = prior.build();

    let mut pipeline = CorrectionPipeline::new(&topology, Box::new(ScriptedStrategy));
    let run = pipeline
        .run(&prior, &CorrectionContext::default(), 2)
        .unwrap();

    let dir = std::env::temp_dir().join(format!(
        "wirecal-pipeline-roundtrip-{}",
        std::process::id()
    ));
    let store = DatasetStore::new(&dir);
    store.write("t0_corrected", &run.dataset).unwrap();
    let loaded = store.read("t0_corrected").unwrap();
    assert_eq!(loaded, run.dataset);
}

/// An unknown algorithm name is rejected before a pipeline even exists.
#[test]
fn test_unknown_algorithm_is_fatal_up_front() {
    let config = CorrectionConfig::default();
    match create_strategy("no-such-algo", &config) {
        Err(ConfigurationError::UnknownAlgorithm { name }) => assert_eq!(name, "no-such-algo"),
        Err(e) => panic!("Expected UnknownAlgorithm error, got: {:?}", e),
        Ok(strategy) => panic!(
            "Expected UnknownAlgorithm error, got strategy '{}'",
            strategy.name()
        ),
    }
}
