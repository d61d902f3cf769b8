use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use wirecal::config::JobConfig;
use wirecal::correction::{create_strategy, registered_strategies, CorrectionContext, CorrectionPipeline};
use wirecal::store::DatasetStore;
use wirecal::tables::{load_delta_table, load_sample_table};
use wirecal::topology::Topology;
use wirecal::validation::{
    compare_reference_records, load_reference_file, Comparator, FullComparator, ReportSink,
    ScalarComparator, Tolerances,
};

#[derive(Parser, Debug)]
#[command(
    name = "wirecal",
    about = "Per-wire calibration correction and validation jobs"
)]
struct Cli {
    /// Path to the JSON job configuration (defaults apply when absent)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recompute every wire's constant and publish a new dataset
    Correct {
        /// JSON topology description
        #[arg(long)]
        topology: PathBuf,
        /// Dataset store directory
        #[arg(long)]
        store: PathBuf,
        /// Version tag of the prior dataset to correct
        #[arg(long)]
        input_tag: String,
        /// Version tag to publish the corrected dataset under
        #[arg(long)]
        output_tag: String,
        /// Per-wire sample table (fit strategy input)
        #[arg(long)]
        samples: Option<PathBuf>,
        /// Per-wire delta table (reference strategy input)
        #[arg(long)]
        deltas: Option<PathBuf>,
    },
    /// Compare a stored dataset against a flat reference file
    Validate {
        /// Dataset store directory
        #[arg(long)]
        store: PathBuf,
        /// Version tag of the dataset to validate
        #[arg(long)]
        tag: String,
        /// Whitespace-separated reference file
        #[arg(long)]
        reference: PathBuf,
    },
    /// List registered correction strategies
    ListStrategies,
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => JobConfig::load_from_file(path),
        None => JobConfig::default(),
    };

    match cli.command {
        Commands::Correct {
            topology,
            store,
            input_tag,
            output_tag,
            samples,
            deltas,
        } => run_correct(&config, topology, store, &input_tag, &output_tag, samples, deltas),
        Commands::Validate { store, tag, reference } => {
            run_validate(&config, store, &tag, reference)
        }
        Commands::ListStrategies => {
            for name in registered_strategies() {
                println!("{}", name);
            }
            Ok(ExitCode::from(0))
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_correct(
    config: &JobConfig,
    topology_path: PathBuf,
    store_dir: PathBuf,
    input_tag: &str,
    output_tag: &str,
    samples: Option<PathBuf>,
    deltas: Option<PathBuf>,
) -> Result<ExitCode> {
    let topology_json = std::fs::read_to_string(&topology_path)
        .with_context(|| format!("reading topology {}", topology_path.display()))?;
    let topology: Topology = serde_json::from_str(&topology_json)
        .with_context(|| format!("parsing topology {}", topology_path.display()))?;

    let store = DatasetStore::new(&store_dir);
    let prior = store
        .read(input_tag)
        .with_context(|| format!("loading prior dataset '{}'", input_tag))?;

    // All strategy input I/O happens here, before the per-wire loop.
    let mut context = CorrectionContext::default();
    if let Some(path) = samples {
        context.samples = load_sample_table(&path)
            .with_context(|| format!("loading sample table {}", path.display()))?;
    }
    if let Some(path) = deltas {
        context.deltas = load_delta_table(&path)
            .with_context(|| format!("loading delta table {}", path.display()))?;
    }

    let strategy = create_strategy(&config.correction.algo, &config.correction)
        .with_context(|| format!("selecting algorithm '{}'", config.correction.algo))?;

    let mut pipeline = CorrectionPipeline::new(&topology, strategy);
    let run = pipeline
        .run(&prior, &context, prior.version() + 1)
        .context("running correction pass")?;

    store
        .write(output_tag, &run.dataset)
        .with_context(|| format!("publishing dataset '{}'", output_tag))?;

    println!(
        "Corrected {} wires, kept prior for {}, dropped {}; published '{}'",
        run.corrected, run.fallbacks, run.dropped, output_tag
    );
    Ok(ExitCode::from(0))
}

fn run_validate(
    config: &JobConfig,
    store_dir: PathBuf,
    tag: &str,
    reference_path: PathBuf,
) -> Result<ExitCode> {
    let store = DatasetStore::new(&store_dir);
    let actual = store
        .read(tag)
        .with_context(|| format!("loading dataset '{}'", tag))?;

    let records = load_reference_file(&reference_path)
        .with_context(|| format!("loading reference {}", reference_path.display()))?;

    let comparator: Box<dyn Comparator> = if config.validation.legacy_format {
        Box::new(FullComparator::new(Tolerances {
            mean: config.validation.mean_tolerance,
            spread: Some(config.validation.spread_tolerance),
        }))
    } else {
        Box::new(ScalarComparator::new(config.validation.mean_tolerance))
    };

    let report = compare_reference_records(comparator.as_ref(), &records, &actual);
    print!("{}", ReportSink::emit(&report));

    if report.passed() {
        Ok(ExitCode::from(0))
    } else {
        Ok(ExitCode::from(2))
    }
}
