use crate::{write_dataset, CsvReader, PredictionReport, ReaderOptions, RunManifest};
use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use ctbnc_learning::{Penalization, RandomRestartHillClimbing};
use ctbnc_models::{ClassifierConfig, CtbncSampler, MultiCtbnc, ScoreKind, SearchConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "ctbnc")]
#[command(about = "Multi-dimensional continuous-time Bayesian network classifiers")]
#[command(long_about = "Learn a BN over class variables and a CTBN over features from CSV sequences, then classify")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Learn a classifier from one dataset and classify another
    LearnPredict(LearnPredictArgs),

    /// Sample a synthetic two-class dataset and write it as CSV
    Sample {
        /// Number of sequences
        #[arg(long, default_value = "100")]
        sequences: usize,

        /// Length of every sequence
        #[arg(long, default_value = "10.0")]
        duration: f64,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Name of the time column
        #[arg(long, default_value = "t")]
        time_column: String,

        /// Output directory, one CSV per sequence
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct LearnPredictArgs {
    /// Training CSV file or directory
    #[arg(long)]
    pub train: PathBuf,

    /// Test CSV file or directory
    #[arg(long)]
    pub test: PathBuf,

    /// Class variable column, repeat for several
    #[arg(long = "class", required = true)]
    pub class_variables: Vec<String>,

    /// Name of the time column
    #[arg(long, default_value = "t")]
    pub time_column: String,

    /// Classifier configuration (JSON); defaults apply when absent
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Structure search, overrides the configuration
    #[arg(long, value_enum)]
    pub search: Option<SearchType>,

    /// Score of the feature sub-model, overrides the configuration
    #[arg(long, value_enum)]
    pub score: Option<ScoreType>,

    /// Penalization of both sub-models, overrides the configuration
    #[arg(long, value_enum)]
    pub penalization: Option<PenalizationType>,

    /// Seed for random restarts
    #[arg(long)]
    pub seed: Option<u64>,

    /// Report the posterior over all class configurations
    #[arg(long)]
    pub probabilities: bool,

    /// Output report (JSON); the manifest is written next to it
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum SearchType {
    #[value(name = "hill-climbing")]
    HillClimbing,
    #[value(name = "random-restart")]
    RandomRestart,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ScoreType {
    #[value(name = "ll")]
    LogLikelihood,
    #[value(name = "cll")]
    ConditionalLogLikelihood,
    #[value(name = "bde")]
    BayesianDirichlet,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum PenalizationType {
    #[value(name = "bic")]
    Bic,
    #[value(name = "aic")]
    Aic,
    #[value(name = "none")]
    None,
}

impl From<ScoreType> for ScoreKind {
    fn from(score_type: ScoreType) -> Self {
        match score_type {
            ScoreType::LogLikelihood => ScoreKind::LogLikelihood,
            ScoreType::ConditionalLogLikelihood => ScoreKind::ConditionalLogLikelihood,
            ScoreType::BayesianDirichlet => ScoreKind::BayesianDirichlet,
        }
    }
}

impl From<PenalizationType> for Penalization {
    fn from(penalization_type: PenalizationType) -> Self {
        match penalization_type {
            PenalizationType::Bic => Penalization::Bic,
            PenalizationType::Aic => Penalization::Aic,
            PenalizationType::None => Penalization::None,
        }
    }
}

impl LearnPredictArgs {
    /// Configuration file (or defaults) with the command-line overrides applied.
    pub fn classifier_config(&self) -> anyhow::Result<ClassifierConfig> {
        let mut config: ClassifierConfig = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read configuration {}", path.display()))?;
                serde_json::from_str(&json).with_context(|| format!("invalid configuration {}", path.display()))?
            }
            None => ClassifierConfig::default(),
        };

        match self.search {
            Some(SearchType::HillClimbing) => config.search = SearchConfig::HillClimbing,
            Some(SearchType::RandomRestart) => {
                let defaults = RandomRestartHillClimbing::default();
                config.search = SearchConfig::RandomRestart {
                    restarts: defaults.restarts,
                    perturbations: defaults.perturbations,
                    seed: defaults.seed,
                };
            }
            None => {}
        }
        if let (Some(seed), SearchConfig::RandomRestart { seed: current, .. }) = (self.seed, &mut config.search) {
            *current = seed;
        }
        if let Some(score) = &self.score {
            config.ctbn.score = score.clone().into();
        }
        if let Some(penalization) = &self.penalization {
            let penalization = Penalization::from(penalization.clone());
            config.bn.penalization = penalization;
            config.ctbn.penalization = penalization;
        }
        Ok(config)
    }
}

pub fn run_learn_predict_command(args: &LearnPredictArgs) -> anyhow::Result<()> {
    let config = args.classifier_config()?;
    let reader = CsvReader::new(ReaderOptions {
        time_column: args.time_column.clone(),
        class_variables: args.class_variables.clone(),
        ..Default::default()
    });

    let train = reader
        .read_dataset(&args.train)
        .with_context(|| format!("failed to load training data from {}", args.train.display()))?;
    let test = reader
        .read_dataset(&args.test)
        .with_context(|| format!("failed to load test data from {}", args.test.display()))?;

    let model = MultiCtbnc::learn(&train.dataset, &config).context("learning failed")?;
    println!("{model}");

    let test_dataset = model.align(test.dataset);
    let predictions = model.predict(&test_dataset, args.probabilities).context("prediction failed")?;
    let report = PredictionReport::new(&test_dataset, &test.names, predictions);
    report.save_to_file(&args.out)?;

    let manifest = RunManifest::new(&model, train.dataset.len(), test_dataset.len());
    let manifest_path = args.out.with_extension("manifest.json");
    manifest.save_to_file(&manifest_path)?;

    println!("Wrote {} predictions to {}", report.records.len(), args.out.display());
    println!("Wrote manifest to {}", manifest_path.display());
    if let Some(accuracy) = &report.accuracy {
        println!("Global accuracy: {:.4} over {} sequences", accuracy.global, accuracy.evaluated);
        for (class, value) in &accuracy.per_class_variable {
            println!("  {class}: {value:.4}");
        }
    }
    Ok(())
}

pub fn run_sample_command(
    sequences: usize,
    duration: f64,
    seed: u64,
    time_column: &str,
    out: &std::path::Path,
) -> anyhow::Result<()> {
    let sampler = CtbncSampler::two_class_bridge().with_duration(duration);
    let dataset = sampler.sample_dataset(sequences, seed)?;
    let written = write_dataset(&dataset, out, time_column)?;
    info!(files = written.len(), out = %out.display(), "synthetic dataset written");

    let arcs: Vec<String> = sampler.true_arcs().iter().map(|(p, c)| format!("{p} -> {c}")).collect();
    println!("Wrote {} sequences to {}", written.len(), out.display());
    println!("Generating arcs: {}", arcs.join(", "));
    Ok(())
}
