use ctbnc_models::{ClassifierConfig, MultiCtbnc};
use serde::{Serialize, Deserialize};
use std::path::Path;
use uuid::Uuid;

/// Learned structure and search statistics of one sub-model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubModelSummary {
    pub arcs: Vec<(String, String)>,
    pub score: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub cache_hits: usize,
}

/// Run manifest for reproducing a learn/predict run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub timestamp: String,
    pub config: ClassifierConfig,
    pub train_sequences: usize,
    pub test_sequences: usize,
    pub class_variables: Vec<String>,
    pub feature_variables: Vec<String>,
    pub bn: SubModelSummary,
    pub ctbn: SubModelSummary,
    pub commit_hash: Option<String>,
    pub rust_version: String,
}

impl RunManifest {
    pub fn new(model: &MultiCtbnc, train_sequences: usize, test_sequences: usize) -> Self {
        let (bn_outcome, ctbn_outcome) = model.search_outcomes();
        let summary = |network: &ctbnc_core::Network, outcome: &ctbnc_learning::SearchOutcome| SubModelSummary {
            arcs: network.named_arcs(),
            score: outcome.score,
            iterations: outcome.iterations,
            evaluations: outcome.evaluations,
            cache_hits: outcome.cache_hits,
        };

        Self {
            run_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            config: model.config().clone(),
            train_sequences,
            test_sequences,
            class_variables: model.class_variables().iter().map(|v| v.name().to_string()).collect(),
            feature_variables: model.feature_variables().iter().map(|v| v.name().to_string()).collect(),
            bn: summary(model.bn().network(), bn_outcome),
            ctbn: summary(model.ctbn().network(), ctbn_outcome),
            commit_hash: get_git_commit(),
            rust_version: get_rust_version(),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let manifest = serde_json::from_str(&json)?;
        Ok(manifest)
    }
}

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    std::process::Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
}

fn get_git_commit() -> Option<String> {
    command_output("git", &["rev-parse", "HEAD"])
}

fn get_rust_version() -> String {
    command_output("rustc", &["--version"]).unwrap_or_else(|| "unknown".to_string())
}
