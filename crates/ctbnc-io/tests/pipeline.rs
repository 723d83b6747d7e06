use approx::assert_relative_eq;
use clap::Parser;
use ctbnc_io::cli::{Cli, Commands};
use ctbnc_io::{write_dataset, CsvReader, PredictionReport, ReaderError, ReaderOptions, RunManifest};
use ctbnc_learning::Penalization;
use ctbnc_models::{ClassifierConfig, CtbncSampler, MultiCtbnc, ScoreKind, SearchConfig};
use std::path::PathBuf;

fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ctbnc-{label}-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn reader() -> CsvReader {
    CsvReader::new(ReaderOptions { class_variables: vec!["C1".into(), "C2".into()], ..Default::default() })
}

#[test]
fn sampled_csv_dataset_learns_and_reports() {
    let dir = scratch_dir("pipeline");
    let sampler = CtbncSampler::two_class_bridge();
    let train_dir = dir.join("train");
    let test_dir = dir.join("test");
    write_dataset(&sampler.sample_dataset(120, 21).unwrap(), &train_dir, "t").unwrap();
    let test_original = sampler.sample_dataset(40, 22).unwrap();
    let written = write_dataset(&test_original, &test_dir, "t").unwrap();
    assert_eq!(written.len(), 40);

    let train = reader().read_dataset(&train_dir).unwrap();
    let test = reader().read_dataset(&test_dir).unwrap();
    assert_eq!(train.dataset.len(), 120);
    assert_eq!(test.names[0], "sequence_00000");
    for (read, original) in test.dataset.sequences().iter().zip(test_original.sequences()) {
        assert_eq!(read.class_values(), original.class_values());
        assert_eq!(read.len(), original.len());
    }

    let model = MultiCtbnc::learn(&train.dataset, &ClassifierConfig::default()).unwrap();
    let predictions = model.predict(&test.dataset, true).unwrap();
    let report = PredictionReport::new(&test.dataset, &test.names, predictions);
    let accuracy = report.accuracy.clone().unwrap();
    assert_eq!(accuracy.evaluated, 40);
    assert!(accuracy.global > 0.6);
    assert!(accuracy.per_class_variable["C1"] >= accuracy.global);

    let report_path = dir.join("report.json");
    report.save_to_file(&report_path).unwrap();
    let reloaded = PredictionReport::load_from_file(&report_path).unwrap();
    assert_eq!(reloaded.records.len(), 40);
    for (a, b) in reloaded.records.iter().zip(&report.records) {
        assert_eq!(a.predicted, b.predicted);
        assert_eq!(a.truth, b.truth);
    }

    let manifest = RunManifest::new(&model, train.dataset.len(), test.dataset.len());
    let manifest_path = report_path.with_extension("manifest.json");
    manifest.save_to_file(&manifest_path).unwrap();
    let loaded = RunManifest::load_from_file(&manifest_path).unwrap();
    assert_eq!(loaded.run_id, manifest.run_id);
    assert_eq!(loaded.config, ClassifierConfig::default());
    assert_eq!(loaded.class_variables, vec!["C1".to_string(), "C2".to_string()]);
    assert_eq!(loaded.ctbn.arcs, model.ctbn().network().named_arcs());
    assert_relative_eq!(loaded.ctbn.score, manifest.ctbn.score, epsilon = 1e-9);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn directory_without_csv_files_is_rejected() {
    let dir = scratch_dir("empty");
    assert!(matches!(reader().read_dataset(&dir), Err(ReaderError::NoFiles(_))));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn command_line_overrides_the_configuration_file() {
    let dir = scratch_dir("config");
    let config_path = dir.join("config.json");
    let from_file = ClassifierConfig {
        search: SearchConfig::RandomRestart { restarts: 3, perturbations: 2, seed: 1 },
        ..Default::default()
    };
    std::fs::write(&config_path, serde_json::to_string(&from_file).unwrap()).unwrap();

    let cli = Cli::try_parse_from([
        "ctbnc",
        "learn-predict",
        "--train",
        "train",
        "--test",
        "test",
        "--class",
        "C1",
        "--class",
        "C2",
        "--config",
        config_path.to_str().unwrap(),
        "--score",
        "bde",
        "--penalization",
        "aic",
        "--seed",
        "99",
        "--out",
        "report.json",
    ])
    .unwrap();
    let Commands::LearnPredict(args) = cli.command else {
        panic!("expected learn-predict");
    };
    assert_eq!(args.class_variables, vec!["C1".to_string(), "C2".to_string()]);

    let config = args.classifier_config().unwrap();
    assert_eq!(config.search, SearchConfig::RandomRestart { restarts: 3, perturbations: 2, seed: 99 });
    assert_eq!(config.ctbn.score, ScoreKind::BayesianDirichlet);
    assert_eq!(config.bn.score, ScoreKind::LogLikelihood);
    assert_eq!(config.bn.penalization, Penalization::Aic);
    assert_eq!(config.ctbn.penalization, Penalization::Aic);

    std::fs::remove_dir_all(&dir).unwrap();
}
