use approx::assert_relative_eq;
use ctbnc_core::{DatasetError, Observation, ParameterEstimator, Sequence};
use ctbnc_learning::{LogLikelihood, Penalization, StructureScore};
use ctbnc_models::{
    ClassifierConfig, ClassifierError, ConstraintKind, CtbncSampler, MultiCtbnc, ScoreKind, SearchConfig,
    SubModelConfig,
};

fn accuracy(model: &MultiCtbnc, seed: u64) -> f64 {
    let test = CtbncSampler::two_class_bridge().sample_dataset(200, seed).unwrap();
    let predictions = model.predict(&test, false).unwrap();
    let correct = test
        .sequences()
        .iter()
        .zip(&predictions)
        .filter(|(sequence, prediction)| sequence.class_values() == &prediction.class_configuration)
        .count();
    correct as f64 / test.len() as f64
}

#[test]
fn naive_bayes_recovers_exactly_the_bridge_arcs() {
    let sampler = CtbncSampler::two_class_bridge();
    let train = sampler.sample_dataset(150, 7).unwrap();
    let config = ClassifierConfig {
        ctbn: SubModelConfig { constraint: ConstraintKind::NaiveBayes, ..Default::default() },
        ..Default::default()
    };
    let model = MultiCtbnc::learn(&train, &config).unwrap();

    let ix = model.indexer();
    let m = model.adjacency_matrix();
    for (parent, child) in sampler.true_arcs() {
        let (from, to) = (ix.index_of(&parent).unwrap(), ix.index_of(&child).unwrap());
        assert!(m.has_arc(from, to), "{parent} -> {child} missing");
    }

    // exactly every class -> feature arc
    let mut expected: Vec<(usize, usize)> = ix
        .class_indices()
        .into_iter()
        .flat_map(|c| ix.feature_indices().into_iter().map(move |f| (c, f)))
        .collect();
    expected.sort_unstable();
    let mut learned = model.ctbn().network().structure().arcs();
    learned.sort_unstable();
    assert_eq!(learned, expected);
    assert_eq!(learned.len(), 4);
    assert!(learned.iter().all(|&(from, _)| ix.is_class(from)));
    assert!(accuracy(&model, 1_000) > 0.7);
}

#[test]
fn hill_climbing_recovers_the_bridge_and_scores_no_worse_than_truth() {
    let sampler = CtbncSampler::two_class_bridge();
    let train = sampler.sample_dataset(200, 11).unwrap();
    let config = ClassifierConfig::default();
    let model = MultiCtbnc::learn(&train, &config).unwrap();

    let ix = model.indexer();
    let learned = model.ctbn().network().structure().clone();
    for (parent, child) in sampler.true_arcs() {
        assert!(learned.has_arc(ix.index_of(&parent).unwrap(), ix.index_of(&child).unwrap()), "{model}");
    }
    // no arc may point into a class variable
    for class in ix.class_indices() {
        assert!(learned.parents(class).iter().all(|&p| ix.is_class(p)));
    }

    let score = LogLikelihood::new(Penalization::Bic, ParameterEstimator::MaximumLikelihood);
    let mut truth = model.ctbn().network().clone();
    let arcs: Vec<(usize, usize)> = sampler
        .true_arcs()
        .iter()
        .map(|(p, c)| (ix.index_of(p).unwrap(), ix.index_of(c).unwrap()))
        .collect();
    truth.set_structure(ctbnc_core::AdjacencyMatrix::from_arcs(ix.len(), &arcs));
    let (_, ctbn_outcome) = model.search_outcomes();
    assert!(ctbn_outcome.score >= score.compute(&truth, &train) - 1e-9);

    assert!(accuracy(&model, 2_000) > 0.7);
}

#[test]
fn probabilities_form_a_distribution() {
    let train = CtbncSampler::two_class_bridge().sample_dataset(80, 3).unwrap();
    let config = ClassifierConfig {
        ctbn: SubModelConfig { score: ScoreKind::BayesianDirichlet, ..Default::default() },
        estimator: ParameterEstimator::bayesian(1.0, 1.0, 0.01),
        ..Default::default()
    };
    let model = MultiCtbnc::learn(&train, &config).unwrap();
    let test = CtbncSampler::two_class_bridge().sample_dataset(10, 4).unwrap();

    for prediction in model.predict(&test, true).unwrap() {
        let probabilities = prediction.probabilities.unwrap();
        assert_eq!(probabilities.len(), 4);
        let total: f64 = probabilities.iter().map(|p| p.probability).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-9);
        let best = probabilities
            .iter()
            .fold(&probabilities[0], |best, p| if p.probability > best.probability { p } else { best });
        assert_eq!(best.configuration, prediction.class_configuration);
    }
}

#[test]
fn trajectories_impossible_under_a_class_rule_it_out() {
    let sequence = |class: &str, states: [&str; 6]| {
        let obs = states
            .iter()
            .enumerate()
            .map(|(t, x)| Observation::from_pairs(t as f64, [("C", class), ("X", *x)]))
            .collect();
        Sequence::new(vec!["C".into()], vec!["X".into()], obs).unwrap()
    };
    let flipping = ["0", "1", "0", "1", "0", "1"];
    let train = ctbnc_core::Dataset::new(vec![
        sequence("a", flipping),
        sequence("a", ["1", "0", "1", "0", "1", "0"]),
        sequence("b", ["0"; 6]),
        sequence("b", ["1"; 6]),
    ])
    .unwrap();
    let config = ClassifierConfig {
        ctbn: SubModelConfig { constraint: ConstraintKind::NaiveBayes, ..Default::default() },
        ..Default::default()
    };
    let model = MultiCtbnc::learn(&train, &config).unwrap();
    let cim = model.cim("X").unwrap();
    // configuration 1 is class b, which never leaves its state
    assert_eq!(cim.exit_rate(1, 0), 0.0);
    assert_eq!(cim.exit_rate(1, 1), 0.0);

    let test = ctbnc_core::Dataset::new(vec![sequence("a", flipping)]).unwrap();
    let prediction = model.predict(&test, true).unwrap().remove(0);
    assert_eq!(prediction.class_configuration.get("C").map(String::as_str), Some("a"));
    for p in prediction.probabilities.unwrap() {
        let expected = if p.configuration["C"] == "a" { 1.0 } else { 0.0 };
        assert_relative_eq!(p.probability, expected, epsilon = 1e-12);
    }
}

#[test]
fn test_sets_take_the_training_state_universe() {
    let train = CtbncSampler::two_class_bridge().sample_dataset(30, 8).unwrap();
    let model = MultiCtbnc::learn(&train, &ClassifierConfig::default()).unwrap();

    let obs = vec![
        Observation::from_pairs(0.0, [("X", "0"), ("Y", "0")]),
        Observation::from_pairs(1.0, [("X", "0"), ("Y", "0")]),
    ];
    let unlabeled = Sequence::new(vec!["C1".into(), "C2".into()], vec!["X".into(), "Y".into()], obs).unwrap();
    let test = ctbnc_core::Dataset::new(vec![unlabeled]).unwrap();
    assert_eq!(test.states("X").unwrap(), vec!["0".to_string()]);
    assert!(test.states("C1").unwrap().is_empty());

    let aligned = model.align(test);
    assert_eq!(aligned.states("X").unwrap(), vec!["0".to_string(), "1".to_string()]);
    assert_eq!(aligned.states("C1").unwrap(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(model.predict(&aligned, false).unwrap().len(), 1);
}

#[test]
fn other_searches_and_scores_learn() {
    let train = CtbncSampler::two_class_bridge().sample_dataset(60, 5).unwrap();
    let configs = [
        ClassifierConfig {
            search: SearchConfig::RandomRestart { restarts: 2, perturbations: 3, seed: 17 },
            ctbn: SubModelConfig { constraint: ConstraintKind::MaxK { k: 1 }, ..Default::default() },
            ..Default::default()
        },
        ClassifierConfig {
            search: SearchConfig::Hybrid { skeleton: vec![("C1".into(), "X".into()), ("C2".into(), "Y".into())] },
            ..Default::default()
        },
        ClassifierConfig {
            ctbn: SubModelConfig { score: ScoreKind::ConditionalLogLikelihood, ..Default::default() },
            bn: SubModelConfig { constraint: ConstraintKind::Empty, ..Default::default() },
            ..Default::default()
        },
    ];
    for config in &configs {
        let model = MultiCtbnc::learn(&train, config).unwrap();
        assert!(model.cim("X").is_some() && model.cim("Y").is_some());
        assert!(model.cpt("C1").is_some() && model.cpt("C2").is_some());
        assert!(model.cim("C1").is_none());
        assert_eq!(model.predict(&train, false).unwrap().len(), train.len());
    }
}

#[test]
fn malformed_input_is_rejected_before_search() {
    let single = |class: &str| {
        let obs = vec![Observation::from_pairs(0.0, [("C", class), ("X", "0")])];
        Sequence::new(vec!["C".into()], vec!["X".into()], obs).unwrap()
    };
    let ds = ctbnc_core::Dataset::new(vec![single("a"), single("b")]).unwrap();
    let err = MultiCtbnc::learn(&ds, &ClassifierConfig::default()).unwrap_err();
    assert!(matches!(err, ClassifierError::Dataset(DatasetError::TooFewObservations { sequence: 0, .. })));

    let train = CtbncSampler::two_class_bridge().sample_dataset(5, 5).unwrap();
    let config = ClassifierConfig {
        search: SearchConfig::Hybrid { skeleton: vec![("C1".into(), "Q".into())] },
        ..Default::default()
    };
    assert!(matches!(
        MultiCtbnc::learn(&train, &config),
        Err(ClassifierError::Dataset(DatasetError::MissingVariable(name))) if name == "Q"
    ));

    let config = ClassifierConfig {
        bn: SubModelConfig { score: ScoreKind::ConditionalLogLikelihood, ..Default::default() },
        ..Default::default()
    };
    assert!(matches!(MultiCtbnc::learn(&train, &config), Err(ClassifierError::Configuration(_))));
}
