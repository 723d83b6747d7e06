use crate::ClassifierError;
use ctbnc_core::node::configuration_index;
use ctbnc_core::{Cim, Dataset, DatasetError, Observation, Sequence, Time, Variable};
use nalgebra::DMatrix;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Exp};
use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use tracing::debug;

/// Independent prior over the states of one class variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassPrior {
    pub variable: Variable,
    pub probabilities: Vec<f64>,
}

/// Generative process of one feature. The CIM is indexed by the
/// configuration of `parents` in the order given, first parent least
/// significant. Parents may be class variables or other features.
#[derive(Clone, Debug)]
pub struct FeatureProcess {
    pub variable: Variable,
    pub parents: Vec<String>,
    pub cim: Cim,
}

#[derive(Copy, Clone, Debug)]
enum Parent {
    Class(usize),
    Feature(usize),
}

/// Draws labeled trajectories from a known multi-dimensional CTBN classifier.
///
/// Class values are drawn once per sequence; features then evolve jointly:
/// the next event time is exponential in the summed exit rates, the feature
/// that moves is chosen proportionally to its rate and its destination from
/// the CIM's transition distribution.
#[derive(Clone, Debug)]
pub struct CtbncSampler {
    classes: Vec<ClassPrior>,
    features: Vec<FeatureProcess>,
    parents: Vec<Vec<Parent>>,
    duration: Time,
    max_transitions: usize,
}

/// Per-sequence RNG, independent of thread scheduling.
pub fn sequence_rng(global_seed: u64, sequence_id: u64) -> ChaCha20Rng {
    let seed = global_seed.wrapping_add(sequence_id.wrapping_mul(0x9e3779b97f4a7c15));
    ChaCha20Rng::seed_from_u64(seed)
}

/// Index drawn proportionally to non-negative `weights`.
fn sample_index(weights: &[f64], rng: &mut impl Rng) -> usize {
    let total: f64 = weights.iter().sum();
    let mut u = rng.gen::<f64>() * total;
    for (i, &w) in weights.iter().enumerate() {
        if u < w {
            return i;
        }
        u -= w;
    }
    weights.iter().rposition(|&w| w > 0.0).unwrap_or(0)
}

impl CtbncSampler {
    pub fn new(
        classes: Vec<ClassPrior>,
        features: Vec<FeatureProcess>,
        duration: Time,
    ) -> Result<Self, ClassifierError> {
        let invalid = |msg: String| ClassifierError::Configuration(msg);

        for prior in &classes {
            if prior.probabilities.len() != prior.variable.cardinality() {
                return Err(invalid(format!("prior of '{}' does not match its states", prior.variable.name())));
            }
        }

        let mut parents = Vec::with_capacity(features.len());
        for process in &features {
            let mut resolved = Vec::with_capacity(process.parents.len());
            let mut cardinalities = Vec::with_capacity(process.parents.len());
            for name in &process.parents {
                if let Some(i) = classes.iter().position(|c| c.variable.name() == name.as_str()) {
                    resolved.push(Parent::Class(i));
                    cardinalities.push(classes[i].variable.cardinality());
                } else if let Some(i) = features.iter().position(|f| f.variable.name() == name.as_str()) {
                    resolved.push(Parent::Feature(i));
                    cardinalities.push(features[i].variable.cardinality());
                } else {
                    return Err(invalid(format!("unknown parent '{name}' of '{}'", process.variable.name())));
                }
            }
            let expected: usize = cardinalities.iter().product();
            if process.cim.num_configurations() != expected
                || process.cim.cardinality() != process.variable.cardinality()
            {
                return Err(invalid(format!("CIM of '{}' does not match its parents", process.variable.name())));
            }
            parents.push(resolved);
        }

        Ok(Self { classes, features, parents, duration, max_transitions: 100_000 })
    }

    /// Two binary classes and two binary features: `C1 -> X` changes how fast
    /// X flips, `C2 -> Y` changes which state Y prefers.
    pub fn two_class_bridge() -> Self {
        let binary = |name: &str| Variable::new(name, ["0", "1"]);
        let flip = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]);
        let classes = vec![
            ClassPrior { variable: Variable::new("C1", ["a", "b"]), probabilities: vec![0.5, 0.5] },
            ClassPrior { variable: Variable::new("C2", ["u", "v"]), probabilities: vec![0.5, 0.5] },
        ];
        let features = vec![
            FeatureProcess {
                variable: binary("X"),
                parents: vec!["C1".into()],
                cim: Cim::new(DMatrix::from_row_slice(2, 2, &[3.0, 3.0, 0.5, 0.5]), vec![flip.clone(); 2]),
            },
            FeatureProcess {
                variable: binary("Y"),
                parents: vec!["C2".into()],
                cim: Cim::new(DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.3, 2.0]), vec![flip; 2]),
            },
        ];
        let parents = vec![vec![Parent::Class(0)], vec![Parent::Class(1)]];
        Self { classes, features, parents, duration: 10.0, max_transitions: 100_000 }
    }

    pub fn with_duration(mut self, duration: Time) -> Self {
        self.duration = duration;
        self
    }

    pub fn classes(&self) -> &[ClassPrior] {
        &self.classes
    }

    pub fn features(&self) -> &[FeatureProcess] {
        &self.features
    }

    /// Generating arcs as `(parent, feature)` names.
    pub fn true_arcs(&self) -> Vec<(String, String)> {
        self.features
            .iter()
            .flat_map(|f| f.parents.iter().map(move |p| (p.clone(), f.variable.name().to_string())))
            .collect()
    }

    fn configuration(&self, feature: usize, class_states: &[usize], feature_states: &[usize]) -> usize {
        let (cardinalities, states): (Vec<usize>, Vec<usize>) = self.parents[feature]
            .iter()
            .map(|parent| match *parent {
                Parent::Class(i) => (self.classes[i].variable.cardinality(), class_states[i]),
                Parent::Feature(i) => (self.features[i].variable.cardinality(), feature_states[i]),
            })
            .unzip();
        configuration_index(&cardinalities, &states)
    }

    fn observation(&self, time: Time, class_states: &[usize], feature_states: &[usize]) -> Observation {
        let classes = self.classes.iter().zip(class_states).map(|(c, &s)| (c.variable.name(), c.variable.state(s)));
        let features = self.features.iter().zip(feature_states).map(|(f, &s)| (f.variable.name(), f.variable.state(s)));
        Observation::from_pairs(
            time,
            classes.chain(features).filter_map(|(name, value)| value.map(|v| (name, v))),
        )
    }

    /// Simulate one labeled sequence on `[0, duration]`.
    pub fn sample_sequence(&self, rng: &mut impl Rng) -> Result<Sequence, DatasetError> {
        let class_states: Vec<usize> = self.classes.iter().map(|c| sample_index(&c.probabilities, rng)).collect();
        let mut state: Vec<usize> = self
            .features
            .iter()
            .map(|f| rng.gen_range(0..f.variable.cardinality().max(1)))
            .collect();

        let mut t = 0.0;
        let mut observations = vec![self.observation(t, &class_states, &state)];
        for _ in 0..self.max_transitions {
            let configurations: Vec<usize> = (0..self.features.len())
                .map(|i| self.configuration(i, &class_states, &state))
                .collect();
            let rates: Vec<f64> = self
                .features
                .iter()
                .enumerate()
                .map(|(i, f)| f.cim.exit_rate(configurations[i], state[i]))
                .collect();
            let Ok(waiting) = Exp::new(rates.iter().sum::<f64>()) else {
                break;
            };
            let next_t = t + waiting.sample(rng);
            if next_t >= self.duration || next_t <= t {
                break;
            }
            t = next_t;

            let moving = sample_index(&rates, rng);
            let cim = &self.features[moving].cim;
            let destinations: Vec<f64> = (0..cim.cardinality())
                .map(|to| cim.transition_probability(configurations[moving], state[moving], to))
                .collect();
            state[moving] = sample_index(&destinations, rng);
            observations.push(self.observation(t, &class_states, &state));
        }
        if self.duration > t {
            observations.push(self.observation(self.duration, &class_states, &state));
        }

        Sequence::new(
            self.classes.iter().map(|c| c.variable.name().to_string()).collect(),
            self.features.iter().map(|f| f.variable.name().to_string()).collect(),
            observations,
        )
    }

    /// Sample `n` sequences in parallel, each with its own seeded RNG.
    pub fn sample_dataset(&self, n: usize, seed: u64) -> Result<Dataset, DatasetError> {
        let sequences = (0..n)
            .into_par_iter()
            .map(|id| {
                let mut rng = sequence_rng(seed, id as u64);
                self.sample_sequence(&mut rng)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let observations: usize = sequences.iter().map(|s| s.len()).sum();
        debug!(sequences = n, observations, seed, "sampled dataset");
        Dataset::new(sequences)
    }
}
