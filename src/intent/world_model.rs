//! WorldModel: a small learned reward predictor.
//!
//! A two-layer perceptron (256 inputs, 64 hidden units, one output, sigmoid
//! activations) mapping an activation to a reward in `(0, 1)`. Activated
//! prototype indices are folded onto the input layer modulo [`INPUT_SIZE`],
//! so any bank size works.
//!
//! Weights start from a seeded Xavier-uniform draw and are refined online
//! with [`WorldModel::train`], one backpropagation step per observed reward.
//!
//! ```rust
//! use sentra::intent::{RewardOracle, WorldModel};
//!
//! let mut model = WorldModel::new(7);
//! let before = model.predict(&[3, 40, 900]).unwrap();
//! for _ in 0..100 {
//!     model.train(&[3, 40, 900], 1.0);
//! }
//! assert!(model.predict(&[3, 40, 900]).unwrap() > before);
//! ```

use super::oracle::{OracleError, RewardOracle};
use crate::error::{Result, SentraError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Width of the input layer.
pub const INPUT_SIZE: usize = 256;

/// Width of the hidden layer.
pub const HIDDEN_SIZE: usize = 64;

/// Default step size for [`WorldModel::train`].
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// Connection weights, row-major by source unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    /// `INPUT_SIZE` rows of `HIDDEN_SIZE`
    pub hidden: Vec<Vec<f64>>,
    /// `HIDDEN_SIZE` rows of one
    pub output: Vec<Vec<f64>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Biases {
    pub hidden: Vec<f64>,
    pub output: Vec<f64>,
}

/// Learned reward predictor over activated prototype indices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldModel {
    weights: Weights,
    biases: Biases,
    #[serde(default = "default_learning_rate")]
    learning_rate: f64,
}

fn default_learning_rate() -> f64 {
    DEFAULT_LEARNING_RATE
}

impl WorldModel {
    /// Fresh model with Xavier-uniform weights drawn from `seed`.
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let hidden = xavier(&mut rng, INPUT_SIZE, HIDDEN_SIZE);
        let output = xavier(&mut rng, HIDDEN_SIZE, 1);
        Self {
            weights: Weights { hidden, output },
            biases: Biases {
                hidden: vec![0.0; HIDDEN_SIZE],
                output: vec![0.0],
            },
            learning_rate: DEFAULT_LEARNING_RATE,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Retune the step size, e.g. from a homeostatic regulator.
    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn biases(&self) -> &Biases {
        &self.biases
    }

    /// Predicted reward for the activation.
    pub fn reward(&self, activated: &[usize]) -> f64 {
        let input = one_hot(activated);
        self.forward(&input).1
    }

    /// One backpropagation step toward `actual` on squared error.
    ///
    /// Returns `actual - prediction` measured before the step.
    pub fn train(&mut self, activated: &[usize], actual: f64) -> f64 {
        let input = one_hot(activated);
        let (hidden, predicted) = self.forward(&input);
        let error = actual - predicted;

        let output_delta = error * predicted * (1.0 - predicted);
        let hidden_deltas: Vec<f64> = hidden
            .iter()
            .zip(&self.weights.output)
            .map(|(h, w)| output_delta * w[0] * h * (1.0 - h))
            .collect();

        let rate = self.learning_rate;
        for (w, h) in self.weights.output.iter_mut().zip(&hidden) {
            w[0] += rate * output_delta * h;
        }
        self.biases.output[0] += rate * output_delta;

        for (row, x) in self.weights.hidden.iter_mut().zip(&input) {
            if *x == 0.0 {
                continue;
            }
            for (w, delta) in row.iter_mut().zip(&hidden_deltas) {
                *w += rate * delta * x;
            }
        }
        for (b, delta) in self.biases.hidden.iter_mut().zip(&hidden_deltas) {
            *b += rate * delta;
        }

        debug!(predicted, actual, error, "world model trained");
        error
    }

    fn forward(&self, input: &[f64]) -> (Vec<f64>, f64) {
        let hidden: Vec<f64> = (0..HIDDEN_SIZE)
            .map(|j| {
                let sum = input
                    .iter()
                    .zip(&self.weights.hidden)
                    .filter(|(x, _)| **x != 0.0)
                    .fold(self.biases.hidden[j], |acc, (x, row)| acc + x * row[j]);
                sigmoid(sum)
            })
            .collect();
        let sum = hidden
            .iter()
            .zip(&self.weights.output)
            .fold(self.biases.output[0], |acc, (h, w)| acc + h * w[0]);
        (hidden, sigmoid(sum))
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Parse a model from JSON, checking every layer's shape.
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load a saved model. A missing or empty file yields `WorldModel::new(seed)`.
    pub fn load<P: AsRef<Path>>(path: P, seed: u64) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "no saved world model, initialising");
            return Ok(Self::new(seed));
        }
        let json = std::fs::read_to_string(path)?;
        if json.trim().is_empty() {
            info!(path = %path.display(), "empty world model file, initialising");
            return Ok(Self::new(seed));
        }
        let model = Self::from_json(&json)?;
        info!(path = %path.display(), "loaded world model");
        Ok(model)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        check_len(self.weights.hidden.len(), INPUT_SIZE)?;
        for row in &self.weights.hidden {
            check_len(row.len(), HIDDEN_SIZE)?;
        }
        check_len(self.weights.output.len(), HIDDEN_SIZE)?;
        for row in &self.weights.output {
            check_len(row.len(), 1)?;
        }
        check_len(self.biases.hidden.len(), HIDDEN_SIZE)?;
        check_len(self.biases.output.len(), 1)
    }
}

impl RewardOracle for WorldModel {
    fn predict(&self, activated: &[usize]) -> std::result::Result<f64, OracleError> {
        Ok(self.reward(activated))
    }
}

fn check_len(got: usize, expected: usize) -> Result<()> {
    if got == expected {
        Ok(())
    } else {
        Err(SentraError::DimensionMismatch { expected, got })
    }
}

fn xavier<R: Rng>(rng: &mut R, fan_in: usize, fan_out: usize) -> Vec<Vec<f64>> {
    let scale = (2.0 / (fan_in + fan_out) as f64).sqrt();
    (0..fan_in)
        .map(|_| {
            (0..fan_out)
                .map(|_| rng.gen_range(-1.0..1.0f64) * scale)
                .collect()
        })
        .collect()
}

fn one_hot(activated: &[usize]) -> Vec<f64> {
    let mut input = vec![0.0; INPUT_SIZE];
    for &i in activated {
        input[i % INPUT_SIZE] = 1.0;
    }
    input
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
