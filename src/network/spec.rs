use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{ConfigError, Result};
use crate::loss::loss_type::LossType;
use crate::network::builder::{Initializer, NetworkBuilder};
use crate::network::network::Layout;

/// A serializable description of a network and how to train it.
///
/// Fields:
/// - `layers`        : neurons per layer, input layer first
/// - `threads`       : worker threads (and per-thread scratch slots)
/// - `learning_rate` : gradient descent step size
/// - `generations`   : full-batch updates to run
/// - `activation`    : applied by every neuron
/// - `loss`          : cost of each output against its target
/// - `initializer`   : source of the initial biases and weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSpec {
    pub layers: Vec<usize>,
    pub threads: usize,
    pub learning_rate: f64,
    pub generations: usize,
    pub activation: ActivationFunction,
    pub loss: LossType,
    pub initializer: Initializer,
}

impl Default for NetworkSpec {
    fn default() -> Self {
        NetworkSpec {
            layers: vec![3, 1],
            threads: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            learning_rate: 1e-3,
            generations: 30_000,
            activation: ActivationFunction::default(),
            loss: LossType::default(),
            initializer: Initializer::default(),
        }
    }
}

impl NetworkSpec {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        Layout::new(self.layers.clone())?;
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ConfigError::LearningRate(self.learning_rate));
        }
        Ok(())
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().copied().unwrap_or(0)
    }

    pub fn builder(&self) -> Result<NetworkBuilder> {
        self.validate()?;
        NetworkBuilder::new(self.layers.clone(), self.threads, self.initializer)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a spec; missing fields take their defaults.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let spec: NetworkSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }
}
