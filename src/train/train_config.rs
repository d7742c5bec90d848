use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use crate::network::spec::NetworkSpec;
use crate::train::generation_stats::GenerationStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `generations`   : full-batch updates to run
/// - `learning_rate` : gradient descent step size
/// - `progress_tx`   : optional channel sender; one `GenerationStats` is sent
///                     per completed generation. If the receiver is dropped
///                     the loop stops after that generation.
/// - `stop_flag`     : optional atomic flag; when set to `true` from another
///                     thread the loop stops before the next generation.
pub struct TrainConfig {
    pub generations: usize,
    pub learning_rate: f64,
    pub progress_tx: Option<mpsc::Sender<GenerationStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with no progress channel and no stop flag.
    pub fn new(generations: usize, learning_rate: f64) -> Self {
        TrainConfig {
            generations,
            learning_rate,
            progress_tx: None,
            stop_flag: None,
        }
    }
}

impl From<&NetworkSpec> for TrainConfig {
    fn from(spec: &NetworkSpec) -> Self {
        TrainConfig::new(spec.generations, spec.learning_rate)
    }
}
