use serde::{Serialize, Deserialize};

/// Per-generation statistics emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the loop
/// sends one `GenerationStats` after every completed generation, once the
/// parameters have been updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// 0-based generation number.
    pub generation: usize,
    /// Total generations requested for this run.
    pub total_generations: usize,
    /// Mean cost per example in this generation, before the update.
    pub average_cost: f64,
    /// Lowest average cost seen so far, this generation included.
    pub best_cost: f64,
    /// Wall-clock duration of this generation in milliseconds.
    pub elapsed_ms: u64,
}
