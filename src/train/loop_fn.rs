use std::sync::atomic::Ordering;
use std::time::Instant;

use log::{info, warn};

use crate::activation::activation::Activation;
use crate::checkpoint::state::Checkpoint;
use crate::data::partition::Partition;
use crate::error::Result;
use crate::loss::loss_type::Cost;
use crate::network::network::ParameterStore;
use crate::optim::sgd::Sgd;
use crate::train::generation_stats::GenerationStats;
use crate::train::train_config::TrainConfig;
use crate::train::worker::run_generation;

/// Outcome of a `train_loop` run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    /// Generation whose average cost was lowest, `None` if no generation
    /// ever produced a finite cost.
    pub best_generation: Option<usize>,
    pub best_cost: f64,
    pub last_cost: f64,
    pub generations_run: usize,
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `store` for `config.generations` full-batch generations and leaves
/// it holding the best parameters seen.
///
/// Each generation runs every shard of `partition` on its own worker, applies
/// one gradient descent step, then compares the generation's average cost
/// with the best so far. On a new best the freshly updated parameters are
/// captured. When the loop ends the captured parameters are restored.
///
/// # Early termination
/// The loop stops early if:
/// - `config.stop_flag` is set (checked before each generation), **or**
/// - the `progress_tx` receiver has been dropped.
///
/// A worker failure aborts the run with the error; the store is then left as
/// the failed generation found it.
pub fn train_loop<A, C>(
    store: &mut ParameterStore,
    partition: &Partition,
    activation: &A,
    cost: &C,
    config: &TrainConfig,
) -> Result<TrainReport>
where
    A: Activation + ?Sized,
    C: Cost + ?Sized,
{
    let optimizer = Sgd::new(config.learning_rate);
    let mut best = Checkpoint::capture(store)?;
    let mut report = TrainReport {
        best_generation: None,
        best_cost: f64::INFINITY,
        last_cost: f64::NAN,
        generations_run: 0,
    };

    for generation in 0..config.generations {
        if let Some(ref flag) = config.stop_flag {
            if flag.load(Ordering::Relaxed) {
                warn!("stop requested, ending training before generation {generation}");
                break;
            }
        }

        let t_start = Instant::now();

        let total = run_generation(store, partition, activation, cost, generation)?;
        optimizer.step(store, partition.len());
        let average_cost = total / partition.len() as f64;

        report.last_cost = average_cost;
        report.generations_run += 1;
        info!("generation {generation}: average cost {average_cost}");

        if average_cost < report.best_cost {
            report.best_cost = average_cost;
            report.best_generation = Some(generation);
            best.capture_into(store)?;
        }

        let stats = GenerationStats {
            generation,
            total_generations: config.generations,
            average_cost,
            best_cost: report.best_cost,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };

        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                warn!("progress receiver dropped, ending training after generation {generation}");
                break;
            }
        }
    }

    best.restore(store)?;
    match report.best_generation {
        Some(generation) => info!(
            "restored parameters from generation {generation} (average cost {})",
            report.best_cost
        ),
        None => warn!("no generation improved on the initial parameters"),
    }
    Ok(report)
}
