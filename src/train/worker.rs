use std::thread;

use log::{debug, warn};

use crate::activation::activation::Activation;
use crate::data::dataset::Example;
use crate::data::partition::Partition;
use crate::error::{try_vec, ConcurrencyError, NetworkError, Result};
use crate::loss::loss_type::Cost;
use crate::network::network::{ParameterStore, Parameters};
use crate::network::neuron::ThreadSlot;
use crate::train::engine::run_shard;

/// Everything one worker needs for a generation.
///
/// Aligned to a full cache line so records of neighbouring workers never
/// share one.
#[repr(align(128))]
struct WorkerTask<'a> {
    thread: usize,
    shard: &'a [Example],
    slot: &'a mut ThreadSlot,
}

impl WorkerTask<'_> {
    fn run<A, C>(self, params: &Parameters, activation: &A, cost: &C) -> Result<f64>
    where
        A: Activation + ?Sized,
        C: Cost + ?Sized,
    {
        run_shard(params, self.slot, activation, cost, self.shard)
    }
}

/// Runs the forward/backward pass of one generation: one scoped thread per
/// shard, each writing only to its own slot, all joined before returning.
///
/// Returns the summed cost over every example, added up in thread order so
/// the result does not depend on scheduling.
///
/// A spawn failure, a panicking worker or an example the engine rejects
/// fails the generation. Workers that were already running are still joined
/// before the error is returned.
pub fn run_generation<A, C>(
    store: &mut ParameterStore,
    partition: &Partition,
    activation: &A,
    cost: &C,
    generation: usize,
) -> Result<f64>
where
    A: Activation + ?Sized,
    C: Cost + ?Sized,
{
    if store.thread_count() != partition.thread_count() {
        return Err(ConcurrencyError::SlotCountMismatch {
            slots: store.thread_count(),
            shards: partition.thread_count(),
        }
        .into());
    }

    let (params, slots) = store.split_for_workers();
    let mut tasks = try_vec(slots.len(), "allocating worker tasks")?;
    for (thread, (slot, shard)) in slots.iter_mut().zip(partition.shards()).enumerate() {
        tasks.push(WorkerTask { thread, shard, slot });
    }

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(tasks.len());
        let mut failure: Option<NetworkError> = None;

        for task in tasks {
            let thread = task.thread;
            let spawned = thread::Builder::new()
                .name(format!("worker-{thread}"))
                .spawn_scoped(scope, move || task.run(params, activation, cost));
            match spawned {
                Ok(handle) => handles.push((thread, handle)),
                Err(source) => {
                    warn!("could not spawn worker {thread} in generation {generation}: {source}");
                    failure = Some(ConcurrencyError::Spawn { thread, generation, source }.into());
                    break;
                }
            }
        }

        let mut total = 0.0;
        for (thread, handle) in handles {
            match handle.join() {
                Ok(Ok(shard_cost)) => total += shard_cost,
                Ok(Err(err)) => {
                    warn!("worker {thread} failed in generation {generation}: {err}");
                    if failure.is_none() {
                        failure = Some(err);
                    }
                }
                Err(_) => {
                    warn!("worker {thread} panicked in generation {generation}");
                    if failure.is_none() {
                        failure = Some(ConcurrencyError::WorkerPanicked { thread, generation }.into());
                    }
                }
            }
        }

        match failure {
            Some(err) => Err(err),
            None => {
                debug!("generation {generation}: workers joined, summed cost {total}");
                Ok(total)
            }
        }
    })
}
