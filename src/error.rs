use std::collections::TryReserveError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NetworkError>;

/// Every failure the trainer can report.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("allocation of {requested} elements failed while {operation}")]
    Allocation {
        operation: &'static str,
        requested: usize,
        #[source]
        source: TryReserveError,
    },
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    Concurrency(#[from] ConcurrencyError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Structural errors. The store is left untouched when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("neuron position {position} is out of range (network has {len} neurons)")]
    PositionOutOfRange { position: usize, len: usize },
    #[error("no connection from neuron {from} to neuron {to}")]
    ConnectionNotFound { from: usize, to: usize },
    #[error("neuron {position} is in the output layer and cannot have outgoing connections")]
    OutputSource { position: usize },
    #[error("connection {from} -> {to} does not point forward")]
    BackwardConnection { from: usize, to: usize },
    #[error("expected {expected} neurons, found {found}")]
    NeuronCountMismatch { expected: usize, found: usize },
    #[error("neuron {position} has {found} connections, snapshot holds {expected}")]
    ConnectionCountMismatch {
        position: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Error)]
pub enum ConcurrencyError {
    #[error("failed to spawn worker {thread} in generation {generation}: {source}")]
    Spawn {
        thread: usize,
        generation: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("worker {thread} panicked in generation {generation}")]
    WorkerPanicked { thread: usize, generation: usize },
    #[error("store has {slots} thread slots but the data is split into {shards} shards")]
    SlotCountMismatch { slots: usize, shards: usize },
    #[error("thread slot {thread} does not exist (store has {slots} slots)")]
    NoSuchSlot { thread: usize, slots: usize },
}

/// Malformed training data or persisted networks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataError {
    #[error("line {line}: '{value}' is not a number")]
    InvalidNumber { line: usize, value: String },
    #[error("line {line}: expected {expected} columns, found {found}")]
    RowWidth {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: {found} columns leave no room for inputs before {outputs} outputs")]
    TooFewColumns {
        line: usize,
        found: usize,
        outputs: usize,
    },
    #[error("no examples to train on")]
    Empty,
    #[error("cannot split examples across zero threads")]
    ZeroThreads,
    #[error("example {index}: input has {found} values, expected {expected}")]
    InputWidth {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("example {index}: output has {found} values, output layer has {expected}")]
    OutputWidth {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("example has {found} target values, output layer has {expected}")]
    TargetWidth { expected: usize, found: usize },
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("a network needs at least an input and an output layer, got {0} layers")]
    TooFewLayers(usize),
    #[error("layer {0} has no neurons")]
    EmptyLayer(usize),
    #[error("thread count must be at least 1")]
    ZeroThreads,
    #[error("learning rate must be finite and positive, got {0}")]
    LearningRate(f64),
    #[error("layer sizes {0:?} add up to more neurons than fit in memory")]
    TooManyNeurons(Vec<usize>),
}

/// Reserves room for `len` elements, reporting failure instead of aborting.
pub(crate) fn try_vec<T>(len: usize, operation: &'static str) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|source| NetworkError::Allocation {
            operation,
            requested: len,
            source,
        })?;
    Ok(v)
}

/// Fallible `vec![value; len]`.
pub(crate) fn try_filled<T: Clone>(value: T, len: usize, operation: &'static str) -> Result<Vec<T>> {
    let mut v = try_vec(len, operation)?;
    v.resize(len, value);
    Ok(v)
}
