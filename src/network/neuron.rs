/// Weighted edge to a neuron of a later layer, addressed by its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub(crate) target: usize,
    pub(crate) weight: f64,
}

impl Connection {
    pub fn new(target: usize, weight: f64) -> Connection {
        Connection { target, weight }
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// One unit of the network. Owns its outgoing connections; per-thread
/// scratch lives in the store's `ThreadSlot`s.
#[derive(Debug, Clone, PartialEq)]
pub struct Neuron {
    pub(crate) bias: f64,
    pub(crate) position: usize,
    pub(crate) connections: Vec<Connection>,
}

impl Neuron {
    pub fn new(position: usize, bias: f64) -> Neuron {
        Neuron { bias, position, connections: Vec::new() }
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Index of the first connection pointing at `target`.
    pub fn connection_index(&self, target: usize) -> Option<usize> {
        self.connections.iter().position(|c| c.target == target)
    }
}

/// Per-thread scratch for every neuron and connection of the network,
/// indexed by neuron position (and connection index for `weight_grad`).
///
/// Each worker owns exactly one slot for the duration of a generation, so
/// concurrent workers never write to the same memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadSlot {
    pub(crate) input_accum: Vec<f64>,
    pub(crate) pre_activation: Vec<f64>,
    pub(crate) delta: Vec<f64>,
    pub(crate) bias_grad: Vec<f64>,
    pub(crate) weight_grad: Vec<Vec<f64>>,
}

impl ThreadSlot {
    /// Running pre-activation sum; equals the bias between examples.
    pub fn input_accum(&self, position: usize) -> f64 {
        self.input_accum[position]
    }

    /// Pre-activation recorded by the last forward pass on this thread.
    pub fn pre_activation(&self, position: usize) -> f64 {
        self.pre_activation[position]
    }

    pub fn delta(&self, position: usize) -> f64 {
        self.delta[position]
    }

    pub fn bias_grad(&self, position: usize) -> f64 {
        self.bias_grad[position]
    }

    pub fn weight_grad(&self, position: usize, connection: usize) -> f64 {
        self.weight_grad[position][connection]
    }
}
