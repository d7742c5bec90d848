use std::fmt;
use std::ops::Range;

use crate::error::{try_filled, try_vec, ConfigError, NetworkError, Result, TopologyError};
use crate::network::neuron::{Connection, Neuron, ThreadSlot};

/// Layer sizes plus the counts derived from them.
///
/// Immutable: a different set of layer sizes means a new `Layout`, so the
/// derived counts can never go stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    sizes: Vec<usize>,
    total: usize,
    working: usize,
}

impl Layout {
    pub fn new(sizes: Vec<usize>) -> std::result::Result<Layout, ConfigError> {
        if sizes.len() < 2 {
            return Err(ConfigError::TooFewLayers(sizes.len()));
        }
        if let Some(layer) = sizes.iter().position(|&n| n == 0) {
            return Err(ConfigError::EmptyLayer(layer));
        }
        let total = match sizes.iter().try_fold(0usize, |acc, &n| acc.checked_add(n)) {
            Some(total) => total,
            None => return Err(ConfigError::TooManyNeurons(sizes)),
        };
        let working = total - sizes[sizes.len() - 1];
        Ok(Layout { sizes, total, working })
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Number of neurons across all layers.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of neurons outside the output layer.
    pub fn working(&self) -> usize {
        self.working
    }

    pub fn input_size(&self) -> usize {
        self.sizes[0]
    }

    pub fn output_size(&self) -> usize {
        self.total - self.working
    }

    /// Positions occupied by `layer`.
    pub fn layer_range(&self, layer: usize) -> Range<usize> {
        let start: usize = self.sizes[..layer].iter().sum();
        start..start + self.sizes[layer]
    }

    pub fn output_range(&self) -> Range<usize> {
        self.working..self.total
    }
}

/// The shared, read-mostly half of the store: topology, biases and weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub(crate) layout: Layout,
    pub(crate) neurons: Vec<Neuron>,
}

impl Parameters {
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn neuron(&self, position: usize) -> Option<&Neuron> {
        self.neurons.get(position)
    }

    fn check_position(&self, position: usize) -> std::result::Result<(), TopologyError> {
        if position < self.neurons.len() {
            Ok(())
        } else {
            Err(TopologyError::PositionOutOfRange { position, len: self.neurons.len() })
        }
    }
}

/// Owns every neuron of the network plus one scratch slot per worker thread.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStore {
    pub(crate) params: Parameters,
    pub(crate) slots: Vec<ThreadSlot>,
}

impl ParameterStore {
    /// Assembles a store from neurons already ordered by position, creating
    /// `threads` fresh slots sized to the current topology.
    pub fn from_neurons(layout: Layout, neurons: Vec<Neuron>, threads: usize) -> Result<ParameterStore> {
        if threads == 0 {
            return Err(ConfigError::ZeroThreads.into());
        }
        if neurons.len() != layout.total() {
            return Err(TopologyError::NeuronCountMismatch {
                expected: layout.total(),
                found: neurons.len(),
            }
            .into());
        }
        let mut slots = try_vec(threads, "allocating thread slots")?;
        for _ in 0..threads {
            slots.push(new_slot(&neurons)?);
        }
        Ok(ParameterStore { params: Parameters { layout, neurons }, slots })
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn layout(&self) -> &Layout {
        &self.params.layout
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.params.neurons
    }

    pub fn neuron(&self, position: usize) -> Option<&Neuron> {
        self.params.neuron(position)
    }

    pub fn len(&self) -> usize {
        self.params.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.neurons.is_empty()
    }

    pub fn thread_count(&self) -> usize {
        self.slots.len()
    }

    /// # Panics
    ///
    /// Panics if `thread >= self.thread_count()`.
    pub fn slot(&self, thread: usize) -> &ThreadSlot {
        &self.slots[thread]
    }

    pub fn slots(&self) -> &[ThreadSlot] {
        &self.slots
    }

    /// Splits the store into the shared parameters and the per-thread slots,
    /// which can then be handed out to workers as disjoint `&mut` borrows.
    pub fn split_for_workers(&mut self) -> (&Parameters, &mut [ThreadSlot]) {
        (&self.params, &mut self.slots)
    }

    /// Sets a bias and rebases every thread's input accumulator on it.
    pub fn set_bias(&mut self, position: usize, bias: f64) -> Result<()> {
        self.params.check_position(position)?;
        self.params.neurons[position].bias = bias;
        for slot in &mut self.slots {
            slot.input_accum[position] = bias;
        }
        Ok(())
    }

    pub fn weight(&self, from: usize, to: usize) -> Option<f64> {
        let neuron = self.params.neuron(from)?;
        neuron.connection_index(to).map(|k| neuron.connections[k].weight)
    }

    pub fn set_weight(&mut self, from: usize, to: usize, weight: f64) -> Result<()> {
        self.params.check_position(from)?;
        let neuron = &mut self.params.neurons[from];
        let k = neuron
            .connection_index(to)
            .ok_or(TopologyError::ConnectionNotFound { from, to })?;
        neuron.connections[k].weight = weight;
        Ok(())
    }

    /// Appends a connection `from -> to`. Edges must point to a later
    /// position and may not leave the output layer, so the ascending-position
    /// forward pass stays a valid topological order.
    pub fn add_connection(&mut self, from: usize, to: usize, weight: f64) -> Result<()> {
        self.params.check_position(from)?;
        self.params.check_position(to)?;
        if from >= self.params.layout.working() {
            return Err(TopologyError::OutputSource { position: from }.into());
        }
        if to <= from {
            return Err(TopologyError::BackwardConnection { from, to }.into());
        }
        let neuron = &mut self.params.neurons[from];
        let alloc_err = |source| NetworkError::Allocation {
            operation: "adding a connection",
            requested: 1,
            source,
        };
        neuron.connections.try_reserve(1).map_err(alloc_err)?;
        for slot in &mut self.slots {
            slot.weight_grad[from].try_reserve(1).map_err(alloc_err)?;
        }
        neuron.connections.push(Connection::new(to, weight));
        for slot in &mut self.slots {
            slot.weight_grad[from].push(0.0);
        }
        Ok(())
    }

    /// Removes the first connection `from -> to`, along with its gradient
    /// accumulators. Linear in the neuron's out-degree.
    pub fn remove_connection(&mut self, from: usize, to: usize) -> Result<()> {
        self.params.check_position(from)?;
        let neuron = &mut self.params.neurons[from];
        let k = neuron
            .connection_index(to)
            .ok_or(TopologyError::ConnectionNotFound { from, to })?;
        neuron.connections.remove(k);
        for slot in &mut self.slots {
            slot.weight_grad[from].remove(k);
        }
        Ok(())
    }

    /// Clears every gradient and delta and rebases the accumulators on the
    /// current biases.
    pub fn reset_scratch(&mut self) {
        for slot in &mut self.slots {
            for (position, neuron) in self.params.neurons.iter().enumerate() {
                slot.input_accum[position] = neuron.bias;
                slot.pre_activation[position] = 0.0;
                slot.delta[position] = 0.0;
                slot.bias_grad[position] = 0.0;
                slot.weight_grad[position].iter_mut().for_each(|g| *g = 0.0);
            }
        }
    }
}

/// Fresh scratch for one thread: accumulators start at each bias.
pub(crate) fn new_slot(neurons: &[Neuron]) -> Result<ThreadSlot> {
    let n = neurons.len();
    let mut input_accum = try_vec(n, "allocating input accumulators")?;
    input_accum.extend(neurons.iter().map(|neuron| neuron.bias));
    let mut weight_grad = try_vec(n, "allocating weight gradients")?;
    for neuron in neurons {
        weight_grad.push(try_filled(0.0, neuron.connections.len(), "allocating weight gradients")?);
    }
    Ok(ThreadSlot {
        input_accum,
        pre_activation: try_filled(0.0, n, "allocating pre-activations")?,
        delta: try_filled(0.0, n, "allocating deltas")?,
        bias_grad: try_filled(0.0, n, "allocating bias gradients")?,
        weight_grad,
    })
}

impl fmt::Display for ParameterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = self.layout();
        for (layer, &size) in layout.sizes().iter().enumerate() {
            writeln!(f, "layer {layer} ({size} neurons)")?;
            for neuron in &self.params.neurons[layout.layer_range(layer)] {
                write!(f, "  [{:>3}] bias {:>9.4}", neuron.position, neuron.bias)?;
                if !neuron.connections.is_empty() {
                    write!(f, " ->")?;
                    for c in &neuron.connections {
                        write!(f, " {}:{:.4}", c.target, c.weight)?;
                    }
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
