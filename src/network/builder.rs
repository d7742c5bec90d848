use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::error::{try_filled, try_vec, ConfigError, Result};
use crate::network::network::{Layout, ParameterStore};
use crate::network::neuron::{Connection, Neuron};

/// Where initial biases and weights come from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initializer {
    /// Uniform samples in [0, 1). A seed makes the network reproducible.
    Uniform { seed: Option<u64> },
    /// Every weight and every bias gets the same value.
    Constant { weight: f64, bias: f64 },
}

impl Default for Initializer {
    fn default() -> Self {
        Initializer::Uniform { seed: None }
    }
}

/// Builds a fully connected `ParameterStore` layer by layer.
///
/// `build()` creates the neurons, `connect()` wires every neuron of a layer to
/// every neuron of the next one. Both draw from the same initializer stream.
pub struct NetworkBuilder {
    layout: Layout,
    threads: usize,
    initializer: Initializer,
    rng: StdRng,
}

impl NetworkBuilder {
    pub fn new(layer_sizes: Vec<usize>, threads: usize, initializer: Initializer) -> Result<NetworkBuilder> {
        let layout = Layout::new(layer_sizes)?;
        if threads == 0 {
            return Err(ConfigError::ZeroThreads.into());
        }
        let rng = match initializer {
            Initializer::Uniform { seed: Some(seed) } => StdRng::seed_from_u64(seed),
            _ => StdRng::from_entropy(),
        };
        Ok(NetworkBuilder { layout, threads, initializer, rng })
    }

    fn next_bias(&mut self) -> f64 {
        match self.initializer {
            Initializer::Uniform { .. } => self.rng.gen::<f64>(),
            Initializer::Constant { bias, .. } => bias,
        }
    }

    fn next_weight(&mut self) -> f64 {
        match self.initializer {
            Initializer::Uniform { .. } => self.rng.gen::<f64>(),
            Initializer::Constant { weight, .. } => weight,
        }
    }

    /// Allocates every neuron with its position and initial bias. The
    /// result has no connections yet.
    pub fn build(&mut self) -> Result<ParameterStore> {
        let total = self.layout.total();
        let mut neurons = try_vec(total, "allocating neurons")?;
        for position in 0..total {
            let bias = self.next_bias();
            neurons.push(Neuron::new(position, bias));
        }
        debug!(
            "built {} neurons in layers {:?} with {} thread slots",
            total,
            self.layout.sizes(),
            self.threads
        );
        ParameterStore::from_neurons(self.layout.clone(), neurons, self.threads)
    }

    /// Connects each neuron to every neuron of the following layer, replacing
    /// any connections it already had. Output neurons stay unconnected.
    pub fn connect(&mut self, store: &mut ParameterStore) -> Result<()> {
        let layout = store.layout().clone();
        let mut edges = 0;
        for layer in 0..layout.sizes().len() - 1 {
            let targets = layout.layer_range(layer + 1);
            for source in layout.layer_range(layer) {
                let mut connections = try_vec(targets.len(), "connecting neurons")?;
                for target in targets.clone() {
                    connections.push(Connection::new(target, self.next_weight()));
                }
                let mut grads = try_vec(store.slots.len(), "allocating weight gradients")?;
                for _ in 0..store.slots.len() {
                    grads.push(try_filled(0.0, targets.len(), "allocating weight gradients")?);
                }
                for (slot, grad) in store.slots.iter_mut().zip(grads) {
                    slot.weight_grad[source] = grad;
                }
                store.params.neurons[source].connections = connections;
                edges += targets.len();
            }
        }
        for position in layout.output_range() {
            store.params.neurons[position].connections.clear();
            for slot in &mut store.slots {
                slot.weight_grad[position].clear();
            }
        }
        debug!("connected {edges} edges");
        Ok(())
    }

    pub fn build_connected(&mut self) -> Result<ParameterStore> {
        let mut store = self.build()?;
        self.connect(&mut store)?;
        Ok(store)
    }
}
