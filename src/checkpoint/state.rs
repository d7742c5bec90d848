use serde::{Serialize, Deserialize};

use crate::error::{try_vec, NetworkError, Result, TopologyError};
use crate::network::network::ParameterStore;

/// A positional snapshot of every bias and weight in a `ParameterStore`.
///
/// `biases[p]` belongs to the neuron at position `p`; `weights[p][k]` to its
/// `k`-th connection. Only values are recorded, never topology: restoring
/// into a store whose connections were reordered since capture writes the
/// weights onto the wrong edges without any error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub biases: Vec<f64>,
    pub weights: Vec<Vec<f64>>,
}

impl Checkpoint {
    /// Copies the current parameters into a fresh snapshot.
    pub fn capture(store: &ParameterStore) -> Result<Checkpoint> {
        let neurons = store.neurons();
        let mut biases = try_vec(neurons.len(), "capturing biases")?;
        let mut weights = try_vec(neurons.len(), "capturing weights")?;
        for neuron in neurons {
            biases.push(neuron.bias);
            let mut row = try_vec(neuron.connections.len(), "capturing weights")?;
            row.extend(neuron.connections.iter().map(|c| c.weight));
            weights.push(row);
        }
        Ok(Checkpoint { biases, weights })
    }

    /// Overwrites this snapshot with the current parameters, reusing its
    /// buffers when the shapes already match.
    pub fn capture_into(&mut self, store: &ParameterStore) -> Result<()> {
        let neurons = store.neurons();
        if self.biases.len() != neurons.len()
            || self.weights.len() != neurons.len()
            || self
                .weights
                .iter()
                .zip(neurons)
                .any(|(row, neuron)| row.len() != neuron.connections.len())
        {
            *self = Checkpoint::capture(store)?;
            return Ok(());
        }
        for ((bias, row), neuron) in self.biases.iter_mut().zip(&mut self.weights).zip(neurons) {
            *bias = neuron.bias;
            for (w, c) in row.iter_mut().zip(&neuron.connections) {
                *w = c.weight;
            }
        }
        Ok(())
    }

    /// Writes the snapshot back into `store` and rebases every thread's
    /// input accumulator on the restored biases.
    ///
    /// Neuron and per-neuron connection counts must match the snapshot;
    /// nothing is written when they do not.
    pub fn restore(&self, store: &mut ParameterStore) -> Result<()> {
        let neurons = store.neurons();
        if self.biases.len() != neurons.len() || self.weights.len() != neurons.len() {
            return Err(TopologyError::NeuronCountMismatch {
                expected: neurons.len(),
                found: self.biases.len().min(self.weights.len()),
            }
            .into());
        }
        for (position, (row, neuron)) in self.weights.iter().zip(neurons).enumerate() {
            if row.len() != neuron.connections.len() {
                return Err(TopologyError::ConnectionCountMismatch {
                    position,
                    expected: row.len(),
                    found: neuron.connections.len(),
                }
                .into());
            }
        }

        let ParameterStore { params, slots } = store;
        for (position, neuron) in params.neurons.iter_mut().enumerate() {
            neuron.bias = self.biases[position];
            for (c, &w) in neuron.connections.iter_mut().zip(&self.weights[position]) {
                c.weight = w;
            }
            for slot in slots.iter_mut() {
                slot.input_accum[position] = neuron.bias;
            }
        }
        Ok(())
    }

    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer(writer, self).map_err(NetworkError::from)
    }

    pub fn load_json(path: &str) -> Result<Checkpoint> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::builder::{Initializer, NetworkBuilder};

    fn store(seed: u64) -> ParameterStore {
        NetworkBuilder::new(vec![2, 3, 2], 2, Initializer::Uniform { seed: Some(seed) })
            .unwrap()
            .build_connected()
            .unwrap()
    }

    #[test]
    fn restore_brings_back_exact_values() {
        let mut s = store(1);
        let original = s.clone();
        let snapshot = Checkpoint::capture(&s).unwrap();

        s.set_bias(3, 123.456).unwrap();
        s.set_weight(0, 2, -9.75).unwrap();
        s.slots[1].input_accum[4] = 77.0;

        snapshot.restore(&mut s).unwrap();
        assert_eq!(s.params(), original.params());
        for slot in s.slots() {
            for neuron in s.neurons() {
                assert_eq!(slot.input_accum(neuron.position()), neuron.bias());
            }
        }
    }

    #[test]
    fn capture_into_overwrites_in_place() {
        let a = store(1);
        let b = store(2);
        let mut snapshot = Checkpoint::capture(&a).unwrap();
        snapshot.capture_into(&b).unwrap();
        assert_eq!(snapshot, Checkpoint::capture(&b).unwrap());
    }

    #[test]
    fn capture_into_handles_a_different_shape() {
        let small = NetworkBuilder::new(vec![1, 1], 1, Initializer::default())
            .unwrap()
            .build_connected()
            .unwrap();
        let big = store(4);
        let mut snapshot = Checkpoint::capture(&small).unwrap();
        snapshot.capture_into(&big).unwrap();
        assert_eq!(snapshot, Checkpoint::capture(&big).unwrap());
    }

    #[test]
    fn restore_rejects_a_changed_topology() {
        let mut s = store(3);
        let snapshot = Checkpoint::capture(&s).unwrap();
        s.remove_connection(1, 3).unwrap();
        let before = s.clone();

        let err = snapshot.restore(&mut s).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::Topology(TopologyError::ConnectionCountMismatch { position: 1, expected: 3, found: 2 })
        ));
        assert_eq!(s, before);

        let mut other = NetworkBuilder::new(vec![2, 2], 1, Initializer::default())
            .unwrap()
            .build_connected()
            .unwrap();
        assert!(matches!(
            snapshot.restore(&mut other).unwrap_err(),
            NetworkError::Topology(TopologyError::NeuronCountMismatch { expected: 4, found: 7 })
        ));
    }

    #[test]
    fn json_file_roundtrip_is_exact() {
        let mut s = store(8);
        s.set_bias(0, 0.1 + 0.2).unwrap();
        s.set_weight(2, 5, 1.0 / 3.0).unwrap();
        let snapshot = Checkpoint::capture(&s).unwrap();

        let path = std::env::temp_dir().join(format!("parallel-nn-checkpoint-{}.json", std::process::id()));
        let path = path.to_str().unwrap();
        snapshot.save_json(path).unwrap();
        let loaded = Checkpoint::load_json(path).unwrap();
        std::fs::remove_file(path).unwrap();
        assert_eq!(loaded, snapshot);
    }
}
