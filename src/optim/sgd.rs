use crate::network::network::ParameterStore;

/// Plain full-batch gradient descent.
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Folds every thread's accumulated gradients into one averaged update
    /// per bias and weight, applies it, and clears the accumulators.
    ///
    /// Every thread's input accumulator is rebased on the updated bias.
    /// Must not run while workers hold slots of `store`; the `&mut` borrow
    /// guarantees that.
    pub fn step(&self, store: &mut ParameterStore, n_examples: usize) {
        let scale = if n_examples == 0 {
            0.0
        } else {
            self.learning_rate / n_examples as f64
        };
        let ParameterStore { params, slots } = store;

        for (pos, neuron) in params.neurons.iter_mut().enumerate() {
            let mut bias_grad = 0.0;
            for slot in slots.iter_mut() {
                bias_grad += slot.bias_grad[pos];
                slot.bias_grad[pos] = 0.0;
            }
            neuron.bias -= scale * bias_grad;
            for slot in slots.iter_mut() {
                slot.input_accum[pos] = neuron.bias;
            }

            for (k, connection) in neuron.connections.iter_mut().enumerate() {
                let mut weight_grad = 0.0;
                for slot in slots.iter_mut() {
                    weight_grad += slot.weight_grad[pos][k];
                    slot.weight_grad[pos][k] = 0.0;
                }
                connection.weight -= scale * weight_grad;
            }
        }
    }
}
