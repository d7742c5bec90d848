use crate::activation::activation::Activation;
use crate::data::dataset::Example;
use crate::error::{ConcurrencyError, DataError, Result};
use crate::loss::loss_type::Cost;
use crate::network::network::{ParameterStore, Parameters};
use crate::network::neuron::ThreadSlot;

// ---------------------------------------------------------------------------
// Forward/backward pass for one worker thread
// ---------------------------------------------------------------------------
//
// Every function here reads weights, biases and topology through `&Parameters`
// and writes only to the caller's `ThreadSlot`. Workers holding disjoint slots
// can therefore run over the same parameters concurrently.

/// Adds each input component onto an input neuron's accumulator, wrapping
/// around the input layer when the example is wider than it.
fn distribute(params: &Parameters, slot: &mut ThreadSlot, input: &[f64]) {
    let n_input = params.layout.input_size();
    for (i, &x) in input.iter().enumerate() {
        slot.input_accum[i % n_input] += x;
    }
}

/// Pushes activations through every working neuron in ascending position
/// order, recording each pre-activation and resetting its accumulator to the
/// bias once consumed.
fn propagate<A: Activation + ?Sized>(params: &Parameters, slot: &mut ThreadSlot, activation: &A) {
    for neuron in &params.neurons[..params.layout.working()] {
        let pos = neuron.position;
        let z = slot.input_accum[pos];
        slot.pre_activation[pos] = z;
        let a = activation.function(z);
        for c in &neuron.connections {
            slot.input_accum[c.target] += c.weight * a;
        }
        slot.input_accum[pos] = neuron.bias;
    }
}

/// An example needs one target per output neuron.
fn check_targets(params: &Parameters, example: &Example) -> std::result::Result<(), DataError> {
    let expected = params.layout.output_size();
    if example.output.len() != expected {
        return Err(DataError::TargetWidth { expected, found: example.output.len() });
    }
    Ok(())
}

/// Runs one example through the network and accumulates its gradients into
/// `slot`. Returns the example's cost summed over all outputs.
///
/// An example without exactly one target per output neuron is rejected
/// before anything in `slot` changes.
pub fn forward_backward<A, C>(
    params: &Parameters,
    slot: &mut ThreadSlot,
    activation: &A,
    cost: &C,
    example: &Example,
) -> Result<f64>
where
    A: Activation + ?Sized,
    C: Cost + ?Sized,
{
    check_targets(params, example)?;
    distribute(params, slot, &example.input);
    propagate(params, slot, activation);

    // Output layer: prediction, cost and the seed deltas.
    let mut total = 0.0;
    let outputs = params.layout.output_range();
    for (neuron, &actual) in params.neurons[outputs].iter().zip(&example.output) {
        let pos = neuron.position;
        let z = slot.input_accum[pos];
        slot.pre_activation[pos] = z;
        let predicted = activation.function(z);
        let delta = cost.derivative(actual, predicted) * activation.derivative(z);
        slot.delta[pos] = delta;
        slot.bias_grad[pos] += delta;
        total += cost.cost(actual, predicted);
        slot.input_accum[pos] = neuron.bias;
    }

    // Backward: descending positions visit every target before its sources.
    for neuron in params.neurons[..params.layout.working()].iter().rev() {
        let pos = neuron.position;
        let cum_delta: f64 = neuron
            .connections
            .iter()
            .map(|c| slot.delta[c.target] * c.weight)
            .sum();
        let z = slot.pre_activation[pos];
        let delta = cum_delta * activation.derivative(z);
        slot.delta[pos] = delta;
        slot.bias_grad[pos] += delta;

        let a = activation.function(z);
        for (k, c) in neuron.connections.iter().enumerate() {
            slot.weight_grad[pos][k] += a * slot.delta[c.target];
        }
    }

    Ok(total)
}

/// Processes a whole shard in order; returns the summed cost.
pub fn run_shard<A, C>(
    params: &Parameters,
    slot: &mut ThreadSlot,
    activation: &A,
    cost: &C,
    shard: &[Example],
) -> Result<f64>
where
    A: Activation + ?Sized,
    C: Cost + ?Sized,
{
    let mut total = 0.0;
    for example in shard {
        total += forward_backward(params, slot, activation, cost, example)?;
    }
    Ok(total)
}

/// Forward pass only. Accumulators are back at their biases afterwards and
/// no gradient is touched.
pub fn predict<A: Activation + ?Sized>(
    params: &Parameters,
    slot: &mut ThreadSlot,
    activation: &A,
    input: &[f64],
) -> Vec<f64> {
    distribute(params, slot, input);
    propagate(params, slot, activation);
    params.neurons[params.layout.output_range()]
        .iter()
        .map(|neuron| {
            let pos = neuron.position;
            let predicted = activation.function(slot.input_accum[pos]);
            slot.input_accum[pos] = neuron.bias;
            predicted
        })
        .collect()
}

/// Summed cost of `examples` under the current parameters, without touching
/// any gradient.
pub fn total_cost<A, C>(
    params: &Parameters,
    slot: &mut ThreadSlot,
    activation: &A,
    cost: &C,
    examples: &[Example],
) -> Result<f64>
where
    A: Activation + ?Sized,
    C: Cost + ?Sized,
{
    let mut total = 0.0;
    for example in examples {
        check_targets(params, example)?;
        total += predict(params, slot, activation, &example.input)
            .iter()
            .zip(&example.output)
            .map(|(&predicted, &actual)| cost.cost(actual, predicted))
            .sum::<f64>();
    }
    Ok(total)
}

impl ParameterStore {
    fn worker_view(&mut self, thread: usize) -> Result<(&Parameters, &mut ThreadSlot)> {
        let (params, slots) = self.split_for_workers();
        let count = slots.len();
        match slots.get_mut(thread) {
            Some(slot) => Ok((params, slot)),
            None => Err(ConcurrencyError::NoSuchSlot { thread, slots: count }.into()),
        }
    }

    /// `forward_backward` on the slot of `thread`.
    pub fn forward_backward<A, C>(
        &mut self,
        thread: usize,
        activation: &A,
        cost: &C,
        example: &Example,
    ) -> Result<f64>
    where
        A: Activation + ?Sized,
        C: Cost + ?Sized,
    {
        let (params, slot) = self.worker_view(thread)?;
        forward_backward(params, slot, activation, cost, example)
    }

    /// `predict` on the slot of `thread`.
    pub fn predict<A: Activation + ?Sized>(
        &mut self,
        thread: usize,
        activation: &A,
        input: &[f64],
    ) -> Result<Vec<f64>> {
        let (params, slot) = self.worker_view(thread)?;
        Ok(predict(params, slot, activation, input))
    }

    /// Mean cost per example, evaluated on thread slot 0.
    pub fn average_cost<A, C>(&mut self, activation: &A, cost: &C, examples: &[Example]) -> Result<f64>
    where
        A: Activation + ?Sized,
        C: Cost + ?Sized,
    {
        if examples.is_empty() {
            return Ok(0.0);
        }
        let (params, slot) = self.worker_view(0)?;
        Ok(total_cost(params, slot, activation, cost, examples)? / examples.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::error::NetworkError;
    use crate::loss::loss_type::LossType;
    use crate::network::builder::{Initializer, NetworkBuilder};

    fn store(sizes: &[usize], threads: usize, init: Initializer) -> ParameterStore {
        NetworkBuilder::new(sizes.to_vec(), threads, init).unwrap().build_connected().unwrap()
    }

    fn unit() -> Initializer {
        Initializer::Constant { weight: 1.0, bias: 0.0 }
    }

    #[test]
    fn wide_inputs_wrap_around_the_input_layer() {
        let mut s = store(&[2, 1], 1, unit());
        let out = s.predict(0, &ActivationFunction::Identity, &[1.0, 2.0, 3.0]).unwrap();
        // neuron 0 receives 1 + 3, neuron 1 receives 2
        assert_eq!(out, vec![6.0]);
    }

    #[test]
    fn accumulators_return_to_bias_after_each_example() {
        let mut s = store(&[2, 3, 1], 2, Initializer::Uniform { seed: Some(11) });
        let example = Example::new(vec![0.3, -0.8], vec![0.5]);
        s.forward_backward(1, &ActivationFunction::Sigmoid, &LossType::SquaredError, &example).unwrap();
        for neuron in s.neurons() {
            assert_eq!(s.slot(1).input_accum(neuron.position()), neuron.bias());
        }
    }

    #[test]
    fn forward_backward_leaves_parameters_and_other_slots_alone() {
        let mut s = store(&[2, 2, 1], 3, Initializer::Uniform { seed: Some(5) });
        let params_before = s.params().clone();
        let slot0_before = s.slot(0).clone();
        let slot2_before = s.slot(2).clone();

        let example = Example::new(vec![1.0, 0.5], vec![0.0]);
        s.forward_backward(1, &ActivationFunction::Tanh, &LossType::SquaredError, &example).unwrap();

        assert_eq!(s.params(), &params_before);
        assert_eq!(s.slot(0), &slot0_before);
        assert_eq!(s.slot(2), &slot2_before);
        assert_ne!(s.slot(1).bias_grad(4), 0.0);
    }

    #[test]
    fn predict_does_not_touch_gradients() {
        let mut s = store(&[1, 2, 1], 1, Initializer::Uniform { seed: Some(2) });
        let before = s.clone();
        s.predict(0, &ActivationFunction::Sigmoid, &[0.25]).unwrap();
        assert_eq!(s.slot(0).bias_grad, before.slot(0).bias_grad);
        assert_eq!(s.slot(0).weight_grad, before.slot(0).weight_grad);
        assert_eq!(s.slot(0).input_accum, before.slot(0).input_accum);
    }

    #[test]
    fn gradients_accumulate_across_examples() {
        let mut s = store(&[1, 1], 1, Initializer::Constant { weight: 0.5, bias: 0.0 });
        let example = Example::new(vec![2.0], vec![0.0]);
        let act = ActivationFunction::Identity;
        // prediction = 2 * 0.5 = 1, delta = 1, weight grad = 2 * 1
        s.forward_backward(0, &act, &LossType::SquaredError, &example).unwrap();
        assert_eq!(s.slot(0).delta(1), 1.0);
        assert_eq!(s.slot(0).weight_grad(0, 0), 2.0);
        s.forward_backward(0, &act, &LossType::SquaredError, &example).unwrap();
        assert_eq!(s.slot(0).bias_grad(1), 2.0);
        assert_eq!(s.slot(0).weight_grad(0, 0), 4.0);
        // input neuron: delta = 1 * 0.5
        assert_eq!(s.slot(0).bias_grad(0), 1.0);
    }

    #[test]
    fn run_shard_sums_example_costs() {
        let mut s = store(&[1, 1], 1, unit());
        let shard = vec![
            Example::new(vec![1.0], vec![3.0]),
            Example::new(vec![2.0], vec![2.0]),
        ];
        let (params, slots) = s.split_for_workers();
        let act = ActivationFunction::Identity;
        let total = run_shard(params, &mut slots[0], &act, &LossType::SquaredError, &shard).unwrap();
        // (3 - 1)^2 / 2 + 0
        assert_eq!(total, 2.0);
    }

    #[test]
    fn rejects_examples_with_the_wrong_number_of_targets() {
        let mut s = store(&[1, 2], 1, unit());
        let act = ActivationFunction::Identity;
        s.forward_backward(0, &act, &LossType::SquaredError, &Example::new(vec![1.0], vec![0.0, 0.0]))
            .unwrap();
        let after_first = s.slot(0).clone();

        for targets in [vec![0.0], vec![0.0, 0.0, 0.0]] {
            let err = s
                .forward_backward(0, &act, &LossType::SquaredError, &Example::new(vec![1.0], targets.clone()))
                .unwrap_err();
            assert!(matches!(
                err,
                NetworkError::Data(DataError::TargetWidth { expected: 2, found }) if found == targets.len()
            ));
        }
        // Nothing from the rejected examples reaches the accumulators.
        assert_eq!(s.slot(0), &after_first);
        assert_eq!(s.slot(0).bias_grad(0), 2.0);

        let short = [Example::new(vec![1.0], vec![0.0])];
        assert!(s.average_cost(&act, &LossType::SquaredError, &short).is_err());
    }

    #[test]
    fn unknown_thread_slot_is_an_error() {
        let mut s = store(&[1, 1], 2, unit());
        let err = s.predict(2, &ActivationFunction::Identity, &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::Concurrency(ConcurrencyError::NoSuchSlot { thread: 2, slots: 2 })
        ));
        let example = Example::new(vec![1.0], vec![1.0]);
        let act = ActivationFunction::Identity;
        assert!(s.forward_backward(5, &act, &LossType::SquaredError, &example).is_err());
    }
}
