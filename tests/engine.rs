use parallel_nn::activation::activation::{Activation, ActivationFunction};
use parallel_nn::data::dataset::Example;
use parallel_nn::data::partition::Partition;
use parallel_nn::loss::loss_type::LossType;
use parallel_nn::network::builder::{Initializer, NetworkBuilder};
use parallel_nn::network::network::ParameterStore;
use parallel_nn::train::engine::total_cost;
use parallel_nn::train::worker::run_generation;

/// ReLU whose derivative is always 1.
struct ReluUnitSlope;

impl Activation for ReluUnitSlope {
    fn function(&self, x: f64) -> f64 {
        x.max(0.0)
    }

    fn derivative(&self, _x: f64) -> f64 {
        1.0
    }
}

fn single_edge(threads: usize, bias_in: f64, bias_out: f64, weight: f64) -> ParameterStore {
    let mut store = NetworkBuilder::new(vec![1, 1], threads, Initializer::Constant { weight: 0.0, bias: 0.0 })
        .unwrap()
        .build_connected()
        .unwrap();
    store.set_bias(0, bias_in).unwrap();
    store.set_bias(1, bias_out).unwrap();
    store.set_weight(0, 1, weight).unwrap();
    store
}

#[test]
fn exact_prediction_gives_zero_delta() {
    let mut store = single_edge(1, 0.0, 0.0, 2.0);
    let example = Example::new(vec![4.0], vec![8.0]);
    let cost = store.forward_backward(0, &ActivationFunction::ReLU, &LossType::SquaredError, &example).unwrap();
    assert_eq!(cost, 0.0);
    assert_eq!(store.slot(0).pre_activation(1), 8.0);
    assert_eq!(store.slot(0).delta(1), 0.0);
}

#[test]
fn missed_prediction_gives_expected_delta() {
    let mut store = single_edge(1, -1.0, 8.0, -1.5);
    let act = ReluUnitSlope;
    let example = Example::new(vec![-3.0], vec![4.0]);

    let predicted = store.predict(0, &act, &example.input).unwrap();
    assert!((predicted[0] - 8.0).abs() < 1e-4);

    store.forward_backward(0, &act, &LossType::SquaredError, &example).unwrap();
    assert!((store.slot(0).delta(1) - 4.0).abs() < 1e-4);
}

#[test]
fn every_thread_sees_zero_delta_on_a_perfect_fit() {
    let mut store = single_edge(4, 0.0, 1.0, 2.0);
    let examples = (1..=4)
        .map(|x| Example::new(vec![x as f64], vec![2.0 * x as f64 + 1.0]))
        .collect();
    let partition = Partition::new(examples, 4, 1).unwrap();
    let total = run_generation(&mut store, &partition, &ActivationFunction::ReLU, &LossType::SquaredError, 0).unwrap();

    assert_eq!(total, 0.0);
    for t in 0..4 {
        assert_eq!(partition.shard(t).len(), 1);
        assert_eq!(store.slot(t).delta(1), 0.0, "thread {t}");
        assert_eq!(store.slot(t).pre_activation(1), 2.0 * (t + 1) as f64 + 1.0);
    }
}

#[test]
fn results_do_not_depend_on_the_slot_or_the_run() {
    let build = || {
        NetworkBuilder::new(vec![3, 5, 2], 4, Initializer::Uniform { seed: Some(99) })
            .unwrap()
            .build_connected()
            .unwrap()
    };
    let example = Example::new(vec![0.2, -0.4, 0.9], vec![1.0, 0.0]);
    let act = ActivationFunction::Tanh;

    let mut a = build();
    let cost0 = a.forward_backward(0, &act, &LossType::SquaredError, &example).unwrap();
    let cost3 = a.forward_backward(3, &act, &LossType::SquaredError, &example).unwrap();
    assert_eq!(cost0.to_bits(), cost3.to_bits());
    assert_eq!(a.slot(0), a.slot(3));

    let mut b = build();
    let again = b.forward_backward(0, &act, &LossType::SquaredError, &example).unwrap();
    assert_eq!(cost0.to_bits(), again.to_bits());
    assert_eq!(a.slot(0), b.slot(0));
}

#[test]
fn analytic_gradients_match_finite_differences() {
    let mut store = NetworkBuilder::new(vec![2, 3, 1], 1, Initializer::Uniform { seed: Some(2024) })
        .unwrap()
        .build_connected()
        .unwrap();
    let act = ActivationFunction::Sigmoid;
    let loss = LossType::SquaredError;
    let examples = vec![
        Example::new(vec![0.5, -1.0], vec![0.2]),
        Example::new(vec![-0.3, 0.8], vec![0.9]),
        Example::new(vec![1.2, 0.1], vec![0.4]),
    ];

    for example in &examples {
        store.forward_backward(0, &act, &loss, example).unwrap();
    }
    let analytic = store.slot(0).clone();

    let h = 1e-5;
    let cost_of = |store: &mut ParameterStore| {
        let (params, slots) = store.split_for_workers();
        total_cost(params, &mut slots[0], &act, &loss, &examples).unwrap()
    };

    for pos in 0..store.len() {
        let bias = store.neuron(pos).unwrap().bias();
        store.set_bias(pos, bias + h).unwrap();
        let up = cost_of(&mut store);
        store.set_bias(pos, bias - h).unwrap();
        let down = cost_of(&mut store);
        store.set_bias(pos, bias).unwrap();

        let numeric = (up - down) / (2.0 * h);
        assert!(
            (numeric - analytic.bias_grad(pos)).abs() < 1e-4,
            "bias {pos}: numeric {numeric}, analytic {}",
            analytic.bias_grad(pos)
        );
    }

    for from in 0..store.len() {
        let targets: Vec<usize> = store.neuron(from).unwrap().connections().iter().map(|c| c.target()).collect();
        for (k, to) in targets.into_iter().enumerate() {
            let weight = store.weight(from, to).unwrap();
            store.set_weight(from, to, weight + h).unwrap();
            let up = cost_of(&mut store);
            store.set_weight(from, to, weight - h).unwrap();
            let down = cost_of(&mut store);
            store.set_weight(from, to, weight).unwrap();

            let numeric = (up - down) / (2.0 * h);
            assert!(
                (numeric - analytic.weight_grad(from, k)).abs() < 1e-4,
                "weight {from}->{to}: numeric {numeric}, analytic {}",
                analytic.weight_grad(from, k)
            );
        }
    }
}
