use parallel_nn::{
    train_loop, ActivationFunction, Example, Initializer, LossType, NetworkBuilder, Partition, TrainConfig,
};

fn main() -> parallel_nn::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let examples = vec![
        Example::new(vec![1.0, 0.0], vec![1.0]),
        Example::new(vec![1.0, 1.0], vec![0.0]),
        Example::new(vec![0.0, 1.0], vec![1.0]),
        Example::new(vec![0.0, 0.0], vec![0.0]),
    ];
    let inputs: Vec<Vec<f64>> = examples.iter().map(|e| e.input.clone()).collect();

    let activation = ActivationFunction::Sigmoid;
    let mut store = NetworkBuilder::new(vec![2, 4, 1], 2, Initializer::Uniform { seed: Some(7) })?
        .build_connected()?;
    let partition = Partition::new(examples, 2, 1)?;

    let report = train_loop(
        &mut store,
        &partition,
        &activation,
        &LossType::SquaredError,
        &TrainConfig::new(20_000, 2.0),
    )?;
    println!(
        "best average cost {:.6} at generation {:?}",
        report.best_cost, report.best_generation
    );

    for input in &inputs {
        let output = store.predict(0, &activation, input)?;
        println!("Input: {:?} -> Output: {:.4}", input, output[0]);
    }
    Ok(())
}
