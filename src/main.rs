use std::process;

use env_logger::Env;
use log::{error, info};

use parallel_nn::{load_csv, train_loop, NetworkSpec, Partition, Result, TrainConfig};

struct Args {
    training: String,
    config: Option<String>,
    save: Option<String>,
}

fn usage() -> ! {
    eprintln!("Usage: parallel-nn <training.csv> [--config spec.json] [--save network.txt]");
    eprintln!();
    eprintln!("  <training.csv>        one example per row, expected outputs in the last columns");
    eprintln!("  --config spec.json    network and training settings (defaults if omitted)");
    eprintln!("  --save network.txt    write the best network in text form after training");
    process::exit(2);
}

fn parse_args() -> Args {
    let mut args = std::env::args().skip(1);
    let mut training = None;
    let mut config = None;
    let mut save = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config = Some(args.next().unwrap_or_else(|| usage()));
                continue;
            }
            "--save" => {
                save = Some(args.next().unwrap_or_else(|| usage()));
                continue;
            }
            "-h" | "--help" => usage(),
            flag if flag.starts_with("--") => usage(),
            _ => {}
        }
        if training.is_some() {
            usage();
        }
        training = Some(arg);
    }

    match training {
        Some(training) => Args { training, config, save },
        None => usage(),
    }
}

fn run(args: &Args) -> Result<()> {
    let spec = match &args.config {
        Some(path) => NetworkSpec::load_json(path)?,
        None => NetworkSpec::default(),
    };
    info!(
        "layers {:?}, {} threads, learning rate {}, {} generations",
        spec.layers, spec.threads, spec.learning_rate, spec.generations
    );

    let examples = load_csv(&args.training, spec.output_size())?;
    let partition = Partition::new(examples, spec.threads, spec.output_size())?;
    info!("training on {} examples from {}", partition.len(), args.training);

    let mut store = spec.builder()?.build_connected()?;
    let report = train_loop(
        &mut store,
        &partition,
        &spec.activation,
        &spec.loss,
        &TrainConfig::from(&spec),
    )?;
    info!(
        "ran {} generations, best average cost {}",
        report.generations_run, report.best_cost
    );

    println!("{store}");
    if let Some(path) = &args.save {
        store.save_text(path)?;
        info!("saved network to {path}");
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = parse_args();
    if let Err(e) = run(&args) {
        error!("{e}");
        process::exit(1);
    }
}
