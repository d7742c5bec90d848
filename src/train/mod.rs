pub mod engine;
pub mod generation_stats;
pub mod loop_fn;
pub mod train_config;
pub mod worker;

pub use generation_stats::GenerationStats;
pub use loop_fn::{train_loop, TrainReport};
pub use train_config::TrainConfig;
pub use worker::run_generation;
