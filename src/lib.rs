pub mod activation;
pub mod checkpoint;
pub mod data;
pub mod error;
pub mod loss;
pub mod network;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use activation::activation::{Activation, ActivationFunction};
pub use checkpoint::state::Checkpoint;
pub use data::dataset::{load_csv, Example};
pub use data::partition::Partition;
pub use error::{NetworkError, Result};
pub use loss::loss_type::{Cost, LossType};
pub use network::builder::{Initializer, NetworkBuilder};
pub use network::network::ParameterStore;
pub use network::spec::NetworkSpec;
pub use optim::sgd::Sgd;
pub use train::loop_fn::{train_loop, TrainReport};
pub use train::train_config::TrainConfig;
