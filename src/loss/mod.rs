pub mod bce;
pub mod exponential;
pub mod kl;
pub mod loss_type;
pub mod mae;
pub mod mse;

pub use loss_type::{Cost, LossType};
pub use mse::SquaredError;
