use crate::loss::loss_type::Cost;

/// Halved squared error: (actual - predicted)² / 2.
pub struct SquaredError;

impl Cost for SquaredError {
    fn cost(&self, actual: f64, predicted: f64) -> f64 {
        let error = actual - predicted;
        error * error / 2.0
    }

    /// The halving makes the gradient the plain residual.
    fn derivative(&self, actual: f64, predicted: f64) -> f64 {
        predicted - actual
    }
}
