use crate::loss::loss_type::Cost;

/// Binary cross-entropy for targets in [0, 1]; pair with a Sigmoid output.
///
/// No epsilon clamping: a prediction of exactly 0 or 1 against the opposite
/// target yields an infinite cost.
pub struct CrossEntropy;

impl Cost for CrossEntropy {
    fn cost(&self, actual: f64, predicted: f64) -> f64 {
        -(actual * predicted.ln() + (1.0 - actual) * (1.0 - predicted).ln())
    }

    fn derivative(&self, actual: f64, predicted: f64) -> f64 {
        (predicted - actual) / (predicted * (1.0 - predicted))
    }
}
