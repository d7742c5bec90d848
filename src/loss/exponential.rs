use crate::loss::loss_type::Cost;

/// e^(-actual · predicted); targets are expected to be ±1.
pub struct Exponential;

impl Cost for Exponential {
    fn cost(&self, actual: f64, predicted: f64) -> f64 {
        (-actual * predicted).exp()
    }

    fn derivative(&self, actual: f64, predicted: f64) -> f64 {
        -actual * self.cost(actual, predicted)
    }
}
