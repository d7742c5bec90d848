use crate::loss::loss_type::Cost;

pub struct AbsoluteError;

impl Cost for AbsoluteError {
    fn cost(&self, actual: f64, predicted: f64) -> f64 {
        (actual - predicted).abs()
    }

    /// Subgradient; 0 when the prediction is exact.
    fn derivative(&self, actual: f64, predicted: f64) -> f64 {
        if predicted > actual {
            1.0
        } else if predicted < actual {
            -1.0
        } else {
            0.0
        }
    }
}
