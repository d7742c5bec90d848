use crate::loss::loss_type::Cost;

/// Kullback-Leibler divergence of a Bernoulli prediction from its target.
pub struct KlDivergence;

impl Cost for KlDivergence {
    fn cost(&self, actual: f64, predicted: f64) -> f64 {
        let mut total = 0.0;
        if actual > 0.0 {
            total += actual * (actual / predicted).ln();
        }
        if actual < 1.0 {
            total += (1.0 - actual) * ((1.0 - actual) / (1.0 - predicted)).ln();
        }
        total
    }

    fn derivative(&self, actual: f64, predicted: f64) -> f64 {
        -(actual / predicted) + (1.0 - actual) / (1.0 - predicted)
    }
}
