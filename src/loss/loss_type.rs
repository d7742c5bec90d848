use serde::{Serialize, Deserialize};

use crate::loss::{
    bce::CrossEntropy, exponential::Exponential, kl::KlDivergence, mae::AbsoluteError,
    mse::SquaredError,
};

/// Per-output cost of one prediction. `actual` is the expected value from the
/// training data, `predicted` the activated output neuron.
pub trait Cost: Send + Sync {
    fn cost(&self, actual: f64, predicted: f64) -> f64;
    fn derivative(&self, actual: f64, predicted: f64) -> f64;
}

/// Selects which cost the training loop uses.
///
/// - `SquaredError`  : (a - p)² / 2; the default, pair with any output.
/// - `AbsoluteError` : |a - p|; slow to converge.
/// - `CrossEntropy`  : binary cross-entropy; pair with a Sigmoid output.
/// - `Exponential`   : e^(-a·p) for ±1 targets.
/// - `KlDivergence`  : Bernoulli KL divergence; targets in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    #[default]
    SquaredError,
    AbsoluteError,
    CrossEntropy,
    Exponential,
    KlDivergence,
}

impl Cost for LossType {
    fn cost(&self, actual: f64, predicted: f64) -> f64 {
        match self {
            LossType::SquaredError => SquaredError.cost(actual, predicted),
            LossType::AbsoluteError => AbsoluteError.cost(actual, predicted),
            LossType::CrossEntropy => CrossEntropy.cost(actual, predicted),
            LossType::Exponential => Exponential.cost(actual, predicted),
            LossType::KlDivergence => KlDivergence.cost(actual, predicted),
        }
    }

    fn derivative(&self, actual: f64, predicted: f64) -> f64 {
        match self {
            LossType::SquaredError => SquaredError.derivative(actual, predicted),
            LossType::AbsoluteError => AbsoluteError.derivative(actual, predicted),
            LossType::CrossEntropy => CrossEntropy.derivative(actual, predicted),
            LossType::Exponential => Exponential.derivative(actual, predicted),
            LossType::KlDivergence => KlDivergence.derivative(actual, predicted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_error_is_halved() {
        assert_eq!(LossType::SquaredError.cost(4.0, 2.0), 2.0);
        assert_eq!(LossType::SquaredError.derivative(4.0, 2.0), -2.0);
    }

    #[test]
    fn absolute_error_subgradient() {
        assert_eq!(LossType::AbsoluteError.cost(1.0, 3.0), 2.0);
        assert_eq!(LossType::AbsoluteError.derivative(1.0, 3.0), 1.0);
        assert_eq!(LossType::AbsoluteError.derivative(3.0, 1.0), -1.0);
        assert_eq!(LossType::AbsoluteError.derivative(2.0, 2.0), 0.0);
    }

    #[test]
    fn smooth_costs_match_central_difference() {
        let h = 1e-6;
        let cases = [
            (LossType::SquaredError, 0.7, 0.2),
            (LossType::CrossEntropy, 1.0, 0.3),
            (LossType::CrossEntropy, 0.0, 0.6),
            (LossType::Exponential, -1.0, 0.4),
            (LossType::KlDivergence, 0.3, 0.8),
        ];
        for (loss, actual, predicted) in cases {
            let numeric = (loss.cost(actual, predicted + h) - loss.cost(actual, predicted - h)) / (2.0 * h);
            let analytic = loss.derivative(actual, predicted);
            assert!(
                (numeric - analytic).abs() < 1e-5,
                "{loss:?}: numeric {numeric}, analytic {analytic}"
            );
        }
    }

    #[test]
    fn cross_entropy_is_zero_only_for_perfect_prediction() {
        assert!(LossType::CrossEntropy.cost(1.0, 0.999_999).abs() < 1e-5);
        assert!(LossType::CrossEntropy.cost(1.0, 0.5) > 0.5);
    }

    #[test]
    fn roundtrips_through_json() {
        let json = serde_json::to_string(&LossType::KlDivergence).unwrap();
        assert_eq!(json, r#""kl_divergence""#);
        let back: LossType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LossType::KlDivergence);
    }
}
