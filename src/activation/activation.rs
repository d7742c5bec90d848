use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// Element-wise activation used by every neuron of the network.
///
/// `derivative` receives the same pre-activation value that was passed to
/// `function`, never the activated output.
pub trait Activation: Send + Sync {
    fn function(&self, x: f64) -> f64;
    fn derivative(&self, x: f64) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Sigmoid,
    Tanh,
    #[serde(rename = "relu")]
    ReLU,
    #[serde(rename = "leaky_relu")]
    LeakyReLU { alpha: f64 },
    Identity,
    Elu { alpha: f64 },
    Swish,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + E.powf(-x))
}

impl Activation for ActivationFunction {
    fn function(&self, x: f64) -> f64 {
        match *self {
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::ReLU => {
                if x > 0.0 {
                    x
                } else {
                    0.0
                }
            }
            ActivationFunction::LeakyReLU { alpha } => {
                if x > 0.0 {
                    x
                } else {
                    alpha * x
                }
            }
            ActivationFunction::Identity => x,
            ActivationFunction::Elu { alpha } => {
                if x > 0.0 {
                    x
                } else {
                    alpha * (E.powf(x) - 1.0)
                }
            }
            ActivationFunction::Swish => x * sigmoid(x),
        }
    }

    /// The kinks of ReLU and LeakyReLU take the mean of both one-sided slopes.
    fn derivative(&self, x: f64) -> f64 {
        match *self {
            ActivationFunction::Sigmoid => {
                let s = sigmoid(x);
                s * (1.0 - s)
            }
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::ReLU => {
                if x > 0.0 {
                    1.0
                } else if x == 0.0 {
                    0.5
                } else {
                    0.0
                }
            }
            ActivationFunction::LeakyReLU { alpha } => {
                if x > 0.0 {
                    1.0
                } else if x == 0.0 {
                    (1.0 + alpha) / 2.0
                } else {
                    alpha
                }
            }
            ActivationFunction::Identity => 1.0,
            ActivationFunction::Elu { alpha } => {
                if x > 0.0 {
                    1.0
                } else {
                    alpha * E.powf(x)
                }
            }
            ActivationFunction::Swish => {
                let s = sigmoid(x);
                s + x * s * (1.0 - s)
            }
        }
    }
}

impl Default for ActivationFunction {
    fn default() -> Self {
        ActivationFunction::LeakyReLU { alpha: 0.2 }
    }
}
