use serde::{Deserialize, Serialize};

use crate::math::scalar::Scalar;

/// Element-wise activation applied to a layer's pre-activation values.
///
/// Both [`function`](Activation::function) and
/// [`derivative`](Activation::derivative) take the pre-activation `z`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Sigmoid,
    #[serde(rename = "relu")]
    ReLU,
    Tanh,
    Identity,
    #[serde(rename = "leaky_relu")]
    LeakyReLU { alpha: f64 },
}

impl Activation {
    pub fn function<T: Scalar>(&self, x: T) -> T {
        match self {
            Activation::Sigmoid => T::one() / (T::one() + (-x).exp()),
            Activation::ReLU => if x > T::zero() { x } else { T::zero() },
            Activation::Tanh => x.tanh(),
            Activation::Identity => x,
            Activation::LeakyReLU { alpha } => {
                if x > T::zero() { x } else { T::from_f64(*alpha) * x }
            }
        }
    }

    /// d/dz of [`function`](Activation::function), evaluated at `z`.
    pub fn derivative<T: Scalar>(&self, x: T) -> T {
        match self {
            Activation::Sigmoid => {
                let fx = self.function(x);
                fx * (T::one() - fx)
            }
            Activation::ReLU => if x > T::zero() { T::one() } else { T::zero() },
            Activation::Tanh => {
                let t = x.tanh();
                T::one() - t * t
            }
            Activation::Identity => T::one(),
            Activation::LeakyReLU { alpha } => {
                if x > T::zero() { T::one() } else { T::from_f64(*alpha) }
            }
        }
    }
}
