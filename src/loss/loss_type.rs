use serde::{Deserialize, Serialize};

use crate::math::scalar::Scalar;

/// Huber transition point.
const HUBER_DELTA: f64 = 1.0;

/// Keeps `ln` away from zero in the cross-entropy terms.
const EPS: f64 = 1e-12;

/// Pairwise loss between one predicted activation and its target.
///
/// - `SquareError`        — `(p - t)²`; pair with Sigmoid or Identity output.
/// - `AbsoluteError`      — `|p - t|`; pair with Identity output.
/// - `Huber`              — quadratic inside `|p - t| <= 1`, linear outside.
/// - `BinaryCrossEntropy` — `-(t·ln p + (1 - t)·ln(1 - p))`; pair with Sigmoid output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossFunction {
    SquareError,
    AbsoluteError,
    Huber,
    BinaryCrossEntropy,
}

impl LossFunction {
    pub fn loss<T: Scalar>(&self, predicted: T, expected: T) -> T {
        let diff = predicted - expected;
        match self {
            LossFunction::SquareError => diff * diff,
            LossFunction::AbsoluteError => diff.abs(),
            LossFunction::Huber => {
                let delta = T::from_f64(HUBER_DELTA);
                let half = T::from_f64(0.5);
                if diff.abs() <= delta {
                    half * diff * diff
                } else {
                    delta * (diff.abs() - half * delta)
                }
            }
            LossFunction::BinaryCrossEntropy => {
                let eps = T::from_f64(EPS);
                let one = T::one();
                -(expected * (predicted + eps).ln()
                    + (one - expected) * (one - predicted + eps).ln())
            }
        }
    }

    /// ∂loss/∂predicted.
    pub fn derivative<T: Scalar>(&self, predicted: T, expected: T) -> T {
        let diff = predicted - expected;
        match self {
            LossFunction::SquareError => T::from_f64(2.0) * diff,
            LossFunction::AbsoluteError => {
                if diff > T::zero() {
                    T::one()
                } else if diff < T::zero() {
                    -T::one()
                } else {
                    T::zero()
                }
            }
            LossFunction::Huber => {
                let delta = T::from_f64(HUBER_DELTA);
                if diff.abs() <= delta { diff } else { delta * diff.signum() }
            }
            LossFunction::BinaryCrossEntropy => {
                let eps = T::from_f64(EPS);
                diff / ((predicted + eps) * (T::one() - predicted + eps))
            }
        }
    }
}
