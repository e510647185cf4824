use std::fmt::{Debug, Display};
use std::str::FromStr;

use num_traits::{Float, NumCast};
use rand::distributions::uniform::SampleUniform;

/// Element type of a [`Matrix`](crate::math::matrix::Matrix).
///
/// Anything that behaves like an IEEE float, can be parsed back from its
/// printed form and can be drawn from a uniform distribution qualifies.
/// `f32` and `f64` are covered by the blanket impl.
pub trait Scalar: Float + FromStr + Display + Debug + Default + SampleUniform + 'static {
    /// Converts an `f64` constant into `Self`, saturating to NaN when the
    /// value cannot be represented.
    fn from_f64(value: f64) -> Self {
        <Self as NumCast>::from(value).unwrap_or_else(Self::nan)
    }

    /// Lossy conversion used for reporting.
    fn to_f64_lossy(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

impl<T> Scalar for T where T: Float + FromStr + Display + Debug + Default + SampleUniform + 'static {}
