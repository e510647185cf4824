use rand::Rng;

use crate::activation::activation::Activation;
use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::math::scalar::Scalar;

/// Weights and biases are initialized from `U[-INIT_RANGE, INIT_RANGE]`.
pub const INIT_RANGE: f64 = 1.0;

/// One fully connected layer.
///
/// All matrices are row vectors except `weight`, which maps the previous
/// layer's `neuron_count` inputs onto this layer's neurons. The input layer
/// keeps `weight` and `bias` at `0x0`.
#[derive(Debug, Clone)]
pub struct Layer<T = f64> {
    neuron_count: usize,
    z: Matrix<T>,
    activation: Matrix<T>,
    weight: Matrix<T>,
    bias: Matrix<T>,
    delta: Matrix<T>,
    activator: Activation,
}

impl<T: Scalar> Layer<T> {
    /// An unallocated layer; [`join`](Layer::join) sizes its matrices.
    pub fn new(neuron_count: usize, activation: Activation) -> Layer<T> {
        Layer {
            neuron_count,
            z: Matrix::default(),
            activation: Matrix::default(),
            weight: Matrix::default(),
            bias: Matrix::default(),
            delta: Matrix::default(),
            activator: activation,
        }
    }

    /// Allocates every matrix. `previous` is `None` for the input layer.
    pub fn join(&mut self, previous: Option<&Layer<T>>) {
        let n = self.neuron_count;
        self.z = Matrix::zeros(1, n);
        self.activation = Matrix::zeros(1, n);
        self.delta = Matrix::zeros(1, n);

        match previous {
            Some(prev) => {
                self.weight = Matrix::zeros(prev.neuron_count, n);
                self.bias = Matrix::zeros(1, n);
            }
            None => {
                self.weight = Matrix::default();
                self.bias = Matrix::default();
            }
        }
    }

    /// Redraws weights and biases; a no-op for the input layer.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if !self.has_parameters() {
            return;
        }
        let high = T::from_f64(INIT_RANGE);
        let low = -high;
        self.bias.fill_uniform(low, high, rng);
        self.weight.fill_uniform(low, high, rng);
    }

    /// `next.z = self.activation · next.weight + next.bias`, then
    /// `next.activation = f(next.z)`.
    pub fn forward_step(&self, next: &mut Layer<T>) -> Result<()> {
        let mut z = self.activation.dot(&next.weight)?;
        z.add_assign_matrix(&next.bias)?;

        let act = next.activator;
        next.activation = z.map(|v| act.function(v));
        next.z = z;
        Ok(())
    }

    /// Gradient descent on this layer's parameters using the cached delta.
    ///
    /// `∂cost/∂weight = previous.activationᵗ · delta`, `∂cost/∂bias = delta`.
    pub fn backward_step(&mut self, previous: &Layer<T>, learning_rate: T) -> Result<()> {
        let mut weight_grad = previous.activation.transpose().dot(&self.delta)?;
        weight_grad *= learning_rate;
        let bias_grad = self.delta.clone() * learning_rate;

        self.weight.sub_assign_matrix(&weight_grad)?;
        self.bias.sub_assign_matrix(&bias_grad)?;
        Ok(())
    }

    /// Chains the downstream error back through `next.weight` and this
    /// layer's activation derivative: `δ = (next.δ · next.Wᵗ) ⊙ f'(z)`.
    pub fn accumulate_delta(&mut self, next: &Layer<T>) -> Result<()> {
        let mut delta = next.delta.dot(&next.weight.transpose())?;
        let act = self.activator;
        let derivative = self.z.map(|v| act.derivative(v));
        delta.hadamard_assign(&derivative)?;
        self.delta = delta;
        Ok(())
    }

    /// Copies an externally supplied sample into this layer's activation.
    pub fn set_activation(&mut self, activation: &Matrix<T>) -> Result<()> {
        if activation.shape() != self.activation.shape() {
            return Err(NnError::mismatch(
                "set_activation",
                self.activation.shape(),
                activation.shape(),
            ));
        }
        self.activation.clone_from(activation);
        Ok(())
    }

    pub fn set_delta(&mut self, delta: Matrix<T>) -> Result<()> {
        if delta.shape() != self.delta.shape() {
            return Err(NnError::mismatch("set_delta", self.delta.shape(), delta.shape()));
        }
        self.delta = delta;
        Ok(())
    }

    /// Replaces the learned parameters; shapes must match the joined ones.
    pub fn set_parameters(&mut self, weight: Matrix<T>, bias: Matrix<T>) -> Result<()> {
        if weight.shape() != self.weight.shape() {
            return Err(NnError::mismatch("set_weight", self.weight.shape(), weight.shape()));
        }
        if bias.shape() != self.bias.shape() {
            return Err(NnError::mismatch("set_bias", self.bias.shape(), bias.shape()));
        }
        self.weight = weight;
        self.bias = bias;
        Ok(())
    }

    pub fn neuron_count(&self) -> usize {
        self.neuron_count
    }

    pub fn z(&self) -> &Matrix<T> {
        &self.z
    }

    pub fn activation(&self) -> &Matrix<T> {
        &self.activation
    }

    pub fn weight(&self) -> &Matrix<T> {
        &self.weight
    }

    pub fn bias(&self) -> &Matrix<T> {
        &self.bias
    }

    pub fn delta(&self) -> &Matrix<T> {
        &self.delta
    }

    pub fn activation_function(&self) -> Activation {
        self.activator
    }

    /// False for the input layer (and for any layer not yet joined).
    pub fn has_parameters(&self) -> bool {
        !self.bias.is_empty()
    }
}
