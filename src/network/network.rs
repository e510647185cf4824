use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{NnError, Result};
use crate::layers::dense::Layer;
use crate::loss::loss_type::LossFunction;
use crate::math::matrix::Matrix;
use crate::math::scalar::Scalar;

/// A stack of fully connected layers trained with online SGD.
///
/// Build it with [`add`](Network::add), then call [`compile`](Network::compile)
/// exactly once before any forward or backward pass.
#[derive(Debug, Clone)]
pub struct Network<T = f64> {
    learning_rate: T,
    loss: LossFunction,
    layers: Vec<Layer<T>>,
    cost: T,
    seed: Option<u64>,
    compiled: bool,
}

impl<T: Scalar> Network<T> {
    pub fn new(learning_rate: T, loss: LossFunction) -> Network<T> {
        Network {
            learning_rate,
            loss,
            layers: Vec::new(),
            cost: T::zero(),
            seed: None,
            compiled: false,
        }
    }

    /// Makes [`compile`](Network::compile) draw its initial parameters from a
    /// generator seeded with `seed`.
    pub fn with_seed(mut self, seed: u64) -> Network<T> {
        self.seed = Some(seed);
        self
    }

    /// Appends a layer; shapes are resolved by `compile`.
    pub fn add(&mut self, layer: Layer<T>) -> &mut Self {
        self.layers.push(layer);
        self
    }

    /// Allocates and randomizes every layer using the configured seed, or
    /// entropy when no seed was set.
    pub fn compile(&mut self) -> Result<()> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.compile_with_rng(&mut rng)
    }

    pub fn compile_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        if self.compiled {
            return Err(NnError::Architecture("network is already compiled".into()));
        }
        if self.layers.len() < 2 {
            return Err(NnError::Architecture(format!(
                "a network needs an input and an output layer, got {} layer(s)",
                self.layers.len()
            )));
        }
        if let Some(i) = self.layers.iter().position(|l| l.neuron_count() == 0) {
            return Err(NnError::Architecture(format!("layer {i} has no neurons")));
        }

        self.join_layers();
        for layer in self.layers.iter_mut() {
            layer.randomize(rng);
        }
        self.compiled = true;
        Ok(())
    }

    fn join_layers(&mut self) {
        self.layers[0].join(None);
        for i in 1..self.layers.len() {
            let (head, tail) = self.layers.split_at_mut(i);
            tail[0].join(Some(&head[i - 1]));
        }
    }

    fn ensure_compiled(&self) -> Result<()> {
        if !self.compiled {
            return Err(NnError::Architecture("network is not compiled".into()));
        }
        Ok(())
    }

    fn output(&self) -> &Layer<T> {
        &self.layers[self.layers.len() - 1]
    }

    /// Binds `sample` (shape `1 x n[0]`) to the input layer and cascades
    /// activations to the output.
    pub fn forward_propagate(&mut self, sample: &Matrix<T>) -> Result<()> {
        self.ensure_compiled()?;
        self.layers[0].set_activation(sample)?;

        for i in 0..self.layers.len() - 1 {
            let (head, tail) = self.layers.split_at_mut(i + 1);
            head[i].forward_step(&mut tail[0])?;
        }
        Ok(())
    }

    /// Scores the output activation against the one-hot target for `label`,
    /// stores the mean loss in `cost` and the output delta `f'(z) * loss'(a, t)`.
    ///
    /// Leaves `cost` and every delta untouched when `label` is out of range.
    pub fn calculate_loss(&mut self, label: usize) -> Result<T> {
        self.ensure_compiled()?;
        let outputs = self.output().neuron_count();
        if label >= outputs {
            return Err(NnError::LabelOutOfRange { label, outputs });
        }

        let last = self.output();
        let act = last.activation_function();
        let z = last.z().as_slice();
        let predictions = last.activation().as_slice();

        let mut cost = T::zero();
        let mut delta = Vec::with_capacity(outputs);
        for i in 0..outputs {
            let expected = if i == label { T::one() } else { T::zero() };
            cost = cost + self.loss.loss(predictions[i], expected);
            delta.push(act.derivative(z[i]) * self.loss.derivative(predictions[i], expected));
        }
        let cost = cost / T::from_f64(outputs as f64);

        let last_index = self.layers.len() - 1;
        self.layers[last_index].set_delta(Matrix::row_vector(delta))?;
        self.cost = cost;
        Ok(cost)
    }

    /// Propagates deltas from the output back to layer 1.
    pub fn backpropagate_deltas(&mut self) -> Result<()> {
        self.ensure_compiled()?;
        for i in (1..self.layers.len() - 1).rev() {
            let (head, tail) = self.layers.split_at_mut(i + 1);
            head[i].accumulate_delta(&tail[0])?;
        }
        Ok(())
    }

    /// Applies one gradient-descent step to every layer with parameters.
    pub fn apply_gradients(&mut self) -> Result<()> {
        self.ensure_compiled()?;
        let lr = self.learning_rate;
        for i in (1..self.layers.len()).rev() {
            let (head, tail) = self.layers.split_at_mut(i);
            tail[0].backward_step(&head[i - 1], lr)?;
        }
        Ok(())
    }

    /// One online SGD step; returns the sample's cost.
    pub fn train_sample(&mut self, sample: &Matrix<T>, label: usize) -> Result<T> {
        self.forward_propagate(sample)?;
        let cost = self.calculate_loss(label)?;
        self.backpropagate_deltas()?;
        self.apply_gradients()?;
        Ok(cost)
    }

    /// One pass over the dataset in order; returns the mean sample cost.
    pub fn train_epoch(&mut self, samples: &[Matrix<T>], labels: &[usize]) -> Result<T> {
        ensure_same_len(samples, labels)?;
        let mut total = T::zero();
        for (sample, &label) in samples.iter().zip(labels) {
            total = total + self.train_sample(sample, label)?;
        }
        if samples.is_empty() {
            return Ok(T::zero());
        }
        Ok(total / T::from_f64(samples.len() as f64))
    }

    pub fn fit(&mut self, samples: &[Matrix<T>], labels: &[usize], epochs: usize) -> Result<()> {
        ensure_same_len(samples, labels)?;
        for _ in 0..epochs {
            self.train_epoch(samples, labels)?;
        }
        Ok(())
    }

    /// Index of the strongest output neuron; the first one wins ties.
    pub fn predict(&mut self, sample: &Matrix<T>) -> Result<usize> {
        self.forward_propagate(sample)?;
        Ok(self.output().activation().argmax().unwrap_or(0))
    }

    /// Percentage of samples whose prediction matches the label.
    pub fn evaluate(&mut self, samples: &[Matrix<T>], labels: &[usize]) -> Result<f64> {
        ensure_same_len(samples, labels)?;
        if samples.is_empty() {
            return Ok(0.0);
        }
        let mut correct = 0usize;
        for (sample, &label) in samples.iter().zip(labels) {
            if self.predict(sample)? == label {
                correct += 1;
            }
        }
        Ok(100.0 * correct as f64 / samples.len() as f64)
    }

    pub fn layers(&self) -> &[Layer<T>] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer<T>> {
        self.layers.get(index)
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer<T>] {
        &mut self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Mean loss of the most recent `calculate_loss` call.
    pub fn cost(&self) -> T {
        self.cost
    }

    pub fn learning_rate(&self) -> T {
        self.learning_rate
    }

    pub fn loss(&self) -> LossFunction {
        self.loss
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }
}

fn ensure_same_len<T>(samples: &[Matrix<T>], labels: &[usize]) -> Result<()> {
    if samples.len() != labels.len() {
        return Err(NnError::mismatch(
            "samples/labels",
            (samples.len(), 1),
            (labels.len(), 1),
        ));
    }
    Ok(())
}
