use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::activation::activation::Activation;
use crate::error::{NnError, Result};
use crate::layers::dense::Layer;
use crate::loss::loss_type::LossFunction;
use crate::math::scalar::Scalar;
use crate::network::metadata::ModelMetadata;
use crate::network::network::Network;

/// Describes one layer in a network specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub activation: Activation,
}

/// A serializable description of a network architecture: layer sizes and
/// activations (input first), the loss, the learning rate and optional
/// metadata. Stored as JSON next to the parameter file so the architecture
/// does not have to be re-specified at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub name: String,
    pub layers: Vec<LayerSpec>,
    pub loss: LossFunction,
    pub learning_rate: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl NetworkSpec {
    /// A spec with every layer sharing one activation.
    pub fn uniform(
        name: impl Into<String>,
        sizes: &[usize],
        activation: Activation,
        loss: LossFunction,
        learning_rate: f64,
    ) -> NetworkSpec {
        NetworkSpec {
            name: name.into(),
            layers: sizes
                .iter()
                .map(|&size| LayerSpec { size, activation })
                .collect(),
            loss,
            learning_rate,
            seed: None,
            metadata: None,
        }
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.layers.iter().map(|l| l.size).collect()
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| NnError::io(path, e))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|e| NnError::io(path, e))
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<NetworkSpec> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| NnError::io(path, e))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| NnError::io(path, e))
    }
}

impl<T: Scalar> Network<T> {
    /// Builds the (uncompiled) network described by `spec`.
    pub fn from_spec(spec: &NetworkSpec) -> Network<T> {
        let mut net = Network::new(T::from_f64(spec.learning_rate), spec.loss);
        if let Some(seed) = spec.seed {
            net = net.with_seed(seed);
        }
        for layer in &spec.layers {
            net.add(Layer::new(layer.size, layer.activation));
        }
        net
    }

    /// The architecture of this network.
    pub fn spec(&self, name: impl Into<String>) -> NetworkSpec {
        NetworkSpec {
            name: name.into(),
            layers: self
                .layers()
                .iter()
                .map(|l| LayerSpec {
                    size: l.neuron_count(),
                    activation: l.activation_function(),
                })
                .collect(),
            loss: self.loss(),
            learning_rate: self.learning_rate().to_f64_lossy(),
            seed: self.seed(),
            metadata: None,
        }
    }
}
