pub mod activation;
pub mod dataset;
pub mod error;
pub mod layers;
pub mod loss;
pub mod math;
pub mod network;
pub mod train;

// Convenience re-exports
pub use activation::activation::Activation;
pub use dataset::Dataset;
pub use error::{NnError, Result};
pub use layers::dense::Layer;
pub use loss::loss_type::LossFunction;
pub use math::matrix::Matrix;
pub use math::scalar::Scalar;
pub use network::network::Network;
pub use network::spec::{LayerSpec, NetworkSpec};
pub use train::loop_fn::train_loop;
pub use train::train_config::TrainConfig;
