pub mod loss_type;

pub use loss_type::LossFunction;
