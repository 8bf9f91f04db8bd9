//! Neurons, layers and multi-layer perceptrons built on the scalar engine.

pub mod init;
pub mod layer;
pub mod loss;
pub mod mlp;
pub mod module;
pub mod neuron;

pub use layer::{Layer, LayerOutput};
pub use loss::{mean_squared_error, sum_squared_error};
pub use mlp::Mlp;
pub use module::Module;
pub use neuron::Neuron;
