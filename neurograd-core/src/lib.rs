//! Scalar reverse-mode automatic differentiation with a small neural-network
//! stack on top.
//!
//! Every scalar is a node in a [`Graph`]; arithmetic on [`Value`] handles
//! records new nodes, and [`Value::backward`] fills in the gradient of every
//! node the root depends on.

pub mod autograd;
pub mod error;
pub mod nn;
pub mod optim;
pub mod value;

pub use autograd::{Graph, GraphMark, NodeId, Op};
pub use error::NeurogradError;
pub use value::{Operand, Value};
