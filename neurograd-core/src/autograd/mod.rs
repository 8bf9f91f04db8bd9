//! Reverse-mode automatic differentiation over scalar nodes.
//!
//! Nodes live in a [`Graph`] arena and are addressed by [`NodeId`]. Each
//! node records the [`Op`] that produced it and its operands; the reverse
//! sweep dispatches on that tag to propagate gradients.

pub mod grad_check;
pub mod graph;
pub mod op;

pub use graph::{Graph, GraphMark, Node, NodeId, Trace};
pub use op::Op;
