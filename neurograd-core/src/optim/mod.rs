//! Optimizers for training neural networks.
//!
//! This module provides the `Optimizer` trait and plain stochastic gradient
//! descent with optional momentum and weight decay.

pub mod optimizer_trait;
pub mod sgd;

pub use optimizer_trait::Optimizer;
pub use sgd::{SgdConfig, SgdOptimizer};
