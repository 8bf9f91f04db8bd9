use crate::autograd::graph::NodeId;
use crate::error::NeurogradError;
use crate::optim::optimizer_trait::Optimizer;
use crate::value::Value;
use log::{debug, warn};
use std::collections::HashMap;

/// Hyperparameters for [`SgdOptimizer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SgdConfig {
    pub lr: f64,
    pub momentum: f64,
    pub weight_decay: f64,
    pub nesterov: bool,
}

impl Default for SgdConfig {
    fn default() -> Self {
        SgdConfig {
            lr: 0.05,
            momentum: 0.0,
            weight_decay: 0.0,
            nesterov: false,
        }
    }
}

impl SgdConfig {
    pub fn with_lr(lr: f64) -> Self {
        SgdConfig {
            lr,
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<(), NeurogradError> {
        if !self.lr.is_finite() || self.lr < 0.0 {
            return Err(NeurogradError::InvalidOperation(format!(
                "SGD learning rate must be finite and non-negative, got {}",
                self.lr
            )));
        }
        if !self.momentum.is_finite() || self.momentum < 0.0 {
            return Err(NeurogradError::InvalidOperation(format!(
                "SGD momentum must be finite and non-negative, got {}",
                self.momentum
            )));
        }
        if !self.weight_decay.is_finite() || self.weight_decay < 0.0 {
            return Err(NeurogradError::InvalidOperation(format!(
                "SGD weight decay must be finite and non-negative, got {}",
                self.weight_decay
            )));
        }
        if self.nesterov && self.momentum == 0.0 {
            return Err(NeurogradError::InvalidOperation(
                "Nesterov momentum requires a non-zero momentum".to_string(),
            ));
        }
        Ok(())
    }
}

/// Implements the Stochastic Gradient Descent (SGD) optimizer.
///
/// Supports momentum, weight decay, and Nesterov momentum. With the default
/// extras switched off a step is `p.value -= lr * p.grad`.
#[derive(Debug)]
pub struct SgdOptimizer {
    params: Vec<Value>,
    config: SgdConfig,
    momentum_buffers: HashMap<NodeId, f64>,
    steps: usize,
}

impl SgdOptimizer {
    /// Creates a new `SgdOptimizer` over `params`.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` for an invalid config, an empty parameter list or a
    /// parameter that is not a leaf. `GraphMismatch` if the parameters do not
    /// all live in one graph.
    pub fn new(params: Vec<Value>, config: SgdConfig) -> Result<Self, NeurogradError> {
        config.validate()?;
        let first = params.first().ok_or_else(|| {
            NeurogradError::InvalidOperation("SGD got an empty parameter list".to_string())
        })?;
        let graph = first.graph().clone();
        for param in &params {
            if !param.graph().ptr_eq(&graph) {
                return Err(NeurogradError::GraphMismatch {
                    operation: "SgdOptimizer::new".to_string(),
                });
            }
            if !param.is_leaf() {
                return Err(NeurogradError::InvalidOperation(format!(
                    "SGD can only update leaf values, {} is the output of '{}'",
                    param.id(),
                    param.op()
                )));
            }
        }
        debug!(
            "SgdOptimizer::new: {} parameters, {:?}",
            params.len(),
            config
        );
        Ok(SgdOptimizer {
            params,
            config,
            momentum_buffers: HashMap::new(),
            steps: 0,
        })
    }

    pub fn config(&self) -> &SgdConfig {
        &self.config
    }

    pub fn lr(&self) -> f64 {
        self.config.lr
    }

    /// Changes the learning rate used by subsequent steps.
    pub fn set_lr(&mut self, lr: f64) -> Result<(), NeurogradError> {
        let config = SgdConfig { lr, ..self.config };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Number of completed calls to `step`.
    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl Optimizer for SgdOptimizer {
    fn step(&mut self) -> Result<(), NeurogradError> {
        let SgdConfig {
            lr,
            momentum,
            weight_decay,
            nesterov,
        } = self.config;
        let mut skipped = 0;

        for param in &self.params {
            let grad = param.grad();
            if !grad.is_finite() {
                warn!(
                    "SGD step {}: skipping {} with non-finite gradient {}",
                    self.steps,
                    param.id(),
                    grad
                );
                skipped += 1;
                continue;
            }

            let mut d_p = grad;
            if weight_decay != 0.0 {
                d_p += weight_decay * param.value();
            }

            if momentum != 0.0 {
                let buf = match self.momentum_buffers.get(&param.id()) {
                    Some(prev) => momentum * prev + d_p,
                    None => d_p,
                };
                self.momentum_buffers.insert(param.id(), buf);
                d_p = if nesterov { d_p + momentum * buf } else { buf };
            }

            param.set_value(param.value() - lr * d_p);
        }

        self.steps += 1;
        debug!(
            "SGD step {}: updated {} parameters ({} skipped), lr {}",
            self.steps,
            self.params.len() - skipped,
            skipped,
            lr
        );
        Ok(())
    }

    fn zero_grad(&mut self) {
        for param in &self.params {
            param.zero_grad();
        }
    }
}

#[cfg(test)]
#[path = "sgd_test.rs"]
mod tests;
