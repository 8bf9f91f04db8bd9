use crate::autograd::graph::Graph;
use crate::error::NeurogradError;
use crate::value::Value;
use log::debug;
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input {input_index}: analytical grad {analytical_grad:?} != numerical grad {numerical_grad:?}. Difference: {difference:?}")]
    GradientMismatch {
        input_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },

    #[error("Forward function execution failed during gradient check: {0}")]
    ForwardPassError(NeurogradError),

    #[error("Numerical gradient is NaN or infinite for input {input_index}. Details: Loss+: {loss_plus:?}, Loss-: {loss_minus:?}")]
    NumericalGradNaNOrInfinite {
        input_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },

    #[error("Analytical gradient is NaN or infinite for input {input_index}. Value: {value:?}")]
    AnalyticalGradNaNOrInfinite { input_index: usize, value: f64 },

    #[error("Epsilon must be finite and positive, got {0}")]
    InvalidEpsilon(f64),
}

impl From<NeurogradError> for GradCheckError {
    fn from(err: NeurogradError) -> Self {
        GradCheckError::ForwardPassError(err)
    }
}

/// Checks analytical gradients against central finite differences.
///
/// `func` receives a fresh graph and one leaf per entry of `inputs`, and must
/// return the scalar output built from them. The analytical gradient of each
/// leaf after a reverse sweep is compared with
/// `(f(x + eps) - f(x - eps)) / (2 * eps)`; a mismatch is reported when both
/// the absolute and the relative difference exceed `tolerance`.
pub fn check_grad<F>(func: F, inputs: &[f64], epsilon: f64, tolerance: f64) -> Result<(), GradCheckError>
where
    F: Fn(&Graph, &[Value]) -> Result<Value, NeurogradError>,
{
    if !(epsilon.is_finite() && epsilon > 0.0) {
        return Err(GradCheckError::InvalidEpsilon(epsilon));
    }

    // --- Analytical gradients ---
    let graph = Graph::new();
    let leaves = graph.values(inputs);
    let output = func(&graph, &leaves)?;
    output.backward();
    let analytical: Vec<f64> = leaves.iter().map(|leaf| leaf.grad()).collect();

    let evaluate = |point: &[f64]| -> Result<f64, GradCheckError> {
        let graph = Graph::new();
        let leaves = graph.values(point);
        Ok(func(&graph, &leaves)?.value())
    };

    // --- Numerical gradients, one input at a time ---
    for (i, &analytical_grad) in analytical.iter().enumerate() {
        let mut plus = inputs.to_vec();
        plus[i] += epsilon;
        let loss_plus = evaluate(&plus)?;

        let mut minus = inputs.to_vec();
        minus[i] -= epsilon;
        let loss_minus = evaluate(&minus)?;

        let numerical_grad = (loss_plus - loss_minus) / (2.0 * epsilon);

        if !numerical_grad.is_finite() {
            return Err(GradCheckError::NumericalGradNaNOrInfinite {
                input_index: i,
                loss_plus,
                loss_minus,
            });
        }
        if !analytical_grad.is_finite() {
            return Err(GradCheckError::AnalyticalGradNaNOrInfinite {
                input_index: i,
                value: analytical_grad,
            });
        }

        let difference = (analytical_grad - numerical_grad).abs();
        debug!(
            "check_grad: input {} analytical {} numerical {} diff {}",
            i, analytical_grad, numerical_grad, difference
        );
        if difference > tolerance && difference / (analytical_grad.abs() + epsilon) > tolerance {
            return Err(GradCheckError::GradientMismatch {
                input_index: i,
                analytical_grad,
                numerical_grad,
                difference,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "grad_check_test.rs"]
mod tests;
