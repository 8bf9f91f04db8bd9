use std::fmt;

/// Tag identifying the rule that produced a node.
///
/// Composite operations (negation, subtraction, division) are not tags of
/// their own: they are recorded as the primitive operations they lower to,
/// so a renderer walking the graph will see `*`, `+` and `**` nodes for them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    /// Input or parameter. Never propagates a gradient.
    Leaf,
    Add,
    Mul,
    /// Power with a constant real exponent.
    Pow(f64),
    Exp,
    Tanh,
}

impl Op {
    /// Number of operands a node with this tag records.
    pub fn arity(&self) -> usize {
        match self {
            Op::Leaf => 0,
            Op::Add | Op::Mul => 2,
            Op::Pow(_) | Op::Exp | Op::Tanh => 1,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Op::Leaf)
    }

    /// Computes the forward value from the operand values.
    ///
    /// `inputs.len()` must equal [`Op::arity`]; callers in this crate guarantee it.
    /// Leaves have no forward rule.
    pub(crate) fn forward(&self, inputs: &[f64]) -> f64 {
        match *self {
            Op::Leaf => unreachable!("leaf values are stored, never computed"),
            Op::Add => inputs[0] + inputs[1],
            Op::Mul => inputs[0] * inputs[1],
            Op::Pow(p) => inputs[0].powf(p),
            Op::Exp => inputs[0].exp(),
            // Same value as (e^2x - 1) / (e^2x + 1) but without the inf/inf
            // blow-up for large |x|.
            Op::Tanh => inputs[0].tanh(),
        }
    }

    /// Local backward rule.
    ///
    /// Given the operand values, this node's own forward value and its
    /// accumulated gradient, returns the contribution to add to each
    /// operand's gradient, in operand order.
    pub(crate) fn backward(&self, inputs: &[f64], output: f64, grad_output: f64) -> Vec<f64> {
        match *self {
            Op::Leaf => Vec::new(),
            Op::Add => vec![grad_output, grad_output],
            Op::Mul => vec![inputs[1] * grad_output, inputs[0] * grad_output],
            Op::Pow(p) => vec![p * inputs[0].powf(p - 1.0) * grad_output],
            Op::Exp => vec![output * grad_output],
            Op::Tanh => vec![(1.0 - output * output) * grad_output],
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Leaf => write!(f, ""),
            Op::Add => write!(f, "+"),
            Op::Mul => write!(f, "*"),
            Op::Pow(p) => write!(f, "** {}", p),
            Op::Exp => write!(f, "exp"),
            Op::Tanh => write!(f, "tanh"),
        }
    }
}

#[cfg(test)]
#[path = "op_test.rs"]
mod tests;
