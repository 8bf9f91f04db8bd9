use crate::autograd::graph::{Graph, NodeId, Trace};
use crate::autograd::op::Op;
use crate::error::NeurogradError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Handle to one scalar node of a [`Graph`].
///
/// Cloning a `Value` is shallow: the clone refers to the same node. Equality
/// and hashing use node identity, never the numeric value.
///
/// Arithmetic builds new nodes eagerly:
///
/// ```
/// use neurograd_core::Graph;
///
/// let graph = Graph::new();
/// let a = graph.labeled(2.0, "a");
/// let b = graph.labeled(-3.0, "b");
/// let c = (&a * &b + 10.0).tanh();
/// c.backward();
/// assert!(a.grad() != 0.0);
/// ```
///
/// # Panics
/// The arithmetic operators panic when both sides are values of different
/// graphs. Module entry points check this up front and return
/// [`NeurogradError::GraphMismatch`] instead.
///
/// Every accessor panics once the node has been dropped by
/// [`Graph::truncate`]; check [`Value::is_live`] when unsure.
#[derive(Clone)]
pub struct Value {
    graph: Graph,
    id: NodeId,
    epoch: u64,
}

/// Anything that can stand on either side of an operation on a [`Value`]:
/// another node, or a raw number promoted to a fresh leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Node(Value),
    Constant(f64),
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Constant(value)
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Node(value)
    }
}

impl From<&Value> for Operand {
    fn from(value: &Value) -> Self {
        Operand::Node(value.clone())
    }
}

impl Operand {
    /// Turns the operand into a node of `graph`, promoting constants to
    /// leaves. Fails if the operand is a node of another graph.
    pub(crate) fn resolve(self, graph: &Graph, operation: &str) -> Result<Value, NeurogradError> {
        match self {
            Operand::Node(value) => {
                if !value.graph.ptr_eq(graph) {
                    return Err(NeurogradError::GraphMismatch {
                        operation: operation.to_string(),
                    });
                }
                Ok(value)
            }
            Operand::Constant(c) => Ok(graph.labeled(c, c.to_string())),
        }
    }
}

impl Value {
    pub(crate) fn from_parts(graph: Graph, id: NodeId) -> Self {
        let epoch = graph.epoch_of(id);
        Value { graph, id, epoch }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn value(&self) -> f64 {
        self.graph.read(self.id, self.epoch, |n| n.value)
    }

    /// Overwrites the stored value. Meant for optimizer steps on leaves;
    /// nodes already built from this one keep their old forward values.
    pub fn set_value(&self, value: f64) {
        self.graph.write(self.id, self.epoch, |n| n.value = value);
    }

    pub fn grad(&self) -> f64 {
        self.graph.read(self.id, self.epoch, |n| n.grad)
    }

    pub fn set_grad(&self, grad: f64) {
        self.graph.write(self.id, self.epoch, |n| n.grad = grad);
    }

    pub fn zero_grad(&self) {
        self.set_grad(0.0);
    }

    pub fn label(&self) -> Option<String> {
        self.graph.read(self.id, self.epoch, |n| n.label.clone())
    }

    pub fn set_label(&self, label: impl Into<String>) {
        let label = label.into();
        self.graph.write(self.id, self.epoch, |n| n.label = Some(label));
    }

    /// Builder-style [`Value::set_label`].
    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.set_label(label);
        self
    }

    /// `false` once [`Graph::truncate`] has dropped this value's node.
    pub fn is_live(&self) -> bool {
        self.graph.is_live(self.id, self.epoch)
    }

    fn ensure_live(&self) {
        self.graph.read(self.id, self.epoch, |_| ());
    }

    pub fn op(&self) -> Op {
        self.graph.read(self.id, self.epoch, |n| n.op)
    }

    pub fn is_leaf(&self) -> bool {
        self.op().is_leaf()
    }

    /// The nodes this value was produced from, in recording order.
    pub fn operands(&self) -> Vec<Value> {
        self.graph
            .read(self.id, self.epoch, |n| n.operands.clone())
            .into_iter()
            .map(|id| Value::from_parts(self.graph.clone(), id))
            .collect()
    }

    /// Runs the reverse sweep rooted at this value. See [`Graph::backward`].
    pub fn backward(&self) -> usize {
        self.ensure_live();
        self.graph.backward(self.id)
    }

    pub fn trace(&self) -> Trace {
        self.ensure_live();
        self.graph.trace(self.id)
    }

    /// `self` raised to a constant real power.
    pub fn powf(&self, exponent: f64) -> Value {
        self.unary(Op::Pow(exponent))
    }

    /// Checked power: the exponent must be a constant, not a node.
    pub fn pow(&self, exponent: impl Into<Operand>) -> Result<Value, NeurogradError> {
        match exponent.into() {
            Operand::Constant(p) => Ok(self.powf(p)),
            Operand::Node(_) => Err(NeurogradError::InvalidExponent {
                operation: "pow".to_string(),
            }),
        }
    }

    pub fn exp(&self) -> Value {
        self.unary(Op::Exp)
    }

    pub fn tanh(&self) -> Value {
        self.unary(Op::Tanh)
    }

    /// Promotes a raw number to a leaf of this value's graph.
    pub(crate) fn constant(&self, value: f64) -> Value {
        self.graph.labeled(value, value.to_string())
    }

    fn unary(&self, op: Op) -> Value {
        self.ensure_live();
        let id = self.graph.push_op(op, vec![self.id]);
        Value::from_parts(self.graph.clone(), id)
    }

    fn binary(&self, op: Op, rhs: Operand) -> Value {
        self.ensure_live();
        let rhs = match rhs.resolve(&self.graph, &op.to_string()) {
            Ok(rhs) => rhs,
            Err(e) => panic!("{}", e),
        };
        rhs.ensure_live();
        let id = self.graph.push_op(op, vec![self.id, rhs.id]);
        Value::from_parts(self.graph.clone(), id)
    }

    fn add_operand(&self, rhs: Operand) -> Value {
        self.binary(Op::Add, rhs)
    }

    fn mul_operand(&self, rhs: Operand) -> Value {
        self.binary(Op::Mul, rhs)
    }

    fn neg_value(&self) -> Value {
        self.mul_operand(Operand::Constant(-1.0))
    }

    fn sub_operand(&self, rhs: Operand) -> Value {
        match rhs {
            Operand::Node(v) => self.add_operand(Operand::Node(v.neg_value())),
            // Negated before promotion: one leaf instead of a leaf times -1.
            Operand::Constant(c) => self.add_operand(Operand::Constant(-c)),
        }
    }

    fn div_operand(&self, rhs: Operand) -> Value {
        let rhs = match rhs {
            Operand::Node(v) => v,
            Operand::Constant(c) => self.constant(c),
        };
        self.mul_operand(Operand::Node(rhs.powf(-1.0)))
    }
}

// `a + b`, `a - b`, `a * b`, `a / b` for every mix of `Value`, `&Value` and
// `f64`. Combining values of two different graphs panics.
macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $inner:ident) => {
        impl<R: Into<Operand>> $trait<R> for &Value {
            type Output = Value;

            fn $method(self, rhs: R) -> Value {
                self.$inner(rhs.into())
            }
        }

        impl<R: Into<Operand>> $trait<R> for Value {
            type Output = Value;

            fn $method(self, rhs: R) -> Value {
                (&self).$inner(rhs.into())
            }
        }

        impl $trait<&Value> for f64 {
            type Output = Value;

            fn $method(self, rhs: &Value) -> Value {
                rhs.constant(self).$inner(Operand::from(rhs))
            }
        }

        impl $trait<Value> for f64 {
            type Output = Value;

            fn $method(self, rhs: Value) -> Value {
                rhs.constant(self).$inner(Operand::Node(rhs))
            }
        }
    };
}

impl_binary_op!(Add, add, add_operand);
impl_binary_op!(Sub, sub, sub_operand);
impl_binary_op!(Mul, mul, mul_operand);
impl_binary_op!(Div, div, div_operand);

impl Neg for &Value {
    type Output = Value;

    fn neg(self) -> Value {
        self.neg_value()
    }
}

impl Neg for Value {
    type Output = Value;

    fn neg(self) -> Value {
        self.neg_value()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.epoch == other.epoch && self.graph.ptr_eq(&other.graph)
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.graph.as_ptr().hash(state);
        self.id.hash(state);
        self.epoch.hash(state);
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_live() {
            return write!(f, "{} (dropped)", self.id);
        }
        let label = self.label().unwrap_or_else(|| "data".to_string());
        write!(f, "{} = {}", label, self.value())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_live() {
            return f
                .debug_struct("Value")
                .field("id", &self.id)
                .field("live", &false)
                .finish();
        }
        let node = self.graph.read(self.id, self.epoch, |n| n.clone());
        f.debug_struct("Value")
            .field("id", &self.id)
            .field("value", &node.value)
            .field("grad", &node.grad)
            .field("op", &node.op)
            .field("label", &node.label)
            .finish()
    }
}

#[cfg(test)]
#[path = "value_test.rs"]
mod tests;
