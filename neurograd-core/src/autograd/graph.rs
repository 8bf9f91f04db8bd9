use crate::autograd::op::Op;
use crate::value::Value;
use log::{debug, trace};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Identity of a node: its slot in the graph arena.
///
/// Two nodes holding the same number are still distinct nodes; every
/// visited set and operand list in the engine is keyed by `NodeId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Arena slot of this node.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One scalar in the computation graph.
///
/// Operands always live in lower arena slots than the node that uses them,
/// so the graph is acyclic by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) value: f64,
    pub(crate) grad: f64,
    pub(crate) op: Op,
    pub(crate) operands: Vec<NodeId>,
    pub(crate) label: Option<String>,
    // Truncation count of the arena when this node was created.
    pub(crate) epoch: u64,
}

impl Node {
    fn leaf(value: f64, label: Option<String>, epoch: u64) -> Self {
        Node {
            value,
            grad: 0.0,
            op: Op::Leaf,
            operands: Vec::new(),
            label,
            epoch,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn grad(&self) -> f64 {
        self.grad
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn operands(&self) -> &[NodeId] {
        &self.operands
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// Nodes and "produced-from" edges reachable from a root.
///
/// This is everything an external renderer needs: edges point from an
/// operand to the node it helped produce, duplicates removed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trace {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<(NodeId, NodeId)>,
}

/// Arena length captured by [`Graph::mark`], to roll back to with
/// [`Graph::truncate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GraphMark(usize);

impl GraphMark {
    /// Number of nodes that survive a truncation to this mark.
    pub fn len(&self) -> usize {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Default)]
pub(crate) struct GraphInner {
    nodes: Vec<Node>,
    // Bumped by every truncation that drops nodes.
    epoch: u64,
}

/// Arena owning every node built through it.
///
/// `Graph` is a cheap handle: cloning it shares the same arena. All values
/// produced by arithmetic on a [`Value`] land in the graph of its operands.
/// The arena is single-threaded and lives as long as any handle or value
/// referring to it.
#[derive(Clone, Default)]
pub struct Graph {
    inner: Rc<RefCell<GraphInner>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a leaf node holding `value`.
    pub fn value(&self, value: f64) -> Value {
        let id = self.push_leaf(value, None);
        Value::from_parts(self.clone(), id)
    }

    /// Creates a labeled leaf node. Labels are only used for diagnostics.
    pub fn labeled(&self, value: f64, label: impl Into<String>) -> Value {
        let id = self.push_leaf(value, Some(label.into()));
        Value::from_parts(self.clone(), id)
    }

    /// Wraps every number of `values` in its own leaf node.
    pub fn values(&self, values: &[f64]) -> Vec<Value> {
        values.iter().map(|&v| self.value(v)).collect()
    }

    /// Number of live nodes in this graph.
    pub fn len(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of a node, or `None` if `id` does not belong to this graph.
    pub fn node(&self, id: NodeId) -> Option<Node> {
        self.inner.borrow().nodes.get(id.0).cloned()
    }

    /// Returns `true` if both handles share the same arena.
    pub fn ptr_eq(&self, other: &Graph) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn as_ptr(&self) -> *const () {
        Rc::as_ptr(&self.inner) as *const ()
    }

    /// Captures the current arena length.
    ///
    /// Take a mark once the long-lived nodes (inputs, parameters) exist;
    /// everything built afterwards can be dropped with [`Graph::truncate`].
    pub fn mark(&self) -> GraphMark {
        GraphMark(self.len())
    }

    /// Drops every node created after `mark` and returns how many went.
    ///
    /// Operands always sit below the nodes that use them, so the surviving
    /// prefix is a complete graph. Values that referred to a dropped node
    /// become stale: [`Value::is_live`] reports `false` and any other access
    /// panics, even once the slot is reused by a newer node.
    pub fn truncate(&self, mark: GraphMark) -> usize {
        let mut inner = self.inner.borrow_mut();
        if mark.0 >= inner.nodes.len() {
            return 0;
        }
        let dropped = inner.nodes.len() - mark.0;
        inner.nodes.truncate(mark.0);
        inner.epoch += 1;
        debug!(
            "truncate: dropped {} nodes, {} remain (epoch {})",
            dropped, mark.0, inner.epoch
        );
        dropped
    }

    pub(crate) fn push_leaf(&self, value: f64, label: Option<String>) -> NodeId {
        let mut inner = self.inner.borrow_mut();
        let id = NodeId(inner.nodes.len());
        let epoch = inner.epoch;
        inner.nodes.push(Node::leaf(value, label, epoch));
        id
    }

    /// Appends the result of `op` applied to `operands`.
    pub(crate) fn push_op(&self, op: Op, operands: Vec<NodeId>) -> NodeId {
        debug_assert!(!op.is_leaf(), "leaves are pushed with push_leaf");
        debug_assert_eq!(op.arity(), operands.len(), "operand count does not match {:?}", op);
        let mut inner = self.inner.borrow_mut();
        let inputs: Vec<f64> = operands.iter().map(|o| inner.nodes[o.0].value).collect();
        let value = op.forward(&inputs);
        let id = NodeId(inner.nodes.len());
        let epoch = inner.epoch;
        inner.nodes.push(Node {
            value,
            grad: 0.0,
            op,
            operands,
            label: None,
            epoch,
        });
        id
    }

    /// Epoch of a node that is known to be live.
    pub(crate) fn epoch_of(&self, id: NodeId) -> u64 {
        self.inner.borrow().nodes[id.0].epoch
    }

    pub(crate) fn is_live(&self, id: NodeId, epoch: u64) -> bool {
        matches!(self.inner.borrow().nodes.get(id.0), Some(node) if node.epoch == epoch)
    }

    /// Runs `f` on the node, panicking if the handle `(id, epoch)` is stale.
    pub(crate) fn read<R>(&self, id: NodeId, epoch: u64, f: impl FnOnce(&Node) -> R) -> R {
        let inner = self.inner.borrow();
        match inner.nodes.get(id.0) {
            Some(node) if node.epoch == epoch => f(node),
            _ => panic!("stale value {}: its node was dropped by Graph::truncate", id),
        }
    }

    pub(crate) fn write<R>(&self, id: NodeId, epoch: u64, f: impl FnOnce(&mut Node) -> R) -> R {
        let mut inner = self.inner.borrow_mut();
        match inner.nodes.get_mut(id.0) {
            Some(node) if node.epoch == epoch => f(node),
            _ => panic!("stale value {}: its node was dropped by Graph::truncate", id),
        }
    }

    /// Orders every node reachable from `root` so that each node comes after
    /// all of its operands (depth-first post-order, operands visited in the
    /// order they were recorded). `root` is always last.
    pub fn topological_order(&self, root: NodeId) -> Vec<NodeId> {
        let inner = self.inner.borrow();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut sorted = Vec::new();
        // (node, operands already pushed)
        let mut stack: Vec<(NodeId, bool)> = vec![(root, false)];

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                sorted.push(id);
                continue;
            }
            if !visited.insert(id) {
                continue;
            }
            stack.push((id, true));
            for &operand in inner.nodes[id.0].operands.iter().rev() {
                if !visited.contains(&operand) {
                    stack.push((operand, false));
                }
            }
        }
        sorted
    }

    /// Runs the reverse sweep from `root`.
    ///
    /// Seeds `root`'s gradient with 1.0 and adds each node's local
    /// contributions into its operands, visiting nodes in reverse
    /// topological order. Gradients of other nodes are *not* reset first:
    /// call [`Graph::zero_grad`] (or zero the parameters) between sweeps.
    ///
    /// Returns the number of nodes reached.
    pub fn backward(&self, root: NodeId) -> usize {
        let order = self.topological_order(root);
        let mut inner = self.inner.borrow_mut();
        inner.nodes[root.0].grad = 1.0;

        for &id in order.iter().rev() {
            let node = &inner.nodes[id.0];
            if node.op.is_leaf() {
                continue;
            }
            let op = node.op;
            let output = node.value;
            let grad_output = node.grad;
            let operands = node.operands.clone();
            let inputs: Vec<f64> = operands.iter().map(|o| inner.nodes[o.0].value).collect();

            let contributions = op.backward(&inputs, output, grad_output);
            for (operand, contribution) in operands.iter().zip(contributions) {
                inner.nodes[operand.0].grad += contribution;
            }
            trace!("backward: {} ({}) propagated grad {}", id, op, grad_output);
        }

        debug!("backward from {}: {} nodes reached", root, order.len());
        order.len()
    }

    /// Resets the gradient of every node in the arena to 0.0.
    pub fn zero_grad(&self) {
        for node in self.inner.borrow_mut().nodes.iter_mut() {
            node.grad = 0.0;
        }
    }

    /// Collects the nodes reachable from `root` and the operand edges
    /// between them.
    pub fn trace(&self, root: NodeId) -> Trace {
        let nodes = self.topological_order(root);
        let inner = self.inner.borrow();
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for &id in &nodes {
            for &operand in &inner.nodes[id.0].operands {
                if seen.insert((operand, id)) {
                    edges.push((operand, id));
                }
            }
        }
        Trace { nodes, edges }
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph").field("nodes", &self.len()).finish()
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
