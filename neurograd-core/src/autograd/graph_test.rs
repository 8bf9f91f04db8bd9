use super::*;
use approx::assert_relative_eq;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_leaf_creation() {
    let graph = Graph::new();
    assert!(graph.is_empty());

    let a = graph.value(2.0);
    let b = graph.labeled(-3.0, "b");
    assert_eq!(graph.len(), 2);
    assert_eq!(a.id(), NodeId(0));
    assert_eq!(b.id(), NodeId(1));

    let node = graph.node(b.id()).expect("node should exist");
    assert_eq!(node.value(), -3.0);
    assert_eq!(node.grad(), 0.0);
    assert_eq!(node.op(), Op::Leaf);
    assert!(node.operands().is_empty());
    assert_eq!(node.label(), Some("b"));

    assert!(graph.node(NodeId(7)).is_none());
}

#[test]
fn test_values_creates_one_leaf_per_number() {
    let graph = Graph::new();
    let xs = graph.values(&[1.0, 2.0, 3.0]);
    assert_eq!(xs.len(), 3);
    assert_eq!(graph.len(), 3);
    assert!(xs.iter().all(|x| x.is_leaf()));
}

#[test]
fn test_operands_precede_results() {
    let graph = Graph::new();
    let a = graph.value(1.0);
    let b = graph.value(2.0);
    let c = &a * &b;
    let d = (&c + &a).tanh();
    for id in [c.id(), d.id()] {
        let node = graph.node(id).expect("node should exist");
        assert!(node.operands().iter().all(|o| *o < id));
    }
}

#[test]
fn test_topological_order_respects_dependencies() {
    let graph = Graph::new();
    let a = graph.labeled(2.0, "a");
    let b = graph.labeled(-3.0, "b");
    let c = graph.labeled(10.0, "c");
    let e = &a * &b;
    let d = &e + &c;
    let l = d.tanh();

    let order = graph.topological_order(l.id());
    assert_eq!(order.last(), Some(&l.id()));
    assert_eq!(order.len(), 6);

    let position = |id: NodeId| order.iter().position(|x| *x == id).expect("reachable");
    for &id in &order {
        let node = graph.node(id).expect("node should exist");
        for operand in node.operands() {
            assert!(position(*operand) < position(id));
        }
    }
    // Operands are visited in recording order.
    assert_eq!(&order[..3], &[a.id(), b.id(), e.id()]);
}

#[test]
fn test_topological_order_visits_shared_node_once() {
    let graph = Graph::new();
    let a = graph.value(3.0);
    let b = &a * &a;
    let c = &b + &a;
    let order = graph.topological_order(c.id());
    assert_eq!(order, vec![a.id(), b.id(), c.id()]);
}

#[test]
fn test_topological_order_ignores_unreachable_nodes() {
    let graph = Graph::new();
    let a = graph.value(1.0);
    let _unused = graph.value(5.0);
    let b = a.exp();
    assert_eq!(graph.topological_order(b.id()), vec![a.id(), b.id()]);
}

#[test]
fn test_equal_values_are_distinct_nodes() {
    init_logger();
    let graph = Graph::new();
    let a = graph.value(2.0);
    let b = graph.value(2.0);
    let c = &a * &b;
    c.backward();
    // Both leaves hold 2.0; each still receives its own gradient.
    assert_relative_eq!(a.grad(), 2.0);
    assert_relative_eq!(b.grad(), 2.0);
    assert_eq!(graph.topological_order(c.id()).len(), 3);
}

#[test]
fn test_backward_seeds_root_with_one() {
    init_logger();
    let graph = Graph::new();
    let a = graph.value(0.5);
    a.set_grad(42.0);
    let reached = graph.backward(a.id());
    assert_eq!(reached, 1);
    assert_eq!(a.grad(), 1.0);
}

#[test]
fn test_backward_accumulates_without_reset() {
    init_logger();
    let graph = Graph::new();
    let a = graph.value(2.0);
    let b = graph.value(5.0);
    let c = &a * &b;
    c.backward();
    c.backward();
    // Two sweeps without zeroing: contributions add up.
    assert_relative_eq!(a.grad(), 10.0);
    assert_relative_eq!(b.grad(), 4.0);

    graph.zero_grad();
    assert_eq!(a.grad(), 0.0);
    assert_eq!(b.grad(), 0.0);
    assert_eq!(c.grad(), 0.0);

    c.backward();
    assert_relative_eq!(a.grad(), 5.0);
    assert_relative_eq!(b.grad(), 2.0);
}

#[test]
fn test_backward_on_diamond_graph() {
    init_logger();
    let graph = Graph::new();
    let a = graph.labeled(1.0, "a");
    let b = graph.labeled(3.0, "b");
    let c = graph.labeled(5.0, "c");
    let ab = &a + &b;
    let ac = &a + &c;
    let abac = &ab * &ac;
    abac.backward();
    // d/da (a+b)(a+c) = (a+c) + (a+b)
    assert_relative_eq!(a.grad(), 6.0 + 4.0);
    assert_relative_eq!(b.grad(), 6.0);
    assert_relative_eq!(c.grad(), 4.0);
}

#[test]
fn test_trace_collects_unique_edges() {
    let graph = Graph::new();
    let a = graph.labeled(2.0, "a");
    let b = &a + &a;
    let c = b.exp();
    let trace = graph.trace(c.id());
    assert_eq!(trace.nodes, vec![a.id(), b.id(), c.id()]);
    assert_eq!(trace.edges, vec![(a.id(), b.id()), (b.id(), c.id())]);
}

#[test]
fn test_graph_handles_share_arena() {
    let graph = Graph::new();
    let other = graph.clone();
    let a = other.value(1.0);
    assert!(graph.ptr_eq(&other));
    assert!(a.graph().ptr_eq(&graph));
    assert!(!graph.ptr_eq(&Graph::new()));
    assert_eq!(graph.len(), 1);
}

#[test]
fn test_truncate_drops_nodes_after_mark() {
    init_logger();
    let graph = Graph::new();
    let w = graph.labeled(0.5, "w");
    let mark = graph.mark();
    assert_eq!(mark.len(), 1);

    let y = (&w * 3.0).tanh();
    y.backward();
    let grad = w.grad();
    assert_eq!(graph.len(), 4);

    assert_eq!(graph.truncate(mark), 3);
    assert_eq!(graph.len(), 1);
    assert!(w.is_live());
    assert!(!y.is_live());
    // Surviving nodes keep their state.
    assert_eq!(w.value(), 0.5);
    assert_eq!(w.grad(), grad);

    // Nothing left above the mark.
    assert_eq!(graph.truncate(mark), 0);
}

#[test]
fn test_reused_slot_does_not_revive_stale_value() {
    let graph = Graph::new();
    let a = graph.value(1.0);
    let mark = graph.mark();
    let old = a.exp();
    graph.truncate(mark);

    let new = a.tanh();
    assert_eq!(new.id(), old.id());
    assert!(new.is_live());
    assert!(!old.is_live());
    assert_ne!(new, old);
    assert_eq!(format!("{}", old), format!("{} (dropped)", old.id()));
}

#[test]
#[should_panic(expected = "stale value")]
fn test_stale_value_read_panics() {
    let graph = Graph::new();
    let a = graph.value(1.0);
    let mark = graph.mark();
    let b = &a + 1.0;
    graph.truncate(mark);
    let _ = b.value();
}

#[test]
#[should_panic(expected = "stale value")]
fn test_stale_value_in_arithmetic_panics() {
    let graph = Graph::new();
    let a = graph.value(1.0);
    let mark = graph.mark();
    let b = a.exp();
    graph.truncate(mark);
    // The slot is filled again before the stale value is used.
    let _c = a.tanh();
    let _ = &a * &b;
}

#[test]
fn test_truncated_training_loop_stays_bounded() {
    init_logger();
    let graph = Graph::new();
    let w = graph.labeled(2.0, "w");
    let mark = graph.mark();
    let mut peak = None;
    for _ in 0..200 {
        w.zero_grad();
        let loss = (&w - 0.5).powf(2.0);
        loss.backward();
        w.set_value(w.value() - 0.1 * w.grad());
        let len = graph.len();
        assert_eq!(*peak.get_or_insert(len), len);
        graph.truncate(mark);
        assert_eq!(graph.len(), mark.len());
    }
    assert_relative_eq!(w.value(), 0.5, epsilon = 1e-9);
}
