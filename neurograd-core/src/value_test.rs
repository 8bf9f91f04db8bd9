use super::*;
use approx::assert_relative_eq;

#[test]
fn test_add_gradient_passes_through() {
    let graph = Graph::new();
    let a = graph.value(2.0);
    let b = graph.value(-4.0);
    let c = &a + &b;
    assert_relative_eq!(c.value(), -2.0);
    assert_eq!(c.op(), Op::Add);
    c.backward();
    assert_eq!(a.grad(), c.grad());
    assert_eq!(b.grad(), c.grad());
    assert_eq!(c.grad(), 1.0);
}

#[test]
fn test_mul_gradient_swaps_operands() {
    let graph = Graph::new();
    let a = graph.value(2.0);
    let b = graph.value(-3.0);
    let c = &a * &b;
    assert_relative_eq!(c.value(), -6.0);
    c.backward();
    assert_eq!(a.grad(), b.value());
    assert_eq!(b.grad(), a.value());
}

#[test]
fn test_power_rule() {
    let graph = Graph::new();
    for &(x, p) in &[(2.0, 3.0), (1.5, -1.0), (4.0, 0.5), (-2.0, 2.0)] {
        let a = graph.value(x);
        let c = a.powf(p);
        assert_relative_eq!(c.value(), f64::powf(x, p));
        c.backward();
        assert_relative_eq!(a.grad(), p * f64::powf(x, p - 1.0), epsilon = 1e-12);
    }
}

#[test]
fn test_checked_pow_rejects_node_exponent() {
    let graph = Graph::new();
    let a = graph.value(2.0);
    let p = graph.value(3.0);
    let before = graph.len();
    assert_eq!(
        a.pow(&p),
        Err(NeurogradError::InvalidExponent {
            operation: "pow".to_string()
        })
    );
    assert_eq!(graph.len(), before, "no node should be built on failure");

    let cube = a.pow(3.0).expect("constant exponent is valid");
    assert_relative_eq!(cube.value(), 8.0);
    assert_eq!(cube.op(), Op::Pow(3.0));
}

#[test]
fn test_exp_reuses_forward_value() {
    let graph = Graph::new();
    let a = graph.value(0.7);
    let e = a.exp();
    e.backward();
    assert_relative_eq!(e.value(), 0.7f64.exp());
    assert_relative_eq!(a.grad(), e.value());
}

#[test]
fn test_tanh_bounds_and_derivative() {
    let graph = Graph::new();
    for &x in &[-5.0, -1.2, -0.3, 0.0, 0.4, 0.8813735870195432, 3.0, 7.5] {
        let a = graph.value(x);
        let t = a.tanh();
        assert!(t.value() > -1.0 && t.value() < 1.0, "tanh({}) out of bounds", x);
        t.backward();
        assert_relative_eq!(a.grad(), 1.0 - t.value() * t.value(), epsilon = 1e-12);
    }
}

#[test]
fn test_shared_node_accumulates() {
    let graph = Graph::new();
    let a = graph.value(3.0);
    let d = &a + &a;
    d.backward();
    assert_eq!(a.grad(), 2.0);

    let graph = Graph::new();
    let a = graph.value(3.0);
    let sq = &a * &a;
    sq.backward();
    assert_relative_eq!(a.grad(), 6.0);
}

#[test]
fn test_neg_sub_div_lowering() {
    let graph = Graph::new();
    let a = graph.value(6.0);
    let b = graph.value(4.0);

    let n = -&a;
    assert_relative_eq!(n.value(), -6.0);
    assert_eq!(n.op(), Op::Mul);

    let s = &a - &b;
    assert_relative_eq!(s.value(), 2.0);
    assert_eq!(s.op(), Op::Add);
    s.backward();
    assert_relative_eq!(a.grad(), 1.0);
    assert_relative_eq!(b.grad(), -1.0);

    graph.zero_grad();
    let q = &a / &b;
    assert_relative_eq!(q.value(), 1.5);
    assert_eq!(q.op(), Op::Mul);
    q.backward();
    assert_relative_eq!(a.grad(), 0.25);
    assert_relative_eq!(b.grad(), -6.0 / 16.0);
}

#[test]
fn test_literals_are_promoted_to_leaves() {
    let graph = Graph::new();
    let a = graph.labeled(2.0, "a");

    let r = &a + 1.0;
    assert_relative_eq!(r.value(), 3.0);
    let operands = r.operands();
    assert_eq!(operands.len(), 2);
    assert_eq!(operands[0], a);
    assert!(operands[1].is_leaf());
    assert_eq!(operands[1].label().as_deref(), Some("1"));

    let l = 2.0 * &a;
    assert_relative_eq!(l.value(), 4.0);
    assert_eq!(l.operands()[1], a);

    assert_relative_eq!((1.0 - &a).value(), -1.0);
    assert_relative_eq!((1.0 / &a).value(), 0.5);
    assert_relative_eq!((&a / 4.0).value(), 0.5);
    assert_relative_eq!((a.clone() - 0.5).value(), 1.5);
}

#[test]
fn test_subtracting_a_literal_promotes_its_negation() {
    let graph = Graph::new();
    let a = graph.labeled(2.0, "a");
    let before = graph.len();

    let r = &a - 0.5;
    // One promoted leaf and one add node.
    assert_eq!(graph.len(), before + 2);
    assert_eq!(r.op(), Op::Add);
    let operands = r.operands();
    assert_eq!(operands[0], a);
    assert!(operands[1].is_leaf());
    assert_eq!(operands[1].value(), -0.5);
    assert_eq!(operands[1].label().as_deref(), Some("-0.5"));

    assert_relative_eq!(r.value(), 1.5);
    r.backward();
    assert_relative_eq!(a.grad(), 1.0);
}

#[test]
fn test_literal_division_gradient() {
    let graph = Graph::new();
    let a = graph.value(2.0);
    let r = 1.0 / &a;
    r.backward();
    assert_relative_eq!(a.grad(), -0.25);
}

#[test]
fn test_division_by_zero_follows_ieee() {
    let graph = Graph::new();
    let a = graph.value(1.0);
    let z = graph.value(0.0);
    let q = &a / &z;
    assert!(q.value().is_infinite());
}

#[test]
fn test_owned_operator_forms() {
    let graph = Graph::new();
    let a = graph.value(2.0);
    let b = graph.value(5.0);
    let c = a.clone() * b.clone() + a.clone();
    assert_relative_eq!(c.value(), 12.0);
    let d = -(c - b);
    assert_relative_eq!(d.value(), -7.0);
    d.backward();
    assert_relative_eq!(a.grad(), -6.0);
}

#[test]
#[should_panic(expected = "different graphs")]
fn test_mixing_graphs_panics() {
    let a = Graph::new().value(1.0);
    let b = Graph::new().value(2.0);
    let _ = &a + &b;
}

#[test]
fn test_identity_equality() {
    let graph = Graph::new();
    let a = graph.value(1.0);
    let b = graph.value(1.0);
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
}

#[test]
fn test_value_accessors() {
    let graph = Graph::new();
    let a = graph.value(1.0).with_label("w");
    assert_eq!(a.label().as_deref(), Some("w"));
    a.set_value(3.5);
    assert_eq!(a.value(), 3.5);
    a.set_grad(0.25);
    assert_eq!(a.grad(), 0.25);
    a.zero_grad();
    assert_eq!(a.grad(), 0.0);
    assert_eq!(a.to_string(), "w = 3.5");
    assert_eq!(graph.value(2.0).to_string(), "data = 2");
}

#[test]
fn test_set_value_does_not_recompute_downstream() {
    let graph = Graph::new();
    let a = graph.value(1.0);
    let b = &a + 1.0;
    a.set_value(10.0);
    assert_eq!(b.value(), 2.0);
}

#[test]
fn test_expression_from_walkthrough() {
    // L = tanh((a*b + c) * f)
    let graph = Graph::new();
    let a = graph.labeled(2.0, "a");
    let b = graph.labeled(-3.0, "b");
    let c = graph.labeled(10.0, "c");
    let f = graph.labeled(-2.0, "f");
    let e = (&a * &b).with_label("e");
    let d = (&e + &c).with_label("d");
    let g = (&d * &f).with_label("g");
    let l = g.tanh().with_label("L");
    l.backward();

    let t = (-8.0f64).tanh();
    let dl_dg = 1.0 - t * t;
    assert_relative_eq!(g.grad(), dl_dg);
    assert_relative_eq!(f.grad(), dl_dg * 4.0);
    assert_relative_eq!(d.grad(), dl_dg * -2.0);
    assert_relative_eq!(c.grad(), dl_dg * -2.0);
    assert_relative_eq!(a.grad(), dl_dg * -2.0 * -3.0);
    assert_relative_eq!(b.grad(), dl_dg * -2.0 * 2.0);
}
