use crate::expr::Expr;
use crate::graph::Graph;
use crate::offset::Offset;
use crate::test::fixtures::{shift, stencil, sum_and_neg};
use crate::types::{ComputeOp, FieldRef, ScalarType};

const F64: ScalarType = ScalarType::Float64;

fn field(name: &str, offset: Offset) -> Expr {
    Expr::Field { field: FieldRef::new(name), offset }
}

#[test]
fn test_expand_load() {
    let mut graph = Graph::new();
    let load = graph.add_load("u", F64).unwrap();
    let value = graph.results(load).unwrap()[0];
    assert_eq!(graph.expand(value).unwrap(), field("u", Offset::ZERO));
}

#[test]
fn test_expand_composes_offsets_along_chain() {
    let mut graph = Graph::new();
    let load = graph.add_load("u", F64).unwrap();
    let mut value = graph.results(load).unwrap()[0];
    for offset in [Offset::new(1, 0, 0), Offset::new(0, 2, 0), Offset::new(0, 0, -3)] {
        let apply = graph.add_apply(&[value], shift(F64, offset)).unwrap();
        value = graph.results(apply).unwrap()[0];
    }
    assert_eq!(graph.expand(value).unwrap(), field("u", Offset::new(1, 2, -3)));
}

#[test]
fn test_expand_stencil_and_inputs() {
    let mut graph = Graph::new();
    let input = graph.add_input(F64);
    let apply = graph.add_apply(&[input], stencil(F64, &[Offset::new(-1, 0, 0), Offset::new(1, 0, 0)])).unwrap();
    let value = graph.results(apply).unwrap()[0];

    let expected = Expr::Compute {
        op: ComputeOp::Add,
        args: vec![
            Expr::Input { index: 0, offset: Offset::new(-1, 0, 0) },
            Expr::Input { index: 0, offset: Offset::new(1, 0, 0) },
        ],
    };
    assert_eq!(graph.expand(value).unwrap(), expected);
    assert_eq!(expected.to_string(), "add(in0[-1, 0, 0], in0[1, 0, 0])");
}

#[test]
fn test_expand_second_result() {
    let mut graph = Graph::new();
    let load = graph.add_load("u", F64).unwrap();
    let value = graph.results(load).unwrap()[0];
    let apply = graph.add_apply(&[value], sum_and_neg(&[F64], &[(0, Offset::new(0, 1, 0))])).unwrap();
    let neg = graph.results(apply).unwrap()[1];
    graph.add_output(neg).unwrap();

    let expected = Expr::Compute { op: ComputeOp::Neg, args: vec![field("u", Offset::new(0, 1, 0))] };
    assert_eq!(graph.expand_outputs().unwrap(), vec![expected.clone()]);
    assert_eq!(expected.field_reads(), vec![(&FieldRef::new("u"), Offset::new(0, 1, 0))]);
}
