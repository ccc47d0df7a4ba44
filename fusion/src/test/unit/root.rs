use stencil_ir::test::fixtures::{shift, sum_of};
use stencil_ir::{Body, Graph, NodeTag, Offset, Use};
use test_case::test_case;

use crate::pattern::{FusionPattern, RewriteResult};
use crate::rules::RootIntroduction;
use crate::test::{F64, load, shifted};

#[test]
fn test_shared_load_gets_root() {
    let mut graph = Graph::new();
    let (l, field) = load(&mut graph, "l");
    let (a, a_out) = shifted(&mut graph, field, Offset::new(1, 0, 0));
    let (b, b_out) = shifted(&mut graph, field, Offset::new(0, 1, 0));
    graph.add_output(a_out).unwrap();
    graph.add_output(b_out).unwrap();
    let before = graph.expand_outputs().unwrap();

    let RewriteResult::Rewritten(rewrite) = RootIntroduction.match_and_rewrite(&mut graph, l).unwrap() else {
        panic!("shared load should get a root");
    };
    let [cloned, root] = rewrite.created.as_slice() else { panic!("expected clone and root") };
    let (cloned, root) = (*cloned, *root);

    assert!(!graph.contains_node(l));
    assert_eq!(graph.nodes().collect::<Vec<_>>(), vec![cloned, root, a, b]);
    assert_eq!(**graph.body(root).unwrap(), Body::identity(F64));

    let cloned_out = graph.results(cloned).unwrap()[0];
    let root_out = graph.results(root).unwrap()[0];
    assert_eq!(graph.operands(root).unwrap(), &[cloned_out]);
    assert_eq!(graph.uses(cloned_out), &[Use::Operand { node: root, index: 0 }]);
    assert_eq!(graph.operands(a).unwrap(), &[root_out]);
    assert_eq!(graph.operands(b).unwrap(), &[root_out]);

    assert!(graph.verify().is_ok());
    assert_eq!(graph.expand_outputs().unwrap(), before);
}

#[test_case(1, false ; "single consumer")]
#[test_case(2, true ; "two consumers")]
#[test_case(4, true ; "four consumers")]
fn test_root_sharing(consumers: i64, matches: bool) {
    let mut graph = Graph::new();
    let (l, field) = load(&mut graph, "l");
    let applies: Vec<_> = (0..consumers).map(|i| shifted(&mut graph, field, Offset::new(i, 0, 0)).0).collect();

    let result = RootIntroduction.match_and_rewrite(&mut graph, l).unwrap();
    assert_eq!(result.is_match(), matches);
    assert!(graph.verify().is_ok());

    let loads: Vec<_> = graph.nodes().filter(|&n| graph.node(n).unwrap().is_load()).collect();
    let [load] = loads.as_slice() else { panic!("expected one load") };
    let load_out = graph.results(*load).unwrap()[0];
    let expected = if matches { 1 } else { applies.len() };
    assert_eq!(graph.user_nodes(load_out).len(), expected);
    assert_eq!(graph.count(NodeTag::Apply), applies.len() + usize::from(matches));
}

#[test]
fn test_same_apply_reading_twice_counts_once() {
    let mut graph = Graph::new();
    let (l, field) = load(&mut graph, "l");
    let body = sum_of(&[F64, F64], &[(0, Offset::new(1, 0, 0)), (1, Offset::new(-1, 0, 0))]);
    graph.add_apply(&[field, field], body).unwrap();
    let snapshot = graph.nodes().collect::<Vec<_>>();

    assert_eq!(RootIntroduction.match_and_rewrite(&mut graph, l).unwrap(), RewriteResult::NoMatch);
    assert_eq!(graph.nodes().collect::<Vec<_>>(), snapshot);
}

#[test]
fn test_root_placed_before_earliest_consumer() {
    let mut graph = Graph::new();
    let (l, field) = load(&mut graph, "l");
    let (_, other) = load(&mut graph, "m");
    let (unrelated, _) = shifted(&mut graph, other, Offset::ZERO);
    let (first, _) = shifted(&mut graph, field, Offset::new(1, 0, 0));
    let (second, _) = shifted(&mut graph, field, Offset::new(-1, 0, 0));

    let RewriteResult::Rewritten(rewrite) = RootIntroduction.match_and_rewrite(&mut graph, l).unwrap() else {
        panic!("shared load should get a root");
    };
    let root = rewrite.created[1];
    assert!(graph.is_before(unrelated, root).unwrap());
    assert_eq!(graph.position(root).unwrap() + 1, graph.position(first).unwrap());
    assert!(graph.is_before(first, second).unwrap());
    assert!(graph.verify().is_ok());
}

#[test]
fn test_external_output_reads_root() {
    let mut graph = Graph::new();
    let (l, field) = load(&mut graph, "l");
    shifted(&mut graph, field, Offset::new(1, 0, 0));
    shifted(&mut graph, field, Offset::new(0, 0, 1));
    graph.add_output(field).unwrap();

    let RewriteResult::Rewritten(rewrite) = RootIntroduction.match_and_rewrite(&mut graph, l).unwrap() else {
        panic!("shared load should get a root");
    };
    let root_out = graph.results(rewrite.created[1]).unwrap()[0];
    assert_eq!(graph.outputs(), &[root_out]);
    assert!(graph.verify().is_ok());
}

#[test]
fn test_apply_is_not_an_anchor() {
    let mut graph = Graph::new();
    let (_, field) = load(&mut graph, "l");
    let apply = graph.add_apply(&[field], shift(F64, Offset::ZERO)).unwrap();
    assert_eq!(RootIntroduction.match_and_rewrite(&mut graph, apply).unwrap(), RewriteResult::NoMatch);
}
