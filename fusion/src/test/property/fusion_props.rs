use proptest::prelude::*;
use stencil_ir::test::property::generators::arb_graph;
use stencil_ir::{NodeTag, Use};

use crate::config::FusionConfig;
use crate::driver::fuse_with_config;
use crate::test::assert_fixpoint;

fn verified() -> FusionConfig {
    FusionConfig::builder().verify(true).build()
}

proptest! {
    #[test]
    fn fusion_preserves_outputs(recipe in arb_graph()) {
        let mut graph = recipe.build();
        let before = graph.expand_outputs().unwrap();
        let types: Vec<_> = graph.outputs().iter().map(|&v| graph.value_type(v).unwrap()).collect();

        fuse_with_config(&mut graph, &verified()).unwrap();

        prop_assert!(graph.verify().is_ok());
        prop_assert_eq!(graph.expand_outputs().unwrap(), before);
        let after: Vec<_> = graph.outputs().iter().map(|&v| graph.value_type(v).unwrap()).collect();
        prop_assert_eq!(after, types);
    }

    #[test]
    fn fusion_is_idempotent(recipe in arb_graph()) {
        let mut graph = recipe.build();
        fuse_with_config(&mut graph, &verified()).unwrap();
        let fused: Vec<_> = graph.nodes().collect();

        let stats = fuse_with_config(&mut graph, &verified()).unwrap();
        prop_assert_eq!(stats.rewrites(), 0);
        prop_assert_eq!(graph.nodes().collect::<Vec<_>>(), fused);
    }

    #[test]
    fn fusion_reaches_fixpoint(recipe in arb_graph()) {
        let mut graph = recipe.build();
        fuse_with_config(&mut graph, &verified()).unwrap();
        assert_fixpoint(&graph);

        for node in graph.nodes() {
            let data = graph.node(node).unwrap();
            if data.is_load() {
                prop_assert!(graph.user_nodes(data.results()[0]).len() <= 1);
                continue;
            }
            // No apply is left whose results only feed a single other apply.
            let mut sites = data.results().iter().flat_map(|&r| graph.uses(r).iter().copied()).peekable();
            if let Some(Use::Operand { node: first, .. }) = sites.peek().copied() {
                let exclusive = sites.all(|site| matches!(site, Use::Operand { node, .. } if node == first));
                prop_assert!(!exclusive, "{} is exclusively consumed by {}", node, first);
            }
        }
    }

    #[test]
    fn fusion_keeps_loads(recipe in arb_graph()) {
        let mut graph = recipe.build();
        fuse_with_config(&mut graph, &verified()).unwrap();
        prop_assert_eq!(graph.count(NodeTag::Load), recipe.loads);
    }
}
