//! Root introduction.
//!
//! A load read by several applies is cloned and routed through a single
//! pass-through apply (the root), placed right before the earliest of those
//! applies. Afterwards the load has exactly one consumer, and the former
//! consumers share the root's result, which the rerouting rule can then
//! thread through them.

use stencil_ir::{Body, Graph, InsertPoint, NodeId, NodeKind, NodeTag};

use crate::error::Result;
use crate::pattern::{FusionPattern, Rewrite, RewriteResult, Rule};

#[derive(Debug, Clone, Copy, Default)]
pub struct RootIntroduction;

impl FusionPattern for RootIntroduction {
    fn rule(&self) -> Rule {
        Rule::RootIntroduction
    }

    fn benefit(&self) -> u16 {
        1
    }

    fn root(&self) -> NodeTag {
        NodeTag::Load
    }

    fn match_and_rewrite(&self, graph: &mut Graph, load: NodeId) -> Result<RewriteResult> {
        let &NodeKind::Load { ty, .. } = graph.kind(load)? else {
            return Ok(RewriteResult::NoMatch);
        };
        let Some(&output) = graph.results(load)?.first() else {
            return Ok(RewriteResult::NoMatch);
        };

        // Only applies read values through operands.
        let consumers = graph.user_nodes(output);
        if consumers.len() <= 1 {
            tracing::trace!(%load, consumers = consumers.len(), "root: load is not shared");
            return Ok(RewriteResult::NoMatch);
        }

        let mut earliest = consumers[0];
        for &consumer in &consumers[1..] {
            if graph.is_before(consumer, earliest)? {
                earliest = consumer;
            }
        }

        let cloned = graph.clone_node(load, InsertPoint::Before(load))?;
        let cloned_output = graph.results(cloned)?[0];
        let root = graph.insert_apply(InsertPoint::Before(earliest), &[cloned_output], Body::identity(ty))?;
        let root_output = graph.results(root)?[0];
        graph.replace_node(load, &[root_output])?;

        tracing::debug!(%load, %cloned, %root, consumers = consumers.len(), "introduced root");
        Ok(RewriteResult::Rewritten(Rewrite::new([cloned, root])))
    }
}
