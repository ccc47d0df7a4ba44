//! Output rerouting.
//!
//! When a consumer's only apply producer also feeds other nodes (or external
//! outputs), inlining is not possible. Instead the producer is cloned and the
//! consumer is rebuilt to pass the externally used producer results through
//! as extra results. The clone then has the rebuilt consumer as its single
//! user, which leaves it to the inlining rule.
//!
//! ```text
//! P ──> C            P' ──> C' ──> (C results)
//!   └─> X      =>          └─────> X (reads forwarded P result)
//! ```

use smallvec::SmallVec;
use stencil_ir::{BodyBuilder, Graph, InsertPoint, NodeId, NodeTag, Offset, ValueId};

use super::{apply_producers, used_outside, value_types};
use crate::error::Result;
use crate::pattern::{FusionPattern, Rewrite, RewriteResult, Rule};

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputRerouting;

impl FusionPattern for OutputRerouting {
    fn rule(&self) -> Rule {
        Rule::OutputRerouting
    }

    fn benefit(&self) -> u16 {
        2
    }

    fn root(&self) -> NodeTag {
        NodeTag::Apply
    }

    fn match_and_rewrite(&self, graph: &mut Graph, consumer: NodeId) -> Result<RewriteResult> {
        if !graph.node(consumer)?.is_apply() {
            return Ok(RewriteResult::NoMatch);
        }

        let producers = apply_producers(graph, consumer)?;
        let [producer] = producers.as_slice() else {
            tracing::trace!(%consumer, producers = producers.len(), "reroute: needs exactly one apply producer");
            return Ok(RewriteResult::NoMatch);
        };
        let producer = *producer;

        let producer_pos = graph.position(producer)?;
        for &operand in graph.operands(consumer)? {
            if let Some(def) = graph.producer(operand)?
                && graph.position(def)? > producer_pos
            {
                tracing::trace!(%consumer, %producer, %operand, "reroute: operand defined after producer");
                return Ok(RewriteResult::NoMatch);
            }
        }

        let producer_results: SmallVec<[ValueId; 4]> = graph.results(producer)?.iter().copied().collect();
        let forwarded: SmallVec<[bool; 4]> =
            producer_results.iter().map(|&result| used_outside(graph, result, consumer)).collect();
        if !forwarded.contains(&true) {
            tracing::trace!(%consumer, %producer, "reroute: producer has no use outside consumer");
            return Ok(RewriteResult::NoMatch);
        }

        let consumer_operands: SmallVec<[ValueId; 4]> = graph.operands(consumer)?.iter().copied().collect();
        let consumer_results = graph.results(consumer)?.len();
        let body = graph.body(consumer)?.clone();

        let cloned = graph.clone_node(producer, InsertPoint::After(producer))?;
        let cloned_results: SmallVec<[ValueId; 4]> = graph.results(cloned)?.iter().copied().collect();

        // Every read of a producer result now reads the clone.
        let mut operands: SmallVec<[ValueId; 4]> = consumer_operands
            .iter()
            .map(|&operand| match producer_results.iter().position(|&r| r == operand) {
                Some(index) => cloned_results[index],
                None => operand,
            })
            .collect();

        // Parameter carrying each forwarded result, in producer result order.
        let mut forward_params: SmallVec<[(usize, usize); 4]> = SmallVec::new();
        for (index, &cloned_result) in cloned_results.iter().enumerate() {
            if !forwarded[index] {
                continue;
            }
            let param = match operands.iter().position(|&operand| operand == cloned_result) {
                Some(param) => param,
                None => {
                    operands.push(cloned_result);
                    operands.len() - 1
                }
            };
            forward_params.push((index, param));
        }

        let mut builder = BodyBuilder::new(value_types(graph, &operands)?);
        let mut returns = builder.splice(&body, |b, param, offset| b.access(param, offset))?;
        for &(_, param) in &forward_params {
            returns.push(builder.access(param, Offset::ZERO)?);
        }
        let fused = graph.insert_apply(InsertPoint::After(cloned), &operands, builder.finish(&returns)?)?;
        let fused_results: SmallVec<[ValueId; 4]> = graph.results(fused)?.iter().copied().collect();

        let mut producer_replacements = cloned_results.clone();
        for (slot, &(index, _)) in forward_params.iter().enumerate() {
            producer_replacements[index] = fused_results[consumer_results + slot];
        }

        graph.replace_node(consumer, &fused_results[..consumer_results])?;
        graph.replace_node(producer, &producer_replacements)?;

        tracing::debug!(
            %consumer,
            %producer,
            %cloned,
            %fused,
            forwarded = forward_params.len(),
            "rerouted producer outputs"
        );
        Ok(RewriteResult::Rewritten(Rewrite::new([cloned, fused])))
    }
}
