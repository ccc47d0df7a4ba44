//! Producer inlining.
//!
//! An apply whose results are read only by one consumer is spliced into that
//! consumer. Each access to a producer result at offset `o` becomes a copy of
//! the producer body whose own accesses are shifted by `o`, so a two-hop
//! `Load -> A(a) -> B(b)` chain turns into a single access at `a + b`.
//! Longer chains collapse one hop per application.

use smallvec::SmallVec;
use stencil_ir::error::{AccessUnknownParameterSnafu, ReturnArityMismatchSnafu};
use stencil_ir::{BodyBuilder, Graph, InsertPoint, NodeId, NodeTag, ValueId};

use super::{used_outside, value_types};
use crate::error::Result;
use crate::pattern::{FusionPattern, Rewrite, RewriteResult, Rule};

#[derive(Debug, Clone, Copy, Default)]
pub struct ProducerInlining;

/// What a consumer parameter reads after inlining.
#[derive(Debug, Clone, Copy)]
enum Binding {
    /// Parameter of the fused body.
    Param(usize),
    /// Result of the inlined producer.
    Inlined(usize),
}

impl ProducerInlining {
    /// First apply producer, in operand order, read by nothing but `consumer`.
    fn exclusive_producer(graph: &Graph, consumer: NodeId) -> Result<Option<NodeId>> {
        for &operand in graph.operands(consumer)? {
            let Some(producer) = graph.apply_producer(operand)? else {
                continue;
            };
            if graph.results(producer)?.iter().all(|&result| !used_outside(graph, result, consumer)) {
                return Ok(Some(producer));
            }
        }
        Ok(None)
    }
}

impl FusionPattern for ProducerInlining {
    fn rule(&self) -> Rule {
        Rule::ProducerInlining
    }

    fn benefit(&self) -> u16 {
        3
    }

    fn root(&self) -> NodeTag {
        NodeTag::Apply
    }

    fn match_and_rewrite(&self, graph: &mut Graph, consumer: NodeId) -> Result<RewriteResult> {
        if !graph.node(consumer)?.is_apply() {
            return Ok(RewriteResult::NoMatch);
        }
        let Some(producer) = Self::exclusive_producer(graph, consumer)? else {
            tracing::trace!(%consumer, "inline: no exclusively consumed producer");
            return Ok(RewriteResult::NoMatch);
        };

        let producer_results = graph.results(producer)?;
        let mut operands: SmallVec<[ValueId; 4]> = SmallVec::new();
        let mut consumer_bindings: SmallVec<[Binding; 4]> = SmallVec::new();
        for &operand in graph.operands(consumer)? {
            match producer_results.iter().position(|&result| result == operand) {
                Some(result) => consumer_bindings.push(Binding::Inlined(result)),
                None => {
                    consumer_bindings.push(Binding::Param(operands.len()));
                    operands.push(operand);
                }
            }
        }

        let mut producer_params: SmallVec<[usize; 4]> = SmallVec::new();
        for &operand in graph.operands(producer)? {
            let param = match operands.iter().position(|&existing| existing == operand) {
                Some(param) => param,
                None => {
                    operands.push(operand);
                    operands.len() - 1
                }
            };
            producer_params.push(param);
        }

        let consumer_body = graph.body(consumer)?;
        let producer_body = graph.body(producer)?;
        let mut builder = BodyBuilder::new(value_types(graph, &operands)?);
        let returns = builder.splice(consumer_body, |b, param, offset| {
            let binding = consumer_bindings
                .get(param)
                .copied()
                .ok_or_else(|| AccessUnknownParameterSnafu { param, params: consumer_bindings.len() }.build())?;
            match binding {
                Binding::Param(index) => b.access(index, offset),
                Binding::Inlined(result) => {
                    let inlined = b.splice(producer_body, |b, inner, inner_offset| {
                        let index = producer_params.get(inner).copied().ok_or_else(|| {
                            AccessUnknownParameterSnafu { param: inner, params: producer_params.len() }.build()
                        })?;
                        b.access(index, inner_offset.compose(offset))
                    })?;
                    inlined.get(result).copied().ok_or_else(|| {
                        ReturnArityMismatchSnafu { node: producer, returned: inlined.len(), results: result + 1 }.build()
                    })
                }
            }
        })?;
        let body = builder.finish(&returns)?;

        let fused = graph.insert_apply(InsertPoint::Before(consumer), &operands, body)?;
        let fused_results: SmallVec<[ValueId; 4]> = graph.results(fused)?.iter().copied().collect();
        graph.replace_node(consumer, &fused_results)?;
        graph.erase_node(producer)?;

        tracing::debug!(%consumer, %producer, %fused, params = operands.len(), "inlined producer");
        Ok(RewriteResult::Rewritten(Rewrite::new([fused])))
    }
}
