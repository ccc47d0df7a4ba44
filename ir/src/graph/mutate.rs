//! Builder/rewriter capabilities of [`Graph`].
//!
//! Each call here either completes or fails before touching the graph, and
//! keeps the def-use index and program order in step with the node arena.

use std::sync::Arc;

use smallvec::SmallVec;
use snafu::ensure;

use super::uses::Use;
use super::{Graph, Node, NodeKind, ValueData, ValueDef};
use crate::arena::{NodeId, ValueId};
use crate::body::Body;
use crate::error::*;
use crate::types::{FieldRef, ScalarType};

/// Program-order position for a new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPoint {
    Before(NodeId),
    After(NodeId),
    End,
}

impl Graph {
    /// Adds a region input of element type `ty`.
    pub fn add_input(&mut self, ty: ScalarType) -> ValueId {
        let index = self.inputs.len();
        let value = self.values.insert(ValueData { ty, def: ValueDef::Input { index } });
        self.inputs.push(value);
        value
    }

    /// Marks `value` as externally observable; returns the output index.
    pub fn add_output(&mut self, value: ValueId) -> Result<usize> {
        self.value(value)?;
        let index = self.outputs.len();
        self.outputs.push(value);
        self.uses.add(value, Use::Output { index });
        Ok(index)
    }

    /// Appends a load of `field` at the end of the region.
    pub fn add_load(&mut self, field: impl Into<FieldRef>, ty: ScalarType) -> Result<NodeId> {
        self.insert_load(InsertPoint::End, field, ty)
    }

    /// Appends an apply at the end of the region.
    pub fn add_apply(&mut self, operands: &[ValueId], body: impl Into<Arc<Body>>) -> Result<NodeId> {
        self.insert_apply(InsertPoint::End, operands, body)
    }

    pub fn insert_load(&mut self, at: InsertPoint, field: impl Into<FieldRef>, ty: ScalarType) -> Result<NodeId> {
        let pos = self.resolve(at)?;
        Ok(self.insert_node(pos, NodeKind::Load { field: field.into(), ty }, &[ty]))
    }

    /// Inserts an apply reading `operands`.
    ///
    /// Operand count and types must match the body parameters, and every
    /// operand must be produced before the insertion point.
    pub fn insert_apply(&mut self, at: InsertPoint, operands: &[ValueId], body: impl Into<Arc<Body>>) -> Result<NodeId> {
        let body = body.into();
        let pos = self.resolve(at)?;
        self.check_operands(pos, operands, &body)?;

        let result_types = body.result_types();
        let kind = NodeKind::Apply { operands: operands.iter().copied().collect(), body };
        let node = self.insert_node(pos, kind, &result_types);
        for (index, &operand) in operands.iter().enumerate() {
            self.uses.add(operand, Use::Operand { node, index });
        }
        Ok(node)
    }

    /// Clones `node` (same operands and body, fresh results) at `at`.
    pub fn clone_node(&mut self, node: NodeId, at: InsertPoint) -> Result<NodeId> {
        match self.node(node)?.kind.clone() {
            NodeKind::Load { field, ty } => self.insert_load(at, field, ty),
            NodeKind::Apply { operands, body } => self.insert_apply(at, &operands, body),
        }
    }

    /// Redirects every use of `from` to `to`.
    pub fn replace_all_uses(&mut self, from: ValueId, to: ValueId) -> Result<()> {
        let from_ty = self.value_type(from)?;
        let to_ty = self.value_type(to)?;
        ensure!(from_ty == to_ty, ReplaceTypeMismatchSnafu { from, from_ty, to, to_ty });
        if from == to {
            return Ok(());
        }

        let sites = self.uses.take(from);
        for &site in &sites {
            match site {
                Use::Operand { node, index } => {
                    if let Some(Node { kind: NodeKind::Apply { operands, .. }, .. }) = self.nodes.get_mut(node) {
                        operands[index] = to;
                    }
                }
                Use::Output { index } => self.outputs[index] = to,
            }
        }
        self.uses.extend(to, sites);
        Ok(())
    }

    /// Redirects the results of `node` to `values` (positionally), then erases it.
    pub fn replace_node(&mut self, node: NodeId, values: &[ValueId]) -> Result<()> {
        let results: SmallVec<[ValueId; 4]> = self.results(node)?.iter().copied().collect();
        ensure!(
            results.len() == values.len(),
            ReplacementCountMismatchSnafu { node, expected: results.len(), actual: values.len() }
        );
        for (&result, &value) in results.iter().zip(values) {
            let from_ty = self.value_type(result)?;
            let to_ty = self.value_type(value)?;
            ensure!(from_ty == to_ty, ReplaceTypeMismatchSnafu { from: result, from_ty, to: value, to_ty });
        }
        for (&result, &value) in results.iter().zip(values) {
            self.replace_all_uses(result, value)?;
        }
        tracing::trace!(%node, replacements = values.len(), "replaced node");
        self.erase_node(node)
    }

    /// Removes a node whose results have no remaining uses.
    pub fn erase_node(&mut self, node: NodeId) -> Result<()> {
        let data = self.node(node)?;
        for &value in data.results() {
            let uses = self.uses(value).len();
            ensure!(uses == 0, EraseLiveNodeSnafu { node, value, uses });
        }

        let pos = self.position(node)?;
        let Some(data) = self.nodes.remove(node) else {
            return StaleNodeSnafu { node }.fail();
        };
        for (index, &operand) in data.operands().iter().enumerate() {
            self.uses.remove(operand, Use::Operand { node, index });
        }
        for &value in data.results() {
            self.values.remove(value);
        }
        self.order.remove(pos);
        self.positions.remove(&node);
        self.reindex_from(pos);
        tracing::trace!(%node, pos, "erased node");
        Ok(())
    }

    fn resolve(&self, at: InsertPoint) -> Result<usize> {
        match at {
            InsertPoint::Before(anchor) => self.position(anchor),
            InsertPoint::After(anchor) => Ok(self.position(anchor)? + 1),
            InsertPoint::End => Ok(self.order.len()),
        }
    }

    fn check_operands(&self, pos: usize, operands: &[ValueId], body: &Body) -> Result<()> {
        let params = body.params();
        ensure!(
            operands.len() == params.len(),
            ParameterCountMismatchSnafu { operands: operands.len(), params: params.len() }
        );
        for (index, (&operand, &param)) in operands.iter().zip(params).enumerate() {
            let operand_ty = self.value_type(operand)?;
            ensure!(operand_ty == param, ParameterTypeMismatchSnafu { index, operand: operand_ty, param });
            if let Some(producer) = self.producer(operand)? {
                ensure!(self.position(producer)? < pos, OperandAfterInsertionPointSnafu { value: operand, producer });
            }
        }
        Ok(())
    }

    fn insert_node(&mut self, pos: usize, kind: NodeKind, result_types: &[ScalarType]) -> NodeId {
        let node = self.nodes.insert(Node { kind, results: SmallVec::new() });
        let results: SmallVec<[ValueId; 2]> = result_types
            .iter()
            .enumerate()
            .map(|(index, &ty)| self.values.insert(ValueData { ty, def: ValueDef::Result { node, index } }))
            .collect();
        if let Some(data) = self.nodes.get_mut(node) {
            data.results = results;
        }
        self.order.insert(pos, node);
        self.reindex_from(pos);
        tracing::trace!(%node, pos, "inserted node");
        node
    }
}
