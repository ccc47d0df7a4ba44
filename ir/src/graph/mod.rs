//! Program-ordered dataflow graph of loads and applies.
//!
//! # Module Organization
//!
//! - [`uses`] - def-use index from values to the sites reading them
//! - `mutate` - builder/rewriter capabilities (insert, clone, replace, erase)
//! - `verify` - structural invariant checks
//!
//! A [`Graph`] is a single region: graph inputs, a totally ordered list of
//! nodes, and an external output list. Every value has at most one producer;
//! every node appears exactly once in program order.

mod mutate;
pub mod uses;
mod verify;

use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::arena::{Arena, NodeId, ValueId};
use crate::body::Body;
use crate::error::*;
use crate::types::{FieldRef, ScalarType};

pub use mutate::InsertPoint;
pub use uses::Use;
use uses::UseIndex;

/// What a node computes.
#[derive(Debug, Clone, PartialEq)]
#[derive(strum::EnumDiscriminants)]
#[strum_discriminants(name(NodeTag), derive(Hash, PartialOrd, Ord, strum::Display, strum::EnumIter))]
pub enum NodeKind {
    /// Reference to an externally supplied field; one result, no operands.
    Load { field: FieldRef, ty: ScalarType },
    /// Stencil kernel evaluated at every grid point.
    Apply { operands: SmallVec<[ValueId; 4]>, body: Arc<Body> },
}

/// Graph vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    results: SmallVec<[ValueId; 2]>,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn tag(&self) -> NodeTag {
        NodeTag::from(&self.kind)
    }

    pub fn results(&self) -> &[ValueId] {
        &self.results
    }

    /// Operands in order; empty for loads.
    pub fn operands(&self) -> &[ValueId] {
        match &self.kind {
            NodeKind::Load { .. } => &[],
            NodeKind::Apply { operands, .. } => operands,
        }
    }

    pub fn body(&self) -> Option<&Arc<Body>> {
        match &self.kind {
            NodeKind::Load { .. } => None,
            NodeKind::Apply { body, .. } => Some(body),
        }
    }

    pub fn is_load(&self) -> bool {
        matches!(self.kind, NodeKind::Load { .. })
    }

    pub fn is_apply(&self) -> bool {
        matches!(self.kind, NodeKind::Apply { .. })
    }
}

/// Where a value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueDef {
    /// Region input `index`.
    Input { index: usize },
    /// Result `index` of `node`.
    Result { node: NodeId, index: usize },
}

#[derive(Debug, Clone)]
pub(crate) struct ValueData {
    pub(crate) ty: ScalarType,
    pub(crate) def: ValueDef,
}

/// Single region of loads and applies in program order.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Arena<NodeId, Node>,
    values: Arena<ValueId, ValueData>,
    uses: UseIndex,
    order: Vec<NodeId>,
    positions: HashMap<NodeId, usize>,
    inputs: Vec<ValueId>,
    outputs: Vec<ValueId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, node: NodeId) -> Result<&Node> {
        self.nodes.get(node).ok_or_else(|| StaleNodeSnafu { node }.build())
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains(node)
    }

    pub fn kind(&self, node: NodeId) -> Result<&NodeKind> {
        Ok(self.node(node)?.kind())
    }

    pub fn operands(&self, node: NodeId) -> Result<&[ValueId]> {
        Ok(self.node(node)?.operands())
    }

    pub fn results(&self, node: NodeId) -> Result<&[ValueId]> {
        Ok(self.node(node)?.results())
    }

    /// Body of an apply node.
    pub fn body(&self, node: NodeId) -> Result<&Arc<Body>> {
        self.node(node)?.body().ok_or_else(|| NotAnApplySnafu { node }.build())
    }

    pub fn value_type(&self, value: ValueId) -> Result<ScalarType> {
        Ok(self.value(value)?.ty)
    }

    pub fn value_def(&self, value: ValueId) -> Result<ValueDef> {
        Ok(self.value(value)?.def)
    }

    /// Producing node of `value`; `None` for graph inputs.
    pub fn producer(&self, value: ValueId) -> Result<Option<NodeId>> {
        Ok(match self.value(value)?.def {
            ValueDef::Input { .. } => None,
            ValueDef::Result { node, .. } => Some(node),
        })
    }

    /// Producing node of `value` if it is an apply.
    pub fn apply_producer(&self, value: ValueId) -> Result<Option<NodeId>> {
        match self.producer(value)? {
            Some(node) if self.node(node)?.is_apply() => Ok(Some(node)),
            _ => Ok(None),
        }
    }

    /// Every site reading `value`.
    pub fn uses(&self, value: ValueId) -> &[Use] {
        self.uses.get(value)
    }

    /// Distinct nodes reading `value`, in use order.
    pub fn user_nodes(&self, value: ValueId) -> SmallVec<[NodeId; 4]> {
        let mut users = SmallVec::new();
        for node in self.uses(value).iter().filter_map(Use::node) {
            if !users.contains(&node) {
                users.push(node);
            }
        }
        users
    }

    /// Distinct nodes reading any result of `node`, in result then use order.
    pub fn result_users(&self, node: NodeId) -> Result<SmallVec<[NodeId; 4]>> {
        let mut users: SmallVec<[NodeId; 4]> = SmallVec::new();
        for &result in self.results(node)? {
            for user in self.user_nodes(result) {
                if !users.contains(&user) {
                    users.push(user);
                }
            }
        }
        Ok(users)
    }

    /// Position of `node` in program order.
    pub fn position(&self, node: NodeId) -> Result<usize> {
        self.positions.get(&node).copied().ok_or_else(|| StaleNodeSnafu { node }.build())
    }

    /// Whether `a` comes strictly before `b` in program order.
    pub fn is_before(&self, a: NodeId, b: NodeId) -> Result<bool> {
        Ok(self.position(a)? < self.position(b)?)
    }

    /// Nodes in program order.
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = NodeId> + ExactSizeIterator + '_ {
        self.order.iter().copied()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn count(&self, tag: NodeTag) -> usize {
        self.nodes.iter().filter(|(_, node)| node.tag() == tag).count()
    }

    pub fn inputs(&self) -> &[ValueId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[ValueId] {
        &self.outputs
    }

    fn value(&self, value: ValueId) -> Result<&ValueData> {
        self.values.get(value).ok_or_else(|| StaleValueSnafu { value }.build())
    }

    fn reindex_from(&mut self, start: usize) {
        for (pos, &node) in self.order.iter().enumerate().skip(start) {
            self.positions.insert(node, pos);
        }
    }
}
