//! The fusion rewrite rules.
//!
//! - [`root`] - shares a multiply-consumed load through a pass-through apply
//! - [`reroute`] - routes a producer's external results through one consumer
//! - [`inline`] - splices an exclusively consumed producer into its consumer
//!
//! Every rule validates its preconditions and builds the replacement body
//! before touching the graph.

pub mod inline;
pub mod reroute;
pub mod root;

pub use inline::ProducerInlining;
pub use reroute::OutputRerouting;
pub use root::RootIntroduction;

use smallvec::SmallVec;
use stencil_ir::{Graph, NodeId, ScalarType, Use, ValueId};

use crate::error::Result;

/// Distinct apply nodes producing the operands of `node`, in operand order.
pub(crate) fn apply_producers(graph: &Graph, node: NodeId) -> Result<SmallVec<[NodeId; 4]>> {
    let mut producers: SmallVec<[NodeId; 4]> = SmallVec::new();
    for &operand in graph.operands(node)? {
        if let Some(producer) = graph.apply_producer(operand)?
            && !producers.contains(&producer)
        {
            producers.push(producer);
        }
    }
    Ok(producers)
}

/// Whether `value` is read by anything other than `consumer`, external outputs included.
pub(crate) fn used_outside(graph: &Graph, value: ValueId, consumer: NodeId) -> bool {
    graph.uses(value).iter().any(|site| match site {
        Use::Operand { node, .. } => *node != consumer,
        Use::Output { .. } => true,
    })
}

pub(crate) fn value_types(graph: &Graph, values: &[ValueId]) -> Result<SmallVec<[ScalarType; 4]>> {
    Ok(values.iter().map(|&value| graph.value_type(value)).collect::<stencil_ir::Result<_>>()?)
}
