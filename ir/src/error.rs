use snafu::Snafu;

use crate::arena::{NodeId, ValueId};
use crate::types::ScalarType;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Contract violations detected by the graph model.
///
/// None of these are recoverable: they indicate a malformed input graph or a
/// rewrite that broke an invariant, and the running pass is expected to abort.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Node handle refers to a freed (or never allocated) slot.
    #[snafu(display("node {node} is not live in this graph"))]
    StaleNode { node: NodeId },

    /// Value handle refers to a freed (or never allocated) slot.
    #[snafu(display("value {value} is not live in this graph"))]
    StaleValue { value: ValueId },

    /// Node was expected to be an apply.
    #[snafu(display("node {node} is not an apply node"))]
    NotAnApply { node: NodeId },

    /// Redirecting uses between values of different element types.
    #[snafu(display("cannot replace {from} ({from_ty}) with {to} ({to_ty})"))]
    ReplaceTypeMismatch { from: ValueId, from_ty: ScalarType, to: ValueId, to_ty: ScalarType },

    /// Wrong number of replacement values for a node.
    #[snafu(display("node {node} has {expected} results but {actual} replacements were given"))]
    ReplacementCountMismatch { node: NodeId, expected: usize, actual: usize },

    /// Erasing a node whose results are still referenced.
    #[snafu(display("cannot erase node {node}: result {value} still has {uses} use(s)"))]
    EraseLiveNode { node: NodeId, value: ValueId, uses: usize },

    /// Operand count and body parameter count disagree.
    #[snafu(display("apply has {operands} operands but body declares {params} parameters"))]
    ParameterCountMismatch { operands: usize, params: usize },

    /// Operand type differs from the matching body parameter.
    #[snafu(display("operand {index} has type {operand} but body parameter has type {param}"))]
    ParameterTypeMismatch { index: usize, operand: ScalarType, param: ScalarType },

    /// Access reads a parameter that does not exist.
    #[snafu(display("access reads parameter {param} but body has {params} parameters"))]
    AccessUnknownParameter { param: usize, params: usize },

    /// Instruction references a local that is not defined before it.
    #[snafu(display("instruction {inst} references local {local} which is not defined before it"))]
    UndefinedLocal { inst: usize, local: usize },

    /// Local refers to an instruction without a result (the terminator).
    #[snafu(display("local {local} refers to an instruction without a result"))]
    LocalWithoutResult { local: usize },

    /// Body has no terminator or it is not the last instruction.
    #[snafu(display("body must end with exactly one return"))]
    MissingReturn,

    /// Compute operation with the wrong number of arguments.
    #[snafu(display("{op} expects {expected} argument(s), got {actual}"))]
    ComputeArity { op: crate::types::ComputeOp, expected: usize, actual: usize },

    /// Return operand count differs from the node result count.
    #[snafu(display("node {node} returns {returned} values but declares {results} results"))]
    ReturnArityMismatch { node: NodeId, returned: usize, results: usize },

    /// Return operand type differs from the node result type.
    #[snafu(display("node {node} result {index} has type {result} but body returns {returned}"))]
    ResultTypeMismatch { node: NodeId, index: usize, result: ScalarType, returned: ScalarType },

    /// Operand is produced at or after the node that consumes it.
    #[snafu(display("node {node} reads {value} which is produced by {producer} later in program order"))]
    UseBeforeDef { node: NodeId, value: ValueId, producer: NodeId },

    /// New node would be placed before the producer of one of its operands.
    #[snafu(display("operand {value} is produced by {producer}, which does not precede the insertion point"))]
    OperandAfterInsertionPoint { value: ValueId, producer: NodeId },

    /// Def-use list disagrees with the operands and outputs that reference a value.
    #[snafu(display("def-use list of {value} is inconsistent with its references"))]
    DefUseMismatch { value: ValueId },

    /// Program order and node arena disagree.
    #[snafu(display("program order lists {ordered} nodes but the arena holds {live}"))]
    OrderMismatch { ordered: usize, live: usize },

    /// Output index is out of range.
    #[snafu(display("output {index} does not exist (region has {outputs} outputs)"))]
    UnknownOutput { index: usize, outputs: usize },
}
