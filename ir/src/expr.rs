//! Symbolic expansion of values into offset-resolved expression trees.
//!
//! Expanding a value follows every access back to a load or a region input,
//! summing offsets along the way. Two graphs computing the same thing expand
//! their outputs to identical trees regardless of how the work is split
//! across apply nodes, which makes this the reference for checking fusion.

use std::fmt;

use crate::arena::ValueId;
use crate::body::{Body, Inst, Local};
use crate::error::*;
use crate::graph::{Graph, NodeKind, ValueDef};
use crate::offset::Offset;
use crate::types::{ComputeOp, ConstValue, FieldRef};

/// Offset-resolved expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Field { field: FieldRef, offset: Offset },
    Input { index: usize, offset: Offset },
    Const(ConstValue),
    Compute { op: ComputeOp, args: Vec<Expr> },
}

impl Expr {
    /// Every `(field, offset)` leaf, in depth-first order.
    pub fn field_reads(&self) -> Vec<(&FieldRef, Offset)> {
        let mut reads = Vec::new();
        self.collect_reads(&mut reads);
        reads
    }

    fn collect_reads<'a>(&'a self, reads: &mut Vec<(&'a FieldRef, Offset)>) {
        match self {
            Self::Field { field, offset } => reads.push((field, *offset)),
            Self::Input { .. } | Self::Const(_) => {}
            Self::Compute { args, .. } => args.iter().for_each(|arg| arg.collect_reads(reads)),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field { field, offset } => write!(f, "{field}{offset}"),
            Self::Input { index, offset } => write!(f, "in{index}{offset}"),
            Self::Const(ConstValue::Int(v)) => write!(f, "{v}"),
            Self::Const(ConstValue::Float(v)) => write!(f, "{v:?}"),
            Self::Const(ConstValue::Bool(v)) => write!(f, "{v}"),
            Self::Compute { op, args } => {
                write!(f, "{op}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl Graph {
    /// Expands `value` as evaluated at the origin grid point.
    pub fn expand(&self, value: ValueId) -> Result<Expr> {
        self.expand_at(value, Offset::ZERO)
    }

    /// Expands every external output, in order.
    pub fn expand_outputs(&self) -> Result<Vec<Expr>> {
        self.outputs().iter().map(|&output| self.expand(output)).collect()
    }

    fn expand_at(&self, value: ValueId, shift: Offset) -> Result<Expr> {
        match self.value_def(value)? {
            ValueDef::Input { index } => Ok(Expr::Input { index, offset: shift }),
            ValueDef::Result { node, index } => match self.kind(node)? {
                NodeKind::Load { field, .. } => Ok(Expr::Field { field: field.clone(), offset: shift }),
                NodeKind::Apply { operands, body } => {
                    let local = body.returns().get(index).copied().ok_or_else(|| {
                        ReturnArityMismatchSnafu { node, returned: body.returns().len(), results: index + 1 }.build()
                    })?;
                    self.expand_local(body, operands, local, shift)
                }
            },
        }
    }

    fn expand_local(&self, body: &Body, operands: &[ValueId], local: Local, shift: Offset) -> Result<Expr> {
        let inst = body.insts().get(local.index()).ok_or_else(|| LocalWithoutResultSnafu { local: local.index() }.build())?;
        match inst {
            Inst::Access { param, offset } => {
                let operand = operands
                    .get(*param)
                    .copied()
                    .ok_or_else(|| AccessUnknownParameterSnafu { param: *param, params: operands.len() }.build())?;
                self.expand_at(operand, offset.compose(shift))
            }
            Inst::Const(value) => Ok(Expr::Const(*value)),
            Inst::Compute { op, args } => {
                let args = args.iter().map(|&arg| self.expand_local(body, operands, arg, shift)).collect::<Result<_>>()?;
                Ok(Expr::Compute { op: *op, args })
            }
            Inst::Return { .. } => LocalWithoutResultSnafu { local: local.index() }.fail(),
        }
    }
}
