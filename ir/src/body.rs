//! Apply bodies: the per-grid-point computation of a kernel.
//!
//! A body is a straight-line SSA sequence over its parameters. Parameters are
//! only ever read through `Access` instructions at a constant offset, and the
//! sequence ends in a single `Return` whose operands become the node results.
//!
//! Bodies are immutable once built. [`BodyBuilder`] is the only way to make
//! one, so every `Body` in a graph is well formed by construction; rewrites
//! build a fresh body instead of editing an existing one.

use smallvec::SmallVec;
use snafu::ensure;

use crate::error::*;
use crate::offset::Offset;
use crate::types::{ComputeOp, ConstValue, ScalarType};

/// Result of an instruction inside a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Local(u32);

impl Local {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Instruction inside an apply body.
#[derive(Debug, Clone, PartialEq)]
pub enum Inst {
    /// Reads parameter `param` at `offset` from the current grid point.
    Access { param: usize, offset: Offset },
    Const(ConstValue),
    Compute { op: ComputeOp, args: SmallVec<[Local; 2]> },
    /// Terminator; operands become the node results, in order.
    Return { operands: SmallVec<[Local; 4]> },
}

impl Inst {
    pub fn is_return(&self) -> bool {
        matches!(self, Self::Return { .. })
    }
}

/// Single-entry computation owned by an apply node.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    params: SmallVec<[ScalarType; 4]>,
    insts: Vec<Inst>,
    /// Result type per instruction; `None` for the terminator.
    types: Vec<Option<ScalarType>>,
}

impl Body {
    /// Pass-through body: `return access(param0, [0, 0, 0])`.
    pub fn identity(ty: ScalarType) -> Self {
        let params = SmallVec::from_elem(ty, 1);
        let access = Inst::Access { param: 0, offset: Offset::ZERO };
        let ret = Inst::Return { operands: SmallVec::from_elem(Local(0), 1) };
        Self { params, insts: vec![access, ret], types: vec![Some(ty), None] }
    }

    pub fn params(&self) -> &[ScalarType] {
        &self.params
    }

    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    /// Operands of the terminator.
    pub fn returns(&self) -> &[Local] {
        match self.insts.last() {
            Some(Inst::Return { operands }) => operands,
            // Unreachable for builder-made bodies.
            _ => &[],
        }
    }

    pub fn local_type(&self, local: Local) -> Option<ScalarType> {
        self.types.get(local.index()).copied().flatten()
    }

    /// Types of the returned values, i.e. of the owning node's results.
    pub fn result_types(&self) -> SmallVec<[ScalarType; 4]> {
        self.returns().iter().filter_map(|&local| self.local_type(local)).collect()
    }

    /// All `(param, offset)` pairs read by the body, in instruction order.
    pub fn accesses(&self) -> impl Iterator<Item = (usize, Offset)> + '_ {
        self.insts.iter().filter_map(|inst| match inst {
            Inst::Access { param, offset } => Some((*param, *offset)),
            _ => None,
        })
    }

    /// Whether any instruction reads parameter `param`.
    pub fn reads_param(&self, param: usize) -> bool {
        self.accesses().any(|(p, _)| p == param)
    }
}

/// Incremental, validating constructor for [`Body`].
#[derive(Debug, Clone)]
pub struct BodyBuilder {
    params: SmallVec<[ScalarType; 4]>,
    insts: Vec<Inst>,
    types: Vec<Option<ScalarType>>,
}

impl BodyBuilder {
    pub fn new(params: impl IntoIterator<Item = ScalarType>) -> Self {
        Self { params: params.into_iter().collect(), insts: Vec::new(), types: Vec::new() }
    }

    pub fn params(&self) -> &[ScalarType] {
        &self.params
    }

    pub fn access(&mut self, param: usize, offset: Offset) -> Result<Local> {
        let ty = *self.params.get(param).ok_or_else(|| {
            AccessUnknownParameterSnafu { param, params: self.params.len() }.build()
        })?;
        Ok(self.push(Inst::Access { param, offset }, ty))
    }

    pub fn constant(&mut self, value: ConstValue) -> Local {
        self.push(Inst::Const(value), value.scalar_type())
    }

    /// Emits `op(args)`; the result takes the type of the first argument.
    pub fn compute(&mut self, op: ComputeOp, args: &[Local]) -> Result<Local> {
        ensure!(args.len() == op.arity(), ComputeAritySnafu { op, expected: op.arity(), actual: args.len() });
        let inst = self.insts.len();
        let mut ty = None;
        for &arg in args {
            let arg_ty = self.check_local(inst, arg)?;
            ty.get_or_insert(arg_ty);
        }
        let ty = ty.ok_or_else(|| ComputeAritySnafu { op, expected: op.arity(), actual: 0usize }.build())?;
        Ok(self.push(Inst::Compute { op, args: args.iter().copied().collect() }, ty))
    }

    /// Copies every non-terminator instruction of `body` into this builder.
    ///
    /// Accesses are not copied verbatim: `on_access(builder, param, offset)`
    /// decides what each one becomes and returns the local standing in for it.
    /// Returns the locals that correspond to `body`'s return operands.
    pub fn splice<F>(&mut self, body: &Body, mut on_access: F) -> Result<SmallVec<[Local; 4]>>
    where
        F: FnMut(&mut Self, usize, Offset) -> Result<Local>,
    {
        let mut map: Vec<Option<Local>> = Vec::with_capacity(body.insts.len());
        let lookup = |map: &[Option<Local>], inst: usize, local: Local| {
            map.get(local.index())
                .copied()
                .flatten()
                .ok_or_else(|| UndefinedLocalSnafu { inst, local: local.index() }.build())
        };

        for (index, inst) in body.insts.iter().enumerate() {
            let mapped = match inst {
                Inst::Access { param, offset } => Some(on_access(self, *param, *offset)?),
                Inst::Const(value) => Some(self.constant(*value)),
                Inst::Compute { op, args } => {
                    let args = args.iter().map(|&arg| lookup(&map, index, arg)).collect::<Result<SmallVec<[Local; 2]>>>()?;
                    Some(self.compute(*op, &args)?)
                }
                Inst::Return { operands } => {
                    return operands.iter().map(|&operand| lookup(&map, index, operand)).collect();
                }
            };
            map.push(mapped);
        }

        MissingReturnSnafu.fail()
    }

    /// Terminates the body with `return returns`.
    pub fn finish(mut self, returns: &[Local]) -> Result<Body> {
        let inst = self.insts.len();
        for &local in returns {
            self.check_local(inst, local)?;
        }
        self.insts.push(Inst::Return { operands: returns.iter().copied().collect() });
        self.types.push(None);
        Ok(Body { params: self.params, insts: self.insts, types: self.types })
    }

    fn push(&mut self, inst: Inst, ty: ScalarType) -> Local {
        let local = Local(self.insts.len() as u32);
        self.insts.push(inst);
        self.types.push(Some(ty));
        local
    }

    fn check_local(&self, inst: usize, local: Local) -> Result<ScalarType> {
        ensure!(local.index() < inst, UndefinedLocalSnafu { inst, local: local.index() });
        self.types[local.index()].ok_or_else(|| LocalWithoutResultSnafu { local: local.index() }.build())
    }
}
