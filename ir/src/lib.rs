//! Dataflow graph model for stencil kernel pipelines.
//!
//! A region is a program-ordered list of `Load` nodes (external field
//! references) and `Apply` nodes (stencil kernels evaluated at every grid
//! point). Apply bodies read their operands only through constant-offset
//! accesses, which is what makes producer/consumer fusion possible.
//!
//! # Module Organization
//!
//! - [`arena`] - generation-checked node and value handles
//! - [`types`] - element types, field references, constants, compute ops
//! - [`offset`] - 3-D offset algebra
//! - [`body`] - apply bodies and their builder
//! - [`graph`] - the region: nodes, values, def-use index, program order,
//!   rewriter capabilities and verification
//! - [`expr`] - symbolic expansion used to compare graphs semantically
//! - [`error`] - error types and result handling

pub mod arena;
pub mod body;
pub mod error;
pub mod expr;
pub mod graph;
pub mod offset;
pub mod prelude;
pub mod types;


pub use arena::{NodeId, ValueId};
pub use body::{Body, BodyBuilder, Inst, Local};
pub use error::{Error, Result};
pub use expr::Expr;
pub use graph::{Graph, InsertPoint, Node, NodeKind, NodeTag, Use, ValueDef};
pub use offset::Offset;
pub use types::{ComputeOp, ConstValue, FieldRef, ScalarType};
