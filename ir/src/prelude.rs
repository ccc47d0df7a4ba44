//! Common imports for building and inspecting stencil graphs.
//!
//! ```rust,ignore
//! use stencil_ir::prelude::*;
//! ```

pub use crate::arena::{NodeId, ValueId};
pub use crate::body::{Body, BodyBuilder, Inst, Local};
pub use crate::expr::Expr;
pub use crate::graph::{Graph, InsertPoint, NodeKind, NodeTag, Use};
pub use crate::offset::Offset;
pub use crate::types::{ComputeOp, ConstValue, FieldRef, ScalarType};
