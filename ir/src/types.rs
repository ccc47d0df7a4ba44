//! Type definitions shared by nodes and bodies.
//!
//! The optimizer treats element types as opaque tags compared for equality;
//! compute operations are carried through fusion untouched.

use std::fmt;
use std::sync::Arc;

/// Element type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumIter, strum::VariantArray, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ScalarType {
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl ScalarType {
    pub fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

/// Name of an externally supplied field read by a `Load`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldRef(Arc<str>);

impl FieldRef {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Literal used inside an apply body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ConstValue {
    /// Natural element type of the literal.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Self::Int(_) => ScalarType::Int64,
            Self::Float(_) => ScalarType::Float64,
            Self::Bool(_) => ScalarType::Bool,
        }
    }
}

/// Pointwise arithmetic evaluated inside an apply body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumIter, strum::VariantArray, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ComputeOp {
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    Min,
    Max,
}

impl ComputeOp {
    /// Number of arguments the operation takes.
    pub fn arity(self) -> usize {
        match self {
            Self::Neg => 1,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Min | Self::Max => 2,
        }
    }
}
