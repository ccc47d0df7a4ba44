//! Stencil kernel fusion.
//!
//! Fuses producer/consumer chains of apply nodes in a [`stencil_ir::Graph`]
//! so intermediate fields never have to be materialized. Three local rules
//! run to a fixpoint:
//!
//! - root introduction - a load read by several applies is shared through a
//!   pass-through apply;
//! - output rerouting - a producer whose results escape is cloned and its
//!   escaping results are passed through the consumer;
//! - producer inlining - an apply consumed by exactly one other apply is
//!   spliced into it, composing access offsets.
//!
//! # Module Organization
//!
//! - [`pattern`] - the rule trait and priority-ordered rule set
//! - [`rules`] - the three rules
//! - [`driver`] - worklist driver and entry points
//! - [`config`] - rule selection and verification settings
//! - [`error`] - error types and result handling
//!
//! # Example
//!
//! ```rust,ignore
//! use stencil_fusion::fuse;
//!
//! let stats = fuse(&mut graph)?;
//! assert_eq!(fuse(&mut graph)?.rewrites(), 0);
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod pattern;
pub mod rules;


pub use config::FusionConfig;
pub use driver::{FusionDriver, FusionStats, fuse, fuse_with_config};
pub use error::{Error, Result};
pub use pattern::{FusionPattern, PatternSet, Rewrite, RewriteResult, Rule};
pub use rules::{OutputRerouting, ProducerInlining, RootIntroduction};
