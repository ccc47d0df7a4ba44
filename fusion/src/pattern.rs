//! Rewrite pattern infrastructure for the fusion pass.
//!
//! A [`FusionPattern`] anchors on one node kind and either declines or
//! performs a complete local rewrite. [`PatternSet`] keeps the enabled rules
//! in priority order so the driver can try them one after another.

use smallvec::SmallVec;
use stencil_ir::{Graph, NodeId, NodeTag};

use crate::config::FusionConfig;
use crate::error::Result;
use crate::rules::{OutputRerouting, ProducerInlining, RootIntroduction};

// =============================================================================
// RewriteResult - Result of a pattern attempt
// =============================================================================

/// Nodes a successful rewrite introduced into the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewrite {
    pub created: SmallVec<[NodeId; 4]>,
}

impl Rewrite {
    pub fn new(created: impl IntoIterator<Item = NodeId>) -> Self {
        Self { created: created.into_iter().collect() }
    }
}

/// Result of applying a pattern at a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteResult {
    /// Preconditions did not hold; the graph is untouched.
    NoMatch,
    /// The rewrite was applied.
    Rewritten(Rewrite),
}

impl RewriteResult {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Rewritten(_))
    }
}

// =============================================================================
// Rule identity
// =============================================================================

/// The three fusion rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::IntoStaticStr, strum::EnumIter, strum::VariantArray)]
#[strum(serialize_all = "snake_case")]
pub enum Rule {
    RootIntroduction,
    OutputRerouting,
    ProducerInlining,
}

// =============================================================================
// FusionPattern trait
// =============================================================================

/// Local graph rewrite anchored on a node kind.
///
/// `match_and_rewrite` must check every precondition before mutating: a
/// `NoMatch` leaves the graph exactly as it was.
pub trait FusionPattern {
    fn rule(&self) -> Rule;

    /// Priority; higher runs first at a node.
    fn benefit(&self) -> u16;

    /// Node kind this pattern anchors on.
    fn root(&self) -> NodeTag;

    fn match_and_rewrite(&self, graph: &mut Graph, node: NodeId) -> Result<RewriteResult>;

    fn name(&self) -> &'static str {
        self.rule().into()
    }
}

// =============================================================================
// PatternSet
// =============================================================================

/// Enabled patterns sorted by descending benefit.
pub struct PatternSet {
    patterns: Vec<Box<dyn FusionPattern>>,
}

impl PatternSet {
    pub fn empty() -> Self {
        Self { patterns: Vec::new() }
    }

    /// Every rule the configuration enables.
    pub fn from_config(config: &FusionConfig) -> Self {
        let mut set = Self::empty();
        if config.inline {
            set.push(ProducerInlining);
        }
        if config.reroute {
            set.push(OutputRerouting);
        }
        if config.root {
            set.push(RootIntroduction);
        }
        set
    }

    /// Adds a pattern, keeping the set sorted; equal benefits keep insertion order.
    pub fn push(&mut self, pattern: impl FusionPattern + 'static) {
        let benefit = pattern.benefit();
        let at = self.patterns.partition_point(|p| p.benefit() >= benefit);
        self.patterns.insert(at, Box::new(pattern));
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn FusionPattern> {
        self.patterns.iter().map(|p| p.as_ref())
    }

    /// Patterns anchoring on `tag`, highest benefit first.
    pub fn for_tag(&self, tag: NodeTag) -> impl Iterator<Item = &dyn FusionPattern> {
        self.iter().filter(move |p| p.root() == tag)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::from_config(&FusionConfig::default())
    }
}

impl std::fmt::Debug for PatternSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter().map(|p| p.name())).finish()
    }
}
