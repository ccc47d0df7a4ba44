//! Fixpoint driver for the fusion rules.
//!
//! The driver keeps a FIFO worklist of node handles. Each popped node is
//! offered to the patterns anchored on its kind, highest benefit first; the
//! first one that rewrites wins. The neighbourhood of every rewrite is pushed
//! back on the worklist, so only nodes near a change are revisited.
//!
//! Once the worklist drains, a sweep re-seeds every node in program order.
//! The run ends after a sweep in which no pattern fired, which is the
//! fixpoint: no rule matches anywhere in the graph.

use std::collections::{HashSet, VecDeque};

use smallvec::SmallVec;
use snafu::ResultExt;
use stencil_ir::{Graph, NodeId};

use crate::config::FusionConfig;
use crate::error::*;
use crate::pattern::{PatternSet, Rewrite, RewriteResult, Rule};

/// Counters collected over one fusion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FusionStats {
    pub roots_introduced: usize,
    pub rerouted: usize,
    pub inlined: usize,
    /// Live nodes popped from the worklist.
    pub visited: usize,
    /// Full passes over the graph, including the final quiet one.
    pub sweeps: usize,
}

impl FusionStats {
    /// Total number of applied rewrites.
    pub fn rewrites(&self) -> usize {
        self.roots_introduced + self.rerouted + self.inlined
    }

    fn record(&mut self, rule: Rule) {
        match rule {
            Rule::RootIntroduction => self.roots_introduced += 1,
            Rule::OutputRerouting => self.rerouted += 1,
            Rule::ProducerInlining => self.inlined += 1,
        }
    }
}

/// Worklist-based pattern applicator.
pub struct FusionDriver<'a> {
    patterns: &'a PatternSet,
    verify: bool,
    worklist: VecDeque<NodeId>,
    queued: HashSet<NodeId>,
    stats: FusionStats,
}

impl<'a> FusionDriver<'a> {
    pub fn new(patterns: &'a PatternSet) -> Self {
        Self {
            patterns,
            verify: false,
            worklist: VecDeque::new(),
            queued: HashSet::new(),
            stats: FusionStats::default(),
        }
    }

    /// Verify the graph after every rewrite.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn stats(&self) -> FusionStats {
        self.stats
    }

    /// Queues `node` unless it is already waiting.
    pub fn mark_dirty(&mut self, node: NodeId) {
        if self.queued.insert(node) {
            self.worklist.push_back(node);
        }
    }

    /// Queues every live node of `nodes` in program order.
    pub fn mark_dirty_all(&mut self, graph: &Graph, nodes: impl IntoIterator<Item = NodeId>) -> Result<()> {
        let mut sorted: SmallVec<[(usize, NodeId); 8]> = SmallVec::new();
        for node in nodes {
            if graph.contains_node(node) {
                sorted.push((graph.position(node)?, node));
            }
        }
        sorted.sort_unstable();
        sorted.dedup();
        for (_, node) in sorted {
            self.mark_dirty(node);
        }
        Ok(())
    }

    /// Processes the next queued node.
    ///
    /// Returns `None` once the worklist is empty, otherwise whether a
    /// pattern rewrote the graph.
    pub fn step(&mut self, graph: &mut Graph) -> Result<Option<bool>> {
        let Some(node) = self.worklist.pop_front() else {
            return Ok(None);
        };
        self.queued.remove(&node);

        // Handles of nodes erased by an earlier rewrite.
        if !graph.contains_node(node) {
            return Ok(Some(false));
        }
        self.stats.visited += 1;

        let tag = graph.node(node)?.tag();
        let patterns = self.patterns;
        for pattern in patterns.for_tag(tag) {
            tracing::trace!(%node, pattern = pattern.name(), "trying pattern");
            let RewriteResult::Rewritten(rewrite) = pattern.match_and_rewrite(graph, node)? else {
                continue;
            };

            self.stats.record(pattern.rule());
            if self.verify {
                graph.verify().context(VerificationFailedSnafu { rule: pattern.name() })?;
            }
            self.mark_affected(graph, &rewrite)?;
            return Ok(Some(true));
        }
        Ok(Some(false))
    }

    /// Runs sweeps until one completes without a rewrite.
    pub fn run(mut self, graph: &mut Graph) -> Result<FusionStats> {
        loop {
            self.stats.sweeps += 1;
            let before = self.stats.rewrites();
            let nodes: Vec<NodeId> = graph.nodes().collect();
            self.mark_dirty_all(graph, nodes)?;
            while self.step(graph)?.is_some() {}

            tracing::trace!(sweep = self.stats.sweeps, rewrites = self.stats.rewrites() - before, "sweep finished");
            if self.stats.rewrites() == before {
                return Ok(self.stats);
            }
        }
    }

    /// Queues the created nodes, their consumers, the producers of their
    /// operands and those producers' other consumers.
    fn mark_affected(&mut self, graph: &Graph, rewrite: &Rewrite) -> Result<()> {
        let mut affected: Vec<NodeId> = Vec::new();
        for &node in &rewrite.created {
            if !graph.contains_node(node) {
                continue;
            }
            affected.push(node);
            affected.extend(graph.result_users(node)?);
            for &operand in graph.operands(node)? {
                if let Some(producer) = graph.producer(operand)? {
                    affected.push(producer);
                    affected.extend(graph.result_users(producer)?);
                }
            }
        }
        self.mark_dirty_all(graph, affected)
    }
}

/// Fuses `graph` to a fixpoint using [`FusionConfig::from_env`].
///
/// # Environment Variables
///
/// * `STENCIL_NO_INLINE` / `STENCIL_NO_REROUTE` / `STENCIL_NO_ROOT` - Disable a rule
/// * `STENCIL_VERIFY=0|1` - Per-rewrite verification
pub fn fuse(graph: &mut Graph) -> Result<FusionStats> {
    fuse_with_config(graph, &FusionConfig::from_env())
}

/// Fuses `graph` to a fixpoint with the rules enabled in `config`.
#[tracing::instrument(skip_all, fields(nodes.initial = graph.len()))]
pub fn fuse_with_config(graph: &mut Graph, config: &FusionConfig) -> Result<FusionStats> {
    let patterns = PatternSet::from_config(config);
    if patterns.is_empty() {
        return Ok(FusionStats::default());
    }

    let stats = FusionDriver::new(&patterns).with_verify(config.verify).run(graph)?;
    tracing::debug!(?stats, nodes.fused = graph.len(), "fusion finished");
    Ok(stats)
}
