//! Per-line traversal of the rule graph.
//!
//! For every root the executor performs a memoised post-order walk:
//!
//! ```text
//! enter(node, origin)
//!   ├─ node == origin            -> CycleDetected(node)
//!   ├─ settled[node]             -> done
//!   └─ settled[node] = true
//!        ├─ enter(pred, origin.or(node))   for each predecessor
//!        ├─ apply node's substitution
//!        └─ if origin is none:
//!             enter(succ, none)            for each successor
//! ```
//!
//! The origin token is fixed at the first node that started resolving a
//! predecessor chain, so a chain that loops back to that node is caught.
//! Successors are only cascaded from nodes that were triggered directly
//! (roots and cascade targets), never from nodes visited to satisfy someone
//! else's predecessor requirement.
//!
//! The walk uses an explicit frame stack so long dependency chains cannot
//! exhaust the call stack. Frames are pushed in reverse so they pop in the
//! same order the recursive description visits them.

use super::graph::{RuleGraph, RuleId};
use super::metrics::LineMetrics;
use crate::Result;

/// Caller-owned per-line state: which nodes have been applied.
///
/// The graph itself never changes while lines are processed, so each thread
/// can process its own line with its own `Settled`.
#[derive(Debug, Clone, Default)]
pub struct Settled {
    flags: Vec<bool>,
}

impl Settled {
    pub fn new(len: usize) -> Self {
        Settled { flags: vec![false; len] }
    }

    /// Mark every node unsettled, resizing to `len` nodes.
    pub fn reset(&mut self, len: usize) {
        self.flags.clear();
        self.flags.resize(len, false);
    }

    pub fn is_settled(&self, id: RuleId) -> bool {
        self.flags[id]
    }

    fn settle(&mut self, id: RuleId) {
        self.flags[id] = true;
    }

    /// First unsettled node, in input order.
    pub fn first_unsettled(&self) -> Option<RuleId> {
        self.flags.iter().position(|settled| !settled)
    }

    pub fn all_settled(&self) -> bool {
        self.flags.iter().all(|&settled| settled)
    }
}

#[derive(Debug, Clone, Copy)]
enum Frame {
    /// Visit a node; `origin` is the node whose predecessor chain is unwinding.
    Enter { node: RuleId, origin: Option<RuleId> },
    /// Predecessors are done; substitute, then maybe cascade.
    Apply { node: RuleId, origin: Option<RuleId> },
}

/// Runs the traversal for one line against a shared graph.
#[derive(Debug)]
pub struct Executor<'g> {
    graph: &'g RuleGraph,
    /// When false, `run_line` leaves the caller's line untouched.
    mutate: bool,
}

impl<'g> Executor<'g> {
    pub fn new(graph: &'g RuleGraph) -> Self {
        Executor { graph, mutate: true }
    }

    /// An executor that walks the graph and records the order without
    /// rewriting the line.
    pub fn dry_run(graph: &'g RuleGraph) -> Self {
        Executor { graph, mutate: false }
    }

    /// Process one full line: reset `settled`, run every root in root order,
    /// then confirm every node was reached.
    ///
    /// A node left unsettled is reported as `CycleDetected` when the graph
    /// has a cycle (that is what starved it of a root), otherwise as
    /// `OrphanedRule`.
    pub fn run_line(&self, line: &mut String, settled: &mut Settled, metrics: &mut LineMetrics) -> Result<()> {
        if self.mutate {
            return self.sweep(line, settled, metrics);
        }
        // Dry run: rewrite a scratch copy so match counts still reflect what
        // each rule would have seen.
        let mut scratch = line.clone();
        self.sweep(&mut scratch, settled, metrics)
    }

    fn sweep(&self, line: &mut String, settled: &mut Settled, metrics: &mut LineMetrics) -> Result<()> {
        settled.reset(self.graph.len());

        for &root in self.graph.roots() {
            self.run_root(root, line, settled, metrics)?;
        }

        if let Some(id) = settled.first_unsettled() {
            return Err(match self.graph.find_cycle() {
                Some(closing) => self.graph.cycle_error(closing),
                None => self.graph.orphan_error(id),
            });
        }

        Ok(())
    }

    /// Trigger `root` (or any node) as a top-level entry with no origin token.
    ///
    /// Always rewrites `line`; dry runs go through [`Executor::run_line`].
    pub fn run_root(
        &self,
        root: RuleId,
        line: &mut String,
        settled: &mut Settled,
        metrics: &mut LineMetrics,
    ) -> Result<()> {
        let mut stack = vec![Frame::Enter { node: root, origin: None }];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter { node, origin } => {
                    if origin == Some(node) {
                        tracing::debug!(rule = node, "predecessor chain returned to its origin");
                        return Err(self.graph.cycle_error(node));
                    }
                    if settled.is_settled(node) {
                        continue;
                    }
                    settled.settle(node);

                    stack.push(Frame::Apply { node, origin });
                    let chain_origin = origin.or(Some(node));
                    for &pred in self.graph.node(node).predecessors.iter().rev() {
                        stack.push(Frame::Enter { node: pred, origin: chain_origin });
                    }
                }
                Frame::Apply { node, origin } => {
                    self.apply(node, line, metrics);
                    if origin.is_none() {
                        for &succ in self.graph.node(node).successors.iter().rev() {
                            stack.push(Frame::Enter { node: succ, origin: None });
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn apply(&self, node: RuleId, line: &mut String, metrics: &mut LineMetrics) {
        let rule = &self.graph.node(node).rule;
        let replaced = rule.apply(line);
        tracing::trace!(rule = node, label = %rule, replaced, "applied");
        metrics.record(node, replaced);
    }
}
