//! Rule graph: an arena of rule nodes joined by "must run before" edges.
//!
//! Nodes are addressed by [`RuleId`], the rule's index in the input list.
//! Identity is positional, so two rules with identical text remain distinct
//! nodes and edges never collapse them.
//!
//! ## Invariants
//!
//! - `A ∈ nodes[B].predecessors` iff `B ∈ nodes[A].successors`. Both sides are
//!   only ever written together by [`RuleGraph::add_predecessor`].
//! - At most one edge per ordered pair. Re-inserting an edge only merges its
//!   [`EdgeKind`] bits.
//! - `roots` is computed once after all edges are in and never changes.
//!
//! ```text
//!   ["cd"->"ef"] ──▶ ["ab"->"cd"]      predecessor ──▶ successor
//!        root           successor
//! ```

use crate::{Error, Result, Rule};
use indexmap::IndexMap;
use std::collections::VecDeque;

/// Rule identifier (index into the node arena, equal to input position).
pub type RuleId = usize;

bitflags::bitflags! {
    /// Why an edge exists. One ordered pair may be justified by both
    /// inference rules at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EdgeKind: u8 {
        /// The predecessor's pattern is the successor's replacement.
        const CHAINED  = 1 << 0;
        /// The predecessor's literal pattern contains the successor's.
        const SUPERSET = 1 << 1;
    }
}

/// A rule plus its adjacency.
#[derive(Debug, Clone)]
pub struct RuleNode {
    pub rule: Rule,
    /// Nodes that must be applied before this one, in insertion order.
    pub predecessors: Vec<RuleId>,
    /// Nodes that run after this one, in insertion order.
    pub successors: Vec<RuleId>,
}

impl RuleNode {
    fn new(rule: Rule) -> Self {
        RuleNode { rule, predecessors: Vec::new(), successors: Vec::new() }
    }

    pub fn is_root(&self) -> bool {
        self.predecessors.is_empty()
    }
}

/// Immutable (after construction) dependency graph over rules.
#[derive(Debug, Clone)]
pub struct RuleGraph {
    nodes: Vec<RuleNode>,
    /// `(predecessor, successor)` -> reasons, in insertion order.
    edges: IndexMap<(RuleId, RuleId), EdgeKind>,
    roots: Vec<RuleId>,
}

impl RuleGraph {
    /// Build a graph with inferred edges (see `inference.rs`).
    pub fn build(rules: Vec<Rule>) -> Self {
        let mut graph = Self::unconnected(rules);
        super::infer_edges(&mut graph);
        graph.compute_roots();
        graph
    }

    /// Build a graph with no edges: every rule is a root and runs in input order.
    pub fn explicit(rules: Vec<Rule>) -> Self {
        let mut graph = Self::unconnected(rules);
        graph.compute_roots();
        graph
    }

    /// Build a graph from caller-supplied `(predecessor, successor, kind)`
    /// edges instead of inferring them.
    pub fn with_edges(rules: Vec<Rule>, edges: impl IntoIterator<Item = (RuleId, RuleId, EdgeKind)>) -> Self {
        let mut graph = Self::unconnected(rules);
        for (predecessor, successor, kind) in edges {
            graph.add_predecessor(successor, predecessor, kind);
        }
        graph.compute_roots();
        graph
    }

    fn unconnected(rules: Vec<Rule>) -> Self {
        RuleGraph { nodes: rules.into_iter().map(RuleNode::new).collect(), edges: IndexMap::new(), roots: Vec::new() }
    }

    /// Record that `predecessor` must be applied before `node`.
    ///
    /// Updates both adjacency lists. Duplicate edges merge their reasons; self
    /// edges are ignored.
    pub(crate) fn add_predecessor(&mut self, node: RuleId, predecessor: RuleId, kind: EdgeKind) {
        if node == predecessor {
            return;
        }
        if let Some(existing) = self.edges.get_mut(&(predecessor, node)) {
            *existing |= kind;
            return;
        }
        self.edges.insert((predecessor, node), kind);
        self.nodes[node].predecessors.push(predecessor);
        self.nodes[predecessor].successors.push(node);
    }

    fn compute_roots(&mut self) {
        self.roots = self.nodes.iter().enumerate().filter(|(_, n)| n.is_root()).map(|(id, _)| id).collect();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: RuleId) -> &RuleNode {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[RuleNode] {
        &self.nodes
    }

    /// Nodes without predecessors, in input order.
    pub fn roots(&self) -> &[RuleId] {
        &self.roots
    }

    /// All edges as `(predecessor, successor, reasons)`, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (RuleId, RuleId, EdgeKind)> + '_ {
        self.edges.iter().map(|(&(from, to), &kind)| (from, to, kind))
    }

    pub fn edge_kind(&self, predecessor: RuleId, successor: RuleId) -> Option<EdgeKind> {
        self.edges.get(&(predecessor, successor)).copied()
    }

    pub fn label(&self, id: RuleId) -> String {
        self.nodes[id].rule.label()
    }

    pub(crate) fn cycle_error(&self, id: RuleId) -> Error {
        Error::CycleDetected { rule: id, label: self.label(id) }
    }

    pub(crate) fn orphan_error(&self, id: RuleId) -> Error {
        Error::OrphanedRule { rule: id, label: self.label(id) }
    }

    /// Whole-graph cycle check (Kahn's algorithm).
    ///
    /// Returns a node that closes a cycle, or `None` when the graph is acyclic.
    pub fn find_cycle(&self) -> Option<RuleId> {
        let mut in_degree: Vec<usize> = self.nodes.iter().map(|n| n.predecessors.len()).collect();
        let mut queue: VecDeque<RuleId> = self.roots.iter().copied().collect();
        let mut removed = vec![false; self.nodes.len()];

        while let Some(id) = queue.pop_front() {
            removed[id] = true;
            for &succ in &self.nodes[id].successors {
                in_degree[succ] -= 1;
                if in_degree[succ] == 0 {
                    queue.push_back(succ);
                }
            }
        }

        // Every remaining node has a remaining predecessor, so walking
        // predecessors inside the remainder must revisit a node.
        let start = removed.iter().position(|r| !r)?;
        let mut on_walk = vec![false; self.nodes.len()];
        let mut current = start;
        loop {
            if on_walk[current] {
                return Some(current);
            }
            on_walk[current] = true;
            current = *self.nodes[current].predecessors.iter().find(|&&p| !removed[p])?;
        }
    }

    /// Nodes that no traversal starting at a root can reach, in input order.
    pub fn unreachable_from_roots(&self) -> Vec<RuleId> {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack: Vec<RuleId> = self.roots.clone();

        while let Some(id) = stack.pop() {
            if !seen[id] {
                seen[id] = true;
                stack.extend(self.nodes[id].successors.iter().copied().filter(|&s| !seen[s]));
            }
        }

        seen.iter().enumerate().filter(|(_, s)| !**s).map(|(id, _)| id).collect()
    }

    /// Authoritative structural check: no cycles, and every node reachable
    /// from some root.
    pub fn validate(&self) -> Result<()> {
        if let Some(id) = self.find_cycle() {
            tracing::debug!(rule = id, label = %self.label(id), "rule graph contains a cycle");
            return Err(self.cycle_error(id));
        }
        if let Some(&id) = self.unreachable_from_roots().first() {
            tracing::debug!(rule = id, label = %self.label(id), "rule unreachable from roots");
            return Err(self.orphan_error(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(pairs: &[(&str, &str)]) -> Vec<Rule> {
        pairs.iter().map(|(p, r)| Rule::parse(p, r).unwrap()).collect()
    }

    #[test]
    fn edges_are_symmetric_and_deduplicated() {
        let mut graph = RuleGraph::unconnected(rules(&[("a", "x"), ("b", "y")]));
        graph.add_predecessor(1, 0, EdgeKind::CHAINED);
        graph.add_predecessor(1, 0, EdgeKind::SUPERSET);
        graph.add_predecessor(1, 1, EdgeKind::CHAINED);
        graph.compute_roots();

        assert_eq!(graph.node(1).predecessors, vec![0]);
        assert_eq!(graph.node(0).successors, vec![1]);
        assert!(graph.node(1).successors.is_empty());
        assert_eq!(graph.edge_kind(0, 1), Some(EdgeKind::CHAINED | EdgeKind::SUPERSET));
        assert_eq!(graph.edges().count(), 1);
        assert_eq!(graph.roots(), &[0]);
    }

    #[test]
    fn explicit_graph_has_every_rule_as_root() {
        let graph = RuleGraph::explicit(rules(&[("ab", "Y"), ("abc", "X"), ("Y", "ab")]));
        assert_eq!(graph.roots(), &[0, 1, 2]);
        assert_eq!(graph.edges().count(), 0);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn find_cycle_reports_node_on_loop() {
        // 0 -> 1 -> 2 -> 1, plus an acyclic tail 3.
        let mut graph = RuleGraph::unconnected(rules(&[("a", "a"), ("b", "b"), ("c", "c"), ("d", "d")]));
        graph.add_predecessor(1, 0, EdgeKind::CHAINED);
        graph.add_predecessor(2, 1, EdgeKind::CHAINED);
        graph.add_predecessor(1, 2, EdgeKind::CHAINED);
        graph.compute_roots();

        let closing = graph.find_cycle().unwrap();
        assert!(closing == 1 || closing == 2);
        assert!(matches!(graph.validate(), Err(Error::CycleDetected { .. })));
    }

    #[test]
    fn acyclic_graph_is_valid() {
        let mut graph = RuleGraph::unconnected(rules(&[("a", "x"), ("b", "y"), ("c", "z")]));
        graph.add_predecessor(1, 0, EdgeKind::CHAINED);
        graph.add_predecessor(2, 0, EdgeKind::CHAINED);
        graph.add_predecessor(2, 1, EdgeKind::SUPERSET);
        graph.compute_roots();

        assert_eq!(graph.find_cycle(), None);
        assert!(graph.unreachable_from_roots().is_empty());
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn nodes_behind_a_cycle_are_unreachable() {
        let mut graph = RuleGraph::unconnected(rules(&[("a", "x"), ("b", "y"), ("c", "z")]));
        graph.add_predecessor(0, 1, EdgeKind::CHAINED);
        graph.add_predecessor(1, 0, EdgeKind::CHAINED);
        graph.add_predecessor(2, 1, EdgeKind::CHAINED);
        graph.compute_roots();

        assert!(graph.roots().is_empty());
        assert_eq!(graph.unreachable_from_roots(), vec![0, 1, 2]);
    }

    #[test]
    fn empty_graph_is_valid() {
        let graph = RuleGraph::build(Vec::new());
        assert!(graph.is_empty());
        assert!(graph.roots().is_empty());
        assert!(graph.validate().is_ok());
    }
}
