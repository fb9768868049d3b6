//! Human-readable execution plan.
//!
//! Each root is listed with its successors underneath, one indentation level
//! per step. Rules indented less run before rules indented more:
//!
//! ```text
//! [CamelCase->PascalCase]
//!   [Camel->Donkey]
//! [Donkey->Mule]
//!   [Camel->Donkey]
//! [x->y]
//! ```
//!
//! A node reachable along several paths is printed once per path (it still
//! runs once per line). Re-entering a node that is already on the current path
//! means the graph loops, and the plan refuses to print it.

use super::graph::{RuleGraph, RuleId};
use crate::Result;
use std::fmt;

const INDENT: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    /// 0 for roots.
    pub depth: usize,
    pub rule: RuleId,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub entries: Vec<PlanEntry>,
}

impl ExecutionPlan {
    pub fn build(graph: &RuleGraph) -> Result<Self> {
        let mut entries = Vec::new();
        let mut on_path = vec![false; graph.len()];

        for &root in graph.roots() {
            // (node, depth, leaving): `leaving` frames pop the node off the path.
            let mut stack = vec![(root, 0usize, false)];
            while let Some((node, depth, leaving)) = stack.pop() {
                if leaving {
                    on_path[node] = false;
                    continue;
                }
                if on_path[node] {
                    return Err(graph.cycle_error(node));
                }
                on_path[node] = true;
                entries.push(PlanEntry { depth, rule: node, label: graph.label(node) });

                stack.push((node, depth, true));
                for &succ in graph.node(node).successors.iter().rev() {
                    stack.push((succ, depth + 1, false));
                }
            }
        }

        Ok(ExecutionPlan { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}{}", INDENT.repeat(entry.depth), entry.label)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeKind, Error, Rule};

    fn build(pairs: &[(&str, &str)]) -> RuleGraph {
        RuleGraph::build(pairs.iter().map(|(p, r)| Rule::parse(p, r).unwrap()).collect())
    }

    #[test]
    fn roots_and_successors_are_indented_by_depth() {
        let graph = build(&[("Camel", "Donkey"), ("CamelCase", "PascalCase"), ("Donkey", "Mule"), ("x", "y")]);
        let plan = ExecutionPlan::build(&graph).unwrap();

        assert_eq!(
            plan.to_string(),
            "[CamelCase->PascalCase]\n  [Camel->Donkey]\n[Donkey->Mule]\n  [Camel->Donkey]\n[x->y]\n"
        );
        assert_eq!(plan.entries.iter().map(|e| e.depth).collect::<Vec<_>>(), vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn shared_successor_is_listed_under_each_parent() {
        let rules = ["a", "b", "c"].iter().map(|p| Rule::parse(p, "z").unwrap()).collect();
        let graph = RuleGraph::with_edges(rules, [(0, 2, EdgeKind::CHAINED), (1, 2, EdgeKind::CHAINED)]);
        let plan = ExecutionPlan::build(&graph).unwrap();
        let rules: Vec<RuleId> = plan.entries.iter().map(|e| e.rule).collect();
        assert_eq!(rules, vec![0, 2, 1, 2]);
    }

    #[test]
    fn loop_below_a_root_is_refused() {
        let rules = ["a", "b", "c"].iter().map(|p| Rule::parse(p, "z").unwrap()).collect();
        let graph = RuleGraph::with_edges(
            rules,
            [(0, 1, EdgeKind::CHAINED), (1, 2, EdgeKind::CHAINED), (2, 1, EdgeKind::CHAINED)],
        );
        assert!(matches!(ExecutionPlan::build(&graph), Err(Error::CycleDetected { rule: 1, .. })));
    }

    #[test]
    fn empty_graph_has_empty_plan() {
        let plan = ExecutionPlan::build(&build(&[])).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.to_string(), "");
    }
}
