//! Edge inference between rules.
//!
//! Every ordered pair `(node, other)` of distinct rules is examined and
//! `other` becomes a predecessor of `node` when either holds:
//!
//! 1. **Chained replacement**: `other`'s literal pattern equals `node`'s
//!    replacement. `other` must run first, otherwise the text `node` just
//!    produced would be rewritten again by `other`.
//!
//!    ```text
//!    ["cd"->"ef"]  runs before  ["ab"->"cd"]
//!    ```
//!
//! 2. **Superset before subset**: both patterns are literal and `other`'s
//!    pattern contains `node`'s. The longer pattern runs first so the shorter
//!    one cannot consume part of a longer match.
//!
//!    ```text
//!    ["CamelCase"->"PascalCase"]  runs before  ["Camel"->"Donkey"]
//!    ```
//!
//! Regular-expression patterns never take part in either comparison.
//!
//! The pass is O(n²) over the rule count. That is fine for hand-written rule
//! tables; a large table would want a pattern index (e.g. a trie) instead.

use super::graph::{EdgeKind, RuleGraph, RuleId};

/// Insert all inferred edges into `graph`.
pub(crate) fn infer_edges(graph: &mut RuleGraph) {
    let n = graph.len();
    let mut inferred = Vec::new();

    for node in 0..n {
        for other in 0..n {
            if node == other {
                continue;
            }
            let kind = edge_kind(graph, node, other);
            if !kind.is_empty() {
                inferred.push((node, other, kind));
            }
        }
    }

    for (node, other, kind) in inferred {
        tracing::debug!(
            predecessor = other,
            successor = node,
            ?kind,
            "inferred {} before {}",
            graph.label(other),
            graph.label(node)
        );
        graph.add_predecessor(node, other, kind);
    }
}

/// Reasons `other` must run before `node`, if any.
fn edge_kind(graph: &RuleGraph, node: RuleId, other: RuleId) -> EdgeKind {
    let node_rule = &graph.node(node).rule;
    let other_rule = &graph.node(other).rule;
    let mut kind = EdgeKind::empty();

    if other_rule.pattern().as_literal() == Some(node_rule.replacement()) {
        kind |= EdgeKind::CHAINED;
    }

    if let (Some(longer), Some(shorter)) = (other_rule.pattern().as_literal(), node_rule.pattern().as_literal()) {
        if longer.contains(shorter) {
            kind |= EdgeKind::SUPERSET;
        }
    }

    kind
}
