//! Per-line run metrics.
//!
//! `Engine::process_line` is the normal path. `Engine::process_line_with_metrics`
//! additionally returns the order in which rules fired and how many matches
//! each replaced, which is what the dry-run mode reports.
//!
//! `order[i]` and `replacements[i]` always describe the same application.

use super::graph::RuleId;
use std::time::Duration;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LineMetrics {
    /// Rules in the order their substitutions were applied.
    pub order: Vec<RuleId>,
    /// Matches replaced by each application, aligned with `order`.
    pub replacements: Vec<usize>,
}

impl LineMetrics {
    pub(crate) fn record(&mut self, rule: RuleId, replaced: usize) {
        self.order.push(rule);
        self.replacements.push(replaced);
    }

    /// Total matches replaced on the line.
    pub fn total_replacements(&self) -> usize {
        self.replacements.iter().sum()
    }

    /// Rules that replaced at least one match, in application order.
    pub fn fired(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.order.iter().zip(&self.replacements).filter(|(_, n)| **n > 0).map(|(id, _)| *id)
    }
}

/// One processed line bundled with timing information.
#[derive(Debug, Clone)]
pub struct LineRun {
    /// The rewritten line (the input, unchanged, in dry-run mode).
    pub line: String,
    pub metrics: LineMetrics,
    /// Time spent in the traversal.
    pub elapsed: Duration,
}
