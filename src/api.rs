use crate::engine::{ExecutionPlan, Executor, LineMetrics, LineRun, RuleGraph, RuleId, Settled};
use crate::{RawRule, Result, Rule};
use std::time::Instant;

/// Options that affect how the rule graph is built and lines are processed.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Skip edge inference: every rule is a root, applied in input order.
    pub explicit: bool,
    /// Walk the graph and record the execution order without rewriting lines.
    pub dry_run: bool,
}

/// A validated rule graph ready to rewrite lines.
///
/// The graph is built and checked once. Processing a line never mutates the
/// engine, so one `Engine` can be shared across threads; each call keeps its
/// own settled state.
///
/// # Example
/// ```
/// use resub::{Engine, Options, raw_rules};
///
/// let engine = Engine::from_raw(&raw_rules!["abc" => "X", "ab" => "Y"], &Options::default()).unwrap();
/// assert_eq!(engine.rewrite("abc ab").unwrap(), "X Y");
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    graph: RuleGraph,
    options: Options,
}

impl Engine {
    /// Build the graph over `rules` and validate it.
    ///
    /// Fails with `CycleDetected` when inferred edges form a loop, or
    /// `OrphanedRule` when a rule cannot be reached from any root.
    pub fn new(rules: Vec<Rule>, options: &Options) -> Result<Self> {
        let graph = if options.explicit { RuleGraph::explicit(rules) } else { RuleGraph::build(rules) };
        Self::from_graph(graph, options)
    }

    /// Compile raw rules, then build as [`Engine::new`].
    pub fn from_raw(raw: &[RawRule], options: &Options) -> Result<Self> {
        let rules = raw.iter().map(RawRule::compile).collect::<Result<Vec<_>>>()?;
        Self::new(rules, options)
    }

    /// Wrap a prebuilt graph (for example one from [`RuleGraph::with_edges`]).
    pub fn from_graph(graph: RuleGraph, options: &Options) -> Result<Self> {
        graph.validate()?;
        tracing::info!(
            rules = graph.len(),
            edges = graph.edges().count(),
            roots = graph.roots().len(),
            explicit = options.explicit,
            "rule graph built"
        );
        Ok(Engine { graph, options: options.clone() })
    }

    pub fn graph(&self) -> &RuleGraph {
        &self.graph
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn roots(&self) -> &[RuleId] {
        self.graph.roots()
    }

    /// Roots with their successors indented beneath them.
    pub fn plan(&self) -> Result<ExecutionPlan> {
        ExecutionPlan::build(&self.graph)
    }

    /// Rewrite `line` in place. In dry-run mode the line is left unchanged.
    pub fn process_line(&self, line: &mut String) -> Result<()> {
        let mut settled = Settled::new(self.graph.len());
        let mut metrics = LineMetrics::default();
        self.executor().run_line(line, &mut settled, &mut metrics)
    }

    /// Like [`Engine::process_line`] but also returns the execution order,
    /// match counts and elapsed time.
    pub fn process_line_with_metrics(&self, line: &str) -> Result<LineRun> {
        let start = Instant::now();
        let mut line = line.to_string();
        let mut settled = Settled::new(self.graph.len());
        let mut metrics = LineMetrics::default();

        self.executor().run_line(&mut line, &mut settled, &mut metrics)?;

        Ok(LineRun { line, metrics, elapsed: start.elapsed() })
    }

    /// Convenience wrapper returning the rewritten line.
    pub fn rewrite(&self, line: &str) -> Result<String> {
        let mut line = line.to_string();
        self.process_line(&mut line)?;
        Ok(line)
    }

    fn executor(&self) -> Executor<'_> {
        if self.options.dry_run { Executor::dry_run(&self.graph) } else { Executor::new(&self.graph) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeKind, Error, raw_rules};

    #[test]
    fn from_raw_reports_invalid_pattern() {
        let err = Engine::from_raw(&raw_rules!["ok" => "fine", "/[a-/" => "x"], &Options::default()).unwrap_err();
        match err {
            Error::InvalidPattern { raw, .. } => assert_eq!(raw, "/[a-/"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn cycle_is_rejected_at_construction() {
        let err = Engine::from_raw(&raw_rules!["a" => "b", "b" => "a"], &Options::default()).unwrap_err();
        assert!(matches!(err, Error::CycleDetected { .. }), "{err}");
        assert!(err.to_string().starts_with("loop detected while processing rule #"));
    }

    #[test]
    fn explicit_mode_accepts_rules_that_would_cycle() {
        let opts = Options { explicit: true, ..Options::default() };
        let engine = Engine::from_raw(&raw_rules!["a" => "b", "b" => "a"], &opts).unwrap();
        assert_eq!(engine.roots(), &[0, 1]);
        assert_eq!(engine.rewrite("ab").unwrap(), "aa");
    }

    #[test]
    fn supplied_graph_is_validated() {
        let rules = vec![Rule::parse("a", "x").unwrap(), Rule::parse("b", "y").unwrap()];
        let graph = RuleGraph::with_edges(rules, [(0, 1, EdgeKind::CHAINED), (1, 0, EdgeKind::CHAINED)]);
        assert!(matches!(Engine::from_graph(graph, &Options::default()), Err(Error::CycleDetected { .. })));
    }

    #[test]
    fn dry_run_reports_order_and_keeps_line() {
        let opts = Options { dry_run: true, ..Options::default() };
        let engine = Engine::from_raw(&raw_rules!["cd" => "ef", "ab" => "cd"], &opts).unwrap();

        let run = engine.process_line_with_metrics("ab cd").unwrap();
        assert_eq!(run.line, "ab cd");
        assert_eq!(run.metrics.order, vec![0, 1]);
        assert_eq!(run.metrics.replacements, vec![1, 1]);

        let mut line = "ab cd".to_string();
        engine.process_line(&mut line).unwrap();
        assert_eq!(line, "ab cd");
    }

    #[test]
    fn empty_rule_set_passes_lines_through() {
        let engine = Engine::new(Vec::new(), &Options::default()).unwrap();
        assert!(engine.roots().is_empty());
        assert_eq!(engine.rewrite("unchanged").unwrap(), "unchanged");
        assert!(engine.plan().unwrap().is_empty());
    }

    #[test]
    fn metrics_list_fired_rules() {
        let engine = Engine::from_raw(&raw_rules!["x" => "y", "a" => "b"], &Options::default()).unwrap();
        let run = engine.process_line_with_metrics("aaa").unwrap();
        assert_eq!(run.line, "bbb");
        assert_eq!(run.metrics.fired().collect::<Vec<_>>(), vec![1]);
        assert_eq!(run.metrics.total_replacements(), 3);
    }
}
