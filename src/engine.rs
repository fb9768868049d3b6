//! Rule graph and execution engine.
//!
//! The engine is split into focused submodules under `src/engine/` while the
//! public paths stay flat (`crate::engine::RuleGraph`, `crate::engine::Settled`).
//!
//! ## How the parts work together
//!
//! ```text
//! rules (input order) ──┐
//!                       │  RuleGraph::from_rules          (graph.rs)
//!                       │  infer_edges / explicit order   (inference.rs)
//!                       └──────────────┬──────────────
//!                                      │  find_cycle + unreachable_from_roots
//!                                      v
//!                        roots (cached, built once)
//!                                      │
//! line ── Settled::new ────────────────┼─ Executor::run_root per root
//!                                      │    (executor.rs)
//!                                      │  - resolve predecessors first
//!                                      │  - apply substitution once
//!                                      │  - cascade to successors
//!                                      v
//!                          rewritten line + LineMetrics (metrics.rs)
//! ```
//!
//! The graph is immutable after construction. All per-line state lives in a
//! caller-owned [`Settled`] overlay, so one graph can serve many lines (and
//! many threads) at once.
//!
//! ## Responsibilities by module
//!
//! - `graph.rs`: node arena, symmetric predecessor/successor edges, roots,
//!   global cycle and reachability checks.
//! - `inference.rs`: the two edge inference rules (chained replacement,
//!   superset before subset).
//! - `executor.rs`: the memoised, cascading traversal for one line.
//! - `plan.rs`: the indented, human-readable execution plan.
//! - `metrics.rs`: per-line execution order and match counts.

#[path = "engine/executor.rs"]
mod executor;
#[path = "engine/graph.rs"]
mod graph;
#[path = "engine/inference.rs"]
mod inference;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/plan.rs"]
mod plan;

pub use executor::{Executor, Settled};
pub use graph::{EdgeKind, RuleGraph, RuleId, RuleNode};
pub(crate) use inference::infer_edges;
pub use metrics::{LineMetrics, LineRun};
pub use plan::{ExecutionPlan, PlanEntry};
