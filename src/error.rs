//! Error types for the substitution engine.
//!
//! Errors fall into three groups:
//!
//! - **Construction**: a rule cannot be compiled (`InvalidPattern`) or the
//!   rule table cannot be read (`MalformedRuleTable`, `RuleTableIo`).
//! - **Structural**: the rule graph is defective (`CycleDetected`,
//!   `OrphanedRule`). These are deterministic for a given rule set.
//! - Nothing is retried or recovered; every error reaches the caller.

use crate::engine::RuleId;
use std::path::PathBuf;
use thiserror::Error;

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A pattern marked as a regular expression failed to compile, or was empty.
    #[error("invalid pattern {raw:?}: {reason}")]
    InvalidPattern { raw: String, reason: String },

    /// A predecessor chain looped back onto the rule that started it.
    #[error("loop detected while processing rule #{rule} {label}")]
    CycleDetected { rule: RuleId, label: String },

    /// A rule was never reached from any root.
    #[error("rule #{rule} {label} is orphaned (unreachable from every root)")]
    OrphanedRule { rule: RuleId, label: String },

    #[error("malformed rule table at line {line}: {reason}")]
    MalformedRuleTable { line: usize, reason: String },

    #[error("failed to read rule table {}: {source}", .path.display())]
    RuleTableIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
