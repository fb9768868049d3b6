use regex::Regex;
use std::fmt;

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod rule_table;
mod template;


pub use api::{Engine, Options};
pub use engine::{
    EdgeKind, ExecutionPlan, Executor, LineMetrics, LineRun, PlanEntry, RuleGraph, RuleId, RuleNode, Settled,
};
pub use error::{Error, Result};
pub use rule_table::{RawRule, load_rule_table, parse_rule_table};

// --- Rules -------------------------------------------------------------------

/// What a rule searches for.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Match the text exactly.
    Literal(String),
    /// Match a regular expression. Replacement backreferences are expanded
    /// per match.
    Regex(Regex),
}

impl Pattern {
    /// Classify raw pattern text. Text wrapped in `/…/` is a regular
    /// expression; anything else is a literal.
    ///
    /// ```text
    /// "abc"          -> Literal("abc")
    /// "/(Perl|Py)/"  -> Regex("(Perl|Py)")
    /// "/"            -> Literal("/")
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let source = regex!(r"(?s)\A/(.*)/\z").captures(raw).and_then(|caps| caps.get(1)).map(|m| m.as_str());

        match source {
            Some(source) => {
                if source.is_empty() {
                    return Err(Error::InvalidPattern {
                        raw: raw.to_string(),
                        reason: "empty regular expression".to_string(),
                    });
                }
                let re = Regex::new(source)
                    .map_err(|err| Error::InvalidPattern { raw: raw.to_string(), reason: err.to_string() })?;
                Ok(Pattern::Regex(re))
            }
            None => {
                if raw.is_empty() {
                    return Err(Error::InvalidPattern { raw: String::new(), reason: "empty pattern".to_string() });
                }
                Ok(Pattern::Literal(raw.to_string()))
            }
        }
    }

    /// The literal text, or `None` for regular expressions.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Pattern::Literal(text) => Some(text),
            Pattern::Regex(_) => None,
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, Pattern::Regex(_))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(text) => f.write_str(text),
            Pattern::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// A substitution rule: every occurrence of `pattern` becomes `replacement`.
///
/// Rules are immutable once built. Two rules may carry identical text; the
/// engine tells them apart by their position in the rule list, never by value.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: Pattern,
    replacement: String,
    /// `regex::Captures::expand` template, present for regex patterns only.
    template: Option<String>,
}

impl Rule {
    /// Build a rule from raw pattern text (see [`Pattern::parse`]) and a
    /// replacement.
    pub fn parse(pattern: &str, replacement: &str) -> Result<Self> {
        Ok(Self::new(Pattern::parse(pattern)?, replacement))
    }

    pub fn new(pattern: Pattern, replacement: impl Into<String>) -> Self {
        let replacement = replacement.into();
        let template = pattern.is_regex().then(|| template::to_expand_template(&replacement));
        Rule { pattern, replacement, template }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Replace every occurrence of the pattern in `line`, returning how many
    /// matches were replaced. The line is left untouched when nothing matches.
    pub fn apply(&self, line: &mut String) -> usize {
        match &self.pattern {
            Pattern::Literal(needle) => {
                let count = line.matches(needle.as_str()).count();
                if count > 0 {
                    *line = line.replace(needle.as_str(), &self.replacement);
                }
                count
            }
            Pattern::Regex(re) => {
                let template = self.template.as_deref().unwrap_or_default();
                let mut count = 0;
                let replaced = re.replace_all(line, |caps: &regex::Captures<'_>| {
                    count += 1;
                    let mut dst = String::new();
                    caps.expand(template, &mut dst);
                    dst
                });
                if count > 0 {
                    *line = replaced.into_owned();
                }
                count
            }
        }
    }

    /// Compact label used in plans and error messages: `[pattern->replacement]`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}->{}]", self.pattern, self.replacement)
    }
}
