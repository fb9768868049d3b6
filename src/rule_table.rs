//! Rule tables: the text format rules are loaded from.
//!
//! One rule per line, `pattern,replacement`. Either field may be wrapped in
//! double quotes to carry commas; inside quotes `""` is a literal quote.
//!
//! ```text
//! before,after
//! "never,never","always,always"
//! /(Perl|Python)/,Ruby
//! /([aeiou])/,<\1>
//! ```
//!
//! Blank lines are skipped. Anything else that is not exactly two fields is
//! rejected with the 1-based line number.

use crate::{Error, Result, Rule};
use std::path::Path;

/// An unparsed rule as read from a table: pattern text and replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRule {
    pub pattern: String,
    pub replacement: String,
}

impl RawRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        RawRule { pattern: pattern.into(), replacement: replacement.into() }
    }

    /// Compile into a [`Rule`]; fails with `InvalidPattern` for a bad regex.
    pub fn compile(&self) -> Result<Rule> {
        Rule::parse(&self.pattern, &self.replacement)
    }
}

/// Read and parse a rule table from `path`.
pub fn load_rule_table(path: impl AsRef<Path>) -> Result<Vec<RawRule>> {
    let path = path.as_ref();
    let text =
        std::fs::read_to_string(path).map_err(|source| Error::RuleTableIo { path: path.to_path_buf(), source })?;
    let rules = parse_rule_table(&text)?;
    tracing::debug!(path = %path.display(), rules = rules.len(), "loaded rule table");
    Ok(rules)
}

/// Parse rule table text.
pub fn parse_rule_table(text: &str) -> Result<Vec<RawRule>> {
    let mut rules = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_fields(line).map_err(|reason| Error::MalformedRuleTable { line: idx + 1, reason })?;
        match <[String; 2]>::try_from(fields) {
            Ok([pattern, replacement]) => rules.push(RawRule { pattern, replacement }),
            Err(fields) => {
                return Err(Error::MalformedRuleTable {
                    line: idx + 1,
                    reason: format!("expected 2 fields, found {}", fields.len()),
                });
            }
        }
    }

    Ok(rules)
}

/// Split one line into comma-separated fields, honouring double quotes.
fn split_fields(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;
    let mut field_start = true;

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => {
                    in_quotes = false;
                    if !matches!(chars.peek(), None | Some(',')) {
                        return Err("unexpected text after closing quote".to_string());
                    }
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field_start => in_quotes = true,
            ',' => {
                fields.push(std::mem::take(&mut field));
                field_start = true;
                continue;
            }
            _ => field.push(c),
        }
        field_start = false;
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(field);
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_plain_and_quoted_rows() {
        let text = "before,after\n\"never,never\",\"always,always\"\n\n/(Perl|Python)/,Ruby\nsay \"\"hi\"\",\"\"\"q\"\"\"\n";
        let rules = parse_rule_table(text).unwrap();
        assert_eq!(
            rules,
            vec![
                RawRule::new("before", "after"),
                RawRule::new("never,never", "always,always"),
                RawRule::new("/(Perl|Python)/", "Ruby"),
                RawRule::new("say \"\"hi\"\"", "\"q\""),
            ]
        );
    }

    #[test]
    fn empty_replacement_is_allowed() {
        let rules = parse_rule_table("drop me,\r\n").unwrap();
        assert_eq!(rules, vec![RawRule::new("drop me", "")]);
    }

    #[test]
    fn rejects_wrong_field_count() {
        let err = parse_rule_table("a,b\nonly-one\n").unwrap_err();
        assert!(matches!(err, Error::MalformedRuleTable { line: 2, .. }), "{err}");

        let err = parse_rule_table("a,b,c").unwrap_err();
        assert!(err.to_string().contains("found 3"), "{err}");
    }

    #[test]
    fn rejects_unterminated_quote() {
        let err = parse_rule_table("\"open,close").unwrap_err();
        assert!(matches!(err, Error::MalformedRuleTable { line: 1, .. }));
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn raw_rule_compiles_or_reports_bad_regex() {
        assert!(RawRule::new("/([aeiou])/", "<\\1>").compile().unwrap().pattern().is_regex());
        assert!(matches!(RawRule::new("/(unclosed/", "x").compile(), Err(Error::InvalidPattern { .. })));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cd,ef").unwrap();
        writeln!(file, "ab,cd").unwrap();

        let rules = load_rule_table(file.path()).unwrap();
        assert_eq!(rules, crate::raw_rules!["cd" => "ef", "ab" => "cd"]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_rule_table(dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, Error::RuleTableIo { .. }));
    }
}
