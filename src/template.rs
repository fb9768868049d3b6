//! Replacement templates for regular-expression rules.
//!
//! Rule tables write backreferences the sed/Ruby way (`\1`, `\&`). The regex
//! crate expands `$1` / `${1}` instead, so the replacement is translated once
//! when the rule is built:
//!
//! ```text
//! <\1>      -> <${1}>
//! \&!       -> ${0}!
//! cost: $5  -> cost: $$5
//! a\\b      -> a\b
//! ```
//!
//! Unknown escapes (`\n`, `\x`) are kept as written.

/// Translate a backslash-style replacement into a `regex::Captures::expand`
/// template.
pub(crate) fn to_expand_template(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len() + 4);
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek().copied() {
                Some(d) if d.is_ascii_digit() => {
                    chars.next();
                    out.push_str("${");
                    out.push(d);
                    out.push('}');
                }
                Some('&') => {
                    chars.next();
                    out.push_str("${0}");
                }
                Some('\\') => {
                    chars.next();
                    out.push('\\');
                }
                _ => out.push('\\'),
            },
            '$' => out.push_str("$$"),
            _ => out.push(c),
        }
    }

    out
}
