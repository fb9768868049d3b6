#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build a `Vec<RawRule>` from `pattern => replacement` pairs.
///
/// ```
/// let rules = resub::raw_rules!["cd" => "ef", "ab" => "cd"];
/// assert_eq!(rules.len(), 2);
/// ```
#[macro_export]
macro_rules! raw_rules {
    ( $($pat:expr => $rep:expr),* $(,)? ) => {{
        vec![ $($crate::RawRule::new($pat, $rep)),* ]
    }};
}
