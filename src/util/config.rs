//! Configuration file parsing utilities.
//!
//! Helpers for the flat `key = value` settings format the host uses when a
//! block's settings are exported, with comment skipping and escape handling.

/// What: Check if a line should be skipped (empty or comment).
///
/// Inputs:
/// - `line`: Line to check
///
/// Output:
/// - `true` if the line should be skipped, `false` otherwise
///
/// Details:
/// - Skips empty lines and lines starting with `#`, `//`, or `;`
/// - Inline comments are not recognised; merchant text may contain `#` or `//`
pub fn skip_comment_or_empty(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("//")
        || trimmed.starts_with(';')
}

/// What: Parse a key-value pair from a line.
///
/// Inputs:
/// - `line`: Line containing key=value format
///
/// Output:
/// - `Some((key, value))` if parsing succeeds, `None` otherwise
///
/// Details:
/// - Splits on the first `=` character, so values may themselves contain `=`
///   (e.g. `country_thresholds = US=100\nCA=150`)
/// - Trims whitespace from both key and value
/// - Keys are normalised with [`normalize_key`]
pub fn parse_key_value(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    if !trimmed.contains('=') {
        return None;
    }
    let mut parts = trimmed.splitn(2, '=');
    let key = normalize_key(parts.next()?);
    if key.is_empty() {
        return None;
    }
    let value = unescape_value(parts.next()?.trim());
    Some((key, value))
}

/// What: Normalise a settings key to `snake_case`.
///
/// Details:
/// - Lowercases and maps `.`, `-` and spaces to `_`
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase().replace(['.', '-', ' '], "_")
}

/// What: Expand `\n` and `\t` escapes in a single-line value.
///
/// Details:
/// - `\\` yields a literal backslash; unknown escapes are kept verbatim
pub fn unescape_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Comment and blank lines are recognised.
    fn skip_comments() {
        assert!(skip_comment_or_empty("   "));
        assert!(skip_comment_or_empty("# note"));
        assert!(skip_comment_or_empty("// note"));
        assert!(skip_comment_or_empty("; note"));
        assert!(!skip_comment_or_empty("text = #1 choice"));
    }

    #[test]
    /// What: Values keep embedded `=` and escapes are expanded.
    ///
    /// Inputs:
    /// - A thresholds line with nested `=` and a `\n` escape.
    ///
    /// Output:
    /// - Normalised key and a two-line value.
    fn parse_thresholds_line() {
        let (k, v) = parse_key_value("Country-Thresholds = US=100\\nCA=150").expect("pair");
        assert_eq!(k, "country_thresholds");
        assert_eq!(v, "US=100\nCA=150");
        assert_eq!(parse_key_value("no equals"), None);
        assert_eq!(parse_key_value(" = value"), None);
    }

    #[test]
    fn unescape_edges() {
        assert_eq!(unescape_value(r"a\\b"), r"a\b");
        assert_eq!(unescape_value(r"a\qb"), r"a\qb");
        assert_eq!(unescape_value("tail\\"), "tail\\");
    }
}
