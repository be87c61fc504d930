//! Inline emphasis markup (`*bold*`) parsing.

use serde::Serialize;

/// Delimiter wrapping an emphasized span.
pub const EMPHASIS_DELIMITER: char = '*';

/// A run of rendered text, optionally marked for emphasis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Text content with delimiters removed.
    pub text: String,
    /// Whether the presentation layer should emphasize this run.
    pub emphasized: bool,
}

impl Segment {
    /// What: Plain (non-emphasized) segment.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasized: false,
        }
    }

    /// What: Emphasized segment.
    #[must_use]
    pub fn emphasized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasized: true,
        }
    }
}

/// What: Split text on paired emphasis delimiters.
///
/// Inputs:
/// - `input`: Fully substituted text
///
/// Output:
/// - Alternating plain / emphasized segments, always starting and ending with
///   a (possibly empty) plain segment
///
/// Details:
/// - Delimiters pair left to right; `"a *b* c"` yields three segments.
/// - An opening delimiter without a closing one is not markup: it and the
///   remainder stay in the trailing plain segment.
/// - Without any pair the result is a single plain segment.
#[must_use]
pub fn split_emphasis(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut rest = input;
    while let Some(open) = rest.find(EMPHASIS_DELIMITER) {
        let after = &rest[open + EMPHASIS_DELIMITER.len_utf8()..];
        let Some(close) = after.find(EMPHASIS_DELIMITER) else {
            break;
        };
        plain.push_str(&rest[..open]);
        segments.push(Segment::plain(std::mem::take(&mut plain)));
        segments.push(Segment::emphasized(&after[..close]));
        rest = &after[close + EMPHASIS_DELIMITER.len_utf8()..];
    }
    plain.push_str(rest);
    segments.push(Segment::plain(plain));
    segments
}

/// What: Concatenate segment texts (delimiter-stripped string).
#[must_use]
pub fn plain_text(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}
