//! Host-agnostic render tree and its plain-text preview.

use std::fmt::Write as _;

use serde::Serialize;

use crate::template::{Segment, split_emphasis};

/// Semantic text tone; the host maps it to its own palette.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Neutral information.
    #[default]
    Info,
    /// Positive state.
    Success,
    /// Needs attention.
    Warning,
    /// Error or strike-through price.
    Critical,
    /// Low emphasis.
    Subdued,
    /// Brand accent.
    Accent,
}

impl Tone {
    /// What: Parse a merchant appearance setting.
    ///
    /// Details:
    /// - Unknown values fall back to `Info`.
    #[must_use]
    pub fn from_setting(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "warning" => Self::Warning,
            "critical" => Self::Critical,
            "subdued" => Self::Subdued,
            "accent" | "decorative" => Self::Accent,
            _ => Self::Info,
        }
    }
}

/// One node of a rendered block.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Vertical stack.
    Stack {
        /// Children top to bottom.
        children: Vec<Self>,
    },
    /// Horizontal row.
    Row {
        /// Children left to right.
        children: Vec<Self>,
    },
    /// Text with emphasis segments.
    Text {
        /// Segments in order.
        segments: Vec<Segment>,
        /// Tone.
        tone: Tone,
        /// Whole text drawn bold.
        bold: bool,
    },
    /// Banner with optional title.
    Banner {
        /// Title segments.
        title: Option<Vec<Segment>>,
        /// Banner status tone.
        status: Tone,
        /// Body segments.
        body: Vec<Segment>,
    },
    /// Horizontal fill bar.
    ProgressBar {
        /// Fill in `[0, 1]`.
        fraction: f64,
    },
    /// Checkbox row.
    Checkbox {
        /// Checked state.
        checked: bool,
        /// Mutation in flight.
        busy: bool,
        /// Label.
        label: Vec<Segment>,
    },
    /// Push button.
    Button {
        /// Label.
        label: Vec<Segment>,
        /// Spinner shown instead of the label.
        busy: bool,
        /// Item already added (checkmark).
        done: bool,
    },
    /// Inline link.
    Link {
        /// Label.
        label: Vec<Segment>,
        /// Spinner shown instead of the label.
        busy: bool,
    },
    /// Price with optional struck-through reference.
    Price {
        /// Formatted price paid.
        current: String,
        /// Formatted reference price.
        struck: Option<String>,
    },
    /// Option selector.
    Select {
        /// `(value, label)` pairs.
        options: Vec<(String, String)>,
        /// Selected value.
        selected: String,
    },
    /// Image by URL.
    Image {
        /// Source URL.
        url: String,
    },
    /// Host-drawn payment method icon.
    PaymentIcon {
        /// Method name as the host knows it (`visa`, `paypal`).
        name: String,
    },
}

impl Block {
    /// What: Plain-toned text from already split segments.
    #[must_use]
    pub const fn text(segments: Vec<Segment>, tone: Tone) -> Self {
        Self::Text {
            segments,
            tone,
            bold: false,
        }
    }

    /// What: Bold text from a literal (emphasis markers still apply).
    #[must_use]
    pub fn bold(text: &str, tone: Tone) -> Self {
        Self::Text {
            segments: split_emphasis(text),
            tone,
            bold: true,
        }
    }

    /// What: Vertical stack.
    #[must_use]
    pub const fn stack(children: Vec<Self>) -> Self {
        Self::Stack { children }
    }

    /// What: Horizontal row.
    #[must_use]
    pub const fn row(children: Vec<Self>) -> Self {
        Self::Row { children }
    }
}

/// What: Render a block tree as indented plain text.
///
/// Details:
/// - Emphasized segments and bold text are wrapped in `**`.
/// - Struck prices are wrapped in `~~`.
#[must_use]
pub fn preview(block: &Block) -> String {
    let mut out = String::new();
    write_block(&mut out, block, 0);
    out
}

fn write_block(out: &mut String, block: &Block, depth: usize) {
    let indent = "  ".repeat(depth);
    match block {
        Block::Stack { children } => {
            for child in children {
                write_block(out, child, depth);
            }
        }
        Block::Row { children } => {
            let parts: Vec<String> = children
                .iter()
                .map(|c| preview(c).trim_end().replace('\n', " "))
                .filter(|s| !s.is_empty())
                .collect();
            let _ = writeln!(out, "{indent}{}", parts.join(" | "));
        }
        Block::Text { segments, bold, .. } => {
            let text = segments_text(segments);
            if *bold {
                let _ = writeln!(out, "{indent}**{text}**");
            } else {
                let _ = writeln!(out, "{indent}{text}");
            }
        }
        Block::Banner { title, status, body } => {
            let title = title
                .as_ref()
                .map(|t| format!(" {}", segments_text(t)))
                .unwrap_or_default();
            let _ = writeln!(out, "{indent}[{status:?}]{title}");
            let _ = writeln!(out, "{indent}  {}", segments_text(body));
        }
        Block::ProgressBar { fraction } => {
            let _ = writeln!(out, "{indent}{}", bar(*fraction));
        }
        Block::Checkbox {
            checked,
            busy,
            label,
        } => {
            let mark = match (busy, checked) {
                (true, _) => "[~]",
                (false, true) => "[x]",
                (false, false) => "[ ]",
            };
            let _ = writeln!(out, "{indent}{mark} {}", segments_text(label));
        }
        Block::Button { label, busy, done } => {
            let shown = if *busy {
                "...".to_string()
            } else if *done {
                "✓".to_string()
            } else {
                segments_text(label)
            };
            let _ = writeln!(out, "{indent}<{shown}>");
        }
        Block::Link { label, busy } => {
            let shown = if *busy {
                "...".to_string()
            } else {
                segments_text(label)
            };
            let _ = writeln!(out, "{indent}_{shown}_");
        }
        Block::Price { current, struck } => match struck {
            Some(struck) => {
                let _ = writeln!(out, "{indent}{current} ~~{struck}~~");
            }
            None => {
                let _ = writeln!(out, "{indent}{current}");
            }
        },
        Block::Select { options, selected } => {
            let labels: Vec<String> = options
                .iter()
                .map(|(value, label)| {
                    if value == selected {
                        format!("({label})")
                    } else {
                        label.clone()
                    }
                })
                .collect();
            let _ = writeln!(out, "{indent}Options: {}", labels.join(" / "));
        }
        Block::Image { url } => {
            let _ = writeln!(out, "{indent}<img {url}>");
        }
        Block::PaymentIcon { name } => {
            let _ = writeln!(out, "{indent}<pay {name}>");
        }
    }
}

fn segments_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| {
            if s.emphasized {
                format!("**{}**", s.text)
            } else {
                s.text.clone()
            }
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bar(fraction: f64) -> String {
    const WIDTH: usize = 20;
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (fraction * WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:.0}%",
        "#".repeat(filled),
        "-".repeat(WIDTH - filled),
        fraction * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Emphasis and bold survive the text preview.
    fn preview_marks_emphasis() {
        let block = Block::stack(vec![
            Block::ProgressBar { fraction: 0.6 },
            Block::text(split_emphasis("Only *$40.00* to go"), Tone::Info),
            Block::bold("Total", Tone::Success),
        ]);
        assert_eq!(
            preview(&block),
            "[############--------] 60%\nOnly **$40.00** to go\n**Total**\n"
        );
    }

    #[test]
    fn preview_row_and_price() {
        let block = Block::row(vec![
            Block::bold("You're Saving", Tone::Success),
            Block::Price {
                current: "$8.00".into(),
                struck: Some("$10.00".into()),
            },
        ]);
        assert_eq!(preview(&block), "**You're Saving** | $8.00 ~~$10.00~~\n");
    }

    #[test]
    fn tone_from_setting() {
        assert_eq!(Tone::from_setting("Success"), Tone::Success);
        assert_eq!(Tone::from_setting("decorative"), Tone::Accent);
        assert_eq!(Tone::from_setting("neon"), Tone::Info);
    }

    #[test]
    /// What: Blocks serialize with a `kind` tag for JSON output.
    fn block_json_shape() {
        let json = serde_json::to_value(Block::Link {
            label: vec![Segment::plain("Remove")],
            busy: false,
        })
        .expect("json");
        assert_eq!(json["kind"], "link");
        assert_eq!(json["label"][0]["text"], "Remove");
    }
}
