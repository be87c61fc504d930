//! Compare-at savings line.

use super::output::{Block, Tone};
use crate::i18n::TranslationCatalog;
use crate::metrics::Savings;
use crate::settings::SavingsSettings;
use crate::template::{TemplateBindings, render_or};

/// Label when none is configured.
pub const DEFAULT_SAVINGS_TEXT: &str = "You're Saving";

/// What: Render the savings row.
///
/// Output:
/// - `None` while savings are unknown or not positive
#[must_use]
pub fn render_savings(
    settings: &SavingsSettings,
    catalog: Option<&TranslationCatalog>,
    savings: Option<&Savings>,
) -> Option<Block> {
    let savings = savings.filter(|s| s.is_positive())?;
    let label = render_or(
        settings.text.as_deref(),
        DEFAULT_SAVINGS_TEXT,
        catalog,
        &TemplateBindings::new(),
    );
    Some(Block::row(vec![
        Block::Text {
            segments: label,
            tone: Tone::Success,
            bold: true,
        },
        Block::bold(&savings.money().format(), Tone::Success),
    ]))
}
