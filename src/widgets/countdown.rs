//! Order reservation countdown banner.

use super::output::{Block, Tone};
use crate::i18n::{TranslationCatalog, translate};
use crate::metrics::{DEFAULT_EXPIRED_TEXT, ReservationCountdown, countdown_text};
use crate::settings::CountdownSettings;
use crate::template::{TemplateBindings, render, split_emphasis};

/// Countdown text when none is configured.
pub const DEFAULT_COUNTDOWN_TEXT: &str = "Order reserved for the next";

/// What: Render the banner for the current countdown state.
///
/// Details:
/// - Both texts are resolved before `{min}`/`{sec}` substitution, so
///   translated texts may carry their own placeholders.
#[must_use]
pub fn render_countdown(
    settings: &CountdownSettings,
    catalog: Option<&TranslationCatalog>,
    countdown: &ReservationCountdown,
) -> Block {
    let running = translate(catalog, settings.banner_countdown.as_deref())
        .or_else(|| translate(catalog, Some(DEFAULT_COUNTDOWN_TEXT)))
        .unwrap_or_default();
    let expired = translate(catalog, settings.banner_expired.as_deref())
        .or_else(|| translate(catalog, Some(DEFAULT_EXPIRED_TEXT)))
        .unwrap_or_default();
    Block::Banner {
        title: render(
            settings.banner_title.as_deref(),
            catalog,
            &TemplateBindings::new(),
        ),
        status: Tone::from_setting(&settings.banner_status),
        body: split_emphasis(&countdown_text(countdown.remaining(), &running, &expired)),
    }
}
