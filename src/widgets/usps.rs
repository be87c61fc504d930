//! Selling points list with one icon per item.

use super::output::{Block, Tone};
use crate::i18n::{TranslationCatalog, resolve};
use crate::settings::UspSettings;
use crate::template::{TemplateBindings, render, split_emphasis};

/// Icon for items without a configured image.
pub const DEFAULT_ICON_URL: &str = "https://i.imgur.com/jlrOoUm.png";

/// One selling point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UspItem {
    /// Headline.
    pub title: String,
    /// Optional detail line.
    pub body: Option<String>,
    /// Icon URL.
    pub image_url: String,
}

/// What: Parse `title:body` lines into items.
///
/// Inputs:
/// - `text`: Merchant text, one item per line (`\n`, `\r\n` or `\r`)
/// - `icons`: Icons by item position; missing ones use [`DEFAULT_ICON_URL`]
/// - `catalog`: Active catalog for title and body
///
/// Output:
/// - Items in line order
///
/// Details:
/// - Everything after the first `:` is the body, so bodies may contain colons.
/// - Blank lines produce no item and do not consume an icon.
#[must_use]
pub fn parse_usps(
    text: &str,
    icons: &[Option<&str>],
    catalog: Option<&TranslationCatalog>,
) -> Vec<UspItem> {
    text.split(['\n', '\r'])
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(index, line)| {
            let (title, body) = match line.split_once(':') {
                Some((title, body)) => (title, Some(body.trim()).filter(|b| !b.is_empty())),
                None => (line, None),
            };
            UspItem {
                title: resolve(catalog, title.trim()),
                body: body.map(|b| resolve(catalog, b)),
                image_url: icons
                    .get(index)
                    .copied()
                    .flatten()
                    .filter(|url| !url.is_empty())
                    .unwrap_or(DEFAULT_ICON_URL)
                    .to_string(),
            }
        })
        .collect()
}

/// What: Render the heading and items.
///
/// Output:
/// - `None` when there is neither a heading nor an item
#[must_use]
pub fn render_usps(settings: &UspSettings, catalog: Option<&TranslationCatalog>) -> Option<Block> {
    let items = parse_usps(&settings.usps_text, &settings.icons(), catalog);
    let heading = render(settings.heading.as_deref(), catalog, &TemplateBindings::new());
    if items.is_empty() && heading.is_none() {
        return None;
    }
    let title_tone = Tone::from_setting(&settings.title_appearance);
    let body_tone = Tone::from_setting(&settings.body_appearance);
    let icon_last = settings.icon_position.trim().eq_ignore_ascii_case("end");

    let mut children = Vec::with_capacity(items.len() + 1);
    if let Some(segments) = heading {
        children.push(Block::text(
            segments,
            Tone::from_setting(&settings.heading_appearance),
        ));
    }
    for item in items {
        let mut text = vec![Block::text(split_emphasis(&item.title), title_tone)];
        if let Some(body) = &item.body {
            text.push(Block::text(split_emphasis(body), body_tone));
        }
        let icon = Block::Image {
            url: item.image_url,
        };
        let row = if icon_last {
            vec![Block::stack(text), icon]
        } else {
            vec![icon, Block::stack(text)]
        };
        children.push(Block::row(row));
    }
    Some(Block::stack(children))
}
