//! Single merchant image.

use super::output::{Block, Tone};
use crate::i18n::{TranslationCatalog, resolve};
use crate::settings::GenericImageSettings;
use crate::template::Segment;

/// Banner shown while no image is configured.
pub const MISSING_IMAGE_MESSAGE: &str = "Enter an image link";

/// What: Render the image, or a critical banner asking for a link.
#[must_use]
pub fn render_image(
    settings: &GenericImageSettings,
    catalog: Option<&TranslationCatalog>,
) -> Block {
    let url = settings
        .image
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty());
    match url {
        Some(url) => Block::Image {
            url: url.to_string(),
        },
        None => Block::Banner {
            title: None,
            status: Tone::Critical,
            body: vec![Segment::plain(resolve(catalog, MISSING_IMAGE_MESSAGE))],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::preview;

    #[test]
    fn image_or_banner() {
        let settings = GenericImageSettings {
            image: Some(" https://example.com/hero.jpg ".into()),
        };
        assert_eq!(
            preview(&render_image(&settings, None)),
            "<img https://example.com/hero.jpg>\n"
        );
        assert_eq!(
            preview(&render_image(&GenericImageSettings::default(), None)),
            "[Critical]\n  Enter an image link\n"
        );
    }
}
