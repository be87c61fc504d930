//! Customer review carousel.

use super::output::{Block, Tone};
use crate::i18n::{TranslationCatalog, resolve};
use crate::settings::ReviewsSettings;
use crate::template::{Segment, TemplateBindings, render_or};

/// Footer when none is configured.
pub const DEFAULT_FOOTER: &str = "Showing our 4 & 5 star reviews.";

/// Logo when none is configured.
pub const DEFAULT_LOGO_URL: &str =
    "https://cdn.shopify.com/s/files/1/0659/6676/8379/files/Figma_2024-07-18_13.36.47.png?v=1721302624";

const FIVE_STAR_IMAGE: &str =
    "https://cdn.shopify.com/s/files/1/0719/8470/9689/files/Arc_2025-10-18_16.07.45.png?v=1760789345";
const FOUR_STAR_IMAGE: &str =
    "https://cdn.shopify.com/s/files/1/0807/7715/0808/files/test.svg?v=1734326832";

/// Built-in reviews as `(title, body, name, time ago, five stars)`.
const BUILT_IN: [(&str, &str, &str, &str, bool); 5] = [
    (
        "Very comfortable",
        "Saw this product on TikTok and the girl did not lie. I wore this under my dress on a date night, very comfortable, no panty line shown and it holds the tummy in really good",
        "Eva B.",
        "2 days ago",
        true,
    ),
    (
        "Loved it!",
        "This is the best bodysuit I have tried by a million miles, and I plan to purchase in every color! I have a DDD chest and the fact that I didn't had to wear a bra felt amazing and the waist was snaaaaatched!!",
        "Chelsea",
        "4 days ago",
        false,
    ),
    (
        "Items arrived on time and well packed…",
        "Items arrived on time and well packed was informed every step of the way by email when they would be arriving.",
        "Marie",
        "17 hours ago",
        true,
    ),
    (
        "So soooo good!!",
        "Looks sooo good! I was a little skeptical but there was this adorable sick girl in one of their ads with a REAL body that it made me have to try!",
        "Christene Magin",
        "3 days ago",
        true,
    ),
    (
        "Deal of a life time…",
        "I ordered the buy one get one free deal as a late Christmas gift for myself and I love the way I feel when I put them on.",
        "Eva Teresita Gonzalez",
        "3 hours ago",
        true,
    ),
];

/// Star rating shown on a review card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rating {
    /// Four stars.
    Four,
    /// Five stars.
    Five,
}

impl Rating {
    /// What: Parse the rating field of a review line.
    ///
    /// Details:
    /// - Only `"5"` is five stars; anything else shows four.
    #[must_use]
    pub fn from_setting(raw: &str) -> Self {
        if raw.trim() == "5" { Self::Five } else { Self::Four }
    }

    /// Star image for this rating.
    #[must_use]
    pub const fn image_url(self) -> &'static str {
        match self {
            Self::Five => FIVE_STAR_IMAGE,
            Self::Four => FOUR_STAR_IMAGE,
        }
    }
}

/// One translated review card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Review {
    /// Card title.
    pub title: String,
    /// Review text.
    pub body: String,
    /// Reviewer name.
    pub name: String,
    /// Relative time, e.g. `2 days ago`.
    pub time_ago: String,
    /// Stars.
    pub rating: Rating,
}

/// What: Parse merchant review lines.
///
/// Inputs:
/// - `text`: One review per line, `title:body:name:time ago:rating`
/// - `catalog`: Active catalog; every text field is translated
///
/// Output:
/// - Reviews in line order
///
/// Details:
/// - Lines with fewer than four fields are skipped with a warning; a missing
///   rating shows four stars.
/// - Blank lines are ignored.
#[must_use]
pub fn parse_reviews(text: &str, catalog: Option<&TranslationCatalog>) -> Vec<Review> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut fields = line.split(':').map(str::trim);
            let (Some(title), Some(body), Some(name), Some(time_ago)) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                tracing::warn!(line, "[Reviews] Skipping review line without all fields");
                return None;
            };
            Some(Review {
                title: resolve(catalog, title),
                body: resolve(catalog, body),
                name: resolve(catalog, name),
                time_ago: resolve(catalog, time_ago),
                rating: Rating::from_setting(fields.next().unwrap_or_default()),
            })
        })
        .collect()
}

/// What: Built-in reviews, translated.
#[must_use]
pub fn built_in_reviews(catalog: Option<&TranslationCatalog>) -> Vec<Review> {
    BUILT_IN
        .iter()
        .map(|(title, body, name, time_ago, five)| Review {
            title: resolve(catalog, title),
            body: resolve(catalog, body),
            name: resolve(catalog, name),
            time_ago: resolve(catalog, time_ago),
            rating: if *five { Rating::Five } else { Rating::Four },
        })
        .collect()
}

/// What: Render the carousel.
///
/// Details:
/// - Unset or empty `reviews_json` falls back to the built-in reviews.
#[must_use]
pub fn render_reviews(settings: &ReviewsSettings, catalog: Option<&TranslationCatalog>) -> Block {
    let reviews = match settings.reviews_json.as_deref() {
        Some(text) if !text.trim().is_empty() => parse_reviews(text, catalog),
        _ => built_in_reviews(catalog),
    };
    let cards = reviews
        .into_iter()
        .map(|review| {
            Block::stack(vec![
                Block::Image {
                    url: review.rating.image_url().to_string(),
                },
                Block::Text {
                    segments: vec![Segment::plain(review.title)],
                    tone: Tone::Info,
                    bold: true,
                },
                Block::text(vec![Segment::plain(review.body)], Tone::Info),
                Block::text(
                    vec![Segment::plain(format!("{}, {}", review.name, review.time_ago))],
                    Tone::Subdued,
                ),
            ])
        })
        .collect();
    let logo = settings
        .logo_image_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_LOGO_URL);
    Block::stack(vec![
        Block::Image {
            url: logo.to_string(),
        },
        Block::row(cards),
        Block::text(
            render_or(
                settings.footer_text.as_deref(),
                DEFAULT_FOOTER,
                catalog,
                &TemplateBindings::new(),
            ),
            Tone::Info,
        ),
    ])
}
