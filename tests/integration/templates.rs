//! Translation cache, template rendering and the widgets that use them.

use std::sync::Arc;

use checkout_blocks::i18n::{DirectoryTranslations, TranslationCache, TranslationCatalog};
use checkout_blocks::settings::ProgressBarSettings;
use checkout_blocks::sources::StaticTranslations;
use checkout_blocks::template::{TemplateBindings, plain_text, render};
use checkout_blocks::widgets::{preview, progress_bar};

fn catalog(pairs: &[(&str, &str)]) -> TranslationCatalog {
    TranslationCatalog::from_entries(
        pairs
            .iter()
            .map(|(h, t)| ((*h).to_string(), (*t).to_string())),
    )
}

#[tokio::test]
/// What: Handles resolve after a refresh; a failed country falls back to passthrough.
async fn cache_refresh_and_fallback() {
    let source = StaticTranslations::new()
        .with_country("DE", catalog(&[("remove", "Entfernen"), ("delete", "{remove}")]));
    let cache = Arc::new(TranslationCache::new());
    assert_eq!(cache.resolve("{remove}"), "{remove}");

    assert!(cache.refresh(&source, "DE").await);
    assert_eq!(cache.resolve("{remove}"), "Entfernen");
    assert_eq!(cache.resolve("delete"), "Entfernen");
    assert_eq!(cache.resolve("Keep me"), "Keep me");

    assert!(!cache.refresh(&source, "FR").await);
    assert_eq!(cache.resolve("{remove}"), "{remove}");

    // Switching back uses the warm catalog immediately.
    cache.begin_fetch("DE");
    assert_eq!(cache.resolve("{remove}"), "Entfernen");
}

#[test]
/// What: Resolution happens before substitution, and bound values are never re-read as handles.
fn resolve_then_bind() {
    let catalog = catalog(&[
        ("not_reached", "Noch *{amount_left}* bis zum Gratisversand"),
        ("amount_left", "should not appear"),
    ]);
    let bindings = TemplateBindings::new().with("amount_left", "12,00 €");
    let segments = render(Some("{not_reached}"), Some(&catalog), &bindings).expect("segments");
    assert_eq!(plain_text(&segments), "Noch 12,00 € bis zum Gratisversand");
    assert!(segments[1].emphasized);
    assert_eq!(segments[1].text, "12,00 €");

    assert_eq!(render(None, Some(&catalog), &bindings), None);
    assert_eq!(render(Some(""), Some(&catalog), &bindings), None);
}

#[tokio::test]
/// What: A translation directory drives the progress bar text.
async fn progress_bar_with_directory_translations() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("DE.yml"),
        "shipping:\n  not_reached: \"{flag} Noch *{amount_left}* bis zum Gratisversand\"\n",
    )
    .expect("write");

    let cache = TranslationCache::new();
    assert!(
        cache
            .refresh(&DirectoryTranslations::new(dir.path().to_path_buf()), "DE")
            .await
    );

    let settings = ProgressBarSettings {
        country_thresholds: "DE=50".to_string(),
        free_shipping_not_reached_text: Some("{shipping.not_reached}".to_string()),
        ..ProgressBarSettings::default()
    };
    let catalog = cache.catalog();
    let (block, progress) =
        progress_bar::render(&settings, catalog.as_deref(), Some("DE"), 20.0, "EUR", None);
    assert_eq!(progress.remaining_cents, 3_000);
    assert_eq!(
        preview(&block),
        "[########------------] 40%\n\u{1F1E9}\u{1F1EA} Noch **€30.00** bis zum Gratisversand\n"
    );
}
