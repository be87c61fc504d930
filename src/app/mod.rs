//! Preview runtime behind the `checkout-blocks` binary.
//!
//! Loads a scenario, wires in-memory collaborators, replays the scenario's
//! interactions and prints every visible block, either as indented text or
//! as JSON.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub mod args;
pub mod logging;
pub mod scenario;
pub mod session;

pub use args::{Args, Command, PreviewArgs, determine_log_level};
pub use scenario::{Action, Scenario};
pub use session::{RenderedBlock, Session};

use crate::i18n::{DirectoryTranslations, TranslationCache, parse_catalog_file};
use crate::sources::{JsonFileStore, MemoryStore, StaticTranslations, ValueStore};
use crate::widgets::preview;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// What: Run the parsed command.
///
/// # Errors
/// - Scenario or state files that cannot be read or parsed
/// - Output that cannot be serialised
pub async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Preview(preview) => run_preview(&preview).await,
    }
}

/// What: Render a scenario and print it to stdout.
///
/// # Errors
/// - See [`run`]
pub async fn run_preview(args: &PreviewArgs) -> Result<()> {
    let scenario = Scenario::load(&args.scenario)?;
    let country = args
        .country
        .clone()
        .or_else(|| scenario.country.clone())
        .map(|c| c.to_ascii_uppercase());

    let translations = Arc::new(TranslationCache::new());
    if let (Some(path), Some(country)) = (&args.translations, &country) {
        load_translations(&translations, path, country).await;
    }

    let output = match &args.state {
        Some(path) => {
            let store = Arc::new(JsonFileStore::new(path.clone()));
            render_session(&scenario, country, translations, store, args).await?
        }
        None => {
            let store = Arc::new(MemoryStore::new());
            render_session(&scenario, country, translations, store, args).await?
        }
    };
    print!("{output}");
    Ok(())
}

/// What: Install the catalog for `country` from a file or a directory.
///
/// Details:
/// - Failures are logged and leave the cache in passthrough mode.
async fn load_translations(cache: &TranslationCache, path: &Path, country: &str) {
    let loaded = if path.is_dir() {
        cache
            .refresh(&DirectoryTranslations::new(path.to_path_buf()), country)
            .await
    } else {
        match parse_catalog_file(path) {
            Ok(catalog) => {
                let source = StaticTranslations::new().with_country(country, catalog);
                cache.refresh(&source, country).await
            }
            Err(e) => {
                tracing::warn!(error = %e, "[Preview] Translations not loaded");
                false
            }
        }
    };
    tracing::info!(country, loaded, "[Preview] Translations ready");
}

/// What: Mount, replay, render and unmount one scenario.
///
/// Output:
/// - Everything to print, one frame per render
async fn render_session<S>(
    scenario: &Scenario,
    country: Option<String>,
    translations: Arc<TranslationCache>,
    store: Arc<S>,
    args: &PreviewArgs,
) -> Result<String>
where
    S: ValueStore + Send + Sync + 'static,
{
    let mut session = Session::mount(scenario, country, translations, store).await;
    for action in &scenario.actions {
        session.apply(action).await;
    }

    let mut output = format_frame(&session.render().await, args.json)?;
    if args.watch > 0 {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(args.watch);
        while let Ok(true) = tokio::time::timeout_at(deadline, session.next_tick()).await {
            output.push('\n');
            output.push_str(&format_frame(&session.render().await, args.json)?);
        }
    }
    session.unmount().await;
    Ok(output)
}

/// What: Format one render as text or JSON.
///
/// # Errors
/// - JSON serialisation failure
pub fn format_frame(blocks: &[RenderedBlock], json: bool) -> Result<String> {
    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(blocks)?));
    }
    let mut out = String::new();
    for rendered in blocks {
        let _ = writeln!(out, "== {} ==", rendered.name);
        out.push_str(&preview(&rendered.block));
    }
    Ok(out)
}
