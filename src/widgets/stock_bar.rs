//! Live stock bar.

use super::output::{Block, Tone};
use crate::i18n::TranslationCatalog;
use crate::metrics::StockConfig;
use crate::settings::StockBarSettings;
use crate::template::{TemplateBindings, render};

/// Store key for the persisted stock value.
pub const STOCK_KEY: &str = "maison-stock-bar";

/// What: Render the stock text and bar for the current stock.
///
/// Inputs:
/// - `config`: Normalised stock configuration (the bar is stock over initial)
/// - `stock`: Current displayed stock
///
/// Details:
/// - An empty stock text hides the text line, the bar still shows.
#[must_use]
pub fn render_stock(
    settings: &StockBarSettings,
    catalog: Option<&TranslationCatalog>,
    config: &StockConfig,
    stock: u32,
) -> Block {
    let bindings = TemplateBindings::new().with("stock", stock.to_string());
    let mut children = Vec::with_capacity(2);
    if let Some(text) = render(Some(&settings.stock_text), catalog, &bindings) {
        children.push(Block::text(text, Tone::from_setting(&settings.text_appearance)));
    }
    children.push(Block::ProgressBar {
        fraction: config.fraction(stock),
    });
    Block::stack(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::DecayingStock;
    use crate::widgets::preview;

    #[test]
    /// What: The stock value is bound and the bar shows stock over initial.
    fn renders_stock() {
        let settings = StockBarSettings::default();
        let stock = DecayingStock::new(settings.stock_config()).resume(Some("25"));
        assert_eq!(
            preview(&render_stock(&settings, None, stock.config(), stock.current())),
            "LIVE STOCK UPDATES: 25 left in stock\n[##########----------] 50%\n"
        );
    }

    #[test]
    fn empty_text_hides_line() {
        let settings = StockBarSettings {
            stock_text: String::new(),
            ..StockBarSettings::default()
        };
        let config = settings.stock_config();
        let Block::Stack { children } = render_stock(&settings, None, &config, config.initial) else {
            panic!("stack expected");
        };
        assert_eq!(children.len(), 1);
    }
}
