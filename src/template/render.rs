//! Resolve, bind and split: the template pipeline.

use super::bindings::TemplateBindings;
use super::markup::{Segment, split_emphasis};
use crate::i18n::{TranslationCatalog, translate};

/// What: Resolve a template and substitute its bindings.
///
/// Inputs:
/// - `template`: Merchant setting, possibly a translation handle; `None` when unset
/// - `catalog`: Active catalog, `None` before the first load
/// - `bindings`: Placeholder values for this call site
///
/// Output:
/// - `None` for an absent or empty template, otherwise the substituted text
#[must_use]
pub fn resolve_and_bind(
    template: Option<&str>,
    catalog: Option<&TranslationCatalog>,
    bindings: &TemplateBindings,
) -> Option<String> {
    translate(catalog, template).map(|resolved| bindings.apply(&resolved))
}

/// What: Render a template into emphasis segments.
///
/// Inputs:
/// - `template`: Merchant setting; `None` when unset
/// - `catalog`: Active catalog (passthrough when `None`)
/// - `bindings`: Placeholder values
///
/// Output:
/// - `None` when the template is absent; callers must hide rather than draw empty text
/// - Otherwise the segment list produced by [`split_emphasis`]
#[must_use]
pub fn render(
    template: Option<&str>,
    catalog: Option<&TranslationCatalog>,
    bindings: &TemplateBindings,
) -> Option<Vec<Segment>> {
    resolve_and_bind(template, catalog, bindings).map(|text| split_emphasis(&text))
}

/// What: Render with a fallback literal used when the setting is unset.
///
/// Details:
/// - The fallback goes through the same resolution, so defaults are translatable too.
#[must_use]
pub fn render_or(
    template: Option<&str>,
    fallback: &str,
    catalog: Option<&TranslationCatalog>,
    bindings: &TemplateBindings,
) -> Vec<Segment> {
    let source = template.filter(|t| !t.is_empty()).unwrap_or(fallback);
    render(Some(source), catalog, bindings).unwrap_or_else(|| vec![Segment::plain("")])
}
