//! Translation catalog and handle resolution.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::sources::SourceError;

/// Maximum number of metaobject entries consumed from one fetch.
pub const MAX_FETCH_ENTRIES: usize = 200;

/// What: Derive the translation handle for a literal or `{wrapped}` string.
///
/// Inputs:
/// - `input`: Merchant-authored string (e.g. `"{free_shipping_title}"` or `"Free shipping"`)
///
/// Output:
/// - The input with every `{` and `}` removed
///
/// Details:
/// - Handles are case-sensitive; no trimming or case folding is applied.
#[must_use]
pub fn handle_of(input: &str) -> String {
    input.chars().filter(|c| *c != '{' && *c != '}').collect()
}

/// Immutable mapping from translation handle to localized text.
///
/// Built once per locale from a bulk fetch and replaced wholesale on refetch.
/// Construction collapses chains (an entry whose text is itself another
/// handle) so that every stored text is a fixed point of [`Self::resolve`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranslationCatalog {
    entries: HashMap<String, String>,
}

impl TranslationCatalog {
    /// What: Build a catalog from `(handle, text)` pairs.
    ///
    /// Inputs:
    /// - `pairs`: Entries in fetch order
    ///
    /// Output:
    /// - Normalised catalog
    ///
    /// Details:
    /// - The first occurrence of a duplicate handle wins.
    /// - Chained entries are rewritten to their terminal text.
    /// - Entries whose chain never terminates (cycles) are dropped with a warning.
    pub fn from_entries<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut raw: HashMap<String, String> = HashMap::new();
        for (handle, text) in pairs {
            raw.entry(handle).or_insert(text);
        }

        let mut entries = HashMap::with_capacity(raw.len());
        for handle in raw.keys() {
            match terminal_text(handle, &raw) {
                Some(text) => {
                    entries.insert(handle.clone(), text.to_string());
                }
                None => {
                    tracing::warn!(handle = %handle, "[I18n] Dropping cyclic translation entry");
                }
            }
        }
        Self { entries }
    }

    /// What: Decode a metaobject translation payload.
    ///
    /// Inputs:
    /// - `payload`: `{ "metaobjects": { "nodes": [ { "handle": .., "field": { "value": .. } } ] } }`
    ///
    /// Output:
    /// - Catalog with at most [`MAX_FETCH_ENTRIES`] entries
    ///
    /// # Errors
    /// - Returns `SourceError::Decode` when the `metaobjects.nodes` list is missing
    ///
    /// Details:
    /// - Nodes without a string handle or a string value are skipped.
    pub fn from_metaobjects(payload: &Value) -> Result<Self, SourceError> {
        let nodes = payload
            .get("metaobjects")
            .and_then(|m| m.get("nodes"))
            .and_then(Value::as_array)
            .ok_or_else(|| SourceError::Decode("missing metaobjects.nodes".to_string()))?;

        let pairs = nodes.iter().take(MAX_FETCH_ENTRIES).filter_map(|node| {
            let handle = node.get("handle")?.as_str()?;
            let text = node.get("field")?.get("value")?.as_str()?;
            Some((handle.to_string(), text.to_string()))
        });
        Ok(Self::from_entries(pairs))
    }

    /// What: Encode the catalog as a metaobject payload.
    ///
    /// Output:
    /// - The shape accepted by [`Self::from_metaobjects`], nodes sorted by handle
    #[must_use]
    pub fn to_metaobjects(&self) -> Value {
        let mut handles: Vec<&String> = self.entries.keys().collect();
        handles.sort_unstable();
        let nodes: Vec<Value> = handles
            .into_iter()
            .map(|h| serde_json::json!({ "handle": h, "field": { "value": self.entries[h] } }))
            .collect();
        serde_json::json!({ "metaobjects": { "nodes": nodes } })
    }

    /// What: Look up the text stored for an exact handle.
    #[must_use]
    pub fn get(&self, handle: &str) -> Option<&str> {
        self.entries.get(handle).map(String::as_str)
    }

    /// What: Resolve a literal or wrapped handle against this catalog.
    ///
    /// Output:
    /// - The catalog text when the brace-stripped input is a known handle,
    ///   otherwise the input unchanged
    #[must_use]
    pub fn resolve<'a>(&'a self, input: &'a str) -> &'a str {
        self.get(&handle_of(input)).unwrap_or(input)
    }

    /// What: Iterate over all handles (unordered).
    pub fn handles(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What: Follow a handle chain until the text no longer names a handle.
///
/// Output:
/// - `None` when the chain revisits a handle
fn terminal_text<'a>(start: &str, raw: &'a HashMap<String, String>) -> Option<&'a str> {
    let mut visited = HashSet::new();
    let mut current = raw.get(start)?;
    visited.insert(start.to_string());
    loop {
        let next_handle = handle_of(current);
        match raw.get(&next_handle) {
            Some(next) => {
                if !visited.insert(next_handle) {
                    return None;
                }
                current = next;
            }
            None => return Some(current),
        }
    }
}

/// What: Resolve `input` against an optional catalog.
///
/// Details:
/// - Before the first load (`catalog == None`) this is a passthrough.
#[must_use]
pub fn resolve(catalog: Option<&TranslationCatalog>, input: &str) -> String {
    catalog.map_or(input, |c| c.resolve(input)).to_string()
}

/// What: Resolve an optional merchant setting.
///
/// Output:
/// - `None` for an absent or empty setting, otherwise the resolved text
#[must_use]
pub fn translate(catalog: Option<&TranslationCatalog>, input: Option<&str>) -> Option<String> {
    match input {
        Some(s) if !s.is_empty() => Some(resolve(catalog, s)),
        _ => None,
    }
}
