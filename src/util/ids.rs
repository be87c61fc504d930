//! Helpers for host global identifiers (`gid://shop/Type/123`).

/// Prefix for product variant global identifiers.
pub const VARIANT_GID_PREFIX: &str = "gid://shopify/ProductVariant/";

/// What: Return the trailing path component of a global identifier.
///
/// Inputs:
/// - `gid`: Identifier such as `gid://shopify/Product/42`, or a bare id
///
/// Output:
/// - `"42"` for the example above; the input itself when it has no `/`
#[must_use]
pub fn numeric_tail(gid: &str) -> &str {
    gid.rsplit('/').next().unwrap_or(gid)
}

/// What: Build a variant global identifier from any id form.
///
/// Details:
/// - Accepts bare numeric ids and full gids of any type; only the tail is kept.
#[must_use]
pub fn variant_gid(id: &str) -> String {
    format!("{VARIANT_GID_PREFIX}{}", numeric_tail(id))
}

/// What: Collect product ids from metafield JSON list values.
///
/// Inputs:
/// - `values`: Raw metafield values, each expected to be a JSON array of strings
/// - `limit`: Maximum number of ids to return
///
/// Output:
/// - Ids in metafield order, truncated to `limit`
///
/// Details:
/// - Values that are not JSON string arrays are skipped with a warning.
#[must_use]
pub fn collect_metafield_ids(values: &[String], limit: usize) -> Vec<String> {
    let mut ids = Vec::new();
    for raw in values {
        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(list) => ids.extend(list),
            Err(e) => {
                tracing::warn!(error = %e, "[Metafields] Skipping non-list metafield value");
            }
        }
        if ids.len() >= limit {
            ids.truncate(limit);
            break;
        }
    }
    ids
}
