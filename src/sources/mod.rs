//! Collaborator interfaces owned by the checkout host.
//!
//! Every external dependency of the blocks (catalog queries, translation
//! fetches, cart mutations, persisted values) is reached through one of the
//! traits in this module. The host runtime supplies the real implementations;
//! [`memory`] provides in-process ones used by the preview binary and tests.

use std::fmt;
use std::future::Future;

pub mod catalog;
pub mod memory;
pub mod store;

pub use catalog::{Product, Variant};
pub use memory::{MemoryCart, MemoryCatalog, MemoryStore, StaticTranslations};
pub use store::JsonFileStore;

use crate::cart::CartMutation;

/// What: Failure reported by a host collaborator.
///
/// Details:
/// - `Unavailable` and `Decode` are the "data unavailable" class: callers
///   degrade to passthrough or hide the block.
/// - `Rejected` is a typed refusal from the cart mutation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The collaborator could not be reached or has not produced data yet.
    Unavailable(String),
    /// The host refused a request and returned a message.
    Rejected {
        /// Host-provided reason.
        message: String,
    },
    /// The payload did not have the expected shape.
    Decode(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(what) => write!(f, "data unavailable: {what}"),
            Self::Rejected { message } => write!(f, "rejected by host: {message}"),
            Self::Decode(what) => write!(f, "unexpected payload: {what}"),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<serde_json::Error> for SourceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

/// What: Catalog query service returning products and variants.
///
/// Details:
/// - `country` is the shopper's localization context (ISO code); `None`
///   lets the host pick its default market.
/// - A failed query must surface as `Err`, never as stale data.
pub trait CatalogSource {
    /// What: Fetch a single variant by merchandise identifier.
    ///
    /// Output:
    /// - `Ok(None)` when the identifier does not resolve to a variant.
    fn variant(
        &self,
        id: &str,
        country: Option<&str>,
    ) -> impl Future<Output = Result<Option<Variant>, SourceError>> + Send;

    /// What: Fetch products (with all their variants) for the given ids.
    ///
    /// Output:
    /// - Products in the order the ids were given; unknown ids are omitted.
    fn products(
        &self,
        ids: &[String],
        country: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Product>, SourceError>> + Send;
}

/// What: Translation store returning the raw metaobject payload for a country.
///
/// Details:
/// - The payload is decoded by [`crate::i18n::TranslationCatalog::from_metaobjects`].
pub trait TranslationSource {
    /// What: Fetch translation entries for the given localization country.
    fn fetch_translations(
        &self,
        country: &str,
    ) -> impl Future<Output = Result<serde_json::Value, SourceError>> + Send;
}

/// What: Cart mutation service.
///
/// Details:
/// - `Ok(())` means the host accepted the change; the authoritative result is
///   still the next cart snapshot the host pushes.
pub trait CartMutator {
    /// What: Apply a single add/remove line change.
    fn apply(&self, mutation: CartMutation) -> impl Future<Output = Result<(), SourceError>> + Send;
}

/// What: Key/value store scoped to the checkout session.
pub trait ValueStore {
    /// What: Read a persisted value, `Ok(None)` when the key was never written.
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<String>, SourceError>> + Send;

    /// What: Persist a value under `key`, replacing any previous one.
    fn write(&self, key: &str, value: String) -> impl Future<Output = Result<(), SourceError>> + Send;
}
