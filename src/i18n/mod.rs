//! Translation handles and the shared translation catalog cache.
//!
//! # Overview
//!
//! Every merchant-authored string is implicitly translatable:
//! - **Handles**: a string's handle is the string with its `{` `}` wrapper
//!   characters removed (`"{free_shipping}"` and `"free_shipping"` share one
//!   handle)
//! - **Catalog**: a per-country mapping of handle to localized text, fetched in
//!   bulk from the host's metaobject store
//! - **Resolution**: a string whose handle is in the catalog is replaced by the
//!   catalog text, anything else passes through unchanged
//!
//! # Loading
//!
//! The [`TranslationCache`] is the only process-wide shared state. It starts
//! empty (passthrough), is refreshed whenever the localization country
//! changes, and keeps a few recent countries warm. Fetch results are applied
//! by generation so a slow response for an old country is discarded.
//!
//! # Usage
//!
//! ```rust
//! use checkout_blocks::i18n::{TranslationCache, TranslationCatalog};
//!
//! let cache = TranslationCache::new();
//! assert_eq!(cache.resolve("{remove}"), "{remove}");
//!
//! let ticket = cache.begin_fetch("DE");
//! let catalog = TranslationCatalog::from_entries([("remove".to_string(), "Entfernen".to_string())]);
//! cache.complete_fetch(&ticket, Ok(catalog));
//! assert_eq!(cache.resolve("{remove}"), "Entfernen");
//! ```
//!
//! # Error Handling
//!
//! - Failed or malformed fetches leave resolution in passthrough mode
//! - Cyclic catalog entries are dropped at build time and logged
//! - Nothing in this module panics or blocks a render

mod cache;
mod catalog;
mod loader;

pub use cache::{FetchTicket, TranslationCache};
pub use catalog::{MAX_FETCH_ENTRIES, TranslationCatalog, handle_of, resolve, translate};
pub use loader::{DirectoryTranslations, load_catalog_file, parse_catalog_file};
