//! Process-wide translation catalog cache.
//!
//! The cache holds the catalog for the current localization country and a
//! small LRU of recently used countries so switching back is instant. Fetches
//! are tracked by generation: a late response for a superseded country never
//! replaces a newer one, whatever order the responses arrive in.

use std::num::NonZeroUsize;
use std::sync::{Arc, PoisonError, RwLock};

use lru::LruCache;

use super::catalog::{TranslationCatalog, resolve};
use crate::sources::{SourceError, TranslationSource};

const RECENT_CAPACITY: usize = 4;

/// Token identifying one translation fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    country: String,
}

impl FetchTicket {
    /// Country this fetch was started for.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }
}

#[derive(Debug)]
struct CacheState {
    current: Option<Arc<TranslationCatalog>>,
    country: Option<String>,
    generation: u64,
    recent: LruCache<String, Arc<TranslationCatalog>>,
}

/// Shared, read-mostly translation cache.
///
/// Cheap to share behind an `Arc`; readers take a short read lock and clone
/// the inner `Arc<TranslationCatalog>`.
#[derive(Debug)]
pub struct TranslationCache {
    state: RwLock<CacheState>,
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationCache {
    /// What: Create an empty cache (passthrough until the first load).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(RECENT_CAPACITY)
    }

    /// What: Create an empty cache remembering up to `capacity` countries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: RwLock::new(CacheState {
                current: None,
                country: None,
                generation: 0,
                recent: LruCache::new(capacity),
            }),
        }
    }

    /// What: Currently active catalog, `None` before the first successful load.
    #[must_use]
    pub fn catalog(&self) -> Option<Arc<TranslationCatalog>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    /// What: Country the active catalog (or the pending fetch) belongs to.
    #[must_use]
    pub fn country(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .country
            .clone()
    }

    /// What: Resolve `input` against the active catalog.
    ///
    /// Details:
    /// - Never blocks on a fetch; passthrough while nothing is loaded.
    #[must_use]
    pub fn resolve(&self, input: &str) -> String {
        resolve(self.catalog().as_deref(), input)
    }

    /// What: Start a fetch for `country`.
    ///
    /// Output:
    /// - Ticket to hand back to [`Self::complete_fetch`]
    ///
    /// Details:
    /// - Supersedes every earlier ticket.
    /// - Switching to a different country installs that country's cached
    ///   catalog when one is in the LRU, otherwise drops back to passthrough
    ///   so text from the previous locale is never shown.
    pub fn begin_fetch(&self, country: &str) -> FetchTicket {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.generation += 1;
        if state.country.as_deref() != Some(country) {
            let warm = state.recent.get(country).cloned();
            tracing::debug!(
                country,
                warm = warm.is_some(),
                "[I18n] Locale changed, switching catalog"
            );
            state.current = warm;
            state.country = Some(country.to_string());
        }
        FetchTicket {
            generation: state.generation,
            country: country.to_string(),
        }
    }

    /// What: Apply the result of a fetch.
    ///
    /// Inputs:
    /// - `ticket`: Ticket from [`Self::begin_fetch`]
    /// - `result`: Decoded catalog or the fetch failure
    ///
    /// Output:
    /// - `true` when the result was installed, `false` when discarded
    ///
    /// Details:
    /// - Results for superseded tickets are discarded.
    /// - Failures keep whatever `begin_fetch` installed (warm entry or passthrough).
    pub fn complete_fetch(
        &self,
        ticket: &FetchTicket,
        result: Result<TranslationCatalog, SourceError>,
    ) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if ticket.generation != state.generation {
            tracing::debug!(
                country = %ticket.country,
                ticket = ticket.generation,
                latest = state.generation,
                "[I18n] Discarding stale translation response"
            );
            return false;
        }
        match result {
            Ok(catalog) => {
                tracing::info!(
                    country = %ticket.country,
                    entries = catalog.len(),
                    "[I18n] Translation catalog loaded"
                );
                let catalog = Arc::new(catalog);
                state.recent.put(ticket.country.clone(), Arc::clone(&catalog));
                state.current = Some(catalog);
                true
            }
            Err(e) => {
                tracing::warn!(
                    country = %ticket.country,
                    error = %e,
                    "[I18n] Translation fetch failed; resolving as passthrough"
                );
                false
            }
        }
    }

    /// What: Fetch and install the catalog for `country`.
    ///
    /// Output:
    /// - `true` when a new catalog was installed
    pub async fn refresh<S: TranslationSource>(&self, source: &S, country: &str) -> bool {
        let ticket = self.begin_fetch(country);
        let result = source
            .fetch_translations(country)
            .await
            .and_then(|payload| TranslationCatalog::from_metaobjects(&payload));
        self.complete_fetch(&ticket, result)
    }
}
