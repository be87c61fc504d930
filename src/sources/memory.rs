//! In-process collaborators for the preview binary and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

use super::catalog::{Product, Variant};
use super::{CartMutator, CatalogSource, SourceError, TranslationSource, ValueStore};
use crate::cart::{CartLine, CartMutation, CartSnapshot};
use crate::i18n::TranslationCatalog;

/// Catalog backed by a fixed product list.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    products: Vec<Product>,
    failing: AtomicBool,
    queries: AtomicUsize,
}

impl MemoryCatalog {
    /// What: Create a catalog serving `products`.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            failing: AtomicBool::new(false),
            queries: AtomicUsize::new(0),
        }
    }

    /// What: Make every subsequent query fail with `Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of queries served so far (including failed ones).
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn begin_query(&self) -> Result<(), SourceError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("catalog offline".to_string()));
        }
        Ok(())
    }
}

impl CatalogSource for MemoryCatalog {
    async fn variant(&self, id: &str, _country: Option<&str>) -> Result<Option<Variant>, SourceError> {
        self.begin_query()?;
        Ok(self
            .products
            .iter()
            .flat_map(|p| p.variants.iter())
            .find(|v| v.id == id)
            .cloned())
    }

    async fn products(
        &self,
        ids: &[String],
        _country: Option<&str>,
    ) -> Result<Vec<Product>, SourceError> {
        self.begin_query()?;
        Ok(ids
            .iter()
            .filter_map(|id| self.products.iter().find(|p| &p.id == id))
            .cloned()
            .collect())
    }
}

/// Translation source holding one catalog per country.
#[derive(Debug, Default)]
pub struct StaticTranslations {
    by_country: HashMap<String, TranslationCatalog>,
}

impl StaticTranslations {
    /// What: Create an empty source (every fetch fails).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// What: Register the catalog served for `country` (case-insensitive).
    #[must_use]
    pub fn with_country(mut self, country: &str, catalog: TranslationCatalog) -> Self {
        self.by_country.insert(country.to_ascii_uppercase(), catalog);
        self
    }
}

impl TranslationSource for StaticTranslations {
    async fn fetch_translations(&self, country: &str) -> Result<serde_json::Value, SourceError> {
        self.by_country
            .get(&country.to_ascii_uppercase())
            .map(TranslationCatalog::to_metaobjects)
            .ok_or_else(|| SourceError::Unavailable(format!("no translations for {country}")))
    }
}

#[derive(Debug)]
struct CartState {
    lines: Vec<CartLine>,
    next_line: u64,
    fail_next: Option<String>,
    applied: Vec<CartMutation>,
}

/// Cart service that owns a cart and pushes a snapshot after every change.
///
/// Snapshots are published on a `watch` channel, the same way the host pushes
/// them to mounted blocks.
#[derive(Debug)]
pub struct MemoryCart {
    state: Mutex<CartState>,
    snapshots: watch::Sender<CartSnapshot>,
}

impl MemoryCart {
    /// What: Create a cart holding `lines`.
    #[must_use]
    pub fn new(lines: Vec<CartLine>) -> Self {
        let (snapshots, _) = watch::channel(CartSnapshot::new(lines.clone()));
        Self {
            state: Mutex::new(CartState {
                next_line: lines.len() as u64 + 1,
                lines,
                fail_next: None,
                applied: Vec::new(),
            }),
            snapshots,
        }
    }

    /// What: Subscribe to cart snapshots; the current cart is the initial value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.snapshots.subscribe()
    }

    /// Current cart.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.snapshots.borrow().clone()
    }

    /// What: Reject the next mutation with `message`.
    pub fn fail_next(&self, message: &str) {
        self.lock().fail_next = Some(message.to_string());
    }

    /// Mutations accepted so far, in order.
    #[must_use]
    pub fn applied(&self) -> Vec<CartMutation> {
        self.lock().applied.clone()
    }

    /// What: Replace the cart out of band (another block or the host edited it).
    pub fn replace_lines(&self, lines: Vec<CartLine>) {
        let mut state = self.lock();
        state.lines = lines;
        self.publish(&state);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &CartState) {
        self.snapshots
            .send_replace(CartSnapshot::new(state.lines.clone()));
    }
}

impl CartMutator for MemoryCart {
    async fn apply(&self, mutation: CartMutation) -> Result<(), SourceError> {
        let mut state = self.lock();
        if let Some(message) = state.fail_next.take() {
            return Err(SourceError::Rejected { message });
        }
        match &mutation {
            CartMutation::AddLine {
                merchandise_id,
                quantity,
                ..
            } => {
                if let Some(line) = state
                    .lines
                    .iter_mut()
                    .find(|l| &l.merchandise_id == merchandise_id)
                {
                    line.quantity += quantity;
                } else {
                    let id = format!("gid://shopify/CartLine/{}", state.next_line);
                    state.next_line += 1;
                    state.lines.push(CartLine::new(&id, merchandise_id, *quantity));
                }
            }
            CartMutation::RemoveLine { id, quantity } => {
                let Some(pos) = state.lines.iter().position(|l| &l.id == id) else {
                    return Err(SourceError::Rejected {
                        message: format!("line {id} not found"),
                    });
                };
                let remaining = state.lines[pos].quantity.saturating_sub(*quantity);
                if remaining == 0 {
                    state.lines.remove(pos);
                } else {
                    state.lines[pos].quantity = remaining;
                }
            }
        }
        state.applied.push(mutation);
        self.publish(&state);
        Ok(())
    }
}

/// Session value store held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// What: Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// What: Read a value synchronously (test helper for assertions).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl ValueStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>, SourceError> {
        Ok(self.get(key))
    }

    async fn write(&self, key: &str, value: String) -> Result<(), SourceError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }
}
