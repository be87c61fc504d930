//! A mounted checkout: every visible block wired to in-memory collaborators.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use super::scenario::{Action, Scenario};
use crate::cart::{PendingMutation, SyncHandle, UpsellSlots, spawn_sync_worker};
use crate::i18n::TranslationCache;
use crate::metrics::{
    MetricResult, RandomDecrement, ReservationCountdown, SavingsTracker, ShippingProgress,
    TimerHandle, spawn_countdown, spawn_stock_decay,
};
use crate::settings::{
    BlockSettings, CheckboxUpsellSettings, CheckoutAttributes, CountdownSettings,
    GenericImageSettings, MetafieldUpsellsSettings, PaymentIconsSettings, ProgressBarSettings,
    RemoveLineSettings, ReviewsSettings, SavingsSettings, StockBarSettings, UpsellListSettings,
    UspSettings,
};
use crate::sources::{CartMutator, MemoryCart, MemoryCatalog, ValueStore, Variant};
use crate::widgets::remove_line::RemoveLineLink;
use crate::widgets::{
    Block, checkbox_upsell, countdown, generic_image, metafield_upsells, payment_icons,
    progress_bar, reviews, savings, stock_bar, upsell_list, usps,
};

/// One rendered block, labelled with the block it came from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedBlock {
    /// Settings table name of the block.
    pub name: &'static str,
    /// Rendered tree.
    pub block: Block,
}

/// Checkbox upsell state while mounted.
struct CheckboxMount {
    variant: Variant,
    handle: SyncHandle,
}

/// A running timer and the receiver of its values.
struct TimerMount<T> {
    handle: TimerHandle,
    rx: watch::Receiver<T>,
    live: bool,
}

impl<T> TimerMount<T> {
    /// What: Wrap a freshly spawned timer.
    fn new((handle, rx): (TimerHandle, watch::Receiver<T>)) -> Self {
        Self {
            handle,
            rx,
            live: true,
        }
    }

    /// What: Wait for the next value; never resolves once the timer ended.
    async fn changed(&mut self) {
        if !self.live {
            return std::future::pending().await;
        }
        if self.rx.changed().await.is_err() {
            self.live = false;
        }
    }
}

/// What: Apply one slot list's mutations one at a time until every position is idle.
async fn drive_slots(
    cart: &MemoryCart,
    slots: &mut UpsellSlots,
    mut queue: Vec<(usize, PendingMutation)>,
) {
    while let Some((position, pending)) = queue.pop() {
        let result = cart.apply(pending.mutation).await;
        if let Some(next) = slots.on_mutation_result(position, pending.ticket, result) {
            queue.push((position, next));
        }
        queue.extend(slots.observe(&cart.snapshot()));
    }
}

/// What: Wait on an optional timer; a missing one never resolves.
async fn timer_changed<T>(timer: Option<&mut TimerMount<T>>) {
    match timer {
        Some(timer) => timer.changed().await,
        None => std::future::pending().await,
    }
}

/// Everything mounted for one scenario.
pub struct Session {
    country: Option<String>,
    currency: String,
    subtotal: Option<f64>,
    settings: BlockSettings,
    attributes: CheckoutAttributes,
    translations: Arc<TranslationCache>,
    catalog: Arc<MemoryCatalog>,
    cart: Arc<MemoryCart>,
    checkbox: Option<CheckboxMount>,
    upsells: UpsellSlots,
    offers: UpsellSlots,
    offer_ids: Vec<String>,
    remove_link: RemoveLineLink,
    savings: SavingsTracker,
    progress: Option<ShippingProgress>,
    stock: Option<TimerMount<MetricResult<u32>>>,
    countdown: Option<TimerMount<ReservationCountdown>>,
}

impl Session {
    /// What: Mount every visible block of `scenario`.
    ///
    /// Inputs:
    /// - `scenario`: Loaded scenario
    /// - `country`: Effective shipping country
    /// - `translations`: Shared catalog cache, already refreshed
    /// - `store`: Session store for the timers
    ///
    /// Details:
    /// - Blocks hidden by their checkout attribute are never mounted, so their
    ///   timers and fetches never start.
    pub async fn mount<S>(
        scenario: &Scenario,
        country: Option<String>,
        translations: Arc<TranslationCache>,
        store: Arc<S>,
    ) -> Self
    where
        S: ValueStore + Send + Sync + 'static,
    {
        let attributes = scenario.checkout_attributes();
        let settings = scenario.settings.clone();
        let catalog = Arc::new(MemoryCatalog::new(scenario.products.clone()));
        let cart = Arc::new(MemoryCart::new(scenario.cart.clone()));
        let country_ref = country.as_deref();

        let checkbox = if attributes.is_visible::<CheckboxUpsellSettings>() {
            match checkbox_upsell::load_variant(&settings.checkbox_upsell, &*catalog, country_ref)
                .await
            {
                Some(variant) => {
                    let unit = checkbox_upsell::sync_unit(&settings.checkbox_upsell, &variant);
                    let handle = spawn_sync_worker(unit, Arc::clone(&cart), cart.subscribe());
                    Some(CheckboxMount { variant, handle })
                }
                None => None,
            }
        } else {
            None
        };

        let upsells = if attributes.is_visible::<UpsellListSettings>() {
            let ids = upsell_list::candidate_ids(&settings.upsell_list, &scenario.metafields);
            let products =
                upsell_list::load_products(&settings.upsell_list, &*catalog, &ids, country_ref)
                    .await;
            upsell_list::slots(products)
        } else {
            UpsellSlots::default()
        };

        let (offer_ids, offers) = match &settings.metafield_upsells {
            Some(_) if attributes.is_visible::<MetafieldUpsellsSettings>() => {
                let ids = metafield_upsells::candidate_ids(&scenario.metafields);
                let products =
                    metafield_upsells::load_products(&*catalog, &ids, country_ref).await;
                (ids, metafield_upsells::slots(products))
            }
            _ => (Vec::new(), UpsellSlots::default()),
        };

        let stock = if attributes.is_visible::<StockBarSettings>() {
            Some(TimerMount::new(
                spawn_stock_decay(
                    settings.stock_bar.stock_config(),
                    RandomDecrement,
                    Arc::clone(&store),
                    stock_bar::STOCK_KEY,
                )
                .await,
            ))
        } else {
            None
        };

        let countdown = if attributes.is_visible::<CountdownSettings>() {
            Some(TimerMount::new(spawn_countdown(store).await))
        } else {
            None
        };

        let mut session = Self {
            country,
            currency: scenario.currency.clone(),
            subtotal: scenario.subtotal,
            settings,
            attributes,
            translations,
            catalog,
            cart,
            checkbox,
            upsells,
            offers,
            offer_ids,
            remove_link: RemoveLineLink::new(),
            savings: SavingsTracker::new(),
            progress: None,
            stock,
            countdown,
        };
        session.sync_upsells().await;
        tracing::info!(
            checkbox = session.checkbox.is_some(),
            upsells = session.upsells.len(),
            offers = session.offers.len(),
            "[Preview] Blocks mounted"
        );
        session
    }

    /// Cart service backing the session.
    #[must_use]
    pub fn cart(&self) -> &MemoryCart {
        &self.cart
    }

    /// What: Replay one shopper interaction and wait for it to settle.
    pub async fn apply(&mut self, action: &Action) {
        tracing::debug!(?action, "[Preview] Applying action");
        match action {
            Action::ToggleCheckbox => self.toggle_checkbox().await,
            Action::ToggleUpsell(position) => {
                let pending = self.upsells.toggle(*position);
                let queue = pending.map(|p| vec![(*position, p)]).unwrap_or_default();
                drive_slots(&self.cart, &mut self.upsells, queue).await;
            }
            Action::AddOffer(position) => {
                let pending = self.offers.set_desired(*position, true);
                let queue = pending.map(|p| vec![(*position, p)]).unwrap_or_default();
                drive_slots(&self.cart, &mut self.offers, queue).await;
            }
            Action::SelectOffer(position, variant_id) => {
                if !self.offers.select_variant(*position, variant_id) {
                    tracing::warn!(
                        position,
                        variant_id = %variant_id,
                        "[Preview] Offer variant selection ignored"
                    );
                }
            }
            Action::SelectVariant(position, variant_id) => {
                if !self.upsells.select_variant(*position, variant_id) {
                    tracing::warn!(
                        position,
                        variant_id = %variant_id,
                        "[Preview] Variant selection ignored"
                    );
                }
            }
            Action::RemoveLine => {
                let snapshot = self.cart.snapshot();
                let target = snapshot
                    .lines()
                    .iter()
                    .find(|line| RemoveLineLink::targets(&self.settings.remove_line, line));
                match target {
                    Some(line) => {
                        if let Err(e) = self.remove_link.press(&*self.cart, line).await {
                            tracing::warn!(
                                line = %line.id,
                                error = %e,
                                "[Preview] Remove link press left the line in place"
                            );
                        }
                    }
                    None => tracing::warn!("[Preview] No cart line carries the remove link"),
                }
            }
        }
        self.sync_upsells().await;
        self.settle_checkbox().await;
    }

    /// What: Wait until the checkbox worker has seen the current cart.
    async fn settle_checkbox(&mut self) {
        let snapshot = self.cart.snapshot();
        if let Some(mount) = self.checkbox.as_mut() {
            mount
                .handle
                .wait_for(|v| !v.busy() && v.observed == snapshot.contains(&v.candidate))
                .await;
        }
    }

    /// What: Press the checkbox and wait until the worker has settled this press.
    ///
    /// Details:
    /// - Waits on the intent counter, so an error left over from an earlier
    ///   press never ends the wait early.
    async fn toggle_checkbox(&mut self) {
        let Some(mount) = self.checkbox.as_mut() else {
            tracing::warn!("[Preview] Checkbox upsell is not mounted");
            return;
        };
        let before = mount.handle.view();
        if !mount.handle.toggle() {
            return;
        }
        let settled = mount
            .handle
            .wait_for(|v| v.intents > before.intents && !v.busy())
            .await;
        if let Some(view) = settled
            && let Some(error) = view.last_error
        {
            tracing::warn!(error = %error, "[Preview] Checkbox change rolled back");
        }
    }

    /// What: Feed the current cart to both slot lists and run what they ask for.
    async fn sync_upsells(&mut self) {
        let pending = self.upsells.observe(&self.cart.snapshot());
        drive_slots(&self.cart, &mut self.upsells, pending).await;
        let pending = self.offers.observe(&self.cart.snapshot());
        drive_slots(&self.cart, &mut self.offers, pending).await;
    }

    /// What: Render every mounted, visible block.
    ///
    /// Output:
    /// - Blocks in checkout order; hidden or empty blocks are left out
    pub async fn render(&mut self) -> Vec<RenderedBlock> {
        let catalog = self.translations.catalog();
        let catalog = catalog.as_deref();
        let country = self.country.as_deref();
        let snapshot = self.cart.snapshot();
        let mut out = Vec::new();

        if let Some(timer) = &self.countdown {
            let state = *timer.rx.borrow();
            out.push(RenderedBlock {
                name: "countdown",
                block: countdown::render_countdown(&self.settings.countdown, catalog, &state),
            });
        }

        if self.attributes.is_visible::<ProgressBarSettings>() {
            let subtotal = self
                .subtotal
                .unwrap_or_else(|| Scenario::sum_lines(snapshot.lines()));
            let (block, progress) = progress_bar::render(
                &self.settings.progress_bar,
                catalog,
                country,
                subtotal,
                &self.currency,
                self.progress.as_ref(),
            );
            self.progress = Some(progress);
            out.push(RenderedBlock {
                name: "progress_bar",
                block,
            });
        }

        if let Some(timer) = &self.stock {
            let value = timer.rx.borrow().value;
            out.push(RenderedBlock {
                name: "stock_bar",
                block: stock_bar::render_stock(
                    &self.settings.stock_bar,
                    catalog,
                    &self.settings.stock_bar.stock_config(),
                    value,
                ),
            });
        }

        if let Some(mount) = &self.checkbox
            && let Some(block) = checkbox_upsell::render_upsell(
                &self.settings.checkbox_upsell,
                catalog,
                Some(&mount.variant),
                &mount.handle.view(),
            )
        {
            out.push(RenderedBlock {
                name: "checkbox_upsell",
                block,
            });
        }

        if let Some(block) =
            upsell_list::render_list(&self.settings.upsell_list, catalog, &self.upsells)
        {
            out.push(RenderedBlock {
                name: "upsell_list",
                block,
            });
        }

        if let Some(settings) = &self.settings.metafield_upsells
            && let Some(block) = metafield_upsells::render_offers(
                settings,
                catalog,
                &self.offers,
                &snapshot,
                &self.offer_ids,
            )
        {
            out.push(RenderedBlock {
                name: "metafield_upsells",
                block,
            });
        }

        if self.attributes.is_visible::<SavingsSettings>() {
            let current = self
                .savings
                .refresh(&*self.catalog, &snapshot, country)
                .await
                .cloned();
            if let Some(block) =
                savings::render_savings(&self.settings.savings, catalog, current.as_ref())
            {
                out.push(RenderedBlock {
                    name: "savings",
                    block,
                });
            }
        }

        if self.attributes.is_visible::<RemoveLineSettings>() {
            for line in snapshot.lines() {
                if let Some(block) =
                    self.remove_link.render(&self.settings.remove_line, catalog, line)
                {
                    out.push(RenderedBlock {
                        name: "remove_line",
                        block,
                    });
                }
            }
        }

        if let Some(settings) = &self.settings.info_usps
            && self.attributes.is_visible::<UspSettings>()
            && let Some(block) = usps::render_usps(settings, catalog)
        {
            out.push(RenderedBlock {
                name: "info_usps",
                block,
            });
        }
        if let Some(settings) = &self.settings.reviews
            && self.attributes.is_visible::<ReviewsSettings>()
        {
            out.push(RenderedBlock {
                name: "reviews",
                block: reviews::render_reviews(settings, catalog),
            });
        }
        if let Some(settings) = &self.settings.payment_icons
            && self.attributes.is_visible::<PaymentIconsSettings>()
        {
            out.push(RenderedBlock {
                name: "payment_icons",
                block: payment_icons::render_payment_icons(settings, catalog),
            });
        }
        if let Some(settings) = &self.settings.generic_image
            && self.attributes.is_visible::<GenericImageSettings>()
        {
            out.push(RenderedBlock {
                name: "generic_image",
                block: generic_image::render_image(settings, catalog),
            });
        }
        out
    }

    /// What: Wait until a running timer publishes a new value.
    ///
    /// Output:
    /// - `false` when no timer is running any more
    pub async fn next_tick(&mut self) -> bool {
        let Self {
            countdown, stock, ..
        } = self;
        let live = countdown.as_ref().is_some_and(|t| t.live) || stock.as_ref().is_some_and(|t| t.live);
        if !live {
            return false;
        }
        tokio::select! {
            () = timer_changed(countdown.as_mut()) => {}
            () = timer_changed(stock.as_mut()) => {}
        }
        true
    }

    /// What: Stop every timer and worker.
    pub async fn unmount(self) {
        if let Some(timer) = self.stock {
            timer.handle.stop().await;
        }
        if let Some(timer) = self.countdown {
            timer.handle.stop().await;
        }
        drop(self.checkbox);
        tracing::debug!("[Preview] Blocks unmounted");
    }
}
