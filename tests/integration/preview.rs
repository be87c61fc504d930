//! End-to-end preview: scenario, mount, interactions and rendered output.

use std::sync::Arc;

use checkout_blocks::app::{Action, Scenario, Session, format_frame};
use checkout_blocks::i18n::TranslationCache;
use checkout_blocks::metrics::RESERVATION_KEY;
use checkout_blocks::sources::MemoryStore;

const CHECKOUT: &str = r#"
country = "US"
metafields = ['["gid://shopify/Product/2"]']
actions = ["toggle_checkbox", "toggle_upsell:0"]

[attributes]
_maisonStockBar = "false"
_maisonCountdownTimer = "false"

[settings.progress_bar]
country_thresholds = "US=50"

[settings.checkbox_upsell]
variant_reference = "77"
text1 = "Shipping protection *{formattedPrice}*"

[settings.upsell_list]
header_text = "You may also like"
number_of_upsells = 2

[settings.remove_line]
variant_reference = "77"
remove_line_item = "Remove protection"

[[cart]]
id = "gid://shopify/CartLine/1"
merchandise_id = "gid://shopify/ProductVariant/10"
quantity = 1
total_amount = { amount = 20.0 }

[[products]]
id = "gid://shopify/Product/1"
title = "Jacket"
variants = [{ id = "gid://shopify/ProductVariant/10", price = { amount = 20.0 }, compare_at_price = { amount = 25.0 } }]

[[products]]
id = "gid://shopify/Product/2"
title = "Socks"
variants = [{ id = "gid://shopify/ProductVariant/20", price = { amount = 10.0 } }]

[[products]]
id = "gid://shopify/Product/7"
title = "Protection"
variants = [{ id = "gid://shopify/ProductVariant/77", price = { amount = 2.95 } }]
"#;

fn names(blocks: &[checkout_blocks::app::RenderedBlock]) -> Vec<&'static str> {
    blocks.iter().map(|b| b.name).collect()
}

#[tokio::test]
/// What: Replayed interactions show up in every block of the rendered checkout.
async fn checkout_after_interactions() {
    let scenario = Scenario::from_toml_str(CHECKOUT).expect("scenario");
    let mut session = Session::mount(
        &scenario,
        scenario.country.clone(),
        Arc::new(TranslationCache::new()),
        Arc::new(MemoryStore::new()),
    )
    .await;
    for action in &scenario.actions {
        session.apply(action).await;
    }
    assert_eq!(session.cart().snapshot().lines().len(), 3);

    let blocks = session.render().await;
    assert_eq!(
        names(&blocks),
        vec!["progress_bar", "checkbox_upsell", "upsell_list", "savings", "remove_line"]
    );
    let frame = format_frame(&blocks, false).expect("frame");
    assert!(frame.contains("== progress_bar ==\n[########------------] 40%\n$30.00 until free shipping\n"));
    assert!(frame.contains("[x] Shipping protection **$2.95**"));
    assert!(frame.contains("Socks $10.00 | <✓> _Remove_"));
    assert!(frame.contains("**You're Saving** | **$5.00**"));
    assert!(frame.contains("== remove_line ==\n_Remove protection_\n"));

    session.apply(&Action::RemoveLine).await;
    let blocks = session.render().await;
    assert!(!names(&blocks).contains(&"remove_line"));
    let frame = format_frame(&blocks, false).expect("frame");
    assert!(frame.contains("[ ] Shipping protection **$2.95**"));
    assert_eq!(session.cart().snapshot().lines().len(), 2);

    session.unmount().await;
}

#[tokio::test]
/// What: A rejected checkbox add leaves the checkbox unchecked and the cart untouched.
async fn rejected_checkbox_add() {
    let scenario = Scenario::from_toml_str(CHECKOUT).expect("scenario");
    let mut session = Session::mount(
        &scenario,
        scenario.country.clone(),
        Arc::new(TranslationCache::new()),
        Arc::new(MemoryStore::new()),
    )
    .await;
    session.cart().fail_next("out of stock");
    session.apply(&Action::ToggleCheckbox).await;

    assert_eq!(session.cart().snapshot().lines().len(), 1);
    let frame = format_frame(&session.render().await, false).expect("frame");
    assert!(frame.contains("[ ] Shipping protection"));
    session.unmount().await;
}

#[tokio::test]
/// What: A press after a rejected add waits for its own outcome.
///
/// Inputs:
/// - Rejected add, then a second press that succeeds.
///
/// Output:
/// - The second press returns only once the protection line is in the cart.
async fn press_after_rejection_settles() {
    let scenario = Scenario::from_toml_str(CHECKOUT).expect("scenario");
    let mut session = Session::mount(
        &scenario,
        scenario.country.clone(),
        Arc::new(TranslationCache::new()),
        Arc::new(MemoryStore::new()),
    )
    .await;
    session.cart().fail_next("out of stock");
    session.apply(&Action::ToggleCheckbox).await;
    assert_eq!(session.cart().snapshot().lines().len(), 1);

    session.apply(&Action::ToggleCheckbox).await;
    let snapshot = session.cart().snapshot();
    assert_eq!(snapshot.lines().len(), 2);
    assert!(snapshot.contains("gid://shopify/ProductVariant/77"));
    let frame = format_frame(&session.render().await, false).expect("frame");
    assert!(frame.contains("[x] Shipping protection"));
    session.unmount().await;
}

#[tokio::test]
/// What: A failed remove link press keeps the line and the link.
async fn failed_remove_keeps_line() {
    let scenario = Scenario::from_toml_str(CHECKOUT).expect("scenario");
    let mut session = Session::mount(
        &scenario,
        scenario.country.clone(),
        Arc::new(TranslationCache::new()),
        Arc::new(MemoryStore::new()),
    )
    .await;
    session.apply(&Action::ToggleCheckbox).await;
    assert_eq!(session.cart().snapshot().lines().len(), 2);

    session.cart().fail_next("locked");
    session.apply(&Action::RemoveLine).await;
    assert_eq!(session.cart().snapshot().lines().len(), 2);
    let frame = format_frame(&session.render().await, false).expect("frame");
    assert!(frame.contains("_Remove protection_"));
    assert!(frame.contains("[x] Shipping protection"));
    session.unmount().await;
}

#[tokio::test]
/// What: Blocks hidden by their checkout attribute are not mounted or rendered.
async fn hidden_blocks_are_skipped() {
    let mut scenario = Scenario::from_toml_str(CHECKOUT).expect("scenario");
    for attribute in [
        "_maisonProgressBar",
        "_maisonCheckboxUpsellWithAmount",
        "_maisonUpsellList",
        "_maisonCompareAtPriceDiscount",
    ] {
        scenario
            .attributes
            .insert(attribute.to_string(), "false".to_string());
    }
    let mut session = Session::mount(
        &scenario,
        None,
        Arc::new(TranslationCache::new()),
        Arc::new(MemoryStore::new()),
    )
    .await;
    assert_eq!(names(&session.render().await), Vec::<&str>::new());
    assert!(!session.next_tick().await);
    session.unmount().await;
}

#[tokio::test(start_paused = true)]
/// What: The countdown banner ticks and persists while mounted; JSON frames are tagged.
async fn countdown_ticks_in_watch_mode() {
    let mut scenario = Scenario::from_toml_str(CHECKOUT).expect("scenario");
    scenario.attributes.clear();
    for attribute in [
        "_maisonProgressBar",
        "_maisonStockBar",
        "_maisonCheckboxUpsellWithAmount",
        "_maisonUpsellList",
        "_maisonCompareAtPriceDiscount",
        "_maisonRemoveShippingItem",
    ] {
        scenario
            .attributes
            .insert(attribute.to_string(), "false".to_string());
    }
    let store = Arc::new(MemoryStore::new());
    let mut session = Session::mount(
        &scenario,
        None,
        Arc::new(TranslationCache::new()),
        Arc::clone(&store),
    )
    .await;

    let first = format_frame(&session.render().await, false).expect("frame");
    assert_eq!(
        first,
        "== countdown ==\n[Success]\n  Order reserved for the next 10:00\n"
    );

    assert!(session.next_tick().await);
    let blocks = session.render().await;
    let second = format_frame(&blocks, false).expect("frame");
    assert!(second.ends_with("Order reserved for the next 9:59\n"));
    assert_eq!(store.get(RESERVATION_KEY).as_deref(), Some("599"));

    let json: serde_json::Value =
        serde_json::from_str(&format_frame(&blocks, true).expect("json")).expect("parse");
    assert_eq!(json[0]["name"], "countdown");
    assert_eq!(json[0]["block"]["kind"], "banner");
    assert_eq!(json[0]["block"]["status"], "success");

    session.unmount().await;
}

const OPT_IN: &str = r#"
country = "NL"
currency = "EUR"
metafields = ['["gid://shopify/Product/3","gid://shopify/Product/4"]']

[attributes]
_maisonStockBar = "false"
_maisonCountdownTimer = "false"
_maisonProgressBar = "false"
_maisonUpsellList = "false"
_maisonCompareAtPriceDiscount = "false"
_maisonPaymentIcons = "false"

[settings.metafield_upsells]
add_text = "Add"

[settings.info_usps]
usps_text = "Free returns: 30 days\nSecure payment"

[settings.reviews]
reviews_json = "Great:Fast shipping:Sam:1 day ago:5"
footer_text = "Real reviews"

[settings.payment_icons]
methods = "ideal,visa"

[settings.generic_image]

[[cart]]
id = "gid://shopify/CartLine/1"
merchandise_id = "gid://shopify/ProductVariant/10"
quantity = 1

[[products]]
id = "gid://shopify/Product/3"
title = "Beanie"
variants = [
  { id = "gid://shopify/ProductVariant/30", title = "Grey", price = { amount = 15.0, currency_code = "EUR" } },
  { id = "gid://shopify/ProductVariant/31", title = "Black", price = { amount = 17.0, currency_code = "EUR" } },
]

[[products]]
id = "gid://shopify/Product/4"
title = "Scarf"
variants = [{ id = "gid://shopify/ProductVariant/40", price = { amount = 25.0, currency_code = "EUR" } }]
"#;

#[tokio::test]
/// What: Opt-in blocks render from their tables; offers vanish once one is added.
///
/// Inputs:
/// - Metafield offers, selling points, reviews, hidden payment icons, image without a link.
///
/// Output:
/// - Offers listed until a variant is added, then only the static blocks remain.
async fn opt_in_blocks() {
    let scenario = Scenario::from_toml_str(OPT_IN).expect("scenario");
    let mut session = Session::mount(
        &scenario,
        scenario.country.clone(),
        Arc::new(TranslationCache::new()),
        Arc::new(MemoryStore::new()),
    )
    .await;

    let blocks = session.render().await;
    assert_eq!(
        names(&blocks),
        vec!["metafield_upsells", "info_usps", "reviews", "generic_image"]
    );
    let frame = format_frame(&blocks, false).expect("frame");
    assert!(frame.contains("Beanie €15.00 Options: (Grey (€15.00)) / Black (€17.00) | <Add>"));
    assert!(frame.contains("Scarf €25.00 | <Add>"));
    assert!(frame.contains("Free returns 30 days"));
    assert!(frame.contains("**Great** Fast shipping Sam, 1 day ago"));
    assert!(frame.contains("Real reviews"));
    assert!(frame.contains("Enter an image link"));

    session
        .apply(&Action::SelectOffer(0, "gid://shopify/ProductVariant/31".into()))
        .await;
    session.apply(&Action::AddOffer(0)).await;
    assert!(session.cart().snapshot().contains("gid://shopify/ProductVariant/31"));
    assert_eq!(
        names(&session.render().await),
        vec!["info_usps", "reviews", "generic_image"]
    );
    session.unmount().await;
}
