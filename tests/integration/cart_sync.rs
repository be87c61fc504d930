//! Sync worker against the in-memory cart service.

use std::sync::Arc;
use std::time::Duration;

use checkout_blocks::cart::{
    CartLine, CartMutation, InitialPolicy, Phase, SyncUnit, UpsellSlots, spawn_sync_worker,
};
use checkout_blocks::sources::{CartMutator, MemoryCart, Product, Variant};
use checkout_blocks::util::money::Money;

const VARIANT: &str = "gid://shopify/ProductVariant/77";

#[tokio::test]
/// What: Two presses add the line and then remove it with its full quantity.
///
/// Inputs:
/// - Empty cart, unit mirroring the cart
///
/// Output:
/// - Cart contains the line after the first press and is empty after the second
async fn toggle_adds_then_removes() {
    let cart = Arc::new(MemoryCart::new(Vec::new()));
    let mut handle = spawn_sync_worker(
        SyncUnit::new(VARIANT, InitialPolicy::MirrorCart),
        Arc::clone(&cart),
        cart.subscribe(),
    );

    assert!(handle.toggle());
    let view = handle
        .wait_for(|v| v.observed && !v.busy())
        .await
        .expect("worker alive");
    assert!(view.checked);
    assert!(cart.snapshot().contains(VARIANT));

    assert!(handle.toggle());
    let view = handle
        .wait_for(|v| !v.observed && !v.busy())
        .await
        .expect("worker alive");
    assert!(!view.checked);
    assert!(cart.snapshot().is_empty());

    let applied = cart.applied();
    assert_eq!(applied.len(), 2);
    assert!(matches!(applied[0], CartMutation::AddLine { quantity: 1, .. }));
    assert!(matches!(applied[1], CartMutation::RemoveLine { quantity: 1, .. }));
}

#[tokio::test]
/// What: A rejected add rolls the toggle back and records the error.
async fn rejected_add_rolls_back() {
    let cart = Arc::new(MemoryCart::new(Vec::new()));
    let mut handle = spawn_sync_worker(
        SyncUnit::new(VARIANT, InitialPolicy::MirrorCart),
        Arc::clone(&cart),
        cart.subscribe(),
    );

    cart.fail_next("out of stock");
    handle.toggle();
    let view = handle
        .wait_for(|v| v.phase == Phase::Error)
        .await
        .expect("worker alive");
    assert!(!view.checked);
    assert!(
        view.last_error
            .as_deref()
            .is_some_and(|e| e.contains("out of stock"))
    );
    assert!(cart.applied().is_empty());

    // The error state is left on the next press and the retry succeeds.
    handle.toggle();
    let view = handle
        .wait_for(|v| v.observed && !v.busy())
        .await
        .expect("worker alive");
    assert!(view.checked);
    assert_eq!(view.last_error, None);
}

#[tokio::test]
/// What: `EnsurePresent` adds once on mount and never again after the shopper removes it.
async fn ensure_present_adds_once() {
    let cart = Arc::new(MemoryCart::new(Vec::new()));
    let mut handle = spawn_sync_worker(
        SyncUnit::new(VARIANT, InitialPolicy::EnsurePresent),
        Arc::clone(&cart),
        cart.subscribe(),
    );

    handle
        .wait_for(|v| v.observed && !v.busy())
        .await
        .expect("worker alive");
    assert_eq!(cart.applied().len(), 1);

    cart.replace_lines(Vec::new());
    let view = handle
        .wait_for(|v| !v.observed)
        .await
        .expect("worker alive");
    assert!(!view.checked);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(cart.applied().len(), 1);
    assert!(cart.snapshot().is_empty());
}

#[tokio::test]
/// What: While idle, the toggle follows lines added elsewhere.
async fn follows_external_changes() {
    let cart = Arc::new(MemoryCart::new(Vec::new()));
    let mut handle = spawn_sync_worker(
        SyncUnit::new(VARIANT, InitialPolicy::MirrorCart),
        Arc::clone(&cart),
        cart.subscribe(),
    );

    cart.replace_lines(vec![CartLine::new("gid://shopify/CartLine/9", VARIANT, 2)]);
    let view = handle.wait_for(|v| v.checked).await.expect("worker alive");
    assert!(view.observed);
    assert!(cart.applied().is_empty());
}

fn product(n: u32) -> Product {
    Product {
        id: format!("gid://shopify/Product/{n}"),
        title: format!("Product {n}"),
        tags: Vec::new(),
        featured_image_url: None,
        variants: vec![Variant {
            id: format!("gid://shopify/ProductVariant/{n}0"),
            title: "Default Title".into(),
            price: Money::new(10.0, "USD"),
            compare_at_price: None,
            image_url: None,
            available_for_sale: true,
        }],
    }
}

#[tokio::test]
/// What: List positions mutate independently; the other position never turns busy.
async fn upsell_positions_are_independent() {
    let cart = MemoryCart::new(Vec::new());
    let mut slots = UpsellSlots::new(vec![product(1), product(2)], &[]);
    assert!(slots.observe(&cart.snapshot()).is_empty());

    let pending = slots.toggle(0).expect("add issued");
    assert!(slots.get(0).expect("slot").view().busy());
    assert!(!slots.get(1).expect("slot").view().busy());

    let result = cart.apply(pending.mutation).await;
    assert!(slots.on_mutation_result(0, pending.ticket, result).is_none());
    assert!(slots.observe(&cart.snapshot()).is_empty());

    let first = slots.get(0).expect("slot").view();
    let second = slots.get(1).expect("slot").view();
    assert!(first.checked && first.observed);
    assert!(!second.checked && !second.observed);
    assert!(cart.snapshot().contains("gid://shopify/ProductVariant/10"));
}
