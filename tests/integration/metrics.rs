//! Derived metrics: thresholds, timers and savings.

use std::sync::Arc;
use std::time::Duration;

use checkout_blocks::cart::{CartLine, CartSnapshot};
use checkout_blocks::metrics::{
    FixedDecrement, RESERVATION_KEY, SavingsTracker, StockConfig, ThresholdTable, Trend,
    spawn_countdown, spawn_stock_decay,
};
use checkout_blocks::sources::{MemoryCatalog, MemoryStore, Product, ValueStore, Variant};
use checkout_blocks::util::money::Money;

#[test]
/// What: The documented two-country scenario.
///
/// Inputs:
/// - Thresholds `US=100`, `CA=150`; shopper in the US
///
/// Output:
/// - 60.00 leaves 40.00 at 60%; 100.00 reaches the threshold
fn threshold_scenario() {
    let table = ThresholdTable::parse("US=100\nCA=150");
    let below = table.evaluate(Some("US"), 60.0, None);
    assert_eq!(below.remaining_cents, 4_000);
    assert!((below.progress.value - 0.6).abs() < 1e-9);
    assert!(!below.reached);

    let reached = table.evaluate(Some("US"), 100.0, Some(&below));
    assert_eq!(reached.remaining_cents, 0);
    assert!((reached.progress.value - 1.0).abs() < 1e-9);
    assert!(reached.reached);
    assert_eq!(reached.progress.trend, Trend::Rising);
}

#[test]
/// What: Progress stays in `[0, 1]` and never reaches without a threshold.
fn progress_is_clamped() {
    let table = ThresholdTable::parse("US=100\nCA=150");
    for subtotal in [0.0, 12.34, 99.99, 150.0, 10_000.0] {
        let p = table.evaluate(Some("CA"), subtotal, None);
        assert!((0.0..=1.0).contains(&p.progress.value));
        assert!(p.remaining_cents >= 0);
    }
    let unknown = table.evaluate(Some("FR"), 500.0, None);
    assert!(!unknown.reached);
    assert_eq!(unknown.threshold_cents, None);
    let no_country = table.evaluate(None, 500.0, None);
    assert!(!no_country.reached);
}

#[tokio::test(start_paused = true)]
/// What: Stock resumes from the store, decays per interval and is persisted.
async fn stock_decays_and_persists() {
    let store = Arc::new(MemoryStore::new());
    store.write("stock", "20".to_string()).await.expect("write");

    let config = StockConfig::new(50, Duration::from_secs(45), 1, 3);
    let (handle, rx) = spawn_stock_decay(config, FixedDecrement(2), Arc::clone(&store), "stock").await;
    assert_eq!(rx.borrow().value, 20);

    tokio::time::sleep(Duration::from_secs(91)).await;
    assert_eq!(rx.borrow().value, 16);
    assert_eq!(rx.borrow().trend, Trend::Falling);
    assert_eq!(store.get("stock").as_deref(), Some("16"));

    // Decay stops at the floor.
    tokio::time::sleep(Duration::from_secs(45 * 20)).await;
    assert_eq!(rx.borrow().value, config.floor);
    handle.stop().await;
}

#[tokio::test(start_paused = true)]
/// What: The countdown persists every second and stops once expired.
async fn countdown_runs_out() {
    let store = Arc::new(MemoryStore::new());
    store
        .write(RESERVATION_KEY, "3".to_string())
        .await
        .expect("write");

    let (handle, rx) = spawn_countdown(Arc::clone(&store)).await;
    assert_eq!(rx.borrow().remaining(), 3);

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(rx.borrow().remaining(), 2);
    assert_eq!(store.get(RESERVATION_KEY).as_deref(), Some("2"));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(rx.borrow().is_expired());
    assert!(handle.is_finished());
    assert_eq!(store.get(RESERVATION_KEY).as_deref(), Some("-1"));
}

#[tokio::test(start_paused = true)]
/// What: An expired persisted reservation restarts at ten minutes.
async fn expired_reservation_restarts() {
    let store = Arc::new(MemoryStore::new());
    store
        .write(RESERVATION_KEY, "-1".to_string())
        .await
        .expect("write");
    let (_handle, rx) = spawn_countdown(store).await;
    assert_eq!(rx.borrow().remaining(), 600);
}

fn catalog() -> MemoryCatalog {
    MemoryCatalog::new(vec![Product {
        id: "gid://shopify/Product/1".into(),
        title: "Scarf".into(),
        tags: Vec::new(),
        featured_image_url: None,
        variants: vec![Variant {
            id: "gid://shopify/ProductVariant/10".into(),
            title: "Default Title".into(),
            price: Money::new(8.0, "USD"),
            compare_at_price: Some(Money::new(10.0, "USD")),
            image_url: None,
            available_for_sale: true,
        }],
    }])
}

fn line(quantity: u32, total: f64) -> CartLine {
    CartLine {
        total_amount: Some(Money::new(total, "USD")),
        ..CartLine::new("l1", "gid://shopify/ProductVariant/10", quantity)
    }
}

#[tokio::test]
/// What: Savings are recomputed only when the item count changes.
async fn savings_follow_quantity() {
    let catalog = catalog();
    let mut tracker = SavingsTracker::new();

    let savings = tracker
        .refresh(&catalog, &CartSnapshot::new(vec![line(2, 16.0)]), Some("US"))
        .await
        .cloned()
        .expect("savings");
    assert_eq!(savings.cents, 400);
    assert_eq!(catalog.query_count(), 1);

    // Same quantity, different total: no new query.
    tracker
        .refresh(&catalog, &CartSnapshot::new(vec![line(2, 15.0)]), Some("US"))
        .await;
    assert_eq!(catalog.query_count(), 1);

    catalog.set_failing(true);
    let savings = tracker
        .refresh(&catalog, &CartSnapshot::new(vec![line(3, 24.0)]), Some("US"))
        .await;
    assert!(savings.is_none());
}
