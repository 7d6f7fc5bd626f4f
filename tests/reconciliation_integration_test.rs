//! Reconciliation of a loaded warehouse against its source

mod common;

use common::*;
use rust_decimal::Decimal;
use starsync::core::verification::{CheckKind, Reconciler};
use starsync::domain::source::Inventory;
use starsync::domain::SyncTable;

fn reconciler(h: &Harness, tolerance: f64) -> Reconciler {
    Reconciler::new(h.source.clone(), h.target.clone(), tolerance).unwrap()
}

#[tokio::test]
async fn test_fresh_full_load_reconciles() {
    let h = harness();
    h.coordinator.full_load_at(first_run()).await.unwrap();

    let report = reconciler(&h, 1.0).reconcile(30).await.unwrap();

    assert!(report.is_success(), "{}", report.format_summary());
    // 7 counts, the grand total and one subtotal per store
    assert_eq!(report.checks.len(), 7 + 1 + STORES as usize);

    let films = report.check("film_count").unwrap();
    assert_eq!(films.kind, CheckKind::Count);
    assert_eq!(films.target_value, Decimal::from(FILMS));

    let total = report.check("payment_total").unwrap();
    assert_eq!(total.kind, CheckKind::Amount);
    assert_eq!(total.source_value, total.target_value);
    assert!(report.check("store_1_payment_total").is_some());
    assert!(report.check("store_2_payment_total").is_some());
}

#[tokio::test]
async fn test_missing_rows_are_reported_not_raised() {
    let h = harness();
    h.target.fail_batches_for(SyncTable::Rental).unwrap();
    h.coordinator.full_load_at(first_run()).await.unwrap();

    let report = reconciler(&h, 1.0).reconcile(7).await.unwrap();

    assert!(!report.is_success());
    let names: Vec<&str> = report.mismatches().iter().map(|c| c.name.as_str()).collect();
    assert!(names.contains(&"rental_count"));
    assert!(names.contains(&"payment_count"));
    assert!(names.contains(&"payment_total"));
    assert!(!names.contains(&"film_count"));
    assert_eq!(report.window_days, 7);
}

#[tokio::test]
async fn test_store_subtotal_mismatch_when_store_key_is_null() {
    // Inventory at a store with no store row: the source join still
    // attributes the payment to store 3, the warehouse cannot
    let mut data = sakila();
    data.inventories.push(Inventory {
        inventory_id: INVENTORY + 1,
        film_id: Some(1),
        store_id: Some(3),
    });
    let rental_id = RENTALS as i32 + 1;
    data.rentals.push(rental(rental_id, INVENTORY + 1, 5));
    data.payments.push(payment(PAYMENTS as i32 + 1, Some(rental_id), 5, 599));

    let h = harness_with(data, config());
    h.coordinator.full_load_at(first_run()).await.unwrap();

    let paid = h.target.payment(PAYMENTS as i32 + 1).unwrap().unwrap();
    assert_eq!(paid.store_key, None);

    let report = reconciler(&h, 1.0).reconcile(30).await.unwrap();

    let mismatches = report.mismatches();
    assert_eq!(mismatches.len(), 1, "{}", report.format_summary());
    let store = mismatches[0];
    assert_eq!(store.name, "store_3_payment_total");
    assert_eq!(store.source_value, Decimal::new(599, 2));
    assert_eq!(store.target_value, Decimal::ZERO);
    // Grand total and counts still agree
    assert!(report.check("payment_total").unwrap().passed);
    assert!(report.check("payment_count").unwrap().passed);
}

#[tokio::test]
async fn test_amount_tolerance_absorbs_small_drift() {
    let h = harness();
    h.coordinator.full_load_at(first_run()).await.unwrap();

    // Source drifts by 0.50 after the load
    h.source
        .update(|data| data.payments[0].amount += Decimal::new(50, 2))
        .unwrap();

    let lenient = reconciler(&h, 1.0).reconcile(30).await.unwrap();
    assert!(lenient.is_success());

    let strict = reconciler(&h, 0.0).reconcile(30).await.unwrap();
    let names: Vec<&str> = strict.mismatches().iter().map(|c| c.name.as_str()).collect();
    assert!(names.contains(&"payment_total"));
}

#[tokio::test]
async fn test_report_serializes_for_json_output() {
    let h = harness();
    h.coordinator.full_load_at(first_run()).await.unwrap();

    let report = reconciler(&h, 1.0).reconcile(30).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["window_days"], 30);
    assert_eq!(json["checks"][0]["name"], "film_count");
    assert_eq!(json["checks"][0]["passed"], true);
}
