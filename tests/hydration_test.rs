mod common;

use rust_decimal_macros::dec;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use common::RecordingAdapter;
use stockflow_core::{
    config::AppConfig,
    persistence::collections,
    services::{LedgerKey, NullDocumentGenerator, TablePriceResolver},
    CoreContext,
};

async fn initialize(adapter: Arc<RecordingAdapter>) -> Arc<CoreContext> {
    CoreContext::initialize(
        AppConfig::default(),
        adapter,
        Arc::new(TablePriceResolver::new(HashMap::from([(
            "X".to_string(),
            dec!(1),
        )]))),
        Arc::new(NullDocumentGenerator),
    )
    .await
    .expect("initialization never blocks on hydration failures")
}

#[tokio::test]
async fn failed_primary_hydration_falls_back_to_seed_catalog() {
    let adapter = Arc::new(RecordingAdapter::new());
    adapter.fail_on("list_all", collections::INVENTORY);
    adapter.fail_on("list_all", collections::SECONDARY_INVENTORY);

    let ctx = initialize(adapter).await;

    // Seed catalog rows exist at zero quantity; secondary starts empty.
    assert_eq!(
        ctx.ledger
            .quantity(&LedgerKey::Primary("FG-COLA-330".to_string())),
        Some(0)
    );
    assert_eq!(ctx.ledger.resolve_secondary("anything"), None);
}

#[tokio::test]
async fn failed_order_hydration_starts_empty() {
    let adapter = Arc::new(RecordingAdapter::new());
    adapter.fail_on("list_all", collections::RESELLER_ORDERS);
    adapter.fail_on("list_all", collections::TRANSFER_ORDERS);

    let ctx = initialize(adapter).await;

    assert_eq!(ctx.orders.reseller_count(), 0);
    assert_eq!(ctx.orders.transfer_count(), 0);
}

#[tokio::test]
async fn malformed_records_are_skipped_not_fatal() {
    let adapter = Arc::new(RecordingAdapter::new());
    common::seed_inventory(&adapter);
    adapter.seed(
        collections::INVENTORY,
        "BROKEN",
        json!({"quantity": "not a number"}),
    );

    let ctx = initialize(adapter).await;

    assert_eq!(ctx.ledger.quantity(&LedgerKey::Primary("X".to_string())), Some(10));
    assert_eq!(ctx.ledger.quantity(&LedgerKey::Primary("Y".to_string())), Some(5));
    assert_eq!(
        ctx.ledger.quantity(&LedgerKey::Primary("BROKEN".to_string())),
        None
    );
}

#[tokio::test]
async fn historical_read_status_hydrates_as_processing() {
    let adapter = Arc::new(RecordingAdapter::new());
    common::seed_inventory(&adapter);
    let order_id = uuid::Uuid::new_v4();
    adapter.seed(
        collections::RESELLER_ORDERS,
        &order_id.to_string(),
        json!({
            "id": order_id,
            "reseller_id": "R-1",
            "reseller_name": "Acme",
            "location": "Zone B",
            "items": {"X": 1},
            "total_amount": "50",
            "status": "Read",
            "date": "2023-04-01T00:00:00Z",
            "is_deducted": false
        }),
    );

    let ctx = initialize(adapter).await;

    let order = ctx.orders.reseller_order(order_id).expect("order hydrated");
    assert_eq!(
        order.status,
        stockflow_core::models::ResellerOrderStatus::Processing
    );
}
