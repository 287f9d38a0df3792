mod common;

use assert_matches::assert_matches;
use serde_json::json;
use std::collections::BTreeMap;
use uuid::Uuid;

use common::{core_with_inventory, primary_quantity};
use stockflow_core::{
    commands::{
        orders::{
            AttachCoaCommand, CreateResellerOrderCommand, DeleteOrderCommand,
            GeneratePackingListCommand, PackingListTarget, UpdateOrderStatusCommand,
        },
        Command,
    },
    errors::ServiceError,
    events::Event,
    models::ResellerOrderStatus,
    persistence::collections,
};

fn items(pairs: &[(&str, i32)]) -> BTreeMap<String, i32> {
    pairs
        .iter()
        .map(|(sku, qty)| (sku.to_string(), *qty))
        .collect()
}

fn create_command(zone: &str, lines: &[(&str, i32)]) -> CreateResellerOrderCommand {
    CreateResellerOrderCommand {
        reseller_id: "R-100".to_string(),
        reseller_name: "Acme Trading".to_string(),
        location: zone.to_string(),
        items: items(lines),
    }
}

async fn create_order(core: &common::TestCore, zone: &str, lines: &[(&str, i32)]) -> Uuid {
    create_command(zone, lines)
        .execute(core.ctx.clone(), core.events.clone())
        .await
        .expect("order creation succeeds")
        .order_id
}

#[tokio::test]
async fn order_below_zone_minimum_is_rejected_with_no_mutation() {
    let core = core_with_inventory().await;
    let writes_before = core.adapter.call_count("upsert:") + core.adapter.call_count("write_item:");

    // Zone A minimum is 500; 2 * 50 = 100.
    let err = create_command("Zone A", &[("X", 2)])
        .execute(core.ctx.clone(), core.events.clone())
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::ValidationError(_));
    assert_eq!(primary_quantity(&core, "X"), Some(10));
    let writes_after = core.adapter.call_count("upsert:") + core.adapter.call_count("write_item:");
    assert_eq!(writes_before, writes_after, "validation gate must not write");
    assert_eq!(core.ctx.orders.reseller_count(), 0);
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let core = core_with_inventory().await;
    let err = create_command("Zone A", &[])
        .execute(core.ctx.clone(), core.events.clone())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn creation_persists_order_and_emits_event() {
    let mut core = core_with_inventory().await;

    let result = create_command("Zone B", &[("X", 4)])
        .execute(core.ctx.clone(), core.events.clone())
        .await
        .unwrap();

    assert_eq!(result.status, ResellerOrderStatus::Unread);
    assert_eq!(result.total_amount, rust_decimal_macros::dec!(200));
    // No ledger effect at creation time for reseller orders.
    assert_eq!(primary_quantity(&core, "X"), Some(10));

    let stored = core
        .adapter
        .stored(collections::RESELLER_ORDERS, &result.order_id.to_string())
        .expect("order persisted");
    assert_eq!(stored["status"], json!("Unread"));
    assert_eq!(stored["is_deducted"], json!(false));

    assert_matches!(core.event_rx.try_recv(), Ok(Event::OrderCreated(id)) if id == result.order_id);
}

#[tokio::test]
async fn completion_deducts_primary_stock_exactly_once() {
    let core = core_with_inventory().await;
    let order_id = create_order(&core, "Zone B", &[("Y", 2)]).await;

    // Unread -> Completed deducts.
    let result = UpdateOrderStatusCommand {
        order_id,
        new_status: ResellerOrderStatus::Completed,
    }
    .execute(core.ctx.clone(), core.events.clone())
    .await
    .unwrap();
    assert!(result.deduction_applied);
    assert_eq!(primary_quantity(&core, "Y"), Some(3));

    // Leaving Completed performs no reversal.
    UpdateOrderStatusCommand {
        order_id,
        new_status: ResellerOrderStatus::Processing,
    }
    .execute(core.ctx.clone(), core.events.clone())
    .await
    .unwrap();
    assert_eq!(primary_quantity(&core, "Y"), Some(3));

    // Re-completing is blocked by the durable is_deducted flag.
    let result = UpdateOrderStatusCommand {
        order_id,
        new_status: ResellerOrderStatus::Completed,
    }
    .execute(core.ctx.clone(), core.events.clone())
    .await
    .unwrap();
    assert!(!result.deduction_applied);
    assert_eq!(primary_quantity(&core, "Y"), Some(3));

    let order = core.ctx.orders.reseller_order(order_id).unwrap();
    assert!(order.is_deducted);
    assert_eq!(order.status, ResellerOrderStatus::Completed);
}

#[tokio::test]
async fn completion_emits_stock_adjusted_event() {
    let mut core = core_with_inventory().await;
    let order_id = create_order(&core, "Zone B", &[("Y", 2)]).await;

    UpdateOrderStatusCommand {
        order_id,
        new_status: ResellerOrderStatus::Completed,
    }
    .execute(core.ctx.clone(), core.events.clone())
    .await
    .unwrap();

    let mut adjusted = None;
    while let Ok(event) = core.event_rx.try_recv() {
        if let Event::StockAdjusted {
            key,
            delta,
            new_quantity,
        } = event
        {
            adjusted = Some((key, delta, new_quantity));
        }
    }
    assert_eq!(adjusted, Some(("Y".to_string(), -2, 3)));
}

#[tokio::test]
async fn in_session_processing_lock_makes_duplicate_request_a_no_op() {
    let core = core_with_inventory().await;
    let order_id = create_order(&core, "Zone B", &[("Y", 2)]).await;

    // Simulate the first click still being mid-transition.
    let guard = core.ctx.locks.acquire(order_id).expect("lock acquired");

    let result = UpdateOrderStatusCommand {
        order_id,
        new_status: ResellerOrderStatus::Completed,
    }
    .execute(core.ctx.clone(), core.events.clone())
    .await
    .unwrap();

    assert!(!result.deduction_applied);
    assert_eq!(result.new_status, ResellerOrderStatus::Unread);
    assert_eq!(primary_quantity(&core, "Y"), Some(5));
    drop(guard);

    // After the guard clears the transition goes through.
    let result = UpdateOrderStatusCommand {
        order_id,
        new_status: ResellerOrderStatus::Completed,
    }
    .execute(core.ctx.clone(), core.events.clone())
    .await
    .unwrap();
    assert!(result.deduction_applied);
    assert_eq!(primary_quantity(&core, "Y"), Some(3));
}

#[tokio::test]
async fn rejected_ledger_write_reverts_status_and_leaves_cache_untouched() {
    let core = core_with_inventory().await;
    let order_id = create_order(&core, "Zone B", &[("Y", 2)]).await;

    core.adapter.fail_on("write_item", collections::INVENTORY);
    let err = UpdateOrderStatusCommand {
        order_id,
        new_status: ResellerOrderStatus::Completed,
    }
    .execute(core.ctx.clone(), core.events.clone())
    .await
    .unwrap_err();
    assert_matches!(err, ServiceError::Persistence(_));

    // Write-through ledger: the mirror is only mutated after a confirmed
    // write, so the failed write leaves the quantity alone.
    assert_eq!(primary_quantity(&core, "Y"), Some(5));

    // Optimistic status flip was compensated.
    let order = core.ctx.orders.reseller_order(order_id).unwrap();
    assert_eq!(order.status, ResellerOrderStatus::Unread);
    assert!(!order.is_deducted);

    // The order row was never re-persisted after the failure.
    assert_eq!(
        core.adapter
            .call_count(&format!("upsert:{}", collections::RESELLER_ORDERS)),
        1,
        "only the creation upsert should have happened"
    );
}

#[tokio::test]
async fn rejected_order_write_reverts_status_but_not_applied_ledger_effects() {
    let core = core_with_inventory().await;
    let order_id = create_order(&core, "Zone B", &[("Y", 2)]).await;

    core.adapter
        .fail_on("upsert", collections::RESELLER_ORDERS);
    let err = UpdateOrderStatusCommand {
        order_id,
        new_status: ResellerOrderStatus::Completed,
    }
    .execute(core.ctx.clone(), core.events.clone())
    .await
    .unwrap_err();
    assert_matches!(err, ServiceError::Persistence(_));

    // Known inconsistency window: the ledger deduction already succeeded as
    // an independent write and is not rolled back.
    assert_eq!(primary_quantity(&core, "Y"), Some(3));

    // The order's optimistic change is compensated in the mirror.
    let order = core.ctx.orders.reseller_order(order_id).unwrap();
    assert_eq!(order.status, ResellerOrderStatus::Unread);
    assert!(!order.is_deducted);
}

#[tokio::test]
async fn delete_removes_row_without_stock_compensation() {
    let core = core_with_inventory().await;
    let order_id = create_order(&core, "Zone B", &[("Y", 2)]).await;

    // Complete first so stock was deducted.
    UpdateOrderStatusCommand {
        order_id,
        new_status: ResellerOrderStatus::Completed,
    }
    .execute(core.ctx.clone(), core.events.clone())
    .await
    .unwrap();
    assert_eq!(primary_quantity(&core, "Y"), Some(3));

    let result = DeleteOrderCommand { order_id }
        .execute(core.ctx.clone(), core.events.clone())
        .await
        .unwrap();
    assert!(result.deleted);

    // Reseller deletion never compensates stock.
    assert_eq!(primary_quantity(&core, "Y"), Some(3));
    assert!(core
        .adapter
        .stored(collections::RESELLER_ORDERS, &order_id.to_string())
        .is_none());
    assert!(core.ctx.orders.reseller_order(order_id).is_none());
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let core = core_with_inventory().await;
    let err = UpdateOrderStatusCommand {
        order_id: Uuid::new_v4(),
        new_status: ResellerOrderStatus::Completed,
    }
    .execute(core.ctx.clone(), core.events.clone())
    .await
    .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn packing_list_and_coa_flags_are_recorded() {
    let core = core_with_inventory().await;
    let order_id = create_order(&core, "Zone B", &[("X", 3)]).await;

    let result = GeneratePackingListCommand {
        target: PackingListTarget::Reseller(order_id),
    }
    .execute(core.ctx.clone(), core.events.clone())
    .await
    .unwrap();
    assert!(result.url.contains(&order_id.to_string()));

    let result = AttachCoaCommand {
        order_id,
        coa_data: json!({"batch": "B-77", "purity": 99.2}),
    }
    .execute(core.ctx.clone(), core.events.clone())
    .await
    .unwrap();
    assert!(result.url.ends_with("/coa"));

    let order = core.ctx.orders.reseller_order(order_id).unwrap();
    assert!(order.has_packing_list);
    assert!(order.has_coa);
    assert_eq!(order.coa_data, Some(json!({"batch": "B-77", "purity": 99.2})));

    let stored = core
        .adapter
        .stored(collections::RESELLER_ORDERS, &order_id.to_string())
        .unwrap();
    assert_eq!(stored["has_packing_list"], json!(true));
    assert_eq!(stored["has_coa"], json!(true));
}
