use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, Opts};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    commands::Command,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{ResellerOrder, ResellerOrderStatus},
    CoreContext,
};

lazy_static! {
    static ref ORDERS_CREATED: IntCounter = IntCounter::new(
        "reseller_orders_created_total",
        "Total number of reseller orders created"
    )
    .expect("metric can be created");
    static ref ORDER_CREATION_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "reseller_order_creation_failures_total",
            "Total number of failed reseller order creations"
        ),
        &["error_type"]
    )
    .expect("metric can be created");
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateResellerOrderCommand {
    #[validate(length(min = 1, max = 64))]
    pub reseller_id: String,
    #[validate(length(min = 1, max = 128))]
    pub reseller_name: String,
    /// Zone/category label, used for pricing and the minimum-order check.
    #[validate(length(min = 1, max = 64))]
    pub location: String,
    pub items: BTreeMap<String, i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateResellerOrderResult {
    pub order_id: Uuid,
    pub total_amount: Decimal,
    pub status: ResellerOrderStatus,
}

#[async_trait::async_trait]
impl Command for CreateResellerOrderCommand {
    type Result = CreateResellerOrderResult;

    #[instrument(skip(self, ctx, events), fields(reseller_id = %self.reseller_id))]
    async fn execute(
        &self,
        ctx: Arc<CoreContext>,
        events: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        // Validation gate: everything here runs before any mutation.
        self.validate().map_err(|e| {
            ORDER_CREATION_FAILURES
                .with_label_values(&["validation_error"])
                .inc();
            let msg = format!("Invalid input: {}", e);
            error!("{}", msg);
            ServiceError::ValidationError(msg)
        })?;
        if self.items.is_empty() {
            ORDER_CREATION_FAILURES
                .with_label_values(&["empty_cart"])
                .inc();
            return Err(ServiceError::ValidationError(
                "order has no items".to_string(),
            ));
        }
        if let Some((sku, _)) = self.items.iter().find(|(_, qty)| **qty <= 0) {
            return Err(ServiceError::ValidationError(format!(
                "quantity for {} must be positive",
                sku
            )));
        }

        let total_amount = ctx
            .pricing
            .total_for(&self.location, &self.items)
            .await?;
        let minimum = ctx.config.pricing.minimum_for(&self.location);
        if total_amount < minimum {
            ORDER_CREATION_FAILURES
                .with_label_values(&["below_minimum"])
                .inc();
            return Err(ServiceError::ValidationError(format!(
                "order total {} is below the minimum {} for zone {}",
                total_amount, minimum, self.location
            )));
        }

        let order = ResellerOrder::new(
            self.reseller_id.clone(),
            self.reseller_name.clone(),
            self.location.clone(),
            self.items.clone(),
            total_amount,
        );

        ctx.orders.apply_reseller(order.clone());
        if let Err(e) = ctx.orders.persist_reseller(&order).await {
            ORDER_CREATION_FAILURES
                .with_label_values(&["persistence"])
                .inc();
            ctx.orders.discard_reseller(order.id);
            return Err(e);
        }

        // Notification is fire-and-forget: a delivery failure is logged and
        // never rolls the order back.
        events.emit(Event::OrderCreated(order.id));
        ORDERS_CREATED.inc();
        info!(
            order_id = %order.id,
            total = %order.total_amount,
            "reseller order created"
        );

        Ok(CreateResellerOrderResult {
            order_id: order.id,
            total_amount: order.total_amount,
            status: order.status,
        })
    }
}
