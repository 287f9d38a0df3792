use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use crate::errors::ServiceError;

/// Zone/category price resolver. External collaborator: consulted once at
/// order-validation time to compute the order total, never re-consulted
/// during status transitions.
#[async_trait]
pub trait PriceResolver: Send + Sync {
    async fn total_for(
        &self,
        zone: &str,
        items: &BTreeMap<String, i32>,
    ) -> Result<Decimal, ServiceError>;
}

/// Flat per-SKU price table. Stands in for the real zone-pricing service in
/// local wiring and tests; a SKU without a price fails validation rather
/// than pricing silently at zero.
pub struct TablePriceResolver {
    prices: HashMap<String, Decimal>,
}

impl TablePriceResolver {
    pub fn new(prices: HashMap<String, Decimal>) -> Self {
        Self { prices }
    }
}

#[async_trait]
impl PriceResolver for TablePriceResolver {
    async fn total_for(
        &self,
        _zone: &str,
        items: &BTreeMap<String, i32>,
    ) -> Result<Decimal, ServiceError> {
        let mut total = Decimal::ZERO;
        for (sku, quantity) in items {
            let unit = self.prices.get(sku).ok_or_else(|| {
                ServiceError::ValidationError(format!("no price configured for SKU {}", sku))
            })?;
            total += *unit * Decimal::from(*quantity);
        }
        Ok(total)
    }
}
