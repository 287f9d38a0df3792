use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

/// One line of a generated document, with the catalog description already
/// resolved by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLine {
    pub sku: String,
    pub description: String,
    pub quantity: i32,
}

/// PDF/document generation boundary. Consumer-side only: the core hands over
/// an order snapshot and records the returned handle/URL, nothing flows back
/// into fulfillment state.
#[async_trait]
pub trait DocumentGenerator: Send + Sync {
    async fn packing_list(
        &self,
        order_id: Uuid,
        lines: &[DocumentLine],
    ) -> Result<String, ServiceError>;

    async fn certificate_of_analysis(
        &self,
        order_id: Uuid,
        coa_data: &serde_json::Value,
    ) -> Result<String, ServiceError>;
}

/// Generator that produces stable in-memory handles. Local wiring and tests.
pub struct NullDocumentGenerator;

#[async_trait]
impl DocumentGenerator for NullDocumentGenerator {
    async fn packing_list(
        &self,
        order_id: Uuid,
        _lines: &[DocumentLine],
    ) -> Result<String, ServiceError> {
        Ok(format!("memory://documents/{}/packing-list", order_id))
    }

    async fn certificate_of_analysis(
        &self,
        order_id: Uuid,
        _coa_data: &serde_json::Value,
    ) -> Result<String, ServiceError> {
        Ok(format!("memory://documents/{}/coa", order_id))
    }
}
