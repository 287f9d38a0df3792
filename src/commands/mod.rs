use crate::{errors::ServiceError, events::EventSender, CoreContext};
use async_trait::async_trait;
use std::sync::Arc;

/// Command trait for implementing the Command Pattern
///
/// Each order/transfer transition is a command: it validates its input,
/// snapshots the pre-transition entity, applies the optimistic in-memory
/// change, persists, and carries its own compensating action for the
/// failure branch. Rollback is explicit, never handler-local.
#[async_trait]
pub trait Command: Send + Sync {
    /// The return type of the command when executed successfully
    type Result;

    /// Execute the command with the given dependencies
    ///
    /// # Arguments
    /// * `ctx` - Core services (ledger, order store, locks, collaborators)
    /// * `events` - Channel to publish domain events (fire-and-forget)
    async fn execute(
        &self,
        ctx: Arc<CoreContext>,
        events: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError>;
}

pub mod orders;
pub mod transfers;
