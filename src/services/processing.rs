use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Session-scoped per-order processing lock.
///
/// Guards against the same order being driven through a transition twice by
/// rapid repeated user actions within one client session. This is only the
/// in-session half of the idempotency story; the durable cross-session guard
/// is the order's `is_deducted` flag.
#[derive(Clone, Default)]
pub struct ProcessingLock {
    active: Arc<DashMap<Uuid, ()>>,
}

impl ProcessingLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an order as mid-transition. Returns `None` when the order is
    /// already being processed, in which case the caller treats the request
    /// as a no-op.
    pub fn acquire(&self, order_id: Uuid) -> Option<ProcessingGuard> {
        match self.active.entry(order_id) {
            dashmap::mapref::entry::Entry::Occupied(_) => None,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(());
                Some(ProcessingGuard {
                    active: Arc::clone(&self.active),
                    order_id,
                })
            }
        }
    }

    pub fn is_processing(&self, order_id: Uuid) -> bool {
        self.active.contains_key(&order_id)
    }
}

/// Clears the processing marker on drop, success or failure alike.
pub struct ProcessingGuard {
    active: Arc<DashMap<Uuid, ()>>,
    order_id: Uuid,
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.active.remove(&self.order_id);
    }
}
