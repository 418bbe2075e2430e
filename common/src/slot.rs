use crate::traits::SignalStore;
use tokio::sync::{Mutex, MutexGuard};

/// The single pending-signal slot shared by the generator and the evaluator.
///
/// Every read-modify-write of the slot happens while holding the guard
/// returned by [`PendingSlot::lock`], so a replacement can never interleave
/// with an evaluation in flight.
pub struct PendingSlot {
    store: Mutex<Box<dyn SignalStore>>,
}

impl PendingSlot {
    pub fn new(store: Box<dyn SignalStore>) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, Box<dyn SignalStore>> {
        self.store.lock().await
    }
}
