use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per (user, challenge) locks for the submit path.
/// Submissions for the same pair are serialized; different pairs proceed concurrently.
#[derive(Default)]
pub struct EntityLocks {
    locks: Mutex<HashMap<(String, String), Arc<Mutex<()>>>>,
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the pair. Released when the guard drops.
    pub async fn acquire(&self, user_id: &str, challenge_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry((user_id.to_string(), challenge_id.to_string()))
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Drop locks nobody holds or waits on.
    pub async fn release_idle(&self) {
        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    #[cfg(test)]
    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
