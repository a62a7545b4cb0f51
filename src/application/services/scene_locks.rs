//! Per-scene locks
//!
//! Hands out one async mutex per scene. An entry lives only while some
//! caller holds or waits on it, so the map never outgrows the scenes in use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::value_objects::SceneId;

type LockMap = HashMap<SceneId, Arc<AsyncMutex<()>>>;

#[derive(Default)]
pub struct SceneLocks {
    locks: Mutex<LockMap>,
}

impl SceneLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `scene_id`
    pub async fn acquire(&self, scene_id: SceneId) -> SceneGuard<'_> {
        let lock = {
            let mut locks = self.map();
            locks.entry(scene_id).or_default().clone()
        };
        let guard = lock.lock_owned().await;
        SceneGuard {
            locks: self,
            scene_id,
            guard: Some(guard),
        }
    }

    fn map(&self) -> std::sync::MutexGuard<'_, LockMap> {
        match self.locks.lock() {
            Ok(locks) => locks,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.map().len()
    }
}

/// Held for as long as the scene must stay exclusive
pub struct SceneGuard<'a> {
    locks: &'a SceneLocks,
    scene_id: SceneId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SceneGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut locks = self.locks.map();
        // Only the map still references the lock: nobody holds or awaits it
        if locks
            .get(&self.scene_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.scene_id);
        }
    }
}
