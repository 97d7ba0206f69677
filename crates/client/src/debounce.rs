//! Keyed trailing-edge debouncing on the tokio runtime.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

struct Pending {
    generation: u64,
    handle: JoinHandle<()>,
}

struct Slots<K> {
    next_generation: u64,
    pending: HashMap<K, Pending>,
}

/// Runs a task once its key has been quiet for `delay`.
///
/// Scheduling a key again before the delay elapses aborts the earlier task
/// and restarts the clock. A task that already started running is left
/// alone. Keys are independent of each other.
pub struct Debouncer<K> {
    delay: Duration,
    slots: Arc<Mutex<Slots<K>>>,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            slots: Arc::new(Mutex::new(Slots {
                next_generation: 0,
                pending: HashMap::new(),
            })),
        }
    }

    /// Schedule `task` for `key`, replacing any task still waiting for it.
    pub fn schedule<F>(&self, key: K, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = slots.next_generation;
        slots.next_generation += 1;

        let delay = self.delay;
        let shared = Arc::clone(&self.slots);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut slots = shared.lock().unwrap_or_else(PoisonError::into_inner);
                // Only release the slot if a newer task has not taken it.
                if slots
                    .pending
                    .get(&task_key)
                    .is_some_and(|p| p.generation == generation)
                {
                    slots.pending.remove(&task_key);
                }
            }
            task.await;
        });

        if let Some(previous) = slots.pending.insert(key, Pending { generation, handle }) {
            previous.handle.abort();
        }
    }

    /// Drop the waiting task for `key`. Returns `true` if one was waiting.
    pub fn cancel(&self, key: &K) -> bool {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        match slots.pending.remove(key) {
            Some(pending) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Number of keys with a task still waiting out its delay.
    pub fn pending_count(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .len()
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        for (_, pending) in slots.pending.drain() {
            pending.handle.abort();
        }
    }
}
