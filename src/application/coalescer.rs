//! WriteCoalescer - per-key debounce timers.
//!
//! Each key owns at most one armed timer. Scheduling again before it fires
//! aborts the previous timer and starts a new one, so a burst of edits
//! collapses into a single write once the key has been quiet for the delay.
//!
//! A timer that has fired detaches itself before running its write, so a
//! later `schedule` or `cancel` never aborts a write that is in flight.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;

struct Slot {
    generation: u64,
    handle: JoinHandle<()>,
}

struct Slots<K> {
    armed: HashMap<K, Slot>,
    next_generation: u64,
}

/// Debounces work per key.
pub struct WriteCoalescer<K> {
    delay: Duration,
    slots: Arc<Mutex<Slots<K>>>,
}

impl<K> Clone for WriteCoalescer<K> {
    fn clone(&self) -> Self {
        Self {
            delay: self.delay,
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<K> WriteCoalescer<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            slots: Arc::new(Mutex::new(Slots {
                armed: HashMap::new(),
                next_generation: 0,
            })),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn lock(&self) -> MutexGuard<'_, Slots<K>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Arms (or re-arms) the timer for `key`. `work` runs once the key has
    /// been quiet for the delay.
    pub fn schedule<F, Fut>(&self, key: K, work: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut slots = self.lock();
        slots.next_generation += 1;
        let generation = slots.next_generation;

        let delay = self.delay;
        let registry = Arc::clone(&self.slots);
        let fired_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut slots = registry.lock().unwrap_or_else(|e| e.into_inner());
                match slots.armed.get(&fired_key) {
                    Some(slot) if slot.generation == generation => {
                        slots.armed.remove(&fired_key);
                    }
                    _ => return,
                }
            }
            work().await;
        });

        if let Some(previous) = slots.armed.insert(key, Slot { generation, handle }) {
            previous.handle.abort();
        }
    }

    /// Disarms the timer for `key`. Returns whether one was armed.
    pub fn cancel(&self, key: &K) -> bool {
        match self.lock().armed.remove(key) {
            Some(slot) => {
                slot.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Disarms every timer whose key matches `predicate`, returning the keys.
    pub fn cancel_where(&self, predicate: impl Fn(&K) -> bool) -> Vec<K> {
        let mut slots = self.lock();
        let keys: Vec<K> = slots.armed.keys().filter(|k| predicate(k)).cloned().collect();
        for key in &keys {
            if let Some(slot) = slots.armed.remove(key) {
                slot.handle.abort();
            }
        }
        keys
    }

    /// Disarms everything.
    pub fn cancel_all(&self) -> Vec<K> {
        self.cancel_where(|_| true)
    }

    pub fn is_armed(&self, key: &K) -> bool {
        self.lock().armed.contains_key(key)
    }

    pub fn armed_count(&self) -> usize {
        self.lock().armed.len()
    }
}
