use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::debug;

use crate::errors::CoreError;

type InFlight<V> = Shared<BoxFuture<'static, Result<V, CoreError>>>;

/// A pending request tagged with the generation that started it.
struct Pending<V> {
    generation: u64,
    future: InFlight<V>,
}

/// Per-row lookups keyed by row id (e.g. a piece of equipment's current value).
///
/// Successful results are kept until invalidated. Concurrent lookups for the
/// same key share a single request; failures are handed to every waiter and
/// are not remembered, so the next lookup tries again.
///
/// Invalidating a key also detaches any request already running for it: that
/// request still answers its own waiters but never writes its result back.
pub struct KeyedLookup<V> {
    results: Mutex<HashMap<String, V>>,
    in_flight: Mutex<HashMap<String, Pending<V>>>,
    next_generation: AtomicU64,
}

impl<V> Default for KeyedLookup<V> {
    fn default() -> Self {
        Self {
            results: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl<V> KeyedLookup<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored result for `key`, without fetching.
    pub fn get(&self, key: &str) -> Option<V> {
        lock(&self.results).get(key).cloned()
    }

    /// Return the stored value for `key`, or run `fetch` to get it.
    ///
    /// `fetch` is only invoked when neither a result nor an in-flight request
    /// exists for the key.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<V, CoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, CoreError>> + Send + 'static,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let (generation, shared) = {
            let mut in_flight = lock(&self.in_flight);
            let pending = in_flight.entry(key.to_string()).or_insert_with(|| {
                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                debug!(key, generation, "lookup started");
                Pending {
                    generation,
                    future: fetch().boxed().shared(),
                }
            });
            (pending.generation, pending.future.clone())
        };

        let result = shared.await;

        // Lock order: in_flight, then results.
        let mut in_flight = lock(&self.in_flight);
        let current = in_flight
            .get(key)
            .is_some_and(|pending| pending.generation == generation);
        if current {
            if let Ok(value) = &result {
                lock(&self.results).insert(key.to_string(), value.clone());
            }
            in_flight.remove(key);
        }
        result
    }

    pub fn is_pending(&self, key: &str) -> bool {
        lock(&self.in_flight).contains_key(key)
    }

    /// Forget the stored result for `key` (after an edit, for instance).
    /// A request still running for it is detached.
    pub fn invalidate(&self, key: &str) {
        let mut in_flight = lock(&self.in_flight);
        in_flight.remove(key);
        lock(&self.results).remove(key);
    }

    pub fn clear(&self) {
        let mut in_flight = lock(&self.in_flight);
        in_flight.clear();
        lock(&self.results).clear();
    }

    pub fn len(&self) -> usize {
        lock(&self.results).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.results).is_empty()
    }
}

impl<V> std::fmt::Debug for KeyedLookup<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedLookup")
            .field("results", &lock(&self.results).len())
            .field("in_flight", &lock(&self.in_flight).len())
            .finish()
    }
}
