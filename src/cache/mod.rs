//! Query cache keyed by [`QueryKey`].
//!
//! Each slot keeps the last data returned for its key plus loading, error
//! and staleness flags. Concurrent reads of the same slot share a single
//! request; the shared future records its own result, so the slot is
//! filled even when the caller that started it goes away. Mutations call
//! [`QueryCache::invalidate`] with a key prefix, which marks matching slots
//! stale and detaches their in-flight requests so the next read refetches.

mod key;

pub use key::QueryKey;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::errors::{ClientError, Result};

type SharedFetch = Shared<BoxFuture<'static, Result<Value>>>;

/// Published whenever a slot changes.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent {
    Loading(QueryKey),
    Updated(QueryKey),
    Failed { key: QueryKey, message: String },
    Invalidated { prefix: QueryKey, slots: usize },
}

/// Point-in-time view of a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotState {
    pub data: Option<Value>,
    pub loading: bool,
    pub error: Option<String>,
    pub stale: bool,
    pub updated_at: Option<Instant>,
}

struct InFlight {
    id: u64,
    future: SharedFetch,
}

#[derive(Default)]
struct Slot {
    data: Option<Value>,
    error: Option<String>,
    stale: bool,
    updated_at: Option<Instant>,
    /// Bumped on every invalidation; a fetch started under an older
    /// generation stores its data as stale.
    generation: u64,
    in_flight: Option<InFlight>,
}

impl Slot {
    fn fresh_data(&self, stale_after: Option<Duration>) -> Option<&Value> {
        if self.stale {
            return None;
        }
        let expired = match (stale_after, self.updated_at) {
            (Some(limit), Some(at)) => at.elapsed() >= limit,
            _ => false,
        };
        if expired {
            None
        } else {
            self.data.as_ref()
        }
    }

    fn state(&self) -> SlotState {
        SlotState {
            data: self.data.clone(),
            loading: self.in_flight.is_some(),
            error: self.error.clone(),
            stale: self.stale,
            updated_at: self.updated_at,
        }
    }
}

struct Inner {
    slots: DashMap<QueryKey, Slot>,
    events: broadcast::Sender<CacheEvent>,
    stale_after: Option<Duration>,
    next_fetch: AtomicU64,
}

impl Inner {
    fn publish(&self, event: CacheEvent) {
        trace!(?event, "cache event");
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn complete(&self, key: &QueryKey, fetch_id: u64, generation: u64, result: &Result<Value>) {
        let event = {
            let Some(mut slot) = self.slots.get_mut(key) else {
                // Removed while loading.
                return;
            };
            if slot.in_flight.as_ref().map(|f| f.id) == Some(fetch_id) {
                slot.in_flight = None;
            }
            match result {
                Ok(value) => {
                    slot.data = Some(value.clone());
                    slot.error = None;
                    slot.updated_at = Some(Instant::now());
                    slot.stale = slot.generation != generation;
                    CacheEvent::Updated(key.clone())
                }
                Err(err) => {
                    slot.error = Some(err.to_string());
                    CacheEvent::Failed {
                        key: key.clone(),
                        message: err.to_string(),
                    }
                }
            }
        };
        self.publish(event);
    }
}

/// Shared query cache. Clones share the same slots.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl QueryCache {
    pub fn new(config: &CacheConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                slots: DashMap::new(),
                events,
                stale_after: config.stale_after(),
                next_fetch: AtomicU64::new(1),
            }),
        }
    }

    /// Read a slot, calling `fetcher` only when there is no fresh data and
    /// no request already in flight for the key.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let shared = {
            let mut slot = self.inner.slots.entry(key.clone()).or_default();

            if let Some(data) = slot.fresh_data(self.inner.stale_after) {
                debug!(%key, "cache hit");
                return Ok(serde_json::from_value(data.clone())?);
            }

            let joined = slot.in_flight.as_ref().map(|f| f.future.clone());
            match joined {
                Some(future) => {
                    debug!(%key, "joining in-flight request");
                    future
                }
                None => {
                    debug!(%key, "cache miss, fetching");
                    let fetch_id = self.inner.next_fetch.fetch_add(1, Ordering::Relaxed);
                    let generation = slot.generation;
                    let inner = Arc::clone(&self.inner);
                    let slot_key = key.clone();
                    let request = fetcher();

                    let future = async move {
                        let result = match request.await {
                            Ok(data) => serde_json::to_value(data).map_err(ClientError::from),
                            Err(err) => Err(err),
                        };
                        inner.complete(&slot_key, fetch_id, generation, &result);
                        result
                    }
                    .boxed()
                    .shared();

                    slot.in_flight = Some(InFlight {
                        id: fetch_id,
                        future: future.clone(),
                    });
                    // Drive the request to completion even if every caller
                    // stops waiting.
                    tokio::spawn(future.clone().map(|_| ()));
                    self.inner.publish(CacheEvent::Loading(key.clone()));
                    future
                }
            }
        };

        let value = shared.await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Cached data for a key regardless of staleness.
    pub fn peek<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let slot = self.inner.slots.get(key)?;
        let data = slot.data.clone()?;
        serde_json::from_value(data).ok()
    }

    pub fn snapshot(&self, key: &QueryKey) -> Option<SlotState> {
        self.inner.slots.get(key).map(|slot| slot.state())
    }

    /// Mark every slot under `prefix` stale and detach its in-flight
    /// request. Returns the number of slots touched.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut touched = 0;
        for mut entry in self.inner.slots.iter_mut() {
            if entry.key().starts_with(prefix) {
                let slot = entry.value_mut();
                slot.generation += 1;
                slot.stale = true;
                slot.in_flight = None;
                touched += 1;
            }
        }
        debug!(%prefix, slots = touched, "invalidated");
        self.inner.publish(CacheEvent::Invalidated {
            prefix: prefix.clone(),
            slots: touched,
        });
        touched
    }

    pub fn remove(&self, key: &QueryKey) -> bool {
        self.inner.slots.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.inner.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots.is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }
}
