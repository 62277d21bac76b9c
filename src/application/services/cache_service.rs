//! Get-or-fetch image service.
//!
//! Checks the memory cache first and falls back to fetch, decode and store on a miss.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, trace, warn};

use crate::domain::entities::{
    CacheKey, CachedImage, ImageSource, LoadOptions, LoadOutcome, LoadedImage,
};
use crate::domain::errors::{DecodeError, ImageError};
use crate::domain::ports::{
    ByteFetcherPort, CacheServicing, CacheStats, ImageCachePort, ImageDecoderPort, StoreOutcome,
};

type SharedLoad = Shared<BoxFuture<'static, LoadOutcome>>;

/// Loads currently shared between callers, keyed by image key.
#[derive(Default)]
struct InFlightLoads {
    loads: HashMap<CacheKey, InFlight>,
    next_id: u64,
}

struct InFlight {
    id: u64,
    load: SharedLoad,
    waiters: usize,
    abort: AbortHandle,
}

impl InFlightLoads {
    /// Deregisters load `id` if it is still the one registered for `key`.
    fn finish(&mut self, key: &CacheKey, id: u64) {
        if self.loads.get(key).is_some_and(|entry| entry.id == id) {
            self.loads.remove(key);
        }
    }
}

/// One caller's interest in a shared load. The last waiter to leave aborts it.
struct Waiter {
    registry: Arc<Mutex<InFlightLoads>>,
    key: CacheKey,
    id: u64,
}

impl Drop for Waiter {
    fn drop(&mut self) {
        let mut registry = self.registry.lock();
        let abandoned = match registry.loads.get_mut(&self.key) {
            Some(entry) if entry.id == self.id => {
                entry.waiters -= 1;
                entry.waiters == 0
            }
            _ => false,
        };
        if !abandoned {
            return;
        }
        if let Some(entry) = registry.loads.remove(&self.key) {
            entry.abort.abort();
            trace!(key = %self.key, "Abandoned shared load");
        }
    }
}

/// Answers "get image for key" from the cache, filling it from the network on a miss.
///
/// Cloning is cheap and every clone shares the same cache.
#[derive(Clone)]
pub struct CacheService {
    pipeline: LoadPipeline,
    in_flight: Arc<Mutex<InFlightLoads>>,
    coalesce: bool,
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService")
            .field("coalesce", &self.coalesce)
            .finish_non_exhaustive()
    }
}

impl CacheService {
    /// Creates a service over the given cache, fetcher and decoder.
    /// Concurrent misses for the same key share one load.
    #[must_use]
    pub fn new(
        cache: Arc<dyn ImageCachePort>,
        fetcher: Arc<dyn ByteFetcherPort>,
        decoder: Arc<dyn ImageDecoderPort>,
    ) -> Self {
        Self {
            pipeline: LoadPipeline {
                cache,
                fetcher,
                decoder,
            },
            in_flight: Arc::new(Mutex::new(InFlightLoads::default())),
            coalesce: true,
        }
    }

    /// Enables or disables sharing one load between concurrent misses for a key.
    #[must_use]
    pub fn with_coalescing(mut self, enabled: bool) -> Self {
        self.coalesce = enabled;
        self
    }

    /// Returns the image for `key`, or `None` on any failure or cancellation.
    pub async fn get_image(&self, key: impl Into<CacheKey>) -> Option<CachedImage> {
        self.load(key).await.into_image()
    }

    /// Like `get_image`, but delivers the result to `completion` from a spawned task.
    ///
    /// The completion runs exactly once, even on a cache hit.
    pub fn get_image_with<F>(&self, key: impl Into<CacheKey>, completion: F) -> JoinHandle<()>
    where
        F: FnOnce(Option<CachedImage>) + Send + 'static,
    {
        let service = self.clone();
        let key = key.into();
        tokio::spawn(async move {
            let image = service.get_image(key).await;
            completion(image);
        })
    }

    /// Stores `image` under `key` without touching the network.
    pub fn save_image(&self, key: impl Into<CacheKey>, image: CachedImage) -> StoreOutcome {
        let key = key.into();
        let outcome = self.pipeline.cache.put(key.clone(), image);
        debug!(key = %key, stored = outcome.is_stored(), "Saved image");
        outcome
    }

    /// Loads an image and reports how it went.
    pub async fn load(&self, key: impl Into<CacheKey>) -> LoadOutcome {
        self.load_with(key, LoadOptions::default()).await
    }

    /// Loads an image, giving up when the deadline passes or the token is cancelled.
    ///
    /// Giving up yields `LoadOutcome::Cancelled`. A shared load that other callers are
    /// still waiting on keeps running; once its last waiter gives up it is aborted, so the
    /// next call for the key starts over from the cache check.
    pub async fn load_with(&self, key: impl Into<CacheKey>, options: LoadOptions) -> LoadOutcome {
        let key = key.into();

        if let Some(image) = self.pipeline.cache.get(&key) {
            return LoadOutcome::Loaded(LoadedImage {
                key,
                image,
                source: ImageSource::MemoryCache,
            });
        }

        if options.is_cancelled() {
            debug!(key = %key, "Load cancelled before fetch");
            return LoadOutcome::Cancelled;
        }

        let outcome = Self::guard(self.miss(&key), &options).await;
        if outcome.is_cancelled() {
            debug!(key = %key, "Load cancelled");
        }
        outcome
    }

    /// Drops the cached image for `key`. Returns true if one was cached.
    pub fn invalidate(&self, key: impl Into<CacheKey>) -> bool {
        self.pipeline.cache.remove(&key.into()).is_some()
    }

    /// Drops every cached image.
    pub fn clear(&self) {
        self.pipeline.cache.clear();
    }

    /// Returns cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.pipeline.cache.stats()
    }

    /// Returns the number of loads currently shared between callers.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().loads.len()
    }

    fn miss(&self, key: &CacheKey) -> BoxFuture<'static, LoadOutcome> {
        if !self.coalesce {
            return self.pipeline.clone().run(key.clone()).boxed();
        }

        let mut guard = self.in_flight.lock();
        let registry = &mut *guard;
        let (load, id) = match registry.loads.get_mut(key) {
            Some(entry) => {
                trace!(key = %key, "Joining in-flight load");
                entry.waiters += 1;
                (entry.load.clone(), entry.id)
            }
            None => {
                let id = registry.next_id;
                registry.next_id += 1;
                let (load, abort) = self.spawn_load(key.clone(), id);
                registry.loads.insert(
                    key.clone(),
                    InFlight {
                        id,
                        load: load.clone(),
                        waiters: 1,
                        abort,
                    },
                );
                (load, id)
            }
        };
        drop(guard);

        let waiter = Waiter {
            registry: Arc::clone(&self.in_flight),
            key: key.clone(),
            id,
        };
        async move {
            let _waiter = waiter;
            load.await
        }
        .boxed()
    }

    /// Runs the miss path on its own task so it completes and deregisters even when
    /// no caller is polling it.
    fn spawn_load(&self, key: CacheKey, id: u64) -> (SharedLoad, AbortHandle) {
        let registry = Arc::clone(&self.in_flight);
        let pipeline = self.pipeline.clone();
        let task = tokio::spawn(async move {
            let outcome = pipeline.run(key.clone()).await;
            registry.lock().finish(&key, id);
            outcome
        });
        let abort = task.abort_handle();

        let load = task
            .map(|joined| {
                joined.unwrap_or_else(|error| {
                    if error.is_panic() {
                        warn!(error = %error, "Image load task panicked");
                    }
                    LoadOutcome::Cancelled
                })
            })
            .boxed()
            .shared();
        (load, abort)
    }

    async fn guard(load: BoxFuture<'static, LoadOutcome>, options: &LoadOptions) -> LoadOutcome {
        let cancelled = async {
            match &options.cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let expired = async {
            match options.deadline {
                Some(deadline) => tokio::time::sleep(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            outcome = load => outcome,
            () = cancelled => LoadOutcome::Cancelled,
            () = expired => LoadOutcome::Cancelled,
        }
    }
}

#[async_trait]
impl CacheServicing for CacheService {
    async fn get_image(&self, key: &str) -> Option<CachedImage> {
        Self::get_image(self, key).await
    }

    fn save_image(&self, key: &str, image: CachedImage) {
        Self::save_image(self, key, image);
    }
}

/// The miss path: fetch, decode, store.
#[derive(Clone)]
struct LoadPipeline {
    cache: Arc<dyn ImageCachePort>,
    fetcher: Arc<dyn ByteFetcherPort>,
    decoder: Arc<dyn ImageDecoderPort>,
}

impl LoadPipeline {
    async fn run(self, key: CacheKey) -> LoadOutcome {
        match self.fetch_and_decode(&key).await {
            Ok(image) => {
                if let StoreOutcome::Rejected { cost, limit } =
                    self.cache.put(key.clone(), image.clone())
                {
                    debug!(key = %key, cost, limit, "Returning uncached image");
                }
                debug!(key = %key, source = "network", "Image loaded successfully");
                LoadOutcome::Loaded(LoadedImage {
                    key,
                    image,
                    source: ImageSource::Network,
                })
            }
            Err(error) => {
                warn!(key = %key, kind = error.kind(), error = %error, "Image load failed");
                LoadOutcome::Failed(error)
            }
        }
    }

    async fn fetch_and_decode(&self, key: &CacheKey) -> Result<CachedImage, ImageError> {
        let bytes = self.fetcher.fetch(key.as_str()).await?;

        let decoder = Arc::clone(&self.decoder);
        let image = tokio::task::spawn_blocking(move || decoder.decode(&bytes))
            .await
            .map_err(|e| DecodeError::new(format!("decode task panicked: {e}")))??;
        Ok(image)
    }
}
