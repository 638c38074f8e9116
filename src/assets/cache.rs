use std::collections::HashMap;
use std::sync::{Arc, mpsc};

use crate::assets::decode::DecodedImage;
use crate::assets::source::{ImageSource, SourceKey};
use crate::foundation::error::{StripError, StripResult};

/// Environment variable overriding the decode worker count.
pub const DECODE_THREADS_ENV: &str = "PHOTOSTRIP_DECODE_THREADS";

/// State of a cached source as seen by callers.
#[derive(Clone, Debug)]
pub enum ImageHandle {
    /// Decode requested and not finished yet.
    Pending,
    Ready(DecodedImage),
    /// Decode failed; callers draw a placeholder instead.
    Failed(Arc<str>),
}

impl ImageHandle {
    pub fn ready(&self) -> Option<&DecodedImage> {
        match self {
            Self::Ready(img) => Some(img),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// How decodes are scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeMode {
    /// Decode synchronously inside [`ImageCache::get_or_load`].
    Inline,
    /// Decode on a worker pool; results are collected by [`ImageCache::poll`].
    Background { threads: Option<usize> },
}

impl DecodeMode {
    /// Background decoding, with the worker count taken from
    /// [`DECODE_THREADS_ENV`] when it holds a positive integer.
    pub fn from_env() -> Self {
        let threads = std::env::var(DECODE_THREADS_ENV)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0);
        Self::Background { threads }
    }
}

struct Completion {
    key: SourceKey,
    result: StripResult<DecodedImage>,
}

/// Decoded-image cache keyed by source identity.
///
/// Entries evicted while their decode is in flight are dropped when the result arrives.
pub struct ImageCache {
    entries: HashMap<SourceKey, ImageHandle>,
    pool: Option<rayon::ThreadPool>,
    tx: mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
    in_flight: usize,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("entries", &self.entries.len())
            .field("background", &self.pool.is_some())
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl ImageCache {
    pub fn new(mode: DecodeMode) -> StripResult<Self> {
        match mode {
            DecodeMode::Inline => Ok(Self::inline()),
            DecodeMode::Background { threads } => Ok(Self {
                pool: Some(build_decode_pool(threads)?),
                ..Self::inline()
            }),
        }
    }

    /// Cache that decodes synchronously; same as `new(DecodeMode::Inline)`.
    pub fn inline() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            entries: HashMap::new(),
            pool: None,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Current handle for `source`, starting a decode on first sight.
    pub fn get_or_load(&mut self, source: &ImageSource) -> ImageHandle {
        let key = source.key();
        if let Some(h) = self.entries.get(&key) {
            return h.clone();
        }

        if let Some(img) = source.decoded() {
            let h = ImageHandle::Ready(img.clone());
            self.entries.insert(key, h.clone());
            return h;
        }

        let Some(pool) = &self.pool else {
            let h = handle_from_result(key, source.load());
            self.entries.insert(key, h.clone());
            return h;
        };

        self.entries.insert(key, ImageHandle::Pending);
        self.in_flight += 1;
        let tx = self.tx.clone();
        let source = source.clone();
        pool.spawn(move || {
            let result = source.load();
            // The receiver only goes away together with the cache.
            let _ = tx.send(Completion { key, result });
        });
        tracing::debug!(key = key.0, "decode scheduled");
        ImageHandle::Pending
    }

    /// Handle for `key` without starting any work.
    pub fn get(&self, key: SourceKey) -> Option<ImageHandle> {
        self.entries.get(&key).cloned()
    }

    /// Collect finished background decodes. Returns the keys whose state changed.
    pub fn poll(&mut self) -> Vec<SourceKey> {
        let mut changed = Vec::new();
        while let Ok(done) = self.rx.try_recv() {
            if let Some(key) = self.apply(done) {
                changed.push(key);
            }
        }
        changed
    }

    /// Block until every scheduled decode has finished, then collect them.
    pub fn wait_idle(&mut self) -> Vec<SourceKey> {
        let mut changed = Vec::new();
        while self.in_flight > 0 {
            let Ok(done) = self.rx.recv() else {
                break;
            };
            if let Some(key) = self.apply(done) {
                changed.push(key);
            }
        }
        changed
    }

    /// Forget a source. An in-flight decode for it is discarded on arrival.
    pub fn evict(&mut self, key: SourceKey) {
        self.entries.remove(&key);
    }

    /// Number of decodes scheduled but not yet collected.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn apply(&mut self, done: Completion) -> Option<SourceKey> {
        self.in_flight = self.in_flight.saturating_sub(1);
        match self.entries.get_mut(&done.key) {
            Some(slot) if slot.is_pending() => {
                *slot = handle_from_result(done.key, done.result);
                Some(done.key)
            }
            _ => {
                tracing::debug!(key = done.key.0, "discarding decode for evicted source");
                None
            }
        }
    }
}

fn handle_from_result(key: SourceKey, result: StripResult<DecodedImage>) -> ImageHandle {
    match result {
        Ok(img) => ImageHandle::Ready(img),
        Err(e) => {
            tracing::warn!(key = key.0, error = %e, "image decode failed");
            ImageHandle::Failed(Arc::from(e.to_string()))
        }
    }
}

fn build_decode_pool(threads: Option<usize>) -> StripResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(StripError::validation("decode 'threads' must be >= 1 when set"));
    }
    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("photostrip-decode-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StripError::render(format!("failed to build decode thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
