use std::collections::HashSet;

use crate::assets::cache::{DecodeMode, ImageCache, ImageHandle};
use crate::assets::decode::DecodedImage;
use crate::assets::source::{ImageSource, SourceKey};
use crate::foundation::core::Rect;
use crate::foundation::error::StripResult;
use crate::layout::catalog::Layout;
use crate::prepare::crop::crop_to_rect;

/// Opaque photo identity assigned when a photo is added.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhotoId(pub u64);

/// A user photo: identity plus where its pixels come from.
#[derive(Clone, Debug)]
pub struct Photo {
    pub id: PhotoId,
    pub source: ImageSource,
}

/// Preparation state of one layout slot.
#[derive(Clone, Debug)]
pub enum SlotState {
    /// No photo assigned; rendered as a placeholder.
    Empty,
    /// Waiting for the source decode.
    Decoding,
    /// Source decoded; crops are produced per output scale on demand.
    Ready(DecodedImage),
    /// Decode failed; rendered as a placeholder.
    Failed,
}

#[derive(Clone, Debug)]
struct Slot {
    photo: Option<(PhotoId, SourceKey)>,
    rect: Rect,
    generation: u64,
    state: SlotState,
    /// Finished crops keyed by the output scale's bit pattern.
    crops: Vec<(u64, DecodedImage)>,
}

/// Turns the ordered photo list into one cropped bitmap per layout slot.
///
/// Decodes run through an [`ImageCache`]; crops are cached per slot and scale and
/// thrown away when the slot's photo or rectangle changes.
#[derive(Debug)]
pub struct PhotoPipeline {
    cache: ImageCache,
    slots: Vec<Slot>,
    photo_keys: HashSet<SourceKey>,
    /// Sources shown outside the slots (background, overlay, merged strip).
    decoration_keys: HashSet<SourceKey>,
    generation: u64,
}

impl PhotoPipeline {
    pub fn new(mode: DecodeMode) -> StripResult<Self> {
        Ok(Self::with_cache(ImageCache::new(mode)?))
    }

    pub fn with_cache(cache: ImageCache) -> Self {
        Self {
            cache,
            slots: Vec::new(),
            photo_keys: HashSet::new(),
            decoration_keys: HashSet::new(),
            generation: 0,
        }
    }

    /// Match slots to `layout` and `photos` (index `i` goes to slot `i`).
    ///
    /// Slots whose photo and rectangle are unchanged keep their state. Sources of photos
    /// that are no longer shown are evicted; decodes still running for them are discarded.
    pub fn sync(&mut self, layout: &Layout, photos: &[Photo]) {
        let rects = layout.rects();
        self.slots.truncate(rects.len());

        let mut keys = HashSet::new();
        for (i, rect) in rects.iter().enumerate() {
            let photo = photos.get(i);
            let wanted = photo.map(|p| (p.id, p.source.key()));
            if let Some((_, key)) = wanted {
                keys.insert(key);
            }

            let unchanged = self
                .slots
                .get(i)
                .is_some_and(|s| s.photo == wanted && s.rect == *rect);
            if unchanged {
                continue;
            }

            self.generation += 1;
            let state = match photo {
                None => SlotState::Empty,
                Some(p) => state_from_handle(self.cache.get_or_load(&p.source)),
            };
            let slot = Slot {
                photo: wanted,
                rect: *rect,
                generation: self.generation,
                state,
                crops: Vec::new(),
            };
            if i < self.slots.len() {
                self.slots[i] = slot;
            } else {
                self.slots.push(slot);
            }
        }
        if photos.len() > rects.len() {
            tracing::warn!(
                photos = photos.len(),
                slots = rects.len(),
                "more photos than layout slots; extra photos are not shown"
            );
        }

        for stale in self.photo_keys.difference(&keys) {
            if !self.decoration_keys.contains(stale) {
                self.cache.evict(*stale);
            }
        }
        self.photo_keys = keys;
    }

    /// Make `sources` the full set of non-slot images, starting their decodes.
    ///
    /// Sources dropped from the set are evicted unless a slot photo still uses them.
    pub fn set_decorations<'a>(&mut self, sources: impl IntoIterator<Item = &'a ImageSource>) {
        let mut keys = HashSet::new();
        for src in sources {
            self.cache.get_or_load(src);
            keys.insert(src.key());
        }
        for stale in self.decoration_keys.difference(&keys) {
            if !self.photo_keys.contains(stale) {
                self.cache.evict(*stale);
                tracing::debug!(key = stale.0, "decoration source evicted");
            }
        }
        self.decoration_keys = keys;
    }

    /// Collect finished decodes and update waiting slots. Returns `true` when anything
    /// visible changed and the caller should redraw.
    pub fn refresh(&mut self) -> bool {
        let resolved = self.cache.poll();
        self.apply_resolved(&resolved)
    }

    /// Block until all scheduled decodes finish, then update slots.
    pub fn wait(&mut self) -> bool {
        let resolved = self.cache.wait_idle();
        self.apply_resolved(&resolved)
    }

    fn apply_resolved(&mut self, resolved: &[SourceKey]) -> bool {
        let mut changed = false;
        for slot in &mut self.slots {
            let Some((id, key)) = slot.photo else {
                continue;
            };
            if !matches!(slot.state, SlotState::Decoding) || !resolved.contains(&key) {
                continue;
            }
            match self.cache.get(key) {
                Some(h) => {
                    slot.state = state_from_handle(h);
                    tracing::debug!(photo = id.0, generation = slot.generation, "slot source resolved");
                }
                None => {
                    tracing::debug!(photo = id.0, "slot source evicted before it resolved");
                    continue;
                }
            }
            changed = true;
        }
        // Non-photo sources (backgrounds, overlays) resolving also warrant a redraw.
        changed || !resolved.is_empty()
    }

    /// Cropped bitmap per slot at `scale`; `None` for empty, waiting or failed slots.
    pub fn crops(&mut self, scale: f64) -> Vec<Option<DecodedImage>> {
        let bits = scale.to_bits();
        self.slots
            .iter_mut()
            .map(|slot| {
                let SlotState::Ready(source) = &slot.state else {
                    return None;
                };
                if let Some((_, img)) = slot.crops.iter().find(|(k, _)| *k == bits) {
                    return Some(img.clone());
                }
                match crop_to_rect(source, slot.rect, scale) {
                    Ok(img) => {
                        slot.crops.push((bits, img.clone()));
                        Some(img)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "photo crop failed; drawing placeholder");
                        None
                    }
                }
            })
            .collect()
    }

    pub fn slot_states(&self) -> impl Iterator<Item = &SlotState> {
        self.slots.iter().map(|s| &s.state)
    }

    /// True while any slot still waits for its decode.
    pub fn is_loading(&self) -> bool {
        self.slots
            .iter()
            .any(|s| matches!(s.state, SlotState::Decoding))
    }

    /// Shared cache, for non-photo sources such as backgrounds and overlays.
    pub fn cache_mut(&mut self) -> &mut ImageCache {
        &mut self.cache
    }

    /// Drop every slot, every photo source and every decoration source.
    pub fn clear(&mut self) {
        self.slots.clear();
        for key in self.photo_keys.drain().chain(self.decoration_keys.drain()) {
            self.cache.evict(key);
        }
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }
}

fn state_from_handle(h: ImageHandle) -> SlotState {
    match h {
        ImageHandle::Pending => SlotState::Decoding,
        ImageHandle::Ready(img) => SlotState::Ready(img),
        ImageHandle::Failed(_) => SlotState::Failed,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/prepare/pipeline.rs"]
mod tests;
