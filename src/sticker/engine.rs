use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Point, Rect, Vec2};
use crate::foundation::error::StripResult;
use crate::foundation::math::normalize_degrees;
use crate::sticker::hit::{Corner, HitPart, MIN_STICKER_SIZE, hit_test};
use crate::sticker::model::{Sticker, StickerId};

/// Offset applied to a duplicated sticker.
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(10.0, 10.0);

/// Active pointer gesture. Each variant remembers the previous pointer so moves apply
/// incremental deltas.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Move {
        last: Point,
    },
    Resize {
        corner: Corner,
        last: Point,
        /// Width / height captured when the gesture started.
        aspect: f64,
    },
    Rotate {
        last: Point,
    },
}

/// Owns the sticker stack and turns pointer events into transforms.
///
/// List order is z-order: the last sticker is drawn on top and hit first.
#[derive(Clone, Debug, Default)]
pub struct StickerEngine {
    stickers: Vec<Sticker>,
    selected: Option<StickerId>,
    gesture: Gesture,
    next_id: u64,
    center_bounds: Option<Rect>,
}

impl StickerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stickers(&self) -> &[Sticker] {
        &self.stickers
    }

    pub fn sticker(&self, id: StickerId) -> Option<&Sticker> {
        self.stickers.iter().find(|s| s.id == id)
    }

    pub fn selected_id(&self) -> Option<StickerId> {
        self.selected
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Keep sticker centers inside `bounds` during moves and resizes. Off by default.
    ///
    /// Non-finite bounds are ignored.
    pub fn set_center_bounds(&mut self, bounds: Option<Rect>) {
        self.center_bounds = bounds
            .filter(|b| [b.x0, b.y0, b.x1, b.y1].iter().all(|v| v.is_finite()))
            .map(|b| b.abs());
        let ids: Vec<_> = self.stickers.iter().map(|s| s.id).collect();
        for id in ids {
            self.clamp_center(id);
        }
    }

    /// Replace the whole stack, e.g. with values edited elsewhere.
    ///
    /// A selection whose sticker is gone is cleared and any gesture ends.
    pub fn set_stickers(&mut self, stickers: Vec<Sticker>) {
        self.next_id = stickers
            .iter()
            .map(|s| s.id.0 + 1)
            .max()
            .unwrap_or(0)
            .max(self.next_id);
        self.stickers = stickers;
        if self.selected.is_some_and(|id| self.index_of(id).is_none()) {
            self.selected = None;
        }
        self.gesture = Gesture::Idle;
    }

    /// Push a new sticker on top of the stack.
    pub fn add(
        &mut self,
        image: DecodedImage,
        center: Point,
        width: f64,
        height: f64,
    ) -> StripResult<StickerId> {
        let id = self.alloc_id();
        let sticker = Sticker::new(id, image, center, width, height)?;
        self.stickers.push(sticker);
        self.clamp_center(id);
        tracing::debug!(id = id.0, "sticker added");
        Ok(id)
    }

    /// Start a gesture at `p`. Returns `true` when state changed and a redraw is due.
    pub fn pointer_down(&mut self, p: Point) -> bool {
        let hit = self
            .stickers
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, s)| hit_test(p, s).part().map(|part| (i, part)));

        let Some((i, part)) = hit else {
            let had_selection = self.selected.take().is_some();
            self.gesture = Gesture::Idle;
            return had_selection;
        };

        let id = self.stickers[i].id;
        self.gesture = match part {
            HitPart::Delete => {
                self.stickers.remove(i);
                self.selected = None;
                self.gesture = Gesture::Idle;
                tracing::debug!(id = id.0, "sticker deleted from its control");
                return true;
            }
            HitPart::Resize(corner) => Gesture::Resize {
                corner,
                last: p,
                aspect: self.stickers[i].aspect(),
            },
            HitPart::Rotate => Gesture::Rotate { last: p },
            HitPart::Body => Gesture::Move { last: p },
        };
        self.selected = Some(id);
        true
    }

    /// Continue the active gesture. Returns `true` when the selected sticker changed.
    pub fn pointer_move(&mut self, p: Point) -> bool {
        if matches!(self.gesture, Gesture::Idle) {
            return false;
        }
        let Some(i) = self.selected.and_then(|id| self.index_of(id)) else {
            self.gesture = Gesture::Idle;
            return false;
        };

        let s = &mut self.stickers[i];
        match &mut self.gesture {
            Gesture::Idle => return false,
            Gesture::Move { last } => {
                s.center += p - *last;
                *last = p;
            }
            Gesture::Resize {
                corner,
                last,
                aspect,
            } => {
                let d = p - *last;
                let rad = s.rotation_rad();
                let rotated_dx = d.x * rad.cos() + d.y * rad.sin();
                let (sx, sy) = corner.signs();

                let new_w = (s.width + sx * rotated_dx).max(MIN_STICKER_SIZE);
                let new_h = new_w / *aspect;
                let shift = Vec2::new(sx * (new_w - s.width) / 2.0, sy * (new_h - s.height) / 2.0);
                let delta = s.to_canvas_vec(shift);
                s.center += delta;
                s.width = new_w;
                s.height = new_h;
                *last = p;
            }
            Gesture::Rotate { last } => {
                let c = s.center;
                let a1 = (p.y - c.y).atan2(p.x - c.x);
                let a0 = (last.y - c.y).atan2(last.x - c.x);
                s.rotation_deg = normalize_degrees(s.rotation_deg + (a1 - a0).to_degrees());
                *last = p;
            }
        }
        let id = s.id;
        self.clamp_center(id);
        true
    }

    /// End the gesture without mutating any sticker.
    pub fn pointer_up(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// Pointer left the surface; same as [`pointer_up`](Self::pointer_up).
    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }

    /// Remove a sticker. Missing ids are a no-op.
    pub fn delete(&mut self, id: StickerId) -> bool {
        let Some(i) = self.index_of(id) else {
            return false;
        };
        self.stickers.remove(i);
        if self.selected == Some(id) {
            self.selected = None;
            self.gesture = Gesture::Idle;
        }
        true
    }

    /// Keyboard delete: remove the selected sticker, if any.
    pub fn delete_selected(&mut self) -> bool {
        match self.selected {
            Some(id) => self.delete(id),
            None => false,
        }
    }

    /// Select a sticker without reordering, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<StickerId>) -> bool {
        match id {
            Some(id) if self.index_of(id).is_none() => false,
            _ => {
                let changed = self.selected != id;
                self.selected = id;
                changed
            }
        }
    }

    pub fn bring_to_front(&mut self, id: StickerId) -> bool {
        let Some(i) = self.index_of(id) else {
            return false;
        };
        let s = self.stickers.remove(i);
        self.stickers.push(s);
        true
    }

    pub fn send_to_back(&mut self, id: StickerId) -> bool {
        let Some(i) = self.index_of(id) else {
            return false;
        };
        let s = self.stickers.remove(i);
        self.stickers.insert(0, s);
        true
    }

    /// Numeric rotation entry: clamped to `[0, 360]`, then normalized.
    pub fn set_rotation(&mut self, id: StickerId, deg: f64) -> bool {
        if !deg.is_finite() {
            return false;
        }
        let Some(i) = self.index_of(id) else {
            return false;
        };
        self.stickers[i].rotation_deg = normalize_degrees(deg.clamp(0.0, 360.0));
        true
    }

    /// Copy a sticker on top of the stack, offset by [`DUPLICATE_OFFSET`].
    pub fn duplicate(&mut self, id: StickerId) -> Option<StickerId> {
        let i = self.index_of(id)?;
        let new_id = self.alloc_id();
        let mut copy = self.stickers[i].clone();
        copy.id = new_id;
        copy.center += DUPLICATE_OFFSET;
        self.stickers.push(copy);
        self.clamp_center(new_id);
        Some(new_id)
    }

    pub fn clear(&mut self) {
        self.stickers.clear();
        self.selected = None;
        self.gesture = Gesture::Idle;
    }

    fn index_of(&self, id: StickerId) -> Option<usize> {
        self.stickers.iter().position(|s| s.id == id)
    }

    fn alloc_id(&mut self) -> StickerId {
        let id = StickerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn clamp_center(&mut self, id: StickerId) {
        let Some(b) = self.center_bounds else {
            return;
        };
        if let Some(i) = self.index_of(id) {
            let c = &mut self.stickers[i].center;
            c.x = c.x.clamp(b.x0, b.x1);
            c.y = c.y.clamp(b.y0, b.y1);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sticker/engine.rs"]
mod tests;
