use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Affine, Point, Vec2};
use crate::foundation::error::{StripError, StripResult};
use crate::foundation::math::{normalize_degrees, rotate_vec};

/// Sticker identity, unique within one engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StickerId(pub u64);

/// A freely placed decorative bitmap.
///
/// `center` is in logical canvas pixels; `rotation_deg` is clockwise on screen, in `[0, 360)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Sticker {
    pub id: StickerId,
    pub image: DecodedImage,
    pub center: Point,
    pub width: f64,
    pub height: f64,
    pub rotation_deg: f64,
}

impl Sticker {
    pub fn new(
        id: StickerId,
        image: DecodedImage,
        center: Point,
        width: f64,
        height: f64,
    ) -> StripResult<Self> {
        if !(center.x.is_finite() && center.y.is_finite()) {
            return Err(StripError::validation("sticker center must be finite"));
        }
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(StripError::validation(
                "sticker width/height must be finite and > 0",
            ));
        }
        Ok(Self {
            id,
            image,
            center,
            width,
            height,
            rotation_deg: 0.0,
        })
    }

    /// Same sticker rotated to `deg` (normalized into `[0, 360)`).
    pub fn with_rotation(mut self, deg: f64) -> Self {
        self.rotation_deg = normalize_degrees(deg);
        self
    }

    pub fn rotation_rad(&self) -> f64 {
        self.rotation_deg.to_radians()
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Local frame (origin at center, axes along the sticker edges) to canvas.
    pub fn local_to_canvas(&self) -> Affine {
        Affine::translate(self.center.to_vec2()) * Affine::rotate(self.rotation_rad())
    }

    /// Canvas point expressed in the sticker's local frame.
    pub fn to_local(&self, p: Point) -> Vec2 {
        rotate_vec(p - self.center, -self.rotation_rad())
    }

    /// Local-frame vector expressed in canvas space.
    pub fn to_canvas_vec(&self, v: Vec2) -> Vec2 {
        rotate_vec(v, self.rotation_rad())
    }

    /// Corner positions in canvas space, in [`Corner`](crate::sticker::hit::Corner) order.
    pub fn corners(&self) -> [Point; 4] {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)]
            .map(|(x, y)| self.center + self.to_canvas_vec(Vec2::new(x, y)))
    }
}
