use crate::foundation::core::{Point, Vec2};
use crate::sticker::model::Sticker;

/// Side of the square corner and rotate handles; also the per-axis hit tolerance.
pub const HANDLE_SIZE: f64 = 10.0;
/// Distance of the rotate handle above the top edge.
pub const ROTATE_HANDLE_OFFSET: f64 = 20.0;
/// Offset of the delete control up and to the left of the top-left corner.
pub const DELETE_OFFSET: f64 = 20.0;
pub const DELETE_RADIUS: f64 = 10.0;
/// Smallest width a resize can produce.
pub const MIN_STICKER_SIZE: f64 = 20.0;

/// Sticker corners, indexed 0..4 clockwise from top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Unit direction of the corner from the sticker center, `(±1, ±1)`.
    pub fn signs(self) -> (f64, f64) {
        match self {
            Self::TopLeft => (-1.0, -1.0),
            Self::TopRight => (1.0, -1.0),
            Self::BottomRight => (1.0, 1.0),
            Self::BottomLeft => (-1.0, 1.0),
        }
    }
}

/// Sticker part under the pointer, after precedence is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitPart {
    Delete,
    Resize(Corner),
    Rotate,
    Body,
}

/// Everything the pointer touches on one sticker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HitInfo {
    pub in_body: bool,
    pub corner: Option<Corner>,
    pub on_rotate: bool,
    pub on_delete: bool,
}

impl HitInfo {
    /// Delete wins over resize, resize over rotate, rotate over body.
    pub fn part(&self) -> Option<HitPart> {
        if self.on_delete {
            Some(HitPart::Delete)
        } else if let Some(c) = self.corner {
            Some(HitPart::Resize(c))
        } else if self.on_rotate {
            Some(HitPart::Rotate)
        } else if self.in_body {
            Some(HitPart::Body)
        } else {
            None
        }
    }

    pub fn is_hit(&self) -> bool {
        self.part().is_some()
    }
}

/// Local-frame anchor of the rotate handle.
pub fn rotate_handle_anchor(width: f64, height: f64) -> Point {
    Point::new(width / 2.0, -height / 2.0 - ROTATE_HANDLE_OFFSET)
}

/// Local-frame center of the delete control.
pub fn delete_anchor(width: f64, height: f64) -> Point {
    Point::new(-width / 2.0 - DELETE_OFFSET, -height / 2.0 - DELETE_OFFSET)
}

/// Test a canvas-space pointer against one sticker's body and controls.
pub fn hit_test(pointer: Point, sticker: &Sticker) -> HitInfo {
    let local = sticker.to_local(pointer);
    let (hw, hh) = (sticker.width / 2.0, sticker.height / 2.0);
    let near = |anchor: Point| {
        (local.x - anchor.x).abs() < HANDLE_SIZE && (local.y - anchor.y).abs() < HANDLE_SIZE
    };

    let corner = Corner::ALL.into_iter().find(|c| {
        let (sx, sy) = c.signs();
        near(Point::new(sx * hw, sy * hh))
    });
    let del = delete_anchor(sticker.width, sticker.height);

    HitInfo {
        in_body: local.x >= -hw && local.x <= hw && local.y >= -hh && local.y <= hh,
        corner,
        on_rotate: near(rotate_handle_anchor(sticker.width, sticker.height)),
        on_delete: (local - Vec2::new(del.x, del.y)).hypot() < DELETE_RADIUS,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sticker/hit.rs"]
mod tests;
