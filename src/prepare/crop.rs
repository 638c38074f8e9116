use crate::assets::decode::DecodedImage;
use crate::foundation::core::Rect;
use crate::foundation::error::{StripError, StripResult};

/// Source-space region selected by a center crop, in source pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Largest centered region of a `src_w x src_h` image whose aspect ratio matches
/// `target_w / target_h` ("cover" fit).
pub fn center_crop_region(
    src_w: u32,
    src_h: u32,
    target_w: f64,
    target_h: f64,
) -> StripResult<CropRegion> {
    if src_w == 0 || src_h == 0 {
        return Err(StripError::validation("crop source has zero width or height"));
    }
    if !(target_w.is_finite() && target_h.is_finite()) || target_w <= 0.0 || target_h <= 0.0 {
        return Err(StripError::validation(
            "crop target must be finite with positive size",
        ));
    }

    let (sw, sh) = (f64::from(src_w), f64::from(src_h));
    let src_aspect = sw / sh;
    let target_aspect = target_w / target_h;

    Ok(if src_aspect > target_aspect {
        let width = sh * target_aspect;
        CropRegion {
            x: (sw - width) / 2.0,
            y: 0.0,
            width,
            height: sh,
        }
    } else {
        let height = sw / target_aspect;
        CropRegion {
            x: 0.0,
            y: (sh - height) / 2.0,
            width: sw,
            height,
        }
    })
}

/// Center-crop `source` to the aspect of `rect` and resample it to `rect` at `scale`.
///
/// Output is `round(rect.width * scale) x round(rect.height * scale)`, at least 1x1.
/// Deterministic for equal inputs.
pub fn crop_to_rect(source: &DecodedImage, rect: Rect, scale: f64) -> StripResult<DecodedImage> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(StripError::validation("crop scale must be finite and > 0"));
    }
    let region = center_crop_region(source.width, source.height, rect.width(), rect.height())?;

    let out_w = (rect.width() * scale).round().max(1.0) as u32;
    let out_h = (rect.height() * scale).round().max(1.0) as u32;

    let x = (region.x.round() as u32).min(source.width - 1);
    let y = (region.y.round() as u32).min(source.height - 1);
    let w = (region.width.round().max(1.0) as u32).min(source.width - x);
    let h = (region.height.round().max(1.0) as u32).min(source.height - y);

    let full = source.to_rgba_image()?;
    let sub = image::imageops::crop_imm(&full, x, y, w, h).to_image();
    let out = if (w, h) == (out_w, out_h) {
        sub
    } else {
        image::imageops::resize(&sub, out_w, out_h, image::imageops::FilterType::Triangle)
    };

    DecodedImage::from_premul(out_w, out_h, out.into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/prepare/crop.rs"]
mod tests;
