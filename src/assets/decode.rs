use std::sync::Arc;

use crate::foundation::error::{StripError, StripResult};

/// Largest side accepted for a decoded or rasterized bitmap.
pub const MAX_IMAGE_DIM: u32 = 16_384;

/// Decoded bitmap: premultiplied RGBA8, row-major, tightly packed.
///
/// Pixel data is shared; clones are cheap.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl DecodedImage {
    /// Wrap premultiplied RGBA8 bytes, checking the buffer length.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> StripResult<Self> {
        if width == 0 || height == 0 {
            return Err(StripError::decode("image has zero width or height"));
        }
        let expected = (width as usize) * (height as usize) * 4;
        if rgba8_premul.len() != expected {
            return Err(StripError::decode(format!(
                "image buffer is {} bytes, expected {expected} for {width}x{height}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Premultiply straight RGBA8 bytes and wrap them.
    pub fn from_straight(width: u32, height: u32, mut rgba8: Vec<u8>) -> StripResult<Self> {
        premultiply_rgba8_in_place(&mut rgba8);
        Self::from_premul(width, height, rgba8)
    }

    /// Single-color bitmap.
    pub fn solid(width: u32, height: u32, color: crate::foundation::core::Rgba8) -> StripResult<Self> {
        let px = color.to_premul();
        let n = (width as usize) * (height as usize);
        let mut bytes = Vec::with_capacity(n * 4);
        for _ in 0..n {
            bytes.extend_from_slice(&px);
        }
        Self::from_premul(width, height, bytes)
    }

    /// Copy into an `image` buffer (still premultiplied) for resampling.
    pub(crate) fn to_rgba_image(&self) -> StripResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.rgba8_premul.as_ref().clone())
            .ok_or_else(|| StripError::decode("image buffer does not match its dimensions"))
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let p = &self.rgba8_premul[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }
}

/// Decode encoded bytes (PNG, JPEG, GIF, WebP, BMP or SVG) into premultiplied RGBA8.
///
/// GIFs yield their first frame. SVG documents are rasterized at their intrinsic size.
pub fn decode_image(bytes: &[u8]) -> StripResult<DecodedImage> {
    if bytes.is_empty() {
        return Err(StripError::decode("image source is empty"));
    }
    if looks_like_svg(bytes) {
        return decode_svg(bytes);
    }

    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| StripError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width > MAX_IMAGE_DIM || height > MAX_IMAGE_DIM {
        return Err(StripError::decode(format!(
            "image too large: {width}x{height} (max {MAX_IMAGE_DIM}x{MAX_IMAGE_DIM})"
        )));
    }
    DecodedImage::from_straight(width, height, rgba.into_raw())
}

/// Parse and rasterize an SVG document at its intrinsic size.
pub fn decode_svg(bytes: &[u8]) -> StripResult<DecodedImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| StripError::decode(format!("parse svg tree: {e}")))?;

    let size = tree.size();
    let to_px = |v: f32| -> StripResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(StripError::decode("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    };
    let width = to_px(size.width())?;
    let height = to_px(size.height())?;
    if width > MAX_IMAGE_DIM || height > MAX_IMAGE_DIM {
        return Err(StripError::decode(format!(
            "svg raster size too large: {width}x{height} (max {MAX_IMAGE_DIM}x{MAX_IMAGE_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| StripError::decode("failed to allocate svg pixmap"))?;
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );
    DecodedImage::from_premul(width, height, pixmap.data().to_vec())
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let t = text.trim_start_matches('\u{feff}').trim_start();
    t.starts_with("<svg") || (t.starts_with("<?xml") && t.contains("<svg"))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
