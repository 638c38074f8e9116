use crate::assets::decode::DecodedImage;
use crate::assets::source::ImageSource;
use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::{StripError, StripResult};

/// Two-stop linear gradient. `start`/`end` are percentages of the canvas size
/// (`(0,0)` top-left, `(100,100)` bottom-right).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LinearGradient {
    pub from: Rgba8,
    pub to: Rgba8,
    #[serde(default = "LinearGradient::default_start")]
    pub start: Point,
    #[serde(default = "LinearGradient::default_end")]
    pub end: Point,
}

impl LinearGradient {
    /// Top-left to bottom-right gradient between two colors.
    pub fn diagonal(from: Rgba8, to: Rgba8) -> Self {
        Self {
            from,
            to,
            start: Self::default_start(),
            end: Self::default_end(),
        }
    }

    fn default_start() -> Point {
        Point::new(0.0, 0.0)
    }

    fn default_end() -> Point {
        Point::new(100.0, 100.0)
    }

    /// Rasterize into a `width x height` premultiplied bitmap.
    pub fn rasterize(&self, width: u32, height: u32) -> StripResult<DecodedImage> {
        if width == 0 || height == 0 {
            return Err(StripError::render("gradient raster must be at least 1x1"));
        }
        let (w, h) = (f64::from(width), f64::from(height));
        let s = Point::new(self.start.x / 100.0 * w, self.start.y / 100.0 * h);
        let e = Point::new(self.end.x / 100.0 * w, self.end.y / 100.0 * h);
        let d = e - s;
        let len2 = d.hypot2();

        let mut bytes = vec![0u8; (width as usize) * (height as usize) * 4];
        for y in 0..height {
            for x in 0..width {
                let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let t = if len2 <= f64::EPSILON {
                    0.0
                } else {
                    (p - s).dot(d) / len2
                };
                let c = self.from.lerp(self.to, t).to_premul();
                let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
                bytes[idx..idx + 4].copy_from_slice(&c);
            }
        }
        DecodedImage::from_premul(width, height, bytes)
    }
}

/// Named gradient presets offered by the frame picker.
pub const GRADIENT_PRESETS: [(&str, Rgba8, Rgba8); 10] = [
    ("gradient-1", Rgba8::opaque(0xFC, 0xE3, 0x8A), Rgba8::opaque(0xF3, 0x81, 0x81)),
    ("gradient-2", Rgba8::opaque(0xF5, 0x4E, 0xA2), Rgba8::opaque(0xFF, 0x76, 0x76)),
    ("gradient-3", Rgba8::opaque(0x17, 0xEA, 0xD9), Rgba8::opaque(0x60, 0x78, 0xEA)),
    ("gradient-4", Rgba8::opaque(0x62, 0x27, 0x74), Rgba8::opaque(0xC5, 0x33, 0x64)),
    ("gradient-5", Rgba8::opaque(0x71, 0x17, 0xEA), Rgba8::opaque(0xEA, 0x60, 0x60)),
    ("gradient-6", Rgba8::opaque(0x42, 0xE6, 0x95), Rgba8::opaque(0x3B, 0xB2, 0xB8)),
    ("gradient-7", Rgba8::opaque(0xF0, 0x2F, 0xC2), Rgba8::opaque(0x60, 0x94, 0xEA)),
    ("gradient-8", Rgba8::opaque(0x65, 0x79, 0x9B), Rgba8::opaque(0x5E, 0x25, 0x63)),
    ("gradient-9", Rgba8::opaque(0x18, 0x4E, 0x68), Rgba8::opaque(0x57, 0xCA, 0x85)),
    ("gradient-10", Rgba8::opaque(0x5B, 0x24, 0x7A), Rgba8::opaque(0x1B, 0xCE, 0xDF)),
];

pub fn gradient_preset(name: &str) -> Option<LinearGradient> {
    GRADIENT_PRESETS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|&(_, from, to)| LinearGradient::diagonal(from, to))
}

/// What fills the canvas behind the photos.
#[derive(Clone, Debug)]
pub enum Background {
    Solid(Rgba8),
    Gradient(LinearGradient),
    /// Stretched over the whole canvas once decoded; drawn as the default frame color until then.
    Image(ImageSource),
}

impl Background {
    pub const DEFAULT_COLOR: Rgba8 = Rgba8::BLACK;
}

impl Default for Background {
    fn default() -> Self {
        Self::Solid(Self::DEFAULT_COLOR)
    }
}

/// Background with any image already resolved, ready to paint.
#[derive(Clone, Copy, Debug)]
pub enum BackgroundPaint<'a> {
    Solid(Rgba8),
    Gradient(&'a LinearGradient),
    Image(&'a DecodedImage),
}

#[cfg(test)]
#[path = "../../tests/unit/render/background.rs"]
mod tests;
