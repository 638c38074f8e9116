use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{StripError, StripResult};

/// Largest surface side the raster backend can address.
pub const MAX_SURFACE_DIM: u32 = u16::MAX as u32;

/// A rendered composite: premultiplied pixels at `canvas × scale`.
pub struct Surface {
    pixmap: vello_cpu::Pixmap,
    canvas: Canvas,
    scale: f64,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("scale", &self.scale)
            .finish()
    }
}

impl Surface {
    /// Pixel size for `canvas` at `scale`, checking backend limits.
    pub fn size_for(canvas: Canvas, scale: f64) -> StripResult<(u16, u16)> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(StripError::validation("render scale must be finite and > 0"));
        }
        let (w, h) = canvas.scaled(scale);
        if w > MAX_SURFACE_DIM || h > MAX_SURFACE_DIM {
            return Err(StripError::render(format!(
                "surface {w}x{h} exceeds {MAX_SURFACE_DIM}px per side"
            )));
        }
        Ok((w as u16, h as u16))
    }

    pub(crate) fn from_pixmap(pixmap: vello_cpu::Pixmap, canvas: Canvas, scale: f64) -> Self {
        Self {
            pixmap,
            canvas,
            scale,
        }
    }

    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    /// Logical canvas this surface was rendered for.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data_premul(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Straight-alpha pixel at `(x, y)` in surface pixels.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = ((y as usize) * (self.width() as usize) + (x as usize)) * 4;
        let p = &self.data_premul()[i..i + 4];
        Some(unpremultiply([p[0], p[1], p[2], p[3]]))
    }

    /// Straight-alpha RGBA8 copy of the whole surface.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data_premul().len());
        for px in self.data_premul().chunks_exact(4) {
            let c = unpremultiply([px[0], px[1], px[2], px[3]]);
            out.extend_from_slice(&[c.r, c.g, c.b, c.a]);
        }
        out
    }

    pub fn to_rgba_image(&self) -> StripResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width(), self.height(), self.to_rgba8())
            .ok_or_else(|| StripError::render("surface buffer does not match its dimensions"))
    }
}

fn unpremultiply(px: [u8; 4]) -> Rgba8 {
    let [r, g, b, a] = px;
    if a == 0 {
        return Rgba8 {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        };
    }
    let a16 = u16::from(a);
    let un = |c: u8| -> u8 { ((u16::from(c) * 255 + a16 / 2) / a16).min(255) as u8 };
    Rgba8 {
        r: un(r),
        g: un(g),
        b: un(b),
        a,
    }
}
