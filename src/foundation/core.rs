use crate::foundation::error::{StripError, StripResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Logical canvas size in CSS pixels (96 per inch).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> StripResult<Self> {
        if width == 0 || height == 0 {
            return Err(StripError::validation("canvas width/height must be > 0"));
        }
        Ok(Self { width, height })
    }

    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Pixel size of a surface rendered at `scale`, rounded to whole pixels.
    pub fn scaled(self, scale: f64) -> (u32, u32) {
        let w = (f64::from(self.width) * scale).round().max(1.0) as u32;
        let h = (f64::from(self.height) * scale).round().max(1.0) as u32;
        (w, h)
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> StripResult<Self> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| StripError::validation(format!("color '{s}' must start with '#'")))?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(StripError::validation(format!(
                "color '{s}' has invalid hex digits"
            )));
        }
        let digit = |i: usize| -> StripResult<u8> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| StripError::validation(format!("color '{s}' has invalid hex digits")))
        };
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16).ok_or_else(|| {
                        StripError::validation(format!("color '{s}' has invalid hex digits"))
                    })? as u8;
                    out[i] = v * 17;
                }
                Ok(Self::opaque(out[0], out[1], out[2]))
            }
            6 => Ok(Self::opaque(digit(0)?, digit(2)?, digit(4)?)),
            8 => Ok(Self {
                r: digit(0)?,
                g: digit(2)?,
                b: digit(4)?,
                a: digit(6)?,
            }),
            _ => Err(StripError::validation(format!(
                "color '{s}' must have 3, 6 or 8 hex digits"
            ))),
        }
    }

    pub fn to_premul(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let premul = |c: u8| -> u8 { (((u16::from(c) * a) + 127) / 255) as u8 };
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }

    /// Channel-wise linear interpolation, `t` clamped to `[0,1]`.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            let (a, b) = (f64::from(a), f64::from(b));
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

impl std::str::FromStr for Rgba8 {
    type Err = StripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl serde::Serialize for Rgba8 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let s = if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        };
        serializer.serialize_str(&s)
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
