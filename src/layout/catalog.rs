use std::collections::BTreeMap;

use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{StripError, StripResult};

/// CSS reference resolution used to convert inch-based layouts into pixels.
pub const CSS_PX_PER_INCH: f64 = 96.0;

const DEFAULT_GAP_IN: f64 = 0.1;
const DEFAULT_PADDING_IN: f64 = 0.15;
const CAPTION_PADDING_IN: f64 = 1.15;

/// Numeric layout key, as used by the layout picker.
pub type LayoutId = u32;

/// Unit the dimensions of a [`LayoutSpec`] are expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// CSS pixels.
    Px,
    /// Inches at [`CSS_PX_PER_INCH`].
    #[default]
    In,
}

impl Unit {
    /// Number of CSS pixels in one unit.
    pub fn to_px(self) -> f64 {
        match self {
            Self::Px => 1.0,
            Self::In => CSS_PX_PER_INCH,
        }
    }
}

/// Rule deriving slot rectangles from photo count, gaps and padding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Arrangement {
    /// One column of slots, top to bottom.
    Vertical,
    /// One row of slots, left to right.
    Horizontal,
    /// Row-major grid.
    Grid {
        /// Column count.
        columns: u32,
        /// Row count.
        rows: u32,
    },
}

/// Padding around the photo area, in the owning spec's unit.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    fn scaled(self, k: f64) -> Self {
        Self {
            top: self.top * k,
            right: self.right * k,
            bottom: self.bottom * k,
            left: self.left * k,
        }
    }
}

/// Declarative description of a layout; turned into a [`Layout`] by [`Layout::from_spec`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutSpec {
    pub max_photos: u32,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub unit: Unit,
    pub arrangement: Arrangement,
    #[serde(default)]
    pub gap: Option<f64>,
    #[serde(default)]
    pub padding: Option<Edges>,
}

impl LayoutSpec {
    /// Padding used when `padding` is unset: 0.15in all round, with a 1.15in caption
    /// band on the bottom (portrait) or right (landscape) side for the date stamp.
    pub fn default_padding(&self) -> Edges {
        let k = 1.0 / self.unit.to_px() * CSS_PX_PER_INCH;
        let mut e = Edges::uniform(DEFAULT_PADDING_IN);
        match self.arrangement {
            Arrangement::Vertical => e.bottom = CAPTION_PADDING_IN,
            Arrangement::Horizontal => e.right = CAPTION_PADDING_IN,
            Arrangement::Grid { .. } => {
                if self.width / self.height <= 1.0 {
                    e.bottom = CAPTION_PADDING_IN;
                } else {
                    e.right = CAPTION_PADDING_IN;
                }
            }
        }
        e.scaled(k)
    }

    fn gap_or_default(&self) -> f64 {
        self.gap
            .unwrap_or(DEFAULT_GAP_IN * CSS_PX_PER_INCH / self.unit.to_px())
    }
}

/// A named template: canvas size plus one destination rectangle per photo.
///
/// Rectangles are in logical canvas pixels and ordered by slot index.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    id: LayoutId,
    canvas: Canvas,
    rects: Vec<Rect>,
    arrangement: Option<Arrangement>,
}

impl Layout {
    /// Build a layout from explicit rectangles.
    pub fn new(id: LayoutId, canvas: Canvas, rects: Vec<Rect>) -> StripResult<Self> {
        if rects.is_empty() {
            return Err(StripError::validation(format!(
                "layout {id} must have at least one rectangle"
            )));
        }
        let bounds = canvas.rect();
        for (i, r) in rects.iter().enumerate() {
            let finite = [r.x0, r.y0, r.x1, r.y1].iter().all(|v| v.is_finite());
            if !finite || r.width() <= 0.0 || r.height() <= 0.0 {
                return Err(StripError::validation(format!(
                    "layout {id} rectangle {i} must be finite with positive size"
                )));
            }
            // Allow sub-pixel slack from inch conversion.
            let slack = 1e-6;
            if r.x0 < -slack
                || r.y0 < -slack
                || r.x1 > bounds.x1 + slack
                || r.y1 > bounds.y1 + slack
            {
                return Err(StripError::validation(format!(
                    "layout {id} rectangle {i} lies outside the {}x{} canvas",
                    canvas.width, canvas.height
                )));
            }
        }
        Ok(Self {
            id,
            canvas,
            rects,
            arrangement: None,
        })
    }

    /// Derive slot rectangles from an arrangement rule.
    pub fn from_spec(id: LayoutId, spec: &LayoutSpec) -> StripResult<Self> {
        if spec.max_photos == 0 {
            return Err(StripError::validation(format!(
                "layout {id}: max_photos must be > 0"
            )));
        }
        if !(spec.width.is_finite() && spec.height.is_finite())
            || spec.width <= 0.0
            || spec.height <= 0.0
        {
            return Err(StripError::validation(format!(
                "layout {id}: width/height must be finite and > 0"
            )));
        }

        let k = spec.unit.to_px();
        let canvas = Canvas::new(
            (spec.width * k).round() as u32,
            (spec.height * k).round() as u32,
        )?;
        let pad = spec.padding.unwrap_or_else(|| spec.default_padding()).scaled(k);
        let gap = spec.gap_or_default() * k;

        let avail_w = f64::from(canvas.width) - pad.left - pad.right;
        let avail_h = f64::from(canvas.height) - pad.top - pad.bottom;

        let (columns, rows) = match spec.arrangement {
            Arrangement::Vertical => (1, spec.max_photos),
            Arrangement::Horizontal => (spec.max_photos, 1),
            Arrangement::Grid { columns, rows } => {
                if columns == 0 || rows == 0 {
                    return Err(StripError::validation(format!(
                        "layout {id}: grid columns/rows must be > 0"
                    )));
                }
                if u64::from(columns) * u64::from(rows) < u64::from(spec.max_photos) {
                    return Err(StripError::validation(format!(
                        "layout {id}: {columns}x{rows} grid cannot hold {} photos",
                        spec.max_photos
                    )));
                }
                (columns, rows)
            }
        };

        let slot_w = (avail_w - f64::from(columns - 1) * gap) / f64::from(columns);
        let slot_h = (avail_h - f64::from(rows - 1) * gap) / f64::from(rows);
        if slot_w <= 0.0 || slot_h <= 0.0 {
            return Err(StripError::validation(format!(
                "layout {id}: padding and gaps leave no room for photos"
            )));
        }

        let rects = (0..spec.max_photos)
            .map(|i| {
                let col = i % columns;
                let row = i / columns;
                let x = pad.left + f64::from(col) * (slot_w + gap);
                let y = pad.top + f64::from(row) * (slot_h + gap);
                Rect::from_origin_size((x, y), (slot_w, slot_h))
            })
            .collect();

        let mut layout = Self::new(id, canvas, rects)?;
        layout.arrangement = Some(spec.arrangement);
        Ok(layout)
    }

    pub fn id(&self) -> LayoutId {
        self.id
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Maximum number of photos; equals the rectangle count.
    pub fn max_photos(&self) -> usize {
        self.rects.len()
    }

    /// Arrangement rule the rectangles were derived from, if any.
    pub fn arrangement(&self) -> Option<Arrangement> {
        self.arrangement
    }

    /// Picker label, e.g. `"4 Photos (Vertical)"`.
    pub fn label(&self) -> String {
        let n = self.max_photos();
        let kind = match self.arrangement {
            Some(Arrangement::Vertical) => "Vertical",
            Some(Arrangement::Horizontal) => "Horizontal",
            Some(Arrangement::Grid { .. }) => "Grid",
            None => "Custom",
        };
        format!("{n} Photo{} ({kind})", if n > 1 { "s" } else { "" })
    }
}

/// Static lookup of layouts by id.
#[derive(Clone, Debug, Default)]
pub struct LayoutCatalog {
    layouts: BTreeMap<LayoutId, Layout>,
}

impl LayoutCatalog {
    /// Layout selected when nothing else has been chosen.
    pub const DEFAULT_ID: LayoutId = 1;

    /// The stock photo-strip templates.
    pub fn builtin() -> Self {
        let vertical = |max_photos: u32, gap: Option<f64>| LayoutSpec {
            max_photos,
            width: 3.0,
            height: 9.0,
            unit: Unit::In,
            arrangement: Arrangement::Vertical,
            gap,
            padding: None,
        };
        let specs = [
            (1, vertical(4, Some(0.1))),
            (2, vertical(3, None)),
            (3, vertical(2, Some(0.1))),
            (
                4,
                LayoutSpec {
                    max_photos: 3,
                    width: 9.0,
                    height: 3.0,
                    unit: Unit::In,
                    arrangement: Arrangement::Horizontal,
                    gap: None,
                    padding: None,
                },
            ),
            (
                5,
                LayoutSpec {
                    max_photos: 4,
                    width: 6.0,
                    height: 9.0,
                    unit: Unit::In,
                    arrangement: Arrangement::Grid {
                        columns: 2,
                        rows: 2,
                    },
                    gap: None,
                    padding: None,
                },
            ),
            (
                6,
                LayoutSpec {
                    max_photos: 2,
                    width: 9.0,
                    height: 6.0,
                    unit: Unit::In,
                    arrangement: Arrangement::Grid {
                        columns: 2,
                        rows: 1,
                    },
                    gap: None,
                    padding: None,
                },
            ),
        ];

        let mut out = Self::default();
        for (id, spec) in specs {
            match Layout::from_spec(id, &spec) {
                Ok(layout) => {
                    out.layouts.insert(id, layout);
                }
                Err(e) => tracing::error!(id, error = %e, "builtin layout rejected"),
            }
        }
        out
    }

    /// Build a catalog from `id -> spec` pairs, e.g. parsed from JSON.
    pub fn from_specs(specs: &BTreeMap<LayoutId, LayoutSpec>) -> StripResult<Self> {
        let mut out = Self::default();
        for (&id, spec) in specs {
            out.layouts.insert(id, Layout::from_spec(id, spec)?);
        }
        Ok(out)
    }

    /// Parse a JSON object mapping layout ids to [`LayoutSpec`]s.
    pub fn from_json_str(s: &str) -> StripResult<Self> {
        let specs: BTreeMap<LayoutId, LayoutSpec> = serde_json::from_str(s)
            .map_err(|e| StripError::serde(format!("parse layout catalog JSON: {e}")))?;
        Self::from_specs(&specs)
    }

    /// Add or replace a layout.
    pub fn insert(&mut self, layout: Layout) {
        self.layouts.insert(layout.id(), layout);
    }

    pub fn get(&self, id: LayoutId) -> StripResult<&Layout> {
        self.layouts
            .get(&id)
            .ok_or_else(|| StripError::validation(format!("unknown layout id {id}")))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layout> {
        self.layouts.values()
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/catalog.rs"]
mod tests;
