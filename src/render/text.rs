use crate::foundation::core::Rgba8;
use crate::foundation::error::{StripError, StripResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

struct LoadedFont {
    family: String,
    data: vello_cpu::peniko::FontData,
}

/// A single line of shaped text plus the font needed to draw its glyphs.
pub(crate) struct ShapedLine {
    pub(crate) layout: parley::Layout<TextBrushRgba8>,
    pub(crate) font: vello_cpu::peniko::FontData,
    pub(crate) width: f32,
    pub(crate) baseline: f32,
}

/// Parley contexts plus the one font used for the date stamp.
pub(crate) struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    font: Option<LoadedFont>,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            font: None,
        }
    }

    /// Register TTF/OTF bytes as the stamp font, replacing any previous one.
    pub(crate) fn set_font(&mut self, font_bytes: Vec<u8>) -> StripResult<()> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| StripError::validation("no font families registered from font bytes"))?;
        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StripError::validation("registered font family has no name"))?
            .to_string();
        let data =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);
        tracing::debug!(family = %family, "stamp font registered");
        self.font = Some(LoadedFont { family, data });
        Ok(())
    }

    pub(crate) fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Shape `text` on one line. `None` when no font has been registered.
    pub(crate) fn shape_line(
        &mut self,
        text: &str,
        size_px: f32,
        color: Rgba8,
    ) -> StripResult<Option<ShapedLine>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StripError::validation("text size must be finite and > 0"));
        }
        let Some(font) = &self.font else {
            return Ok(None);
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(font.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8::from(
            color,
        )));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        let baseline = layout
            .lines()
            .next()
            .map(|line| line.metrics().baseline)
            .unwrap_or(size_px);
        let width = layout.width();
        Ok(Some(ShapedLine {
            layout,
            font: font.data.clone(),
            width,
            baseline,
        }))
    }
}

/// Calendar date of a Unix timestamp (UTC) as `YYYY.MM.DD`.
pub fn date_stamp_text(unix_secs: i64) -> String {
    let days = unix_secs.div_euclid(86_400);
    let (y, m, d) = civil_from_days(days);
    format!("{y:04}.{m:02}.{d:02}")
}

/// Proleptic Gregorian date for a count of days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let y = yoe + era * 400 + i64::from(m <= 2);
    (y, m, d)
}
