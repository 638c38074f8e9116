use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use image::ImageEncoder as _;

use crate::foundation::error::{StripError, StripResult};
use crate::render::surface::Surface;

/// Supersampling factor used when nothing else is asked for.
pub const DEFAULT_EXPORT_SCALE: f64 = 3.5;
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

const FILE_PREFIX: &str = "photobooth_";

/// Encoded file format of an export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    /// Lossy; transparent pixels are flattened over white.
    Jpeg {
        #[serde(default = "default_quality")]
        quality: u8,
    },
}

fn default_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

impl ExportFormat {
    pub fn jpeg() -> Self {
        Self::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }
}

/// How [`crate::StripEditor::export`] renders and where the file goes.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOptions {
    pub scale: f64,
    pub format: ExportFormat,
    pub out_dir: PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_EXPORT_SCALE,
            format: ExportFormat::Png,
            out_dir: PathBuf::from("."),
        }
    }
}

/// A file written by an export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    pub path: PathBuf,
    pub bytes: u64,
    pub width: u32,
    pub height: u32,
}

/// `photobooth_<unix-ms>.<ext>`
pub fn export_filename(unix_ms: u128, format: ExportFormat) -> String {
    format!("{FILE_PREFIX}{unix_ms}.{}", format.extension())
}

/// Encode a rendered surface in memory.
pub fn encode(surface: &Surface, format: ExportFormat) -> StripResult<Vec<u8>> {
    let (w, h) = (surface.width(), surface.height());
    let mut out = Vec::new();
    match format {
        ExportFormat::Png => {
            let rgba = surface.to_rgba8();
            image::codecs::png::PngEncoder::new(Cursor::new(&mut out))
                .write_image(&rgba, w, h, image::ExtendedColorType::Rgba8)
                .map_err(|e| StripError::export(format!("encode png: {e}")))?;
        }
        ExportFormat::Jpeg { quality } => {
            if !(1..=100).contains(&quality) {
                return Err(StripError::validation(format!(
                    "jpeg quality must be in 1..=100, got {quality}"
                )));
            }
            let rgb = flatten_over_white(surface.data_premul());
            image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut out), quality)
                .write_image(&rgb, w, h, image::ExtendedColorType::Rgb8)
                .map_err(|e| StripError::export(format!("encode jpeg: {e}")))?;
        }
    }
    Ok(out)
}

/// Premultiplied RGBA composited over opaque white, as packed RGB.
fn flatten_over_white(premul: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(premul.len() / 4 * 3);
    for px in premul.chunks_exact(4) {
        let inv = 255 - px[3];
        rgb.extend(px[..3].iter().map(|&c| c.saturating_add(inv)));
    }
    rgb
}

/// Encode `surface` and write it to `out_dir` under a timestamped name.
///
/// With no surface (nothing has been drawn yet) this logs and returns `Ok(None)`.
#[tracing::instrument(skip(surface), fields(has_surface = surface.is_some()))]
pub fn write_export(
    surface: Option<&Surface>,
    format: ExportFormat,
    out_dir: &Path,
) -> StripResult<Option<ExportArtifact>> {
    let Some(surface) = surface else {
        tracing::warn!("export requested before anything was rendered; skipping");
        return Ok(None);
    };

    let bytes = encode(surface, format)?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir '{}'", out_dir.display()))
        .map_err(|e| StripError::export(format!("{e:#}")))?;

    let unix_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let path = out_dir.join(export_filename(unix_ms, format));
    std::fs::write(&path, &bytes)
        .map_err(|e| StripError::export(format!("write '{}': {e}", path.display())))?;

    tracing::info!(
        path = %path.display(),
        width = surface.width(),
        height = surface.height(),
        bytes = bytes.len(),
        "exported strip"
    );
    Ok(Some(ExportArtifact {
        path,
        bytes: bytes.len() as u64,
        width: surface.width(),
        height: surface.height(),
    }))
}

#[cfg(test)]
#[path = "../../tests/unit/export/encode.rs"]
mod tests;
