use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;

use crate::assets::cache::DecodeMode;
use crate::assets::source::ImageSource;
use crate::editor::session::{DEFAULT_STICKER_SIZE, StripEditor};
use crate::export::encode::{DEFAULT_EXPORT_SCALE, ExportFormat, ExportOptions};
use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::{StripError, StripResult};
use crate::layout::catalog::{Layout, LayoutCatalog, LayoutId, LayoutSpec};
use crate::render::background::{Background, LinearGradient, gradient_preset};
use crate::render::composite::DateStamp;
use crate::render::text::date_stamp_text;
use crate::sticker::model::{Sticker, StickerId};

/// A complete strip described as JSON: which layout, which files, which decoration.
///
/// Relative paths are resolved against the directory of the project file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StripProject {
    #[serde(default = "default_layout")]
    pub layout: LayoutId,
    /// Extra layouts, added to (or replacing) the builtin ones.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub layouts: BTreeMap<LayoutId, LayoutSpec>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub background: BackgroundConfig,
    #[serde(default)]
    pub foreground: Option<String>,
    /// Pre-merged strip image drawn instead of the individual photos.
    #[serde(default)]
    pub merged: Option<String>,
    #[serde(default)]
    pub stickers: Vec<StickerConfig>,
    #[serde(default)]
    pub date: Option<DateConfig>,
    /// TTF/OTF file used for the date stamp.
    #[serde(default)]
    pub font: Option<String>,
    #[serde(default)]
    pub clamp_stickers: bool,
    #[serde(default)]
    pub export: ExportConfig,

    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

fn default_layout() -> LayoutId {
    LayoutCatalog::DEFAULT_ID
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackgroundConfig {
    Color { color: Rgba8 },
    /// One of the named presets, `gradient-1` .. `gradient-10`.
    Preset { name: String },
    Gradient(LinearGradient),
    Image { source: String },
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self::Color {
            color: Background::DEFAULT_COLOR,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StickerConfig {
    pub source: String,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_sticker_size")]
    pub width: f64,
    #[serde(default = "default_sticker_size")]
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
}

fn default_sticker_size() -> f64 {
    DEFAULT_STICKER_SIZE
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateConfig {
    /// Stamp text; today's date (UTC, `YYYY.MM.DD`) when absent.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_date_color")]
    pub color: Rgba8,
}

fn default_date_color() -> Rgba8 {
    Rgba8::WHITE
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default)]
    pub out_dir: Option<String>,
}

fn default_scale() -> f64 {
    DEFAULT_EXPORT_SCALE
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_EXPORT_SCALE,
            format: ExportFormat::Png,
            out_dir: None,
        }
    }
}

impl StripProject {
    pub fn from_reader(r: impl Read) -> StripResult<Self> {
        let project: Self = serde_json::from_reader(r)
            .map_err(|e| StripError::serde(format!("parse project JSON: {e}")))?;
        project.validate()?;
        Ok(project)
    }

    pub fn from_json_str(s: &str) -> StripResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Load a project file; its directory becomes the base for relative paths.
    pub fn from_path(path: &Path) -> StripResult<Self> {
        let f = std::fs::File::open(path)
            .with_context(|| format!("open project '{}'", path.display()))?;
        let mut project = Self::from_reader(std::io::BufReader::new(f))?;
        project.base_dir = path.parent().map(Path::to_path_buf);
        Ok(project)
    }

    /// Directory relative paths are resolved against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn validate(&self) -> StripResult<()> {
        if !self.export.scale.is_finite() || self.export.scale <= 0.0 {
            return Err(StripError::validation("export scale must be finite and > 0"));
        }
        if let ExportFormat::Jpeg { quality } = self.export.format
            && !(1..=100).contains(&quality)
        {
            return Err(StripError::validation(format!(
                "jpeg quality must be in 1..=100, got {quality}"
            )));
        }
        if let BackgroundConfig::Preset { name } = &self.background
            && gradient_preset(name).is_none()
        {
            return Err(StripError::validation(format!(
                "unknown gradient preset '{name}'"
            )));
        }
        for (i, s) in self.stickers.iter().enumerate() {
            let finite = [s.x, s.y, s.width, s.height, s.rotation]
                .iter()
                .all(|v| v.is_finite());
            if !finite || s.width <= 0.0 || s.height <= 0.0 {
                return Err(StripError::validation(format!(
                    "sticker {i} needs finite geometry with width/height > 0"
                )));
            }
        }
        Ok(())
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        match &self.base_dir {
            Some(base) if p.is_relative() => base.join(p),
            _ => p.to_path_buf(),
        }
    }

    /// Builtin layouts plus the ones declared in the project.
    pub fn catalog(&self) -> StripResult<LayoutCatalog> {
        let mut catalog = LayoutCatalog::builtin();
        for (&id, spec) in &self.layouts {
            catalog.insert(Layout::from_spec(id, spec)?);
        }
        Ok(catalog)
    }

    pub fn background(&self) -> StripResult<Background> {
        Ok(match &self.background {
            BackgroundConfig::Color { color } => Background::Solid(*color),
            BackgroundConfig::Preset { name } => {
                Background::Gradient(gradient_preset(name).ok_or_else(|| {
                    StripError::validation(format!("unknown gradient preset '{name}'"))
                })?)
            }
            BackgroundConfig::Gradient(g) => Background::Gradient(*g),
            BackgroundConfig::Image { source } => {
                Background::Image(ImageSource::from_path(self.resolve(source)))
            }
        })
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            scale: self.export.scale,
            format: self.export.format,
            out_dir: self
                .export
                .out_dir
                .as_deref()
                .map(|d| self.resolve(d))
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Editor with everything in the project applied.
    ///
    /// Photo, background and overlay decode failures become placeholders at render time;
    /// sticker and font files must load.
    pub fn build_editor(&self, mode: DecodeMode) -> StripResult<StripEditor> {
        let mut editor = StripEditor::new(self.catalog()?, self.layout, mode)?;

        editor.set_photos(
            self.photos
                .iter()
                .map(|p| ImageSource::from_path(self.resolve(p)))
                .collect(),
        );
        editor.set_background(self.background()?);
        editor.set_foreground(
            self.foreground
                .as_deref()
                .map(|p| ImageSource::from_path(self.resolve(p))),
        );
        editor.set_merged_photo(
            self.merged
                .as_deref()
                .map(|p| ImageSource::from_path(self.resolve(p))),
        );

        if let Some(font) = &self.font {
            let path = self.resolve(font);
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read font '{}'", path.display()))?;
            editor.set_font(bytes)?;
        }
        if let Some(date) = &self.date {
            let text = date.text.clone().unwrap_or_else(today_stamp);
            editor.set_date(Some(DateStamp {
                text,
                color: date.color,
            }));
        }

        let mut stickers = Vec::with_capacity(self.stickers.len());
        for (i, cfg) in self.stickers.iter().enumerate() {
            let image = ImageSource::from_path(self.resolve(&cfg.source)).load()?;
            let sticker = Sticker::new(
                StickerId(i as u64),
                image,
                Point::new(cfg.x, cfg.y),
                cfg.width,
                cfg.height,
            )?
            .with_rotation(cfg.rotation);
            stickers.push(sticker);
        }
        editor.stickers_mut().set_stickers(stickers);
        editor.set_clamp_stickers(self.clamp_stickers);

        Ok(editor)
    }
}

impl Default for StripProject {
    fn default() -> Self {
        Self {
            layout: default_layout(),
            layouts: BTreeMap::new(),
            photos: Vec::new(),
            background: BackgroundConfig::default(),
            foreground: None,
            merged: None,
            stickers: Vec::new(),
            date: None,
            font: None,
            clamp_stickers: false,
            export: ExportConfig::default(),
            base_dir: None,
        }
    }
}

fn today_stamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();
    date_stamp_text(secs)
}

#[cfg(test)]
#[path = "../../tests/unit/project/model.rs"]
mod tests;
