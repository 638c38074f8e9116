use crate::assets::cache::DecodeMode;
use crate::assets::decode::DecodedImage;
use crate::assets::source::ImageSource;
use crate::export::encode::{ExportArtifact, ExportOptions, write_export};
use crate::foundation::core::Point;
use crate::foundation::error::StripResult;
use crate::layout::catalog::{Layout, LayoutCatalog, LayoutId};
use crate::prepare::pipeline::{Photo, PhotoId, PhotoPipeline, SlotState};
use crate::render::background::{Background, BackgroundPaint};
use crate::render::composite::{Compositor, DateStamp, PhotoLayer, Scene};
use crate::render::surface::Surface;
use crate::sticker::engine::StickerEngine;
use crate::sticker::model::StickerId;

/// Side length of a sticker placed without explicit geometry.
pub const DEFAULT_STICKER_SIZE: f64 = 100.0;
/// Vertical step between default sticker placements, one per committed photo.
pub const DEFAULT_STICKER_STEP: f64 = 96.0;

/// One photo-strip editing session.
///
/// Owns the active layout, the committed photos, decoration choices, the sticker stack
/// and the last rendered surface. Mutators return `true` when a redraw is due.
#[derive(Debug)]
pub struct StripEditor {
    catalog: LayoutCatalog,
    layout: Layout,
    photos: Vec<Photo>,
    next_photo_id: u64,
    background: Background,
    foreground: Option<ImageSource>,
    merged: Option<ImageSource>,
    date: Option<DateStamp>,
    clamp_stickers: bool,
    pipeline: PhotoPipeline,
    stickers: StickerEngine,
    compositor: Compositor,
    surface: Option<Surface>,
}

impl StripEditor {
    pub fn new(catalog: LayoutCatalog, layout: LayoutId, mode: DecodeMode) -> StripResult<Self> {
        let layout = catalog.get(layout)?.clone();
        Ok(Self {
            catalog,
            layout,
            photos: Vec::new(),
            next_photo_id: 0,
            background: Background::default(),
            foreground: None,
            merged: None,
            date: None,
            clamp_stickers: false,
            pipeline: PhotoPipeline::new(mode)?,
            stickers: StickerEngine::new(),
            compositor: Compositor::new(),
            surface: None,
        })
    }

    /// Editor over the stock layouts with synchronous decoding.
    pub fn with_builtin_layouts(layout: LayoutId) -> StripResult<Self> {
        Self::new(LayoutCatalog::builtin(), layout, DecodeMode::Inline)
    }

    pub fn catalog(&self) -> &LayoutCatalog {
        &self.catalog
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Switch templates. Only allowed while no photo is committed; returns `Ok(false)`
    /// otherwise. Unknown ids are an error.
    pub fn set_layout(&mut self, id: LayoutId) -> StripResult<bool> {
        let next = self.catalog.get(id)?;
        if !self.photos.is_empty() {
            tracing::debug!(
                current = self.layout.id(),
                requested = id,
                "layout locked while photos are committed"
            );
            return Ok(false);
        }
        if *next == self.layout {
            return Ok(false);
        }
        self.layout = next.clone();
        self.pipeline.sync(&self.layout, &self.photos);
        self.apply_sticker_bounds();
        Ok(true)
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn is_full(&self) -> bool {
        self.photos.len() >= self.layout.max_photos()
    }

    /// Append a photo; `None` when every slot is already taken.
    pub fn add_photo(&mut self, source: ImageSource) -> Option<PhotoId> {
        if self.is_full() {
            tracing::debug!(max = self.layout.max_photos(), "photo rejected; strip is full");
            return None;
        }
        let id = PhotoId(self.next_photo_id);
        self.next_photo_id += 1;
        self.photos.push(Photo { id, source });
        self.pipeline.sync(&self.layout, &self.photos);
        Some(id)
    }

    pub fn remove_photo(&mut self, id: PhotoId) -> bool {
        let Some(i) = self.photos.iter().position(|p| p.id == id) else {
            return false;
        };
        self.photos.remove(i);
        self.pipeline.sync(&self.layout, &self.photos);
        true
    }

    /// Move the photo at `from` to index `to`, shifting the ones between.
    pub fn move_photo(&mut self, from: usize, to: usize) -> bool {
        if from >= self.photos.len() || to >= self.photos.len() || from == to {
            return false;
        }
        let p = self.photos.remove(from);
        self.photos.insert(to, p);
        self.pipeline.sync(&self.layout, &self.photos);
        true
    }

    /// Replace every photo. Sources beyond the layout's capacity are dropped.
    pub fn set_photos(&mut self, sources: Vec<ImageSource>) -> Vec<PhotoId> {
        let max = self.layout.max_photos();
        if sources.len() > max {
            tracing::warn!(
                given = sources.len(),
                max,
                "more photos than the layout holds; extra photos dropped"
            );
        }
        self.photos.clear();
        for source in sources.into_iter().take(max) {
            let id = PhotoId(self.next_photo_id);
            self.next_photo_id += 1;
            self.photos.push(Photo { id, source });
        }
        self.pipeline.sync(&self.layout, &self.photos);
        self.photos.iter().map(|p| p.id).collect()
    }

    pub fn slot_states(&self) -> Vec<SlotState> {
        self.pipeline.slot_states().cloned().collect()
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn set_background(&mut self, background: Background) {
        self.background = background;
        self.sync_decorations();
    }

    /// Full-canvas overlay drawn above the photos.
    pub fn set_foreground(&mut self, source: Option<ImageSource>) {
        self.foreground = source;
        self.sync_decorations();
    }

    /// Pre-merged strip drawn instead of the per-slot photos once decoded.
    pub fn set_merged_photo(&mut self, source: Option<ImageSource>) {
        self.merged = source;
        self.sync_decorations();
    }

    fn sync_decorations(&mut self) {
        let bg = match &self.background {
            Background::Image(src) => Some(src),
            _ => None,
        };
        let sources = [bg, self.foreground.as_ref(), self.merged.as_ref()];
        self.pipeline.set_decorations(sources.into_iter().flatten());
    }

    /// Number of decoded (or decoding) sources currently held.
    pub fn cached_images(&self) -> usize {
        self.pipeline.cache().len()
    }

    pub fn set_date(&mut self, date: Option<DateStamp>) {
        self.date = date;
    }

    pub fn date(&self) -> Option<&DateStamp> {
        self.date.as_ref()
    }

    /// Font for the date stamp (TTF/OTF bytes).
    pub fn set_font(&mut self, font_bytes: Vec<u8>) -> StripResult<()> {
        self.compositor.set_font(font_bytes)
    }

    pub fn stickers(&self) -> &StickerEngine {
        &self.stickers
    }

    pub fn stickers_mut(&mut self) -> &mut StickerEngine {
        &mut self.stickers
    }

    /// Keep sticker centers on the canvas. Off by default.
    pub fn set_clamp_stickers(&mut self, on: bool) {
        self.clamp_stickers = on;
        self.apply_sticker_bounds();
    }

    fn apply_sticker_bounds(&mut self) {
        let bounds = self.clamp_stickers.then(|| self.layout.canvas().rect());
        self.stickers.set_center_bounds(bounds);
    }

    /// Place a sticker with the default geometry: 100x100, horizontally centered,
    /// 96px lower for each committed photo.
    pub fn add_sticker(&mut self, image: DecodedImage) -> StripResult<StickerId> {
        let canvas = self.layout.canvas().rect();
        let y = (self.photos.len().max(1) as f64 * DEFAULT_STICKER_STEP).clamp(0.0, canvas.y1);
        let center = Point::new(canvas.width() / 2.0, y);
        self.add_sticker_at(image, center, DEFAULT_STICKER_SIZE, DEFAULT_STICKER_SIZE)
    }

    pub fn add_sticker_at(
        &mut self,
        image: DecodedImage,
        center: Point,
        width: f64,
        height: f64,
    ) -> StripResult<StickerId> {
        self.stickers.add(image, center, width, height)
    }

    pub fn pointer_down(&mut self, p: Point) -> bool {
        self.stickers.pointer_down(p)
    }

    pub fn pointer_move(&mut self, p: Point) -> bool {
        self.stickers.pointer_move(p)
    }

    pub fn pointer_up(&mut self) {
        self.stickers.pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.stickers.pointer_leave();
    }

    /// Delete/Backspace: remove the selected sticker.
    pub fn delete_selected(&mut self) -> bool {
        self.stickers.delete_selected()
    }

    /// Pick up finished decodes. `true` means a redraw would now look different.
    pub fn refresh(&mut self) -> bool {
        self.pipeline.refresh()
    }

    /// Block until every pending decode has finished.
    pub fn wait_for_decodes(&mut self) -> bool {
        self.pipeline.wait()
    }

    pub fn is_loading(&self) -> bool {
        self.pipeline.is_loading()
    }

    /// Render the working surface at logical resolution, selection chrome included.
    pub fn redraw(&mut self) -> StripResult<&Surface> {
        let surface = self.render(1.0, true)?;
        Ok(self.surface.insert(surface))
    }

    /// Last surface produced by [`Self::redraw`].
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Re-render at `opts.scale` without selection chrome and write the file.
    ///
    /// Before the first redraw there is nothing to export; this logs and returns `Ok(None)`.
    pub fn export(&mut self, opts: &ExportOptions) -> StripResult<Option<ExportArtifact>> {
        if self.surface.is_none() {
            return write_export(None, opts.format, &opts.out_dir);
        }
        let hi = self.render(opts.scale, false)?;
        write_export(Some(&hi), opts.format, &opts.out_dir)
    }

    /// Render at `scale` into a new surface without touching the working one.
    pub fn render(&mut self, scale: f64, with_selection: bool) -> StripResult<Surface> {
        Surface::size_for(self.layout.canvas(), scale)?;
        let crops = self.pipeline.crops(scale);

        let cache = self.pipeline.cache_mut();
        let bg_image = match &self.background {
            Background::Image(src) => cache.get_or_load(src).ready().cloned(),
            _ => None,
        };
        let fg_image = self
            .foreground
            .as_ref()
            .and_then(|src| cache.get_or_load(src).ready().cloned());
        let merged = self
            .merged
            .as_ref()
            .and_then(|src| cache.get_or_load(src).ready().cloned());

        let background = match (&self.background, bg_image.as_ref()) {
            (Background::Solid(c), _) => BackgroundPaint::Solid(*c),
            (Background::Gradient(g), _) => BackgroundPaint::Gradient(g),
            (Background::Image(_), Some(img)) => BackgroundPaint::Image(img),
            (Background::Image(_), None) => BackgroundPaint::Solid(Background::DEFAULT_COLOR),
        };
        let photos = match merged.as_ref() {
            Some(img) => PhotoLayer::Merged(img),
            None => PhotoLayer::Slots(&crops),
        };
        let scene = Scene {
            layout: &self.layout,
            background,
            photos,
            foreground: fg_image.as_ref(),
            date: self.date.as_ref(),
            stickers: self.stickers.stickers(),
            selected: if with_selection {
                self.stickers.selected_id()
            } else {
                None
            },
        };
        self.compositor.redraw(&scene, scale)
    }

    /// Back to a blank strip: photos, stickers, decoration and the working surface are
    /// dropped. The layout, font and sticker clamping stay.
    pub fn reset(&mut self) {
        self.photos.clear();
        self.pipeline.clear();
        self.stickers.clear();
        self.background = Background::default();
        self.foreground = None;
        self.merged = None;
        self.date = None;
        self.surface = None;
        tracing::debug!(layout = self.layout.id(), "editor reset");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/session.rs"]
mod tests;
