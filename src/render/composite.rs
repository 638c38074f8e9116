use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Affine, Point, Rect, Rgba8};
use crate::foundation::error::StripResult;
use crate::layout::catalog::Layout;
use crate::render::background::{BackgroundPaint, LinearGradient};
use crate::render::paint::{
    affine_to_cpu, bezpath_to_cpu, circle_path, color_to_cpu, image_to_paint, line_path,
    rect_path, stroke_outline,
};
use crate::render::surface::Surface;
use crate::render::text::TextEngine;
use crate::sticker::hit::{
    Corner, DELETE_RADIUS, HANDLE_SIZE, delete_anchor, rotate_handle_anchor,
};
use crate::sticker::model::{Sticker, StickerId};

const PLACEHOLDER_COLOR: Rgba8 = Rgba8::opaque(0x99, 0x99, 0x99);
const PLACEHOLDER_STROKE: f64 = 2.0;
const PLACEHOLDER_DASH: [f64; 2] = [5.0, 5.0];
const PLUS_HALF_LEN: f64 = 11.0;
const PLUS_THICKNESS: f64 = 3.0;

const SELECTION_COLOR: Rgba8 = Rgba8::opaque(0, 0, 255);
const SELECTION_STROKE: f64 = 2.0;
const DELETE_COLOR: Rgba8 = Rgba8::opaque(255, 0, 0);
const DELETE_CROSS_HALF: f64 = 4.0;

/// Date stamp font size in logical pixels.
pub const DATE_FONT_SIZE: f64 = 16.0;
/// Right edge of the date stamp, as a fraction of the canvas width.
pub const DATE_RIGHT: f64 = 0.95;
/// Baseline of the date stamp, as a fraction of the canvas height.
pub const DATE_BASELINE: f64 = 0.97;

/// Photo content for the slots.
#[derive(Clone, Copy, Debug)]
pub enum PhotoLayer<'a> {
    /// One entry per layout rectangle; `None` draws a placeholder.
    Slots(&'a [Option<DecodedImage>]),
    /// A single pre-merged strip image stretched over the canvas.
    Merged(&'a DecodedImage),
}

/// Text drawn in the caption band.
#[derive(Clone, Debug, PartialEq)]
pub struct DateStamp {
    pub text: String,
    pub color: Rgba8,
}

impl DateStamp {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Rgba8::WHITE,
        }
    }
}

/// Everything one redraw needs, with every image already decoded.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    pub layout: &'a Layout,
    pub background: BackgroundPaint<'a>,
    pub photos: PhotoLayer<'a>,
    pub foreground: Option<&'a DecodedImage>,
    pub date: Option<&'a DateStamp>,
    pub stickers: &'a [Sticker],
    pub selected: Option<StickerId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GradientKey {
    from: Rgba8,
    to: Rgba8,
    points: [u64; 4],
    w: u32,
    h: u32,
}

impl GradientKey {
    fn new(g: &LinearGradient, w: u32, h: u32) -> Self {
        Self {
            from: g.from,
            to: g.to,
            points: [
                g.start.x.to_bits(),
                g.start.y.to_bits(),
                g.end.x.to_bits(),
                g.end.y.to_bits(),
            ],
            w,
            h,
        }
    }
}

struct CachedPaint {
    // Holds the buffer alive so its address cannot be reused by another image.
    _pixels: Arc<Vec<u8>>,
    paint: vello_cpu::Image,
}

/// Draws a [`Scene`] into a fresh [`Surface`] on the CPU.
///
/// Layer order is fixed: background, photos (or placeholders), foreground, date stamp,
/// stickers, selection chrome. Output is a pure function of the scene and scale.
pub struct Compositor {
    ctx: Option<vello_cpu::RenderContext>,
    text: TextEngine,
    images: HashMap<usize, CachedPaint>,
    used_images: HashSet<usize>,
    gradients: HashMap<GradientKey, vello_cpu::Image>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("cached_images", &self.images.len())
            .field("cached_gradients", &self.gradients.len())
            .field("has_font", &self.text.has_font())
            .finish()
    }
}

impl Compositor {
    pub fn new() -> Self {
        Self {
            ctx: None,
            text: TextEngine::new(),
            images: HashMap::new(),
            used_images: HashSet::new(),
            gradients: HashMap::new(),
        }
    }

    /// Font used for the date stamp. Without one the stamp is skipped.
    pub fn set_font(&mut self, font_bytes: Vec<u8>) -> StripResult<()> {
        self.text.set_font(font_bytes)
    }

    pub fn has_font(&self) -> bool {
        self.text.has_font()
    }

    /// Render `scene` at `scale` times its logical canvas size.
    #[tracing::instrument(skip_all, fields(layout = scene.layout.id(), scale = scale))]
    pub fn redraw(&mut self, scene: &Scene<'_>, scale: f64) -> StripResult<Surface> {
        let canvas = scene.layout.canvas();
        let (w, h) = Surface::size_for(canvas, scale)?;

        self.used_images.clear();
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();

        let drawn = self.draw_scene(&mut ctx, scene, scale, (u32::from(w), u32::from(h)));
        let out = drawn.map(|()| {
            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(w, h);
            ctx.render_to_pixmap(&mut pixmap);
            Surface::from_pixmap(pixmap, canvas, scale)
        });
        self.ctx = Some(ctx);

        let used = &self.used_images;
        self.images.retain(|k, _| used.contains(k));
        self.gradients.retain(|k, _| k.w == u32::from(w) && k.h == u32::from(h));
        out
    }

    fn draw_scene(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        scene: &Scene<'_>,
        scale: f64,
        device: (u32, u32),
    ) -> StripResult<()> {
        let base = Affine::scale(scale);
        let canvas = scene.layout.canvas();
        let canvas_rect = canvas.rect();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match scene.background {
            BackgroundPaint::Solid(c) => {
                ctx.set_transform(affine_to_cpu(base));
                ctx.set_paint(color_to_cpu(c));
                ctx.fill_rect(&rect_to_cpu(canvas_rect));
            }
            BackgroundPaint::Gradient(g) => {
                let img = self.gradient_paint(g, device.0, device.1)?;
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(img);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(device.0),
                    f64::from(device.1),
                ));
            }
            BackgroundPaint::Image(img) => self.draw_image(ctx, img, base, canvas_rect)?,
        }

        match scene.photos {
            PhotoLayer::Slots(crops) => {
                for (i, rect) in scene.layout.rects().iter().enumerate() {
                    match crops.get(i).and_then(|c| c.as_ref()) {
                        Some(img) => self.draw_image(ctx, img, base, *rect)?,
                        None => draw_placeholder(ctx, base, *rect),
                    }
                }
            }
            PhotoLayer::Merged(img) => self.draw_image(ctx, img, base, canvas_rect)?,
        }

        if let Some(fg) = scene.foreground {
            self.draw_image(ctx, fg, base, canvas_rect)?;
        }

        if let Some(date) = scene.date {
            self.draw_date(ctx, date, scale, canvas_rect)?;
        }

        for sticker in scene.stickers {
            let local = base * sticker.local_to_canvas();
            let (hw, hh) = (sticker.width / 2.0, sticker.height / 2.0);
            self.draw_image(ctx, &sticker.image, local, Rect::new(-hw, -hh, hw, hh))?;
            if scene.selected == Some(sticker.id) {
                draw_selection(ctx, local, sticker.width, sticker.height);
            }
        }
        Ok(())
    }

    /// Stretch `img` over `dst` (in the space of `tr`).
    fn draw_image(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        img: &DecodedImage,
        tr: Affine,
        dst: Rect,
    ) -> StripResult<()> {
        let paint = self.image_paint(img)?;
        let fit = Affine::translate((dst.x0, dst.y0))
            * Affine::scale_non_uniform(
                dst.width() / f64::from(img.width),
                dst.height() / f64::from(img.height),
            );
        ctx.set_transform(affine_to_cpu(tr * fit));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(img.width),
            f64::from(img.height),
        ));
        Ok(())
    }

    fn draw_date(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        date: &DateStamp,
        scale: f64,
        canvas: Rect,
    ) -> StripResult<()> {
        if date.text.is_empty() {
            return Ok(());
        }
        let size = (DATE_FONT_SIZE * scale) as f32;
        let Some(line) = self.text.shape_line(&date.text, size, date.color)? else {
            tracing::debug!("no stamp font registered; date stamp skipped");
            return Ok(());
        };

        // Shaped at device size, so position in device space.
        let anchor = Point::new(
            canvas.width() * DATE_RIGHT * scale,
            canvas.height() * DATE_BASELINE * scale,
        );
        let origin = Affine::translate((
            anchor.x - f64::from(line.width),
            anchor.y - f64::from(line.baseline),
        ));
        ctx.set_transform(affine_to_cpu(origin));
        for l in line.layout.lines() {
            for item in l.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&line.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn image_paint(&mut self, img: &DecodedImage) -> StripResult<vello_cpu::Image> {
        let key = Arc::as_ptr(&img.rgba8_premul) as usize;
        self.used_images.insert(key);
        if let Some(cached) = self.images.get(&key) {
            return Ok(cached.paint.clone());
        }
        let paint = image_to_paint(img)?;
        self.images.insert(
            key,
            CachedPaint {
                _pixels: Arc::clone(&img.rgba8_premul),
                paint: paint.clone(),
            },
        );
        Ok(paint)
    }

    fn gradient_paint(
        &mut self,
        g: &LinearGradient,
        w: u32,
        h: u32,
    ) -> StripResult<vello_cpu::Image> {
        let key = GradientKey::new(g, w, h);
        if let Some(img) = self.gradients.get(&key).cloned() {
            return Ok(img);
        }
        let img = image_to_paint(&g.rasterize(w, h)?)?;
        self.gradients.insert(key, img.clone());
        Ok(img)
    }
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn fill_shape(ctx: &mut vello_cpu::RenderContext, path: &kurbo::BezPath, color: Rgba8) {
    ctx.set_paint(color_to_cpu(color));
    ctx.fill_path(&bezpath_to_cpu(path));
}

fn draw_placeholder(ctx: &mut vello_cpu::RenderContext, base: Affine, rect: Rect) {
    ctx.set_transform(affine_to_cpu(base));
    let outline = stroke_outline(&rect_path(rect), PLACEHOLDER_STROKE, &PLACEHOLDER_DASH);
    fill_shape(ctx, &outline, PLACEHOLDER_COLOR);

    let c = rect.center();
    ctx.set_paint(color_to_cpu(PLACEHOLDER_COLOR));
    let t = PLUS_THICKNESS / 2.0;
    ctx.fill_rect(&rect_to_cpu(Rect::new(
        c.x - PLUS_HALF_LEN,
        c.y - t,
        c.x + PLUS_HALF_LEN,
        c.y + t,
    )));
    ctx.fill_rect(&rect_to_cpu(Rect::new(
        c.x - t,
        c.y - PLUS_HALF_LEN,
        c.x + t,
        c.y + PLUS_HALF_LEN,
    )));
}

/// Outline, corner handles, rotate handle and delete control, in the sticker's local frame.
fn draw_selection(ctx: &mut vello_cpu::RenderContext, local: Affine, width: f64, height: f64) {
    ctx.set_transform(affine_to_cpu(local));
    let (hw, hh) = (width / 2.0, height / 2.0);

    let outline = stroke_outline(&rect_path(Rect::new(-hw, -hh, hw, hh)), SELECTION_STROKE, &[]);
    fill_shape(ctx, &outline, SELECTION_COLOR);

    let mut handles: Vec<Point> = Corner::ALL
        .iter()
        .map(|c| {
            let (sx, sy) = c.signs();
            Point::new(sx * hw, sy * hh)
        })
        .collect();
    handles.push(rotate_handle_anchor(width, height));
    for h in handles {
        let square = Rect::from_center_size(h, (HANDLE_SIZE, HANDLE_SIZE));
        ctx.set_paint(color_to_cpu(Rgba8::WHITE));
        ctx.fill_rect(&rect_to_cpu(square));
        let border = stroke_outline(&rect_path(square), SELECTION_STROKE, &[]);
        fill_shape(ctx, &border, SELECTION_COLOR);
    }

    let del = delete_anchor(width, height);
    fill_shape(ctx, &circle_path(del, DELETE_RADIUS), DELETE_COLOR);
    let d = DELETE_CROSS_HALF;
    for (a, b) in [((-d, -d), (d, d)), ((-d, d), (d, -d))] {
        let seg = line_path(
            Point::new(del.x + a.0, del.y + a.1),
            Point::new(del.x + b.0, del.y + b.1),
        );
        fill_shape(ctx, &stroke_outline(&seg, SELECTION_STROKE, &[]), Rgba8::WHITE);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
