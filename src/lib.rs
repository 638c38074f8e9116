//! Photostrip assembles captured photos into a single photo-strip image.
//!
//! The pipeline runs one way for rendering and both ways for stickers:
//!
//! - Pick a [`Layout`] from a [`LayoutCatalog`]
//! - Feed photos into a [`StripEditor`]; sources decode (optionally in the background) and are
//!   center-cropped into the layout slots
//! - Decorate with a background, an overlay, a date stamp and stickers moved, resized and
//!   rotated through pointer events
//! - [`StripEditor::redraw`] the working surface, [`StripEditor::export`] a supersampled file
#![forbid(unsafe_code)]

pub mod assets;
pub mod editor;
pub mod export;
mod foundation;
pub mod layout;
pub mod prepare;
pub mod project;
pub mod render;
pub mod sticker;

pub use crate::foundation::core::{Affine, Canvas, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{StripError, StripResult};

pub use crate::assets::cache::{DecodeMode, ImageCache, ImageHandle};
pub use crate::assets::decode::{DecodedImage, decode_image};
pub use crate::assets::source::{ImageSource, SourceKey};
pub use crate::editor::session::StripEditor;
pub use crate::export::encode::{ExportArtifact, ExportFormat, ExportOptions, export_filename};
pub use crate::layout::catalog::{Layout, LayoutCatalog, LayoutId, LayoutSpec};
pub use crate::prepare::crop::{CropRegion, center_crop_region, crop_to_rect};
pub use crate::prepare::pipeline::{Photo, PhotoId, PhotoPipeline, SlotState};
pub use crate::render::background::{Background, LinearGradient, gradient_preset};
pub use crate::render::composite::{Compositor, DateStamp, PhotoLayer, Scene};
pub use crate::render::surface::Surface;
pub use crate::sticker::engine::{Gesture, StickerEngine};
pub use crate::sticker::hit::{Corner, HitInfo, HitPart, hit_test};
pub use crate::sticker::model::{Sticker, StickerId};
pub use crate::project::model::StripProject;
