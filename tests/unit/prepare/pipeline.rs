use super::*;
use crate::foundation::core::Rgba8;
use crate::layout::catalog::LayoutCatalog;

fn photo(id: u64, w: u32, h: u32, color: Rgba8) -> Photo {
    Photo {
        id: PhotoId(id),
        source: ImageSource::from_decoded(DecodedImage::solid(w, h, color).unwrap()),
    }
}

fn encoded_photo(id: u64, color: [u8; 4]) -> Photo {
    let img = image::RgbaImage::from_pixel(32, 24, image::Rgba(color));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    Photo {
        id: PhotoId(id),
        source: ImageSource::from_bytes(buf),
    }
}

#[test]
fn slots_follow_photo_order_and_layout_size() {
    let catalog = LayoutCatalog::builtin();
    let layout = catalog.get(1).unwrap();
    let mut pipeline = PhotoPipeline::with_cache(ImageCache::inline());

    let photos = vec![
        photo(1, 640, 480, Rgba8::opaque(255, 0, 0)),
        photo(2, 480, 640, Rgba8::opaque(0, 0, 255)),
    ];
    pipeline.sync(layout, &photos);

    let crops = pipeline.crops(1.0);
    assert_eq!(crops.len(), 4);
    let first = crops[0].as_ref().unwrap();
    let rect = layout.rects()[0];
    assert_eq!(first.width, rect.width().round() as u32);
    assert_eq!(first.height, rect.height().round() as u32);
    assert_eq!(first.pixel(5, 5), Some([255, 0, 0, 255]));
    assert!(crops[2].is_none());
    assert!(crops[3].is_none());
}

#[test]
fn crops_are_produced_per_scale() {
    let catalog = LayoutCatalog::builtin();
    let layout = catalog.get(3).unwrap();
    let mut pipeline = PhotoPipeline::with_cache(ImageCache::inline());
    pipeline.sync(layout, &[photo(1, 100, 100, Rgba8::WHITE)]);

    let small = pipeline.crops(1.0)[0].clone().unwrap();
    let big = pipeline.crops(2.0)[0].clone().unwrap();
    assert_eq!(big.width, (layout.rects()[0].width() * 2.0).round() as u32);
    assert!(big.width > small.width);
    assert_eq!(pipeline.crops(1.0)[0].as_ref(), Some(&small));
}

#[test]
fn background_decodes_resolve_on_refresh() {
    let catalog = LayoutCatalog::builtin();
    let layout = catalog.get(3).unwrap();
    let mut pipeline = PhotoPipeline::new(DecodeMode::Background { threads: Some(1) }).unwrap();
    pipeline.sync(layout, &[encoded_photo(1, [0, 255, 0, 255])]);
    assert!(pipeline.is_loading());
    assert!(pipeline.crops(1.0)[0].is_none());

    assert!(pipeline.wait());
    assert!(!pipeline.is_loading());
    let crop = pipeline.crops(1.0)[0].clone().unwrap();
    assert_eq!(crop.pixel(1, 1), Some([0, 255, 0, 255]));
    assert!(!pipeline.refresh());
}

#[test]
fn removed_photo_mid_decode_is_discarded() {
    let catalog = LayoutCatalog::builtin();
    let layout = catalog.get(3).unwrap();
    let mut pipeline = PhotoPipeline::new(DecodeMode::Background { threads: Some(1) }).unwrap();
    pipeline.sync(layout, &[encoded_photo(1, [1, 1, 1, 255])]);
    pipeline.sync(layout, &[]);

    pipeline.wait();
    assert!(pipeline.slot_states().all(|s| matches!(s, SlotState::Empty)));
    assert!(pipeline.cache_mut().is_empty());
}

#[test]
fn undecodable_photo_fails_its_slot_only() {
    let catalog = LayoutCatalog::builtin();
    let layout = catalog.get(3).unwrap();
    let mut pipeline = PhotoPipeline::with_cache(ImageCache::inline());
    let bad = Photo {
        id: PhotoId(1),
        source: ImageSource::from_bytes(b"garbage".to_vec()),
    };
    pipeline.sync(layout, &[bad, photo(2, 10, 10, Rgba8::WHITE)]);

    let states: Vec<_> = pipeline.slot_states().cloned().collect();
    assert!(matches!(states[0], SlotState::Failed));
    assert!(matches!(states[1], SlotState::Ready(_)));
    let crops = pipeline.crops(1.0);
    assert!(crops[0].is_none());
    assert!(crops[1].is_some());
}

#[test]
fn unchanged_slots_keep_their_crops() {
    let catalog = LayoutCatalog::builtin();
    let layout = catalog.get(3).unwrap();
    let mut pipeline = PhotoPipeline::with_cache(ImageCache::inline());
    let photos = vec![photo(1, 50, 50, Rgba8::BLACK)];
    pipeline.sync(layout, &photos);
    let before = pipeline.crops(1.0)[0].clone().unwrap();
    pipeline.sync(layout, &photos);
    let after = pipeline.crops(1.0)[0].clone().unwrap();
    assert!(std::sync::Arc::ptr_eq(&before.rgba8_premul, &after.rgba8_premul));
}

#[test]
fn decorations_are_evicted_when_replaced_or_cleared() {
    let catalog = LayoutCatalog::builtin();
    let layout = catalog.get(1).unwrap();
    let mut pipeline = PhotoPipeline::with_cache(ImageCache::inline());
    let shared = photo(1, 20, 20, Rgba8::opaque(9, 9, 9));
    let overlay = photo(2, 20, 20, Rgba8::opaque(8, 8, 8)).source;

    pipeline.sync(layout, std::slice::from_ref(&shared));
    pipeline.set_decorations([&shared.source, &overlay]);
    assert_eq!(pipeline.cache().len(), 2);

    // Still a slot photo, so only the overlay goes.
    pipeline.set_decorations(Vec::<&ImageSource>::new());
    assert_eq!(pipeline.cache().len(), 1);

    // Removing the photo while it is a decoration keeps it.
    pipeline.set_decorations([&shared.source]);
    pipeline.sync(layout, &[]);
    assert_eq!(pipeline.cache().len(), 1);

    pipeline.clear();
    assert!(pipeline.cache().is_empty());
}
