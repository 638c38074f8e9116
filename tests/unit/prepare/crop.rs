use super::*;
use crate::foundation::core::Rgba8;

#[test]
fn wide_source_is_cropped_horizontally() {
    let r = center_crop_region(1600, 900, 400.0, 300.0).unwrap();
    assert_eq!(
        r,
        CropRegion {
            x: 200.0,
            y: 0.0,
            width: 1200.0,
            height: 900.0
        }
    );
}

#[test]
fn tall_source_is_cropped_vertically() {
    let r = center_crop_region(900, 1600, 300.0, 300.0).unwrap();
    assert_eq!(r.x, 0.0);
    assert_eq!(r.width, 900.0);
    assert_eq!(r.height, 900.0);
    assert_eq!(r.y, 350.0);
}

#[test]
fn matching_aspect_keeps_everything() {
    let r = center_crop_region(800, 600, 400.0, 300.0).unwrap();
    assert_eq!((r.x, r.y, r.width, r.height), (0.0, 0.0, 800.0, 600.0));
}

#[test]
fn degenerate_inputs_are_rejected() {
    assert!(center_crop_region(0, 10, 1.0, 1.0).is_err());
    assert!(center_crop_region(10, 10, 0.0, 1.0).is_err());
    assert!(center_crop_region(10, 10, f64::NAN, 1.0).is_err());
}

#[test]
fn crop_output_matches_scaled_rect() {
    let src = DecodedImage::solid(1600, 900, Rgba8::opaque(40, 80, 120)).unwrap();
    let rect = Rect::new(10.0, 10.0, 410.0, 310.0);

    let out = crop_to_rect(&src, rect, 1.0).unwrap();
    assert_eq!((out.width, out.height), (400, 300));
    assert_eq!(out.pixel(200, 150), Some([40, 80, 120, 255]));

    let big = crop_to_rect(&src, rect, 3.5).unwrap();
    assert_eq!((big.width, big.height), (1400, 1050));
}

#[test]
fn crop_takes_the_center_band() {
    // Left and right thirds red, middle third green; a square crop sees only green.
    let mut rgba = Vec::new();
    for _y in 0..10 {
        for x in 0..30 {
            let px = if (10..20).contains(&x) {
                [0, 255, 0, 255]
            } else {
                [255, 0, 0, 255]
            };
            rgba.extend_from_slice(&px);
        }
    }
    let src = DecodedImage::from_straight(30, 10, rgba).unwrap();
    let out = crop_to_rect(&src, Rect::new(0.0, 0.0, 10.0, 10.0), 1.0).unwrap();
    assert_eq!((out.width, out.height), (10, 10));
    for x in 0..10 {
        assert_eq!(out.pixel(x, 5), Some([0, 255, 0, 255]));
    }
}

#[test]
fn crop_is_deterministic() {
    let src = DecodedImage::solid(37, 91, Rgba8::opaque(1, 2, 3)).unwrap();
    let rect = Rect::new(0.0, 0.0, 50.0, 20.0);
    assert_eq!(
        crop_to_rect(&src, rect, 2.0).unwrap(),
        crop_to_rect(&src, rect, 2.0).unwrap()
    );
    assert!(crop_to_rect(&src, rect, 0.0).is_err());
}
