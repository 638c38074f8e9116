use super::*;
use crate::assets::decode::DecodedImage;
use crate::foundation::core::Rgba8;
use crate::sticker::model::StickerId;

fn sticker(x: f64, y: f64, w: f64, h: f64, rot: f64) -> Sticker {
    let img = DecodedImage::solid(1, 1, Rgba8::WHITE).unwrap();
    Sticker::new(StickerId(1), img, Point::new(x, y), w, h)
        .unwrap()
        .with_rotation(rot)
}

#[test]
fn center_is_always_a_body_hit() {
    for rot in [0.0, 33.0, 90.0, 180.0, 271.5] {
        let s = sticker(140.0, 60.0, 80.0, 30.0, rot);
        let hit = hit_test(s.center, &s);
        assert!(hit.in_body, "rotation {rot}");
        assert_eq!(hit.part(), Some(HitPart::Body));
    }
}

#[test]
fn body_bounds_follow_rotation() {
    let s = sticker(100.0, 100.0, 100.0, 20.0, 90.0);
    // Rotated a quarter turn the long axis is vertical.
    assert!(hit_test(Point::new(100.0, 145.0), &s).in_body);
    assert!(!hit_test(Point::new(145.0, 100.0), &s).in_body);
}

#[test]
fn corner_indices_are_clockwise_from_top_left() {
    let s = sticker(100.0, 100.0, 100.0, 50.0, 0.0);
    let at = |x, y| hit_test(Point::new(x, y), &s).part();
    assert_eq!(at(52.0, 76.0), Some(HitPart::Resize(Corner::TopLeft)));
    assert_eq!(at(149.0, 75.0), Some(HitPart::Resize(Corner::TopRight)));
    assert_eq!(at(150.0, 125.0), Some(HitPart::Resize(Corner::BottomRight)));
    assert_eq!(at(50.0, 124.0), Some(HitPart::Resize(Corner::BottomLeft)));
    assert_eq!(Corner::BottomLeft.index(), 3);
    // Tolerance is strict.
    assert_eq!(at(40.0, 75.0), None);
}

#[test]
fn rotate_handle_sits_above_the_right_edge() {
    let s = sticker(100.0, 100.0, 100.0, 50.0, 0.0);
    let hit = hit_test(Point::new(150.0, 55.0), &s);
    assert!(hit.on_rotate);
    assert!(!hit.in_body);
    assert_eq!(hit.part(), Some(HitPart::Rotate));
}

#[test]
fn delete_control_is_up_and_left_and_wins() {
    let s = sticker(100.0, 100.0, 100.0, 50.0, 0.0);
    let hit = hit_test(Point::new(30.0, 55.0), &s);
    assert!(hit.on_delete);
    assert_eq!(hit.part(), Some(HitPart::Delete));
    assert!(!hit_test(Point::new(30.0, 66.0), &s).on_delete);
}

#[test]
fn small_sticker_overlaps_resolve_by_precedence() {
    // Handles overlap on tiny stickers; resize beats rotate beats body.
    let s = sticker(0.0, 0.0, 20.0, 20.0, 0.0);
    let hit = hit_test(Point::new(9.0, -9.0), &s);
    assert!(hit.in_body && hit.corner.is_some());
    assert_eq!(hit.part(), Some(HitPart::Resize(Corner::TopRight)));
}

#[test]
fn miss_reports_nothing() {
    let s = sticker(100.0, 100.0, 100.0, 50.0, 45.0);
    let hit = hit_test(Point::new(400.0, 400.0), &s);
    assert_eq!(hit, HitInfo::default());
    assert!(!hit.is_hit());
}
