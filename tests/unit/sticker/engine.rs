use super::*;
use crate::foundation::core::Rgba8;

fn img() -> DecodedImage {
    DecodedImage::solid(4, 2, Rgba8::opaque(200, 0, 0)).unwrap()
}

fn engine_with(center: (f64, f64), w: f64, h: f64, rot: f64) -> (StickerEngine, StickerId) {
    let mut e = StickerEngine::new();
    let id = e.add(img(), Point::new(center.0, center.1), w, h).unwrap();
    assert!(e.set_rotation(id, rot));
    (e, id)
}

fn close(a: Point, b: Point) -> bool {
    (a - b).hypot() < 1e-9
}

#[test]
fn resize_from_top_right_keeps_bottom_left_fixed() {
    let (mut e, id) = engine_with((100.0, 100.0), 100.0, 50.0, 0.0);
    let bl_before = e.sticker(id).unwrap().corners()[Corner::BottomLeft.index()];

    assert!(e.pointer_down(Point::new(150.0, 75.0)));
    assert!(matches!(
        e.gesture(),
        Gesture::Resize {
            corner: Corner::TopRight,
            ..
        }
    ));
    assert!(e.pointer_move(Point::new(170.0, 75.0)));
    e.pointer_up();

    let s = e.sticker(id).unwrap();
    assert!((s.width - 120.0).abs() < 1e-9);
    assert!((s.height - 60.0).abs() < 1e-9);
    assert!(close(s.center, Point::new(110.0, 95.0)));
    assert!(close(s.corners()[Corner::BottomLeft.index()], bl_before));
    assert!(close(bl_before, Point::new(50.0, 125.0)));
}

#[test]
fn resize_under_rotation_anchors_the_opposite_corner() {
    let (mut e, id) = engine_with((100.0, 100.0), 100.0, 50.0, 90.0);
    let tl_before = e.sticker(id).unwrap().corners()[Corner::TopLeft.index()];
    assert!(close(tl_before, Point::new(125.0, 50.0)));

    e.pointer_down(Point::new(75.0, 150.0));
    assert!(matches!(
        e.gesture(),
        Gesture::Resize {
            corner: Corner::BottomRight,
            ..
        }
    ));
    e.pointer_move(Point::new(75.0, 170.0));

    let s = e.sticker(id).unwrap();
    assert!((s.width - 120.0).abs() < 1e-9);
    assert!(close(s.corners()[Corner::TopLeft.index()], tl_before));
}

#[test]
fn resize_clamps_to_minimum_and_keeps_aspect() {
    let (mut e, id) = engine_with((100.0, 100.0), 100.0, 50.0, 0.0);
    e.pointer_down(Point::new(150.0, 75.0));
    e.pointer_move(Point::new(-100.0, 75.0));
    let s = e.sticker(id).unwrap();
    assert_eq!(s.width, MIN_STICKER_SIZE);
    assert!((s.height - MIN_STICKER_SIZE / 2.0).abs() < 1e-9);
}

#[test]
fn move_uses_raw_canvas_delta_even_when_rotated() {
    let (mut e, id) = engine_with((100.0, 100.0), 100.0, 50.0, 90.0);
    e.pointer_down(Point::new(100.0, 100.0));
    assert!(matches!(e.gesture(), Gesture::Move { .. }));
    e.pointer_move(Point::new(110.0, 100.0));
    assert!(close(e.sticker(id).unwrap().center, Point::new(110.0, 100.0)));

    // Deltas are incremental: the remembered pointer advanced.
    e.pointer_move(Point::new(115.0, 103.0));
    assert!(close(e.sticker(id).unwrap().center, Point::new(115.0, 103.0)));
}

#[test]
fn rotate_follows_the_pointer_angle_around_the_center() {
    let (mut e, id) = engine_with((100.0, 100.0), 100.0, 50.0, 0.0);
    e.pointer_down(Point::new(150.0, 55.0));
    assert!(matches!(e.gesture(), Gesture::Rotate { .. }));

    // (50,-45) from the center turned a quarter clockwise is (45,50).
    e.pointer_move(Point::new(145.0, 150.0));
    let r = e.sticker(id).unwrap().rotation_deg;
    assert!((r - 90.0).abs() < 1e-9, "rotation {r}");
}

#[test]
fn full_turn_returns_to_start_rotation() {
    let (mut e, id) = engine_with((0.0, 0.0), 40.0, 40.0, 30.0);
    let start = e.sticker(id).unwrap().rotation_deg;
    let s = e.sticker(id).unwrap().clone();
    let handle = s.local_to_canvas() * Point::new(20.0, -40.0);
    e.pointer_down(handle);
    assert!(matches!(e.gesture(), Gesture::Rotate { .. }));

    let v = handle.to_vec2();
    for k in 1..=4 {
        let a = f64::from(k) * std::f64::consts::FRAC_PI_2;
        let p = crate::foundation::math::rotate_vec(v, a);
        e.pointer_move(p.to_point());
    }
    let end = e.sticker(id).unwrap().rotation_deg;
    let diff = (end - start).rem_euclid(360.0);
    assert!(diff.min(360.0 - diff) < 1e-9, "start {start} end {end}");
    assert!((0.0..360.0).contains(&end));
}

#[test]
fn topmost_sticker_wins_and_selection_keeps_order() {
    let mut e = StickerEngine::new();
    let a = e.add(img(), Point::new(100.0, 100.0), 80.0, 80.0).unwrap();
    let b = e.add(img(), Point::new(110.0, 110.0), 80.0, 80.0).unwrap();

    e.pointer_down(Point::new(105.0, 105.0));
    assert_eq!(e.selected_id(), Some(b));
    e.pointer_up();

    e.pointer_down(Point::new(65.0, 100.0));
    assert_eq!(e.selected_id(), Some(a));
    let order: Vec<_> = e.stickers().iter().map(|s| s.id).collect();
    assert_eq!(order, vec![a, b]);
}

#[test]
fn empty_click_clears_selection() {
    let (mut e, id) = engine_with((100.0, 100.0), 50.0, 50.0, 0.0);
    e.pointer_down(Point::new(100.0, 100.0));
    e.pointer_up();
    assert_eq!(e.selected_id(), Some(id));

    assert!(e.pointer_down(Point::new(500.0, 500.0)));
    assert_eq!(e.selected_id(), None);
    assert_eq!(e.gesture(), Gesture::Idle);
    assert!(!e.pointer_down(Point::new(500.0, 500.0)));
}

#[test]
fn delete_control_removes_without_starting_a_drag() {
    let (mut e, _) = engine_with((100.0, 100.0), 100.0, 50.0, 0.0);
    assert!(e.pointer_down(Point::new(30.0, 55.0)));
    assert!(e.stickers().is_empty());
    assert_eq!(e.selected_id(), None);
    assert_eq!(e.gesture(), Gesture::Idle);
    assert!(!e.pointer_move(Point::new(40.0, 60.0)));
}

#[test]
fn keyboard_delete_removes_selected() {
    let mut e = StickerEngine::new();
    let a = e.add(img(), Point::new(50.0, 50.0), 20.0, 20.0).unwrap();
    let _b = e.add(img(), Point::new(150.0, 150.0), 20.0, 20.0).unwrap();
    assert!(!e.delete_selected());

    assert!(e.select(Some(a)));
    assert!(e.delete_selected());
    assert_eq!(e.stickers().len(), 1);
    assert_eq!(e.selected_id(), None);
}

#[test]
fn pointer_up_and_leave_end_gestures_without_mutation() {
    let (mut e, id) = engine_with((100.0, 100.0), 50.0, 50.0, 0.0);
    e.pointer_down(Point::new(100.0, 100.0));
    e.pointer_leave();
    let before = e.sticker(id).unwrap().clone();
    assert!(!e.pointer_move(Point::new(300.0, 300.0)));
    assert_eq!(e.sticker(id).unwrap(), &before);
    assert_eq!(e.selected_id(), Some(id));
}

#[test]
fn rotation_entry_is_clamped_then_normalized() {
    let (mut e, id) = engine_with((0.0, 0.0), 10.0, 10.0, 0.0);
    assert!(e.set_rotation(id, 45.0));
    assert_eq!(e.sticker(id).unwrap().rotation_deg, 45.0);
    e.set_rotation(id, 400.0);
    assert_eq!(e.sticker(id).unwrap().rotation_deg, 0.0);
    e.set_rotation(id, -15.0);
    assert_eq!(e.sticker(id).unwrap().rotation_deg, 0.0);
    assert!(!e.set_rotation(id, f64::NAN));
}

#[test]
fn duplicate_offsets_and_goes_on_top() {
    let (mut e, id) = engine_with((40.0, 40.0), 30.0, 20.0, 15.0);
    let copy = e.duplicate(id).unwrap();
    assert_ne!(copy, id);
    let top = e.stickers().last().unwrap();
    assert_eq!(top.id, copy);
    assert!(close(top.center, Point::new(50.0, 50.0)));
    assert_eq!(top.rotation_deg, 15.0);
    assert_eq!((top.width, top.height), (30.0, 20.0));
}

#[test]
fn reordering_splices_the_list() {
    let mut e = StickerEngine::new();
    let a = e.add(img(), Point::new(0.0, 0.0), 10.0, 10.0).unwrap();
    let b = e.add(img(), Point::new(0.0, 0.0), 10.0, 10.0).unwrap();
    let c = e.add(img(), Point::new(0.0, 0.0), 10.0, 10.0).unwrap();
    let ids = |e: &StickerEngine| e.stickers().iter().map(|s| s.id).collect::<Vec<_>>();

    assert!(e.bring_to_front(a));
    assert_eq!(ids(&e), vec![b, c, a]);
    assert!(e.send_to_back(c));
    assert_eq!(ids(&e), vec![c, b, a]);
}

#[test]
fn missing_ids_are_no_ops() {
    let (mut e, id) = engine_with((0.0, 0.0), 10.0, 10.0, 0.0);
    let ghost = StickerId(999);
    assert!(!e.delete(ghost));
    assert!(!e.select(Some(ghost)));
    assert!(!e.bring_to_front(ghost));
    assert!(!e.send_to_back(ghost));
    assert!(!e.set_rotation(ghost, 10.0));
    assert!(e.duplicate(ghost).is_none());
    assert_eq!(e.stickers().len(), 1);
    assert_eq!(e.stickers()[0].id, id);
}

#[test]
fn center_bounds_are_opt_in() {
    let (mut e, id) = engine_with((100.0, 100.0), 20.0, 20.0, 0.0);
    e.pointer_down(Point::new(100.0, 100.0));
    e.pointer_move(Point::new(-500.0, 100.0));
    assert_eq!(e.sticker(id).unwrap().center.x, -500.0);

    e.set_center_bounds(Some(Rect::new(0.0, 0.0, 288.0, 864.0)));
    assert_eq!(e.sticker(id).unwrap().center.x, 0.0);
    e.pointer_move(Point::new(-900.0, 2000.0));
    let c = e.sticker(id).unwrap().center;
    assert_eq!((c.x, c.y), (0.0, 864.0));
}

#[test]
fn replacing_the_stack_drops_stale_selection() {
    let (mut e, id) = engine_with((0.0, 0.0), 10.0, 10.0, 0.0);
    e.select(Some(id));
    e.set_stickers(Vec::new());
    assert_eq!(e.selected_id(), None);
    let next = e.add(img(), Point::new(1.0, 1.0), 5.0, 5.0).unwrap();
    assert_ne!(next, id);
}
