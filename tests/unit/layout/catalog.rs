use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn builtin_vertical_strip_geometry() {
    let catalog = LayoutCatalog::builtin();
    let l = catalog.get(1).unwrap();
    assert_eq!(l.canvas(), Canvas::new(288, 864).unwrap());
    assert_eq!(l.max_photos(), 4);
    assert_eq!(l.label(), "4 Photos (Vertical)");

    let r0 = l.rects()[0];
    assert!(approx(r0.x0, 14.4));
    assert!(approx(r0.y0, 14.4));
    assert!(approx(r0.width(), 288.0 - 28.8));
    // 864 - 14.4 top - 110.4 caption band - 3 gaps of 9.6, split four ways
    assert!(approx(r0.height(), (864.0 - 124.8 - 28.8) / 4.0));

    let r1 = l.rects()[1];
    assert!(approx(r1.y0 - r0.y1, 9.6));
}

#[test]
fn every_builtin_has_one_rect_per_photo_inside_canvas() {
    let catalog = LayoutCatalog::builtin();
    assert_eq!(catalog.len(), 6);
    for l in catalog.iter() {
        let bounds = l.canvas().rect();
        assert!(l.max_photos() > 0);
        for r in l.rects() {
            assert!(r.x0 >= 0.0 && r.y0 >= 0.0);
            assert!(r.x1 <= bounds.x1 + 1e-6 && r.y1 <= bounds.y1 + 1e-6);
        }
    }
}

#[test]
fn grid_slots_are_row_major() {
    let catalog = LayoutCatalog::builtin();
    let l = catalog.get(5).unwrap();
    let r = l.rects();
    assert_eq!(r.len(), 4);
    assert!(approx(r[0].y0, r[1].y0));
    assert!(r[1].x0 > r[0].x0);
    assert!(approx(r[2].x0, r[0].x0));
    assert!(r[2].y0 > r[0].y0);
}

#[test]
fn horizontal_caption_band_is_on_the_right() {
    let catalog = LayoutCatalog::builtin();
    let l = catalog.get(4).unwrap();
    let last = l.rects()[2];
    assert!(approx(f64::from(l.canvas().width) - last.x1, 1.15 * 96.0));
    assert!(approx(last.y0, 14.4));
}

#[test]
fn spec_validation_rejects_bad_inputs() {
    let mut spec = LayoutSpec {
        max_photos: 5,
        width: 200.0,
        height: 200.0,
        unit: Unit::Px,
        arrangement: Arrangement::Grid {
            columns: 2,
            rows: 2,
        },
        gap: Some(0.0),
        padding: Some(Edges::uniform(0.0)),
    };
    assert!(Layout::from_spec(9, &spec).is_err());

    spec.max_photos = 0;
    assert!(Layout::from_spec(9, &spec).is_err());

    spec.max_photos = 4;
    spec.padding = Some(Edges::uniform(150.0));
    assert!(Layout::from_spec(9, &spec).is_err());

    spec.padding = Some(Edges::uniform(0.0));
    let l = Layout::from_spec(9, &spec).unwrap();
    assert_eq!(l.rects()[3], Rect::new(100.0, 100.0, 200.0, 200.0));
}

#[test]
fn explicit_rects_must_fit_canvas() {
    let canvas = Canvas::new(100, 100).unwrap();
    assert!(Layout::new(1, canvas, vec![]).is_err());
    assert!(Layout::new(1, canvas, vec![Rect::new(50.0, 50.0, 120.0, 90.0)]).is_err());
    let l = Layout::new(1, canvas, vec![Rect::new(0.0, 0.0, 40.0, 30.0)]).unwrap();
    assert_eq!(l.label(), "1 Photo (Custom)");
}

#[test]
fn catalog_from_json_and_unknown_id() {
    let json = r#"{
        "7": { "max_photos": 2, "width": 400, "height": 300, "unit": "px",
               "arrangement": { "kind": "horizontal" }, "gap": 10,
               "padding": { "top": 0, "right": 0, "bottom": 0, "left": 0 } }
    }"#;
    let catalog = LayoutCatalog::from_json_str(json).unwrap();
    let l = catalog.get(7).unwrap();
    assert_eq!(l.rects()[1], Rect::new(205.0, 0.0, 400.0, 300.0));
    assert!(catalog.get(1).is_err());

    assert!(LayoutCatalog::from_json_str(r#"{"1": {"bogus": true}}"#).is_err());
}
