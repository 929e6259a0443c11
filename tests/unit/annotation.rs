use super::*;
use crate::foundation::core::Size;

const RED: Rgba = [1.0, 0.0, 0.0, 1.0];

fn canvas(w: u32, h: u32) -> RgbaCanvas {
    RgbaCanvas::new(Size::new(w, h))
}

#[test]
fn shapes_at_filters_by_frame() {
    let mut set = AnnotationSet::new();
    set.push(Annotation {
        time: RationalTime::new(3.0, 24.0),
        all_frames: false,
        shapes: vec![Shape::Note { text: "a".into() }],
    });
    set.push(Annotation {
        time: RationalTime::new(0.0, 24.0),
        all_frames: true,
        shapes: vec![Shape::Note { text: "b".into() }],
    });
    assert_eq!(set.shapes_at(RationalTime::new(3.0, 24.0)).count(), 2);
    assert_eq!(set.shapes_at(RationalTime::new(4.0, 24.0)).count(), 1);
    // Same instant at a different rate still matches.
    assert_eq!(set.shapes_at(RationalTime::new(6000.0, 48000.0)).count(), 2);
}

#[test]
fn stroke_covers_its_path_only() {
    let mut c = canvas(20, 10);
    let stroke = Shape::Stroke {
        points: vec![Point::new(2.0, 5.0), Point::new(18.0, 5.0)],
        color: RED,
        width: 2.0,
    };
    rasterize([&stroke], Affine::IDENTITY, &mut c);
    let on = c.pixel(10, 4).unwrap();
    assert!(on[0] > 0.9 && on[3] > 0.9, "{on:?}");
    assert_eq!(c.pixel(10, 0).unwrap()[3], 0.0);
    assert_eq!(c.pixel(10, 9).unwrap()[3], 0.0);
}

#[test]
fn transform_scales_position_and_width() {
    let mut c = canvas(40, 40);
    let stroke = Shape::Stroke {
        points: vec![Point::new(1.0, 5.0), Point::new(9.0, 5.0)],
        color: RED,
        width: 1.0,
    };
    rasterize([&stroke], Affine::scale(4.0), &mut c);
    assert!(c.pixel(20, 20).unwrap()[3] > 0.9);
    assert!(c.pixel(20, 18).unwrap()[3] > 0.9);
    assert_eq!(c.pixel(20, 5).unwrap()[3], 0.0);
}

#[test]
fn filled_rectangle_and_hollow_circle() {
    let mut c = canvas(30, 30);
    let rect = Shape::Rectangle {
        rect: Rect::new(2.0, 2.0, 12.0, 12.0),
        color: RED,
        width: 1.0,
        filled: true,
    };
    let circle = Shape::Circle {
        center: Point::new(20.0, 20.0),
        radius: 6.0,
        color: RED,
        width: 1.0,
        filled: false,
    };
    rasterize([&rect, &circle], Affine::IDENTITY, &mut c);
    assert!(c.pixel(7, 7).unwrap()[3] > 0.99);
    // Ring only: the center stays empty, the rim is painted.
    assert_eq!(c.pixel(20, 20).unwrap()[3], 0.0);
    assert!(c.pixel(26, 20).unwrap()[3] > 0.4);
}

#[test]
fn arrow_draws_head_wings() {
    let mut c = canvas(40, 40);
    let arrow = Shape::Arrow {
        from: Point::new(5.0, 20.0),
        to: Point::new(35.0, 20.0),
        color: RED,
        width: 1.0,
    };
    rasterize([&arrow], Affine::IDENTITY, &mut c);
    assert!(c.pixel(20, 19).unwrap()[3] > 0.4);
    // Wings trail back from the tip above and below the shaft.
    assert!(c.pixel(32, 18).unwrap()[3] > 0.0);
    assert!(c.pixel(32, 21).unwrap()[3] > 0.0);
}

#[test]
fn text_and_notes_leave_the_canvas_untouched() {
    let mut c = canvas(8, 8);
    let text = Shape::Text {
        origin: Point::new(1.0, 1.0),
        text: "hello".into(),
        color: RED,
        size: 12.0,
    };
    let note = Shape::Note { text: "n".into() };
    assert!(!text.is_drawable() && !note.is_drawable());
    rasterize([&text, &note], Affine::IDENTITY, &mut c);
    assert!(c.pixels().iter().all(|p| p[3] == 0.0));
}

#[test]
fn annotation_set_reads_json() {
    let json = r#"[
        {"time": {"value": 1.0, "rate": 24.0}, "shapes": [
            {"kind": "circle", "center": {"x": 4.0, "y": 4.0}, "radius": 2.0,
             "color": [0.0, 1.0, 0.0, 1.0], "width": 1.0}
        ]}
    ]"#;
    let set: AnnotationSet = serde_json::from_str(json).unwrap();
    assert_eq!(set.annotations().len(), 1);
    assert!(!set.annotations()[0].all_frames);
    assert!(matches!(
        set.annotations()[0].shapes[0],
        Shape::Circle { filled: false, .. }
    ));
}

#[test]
fn text_and_notes_are_reported_as_skipped() {
    let mut c = canvas(8, 8);
    let shapes = [
        Shape::Text {
            origin: Point::new(1.0, 1.0),
            text: "take 3".into(),
            color: RED,
            size: 12.0,
        },
        Shape::Note {
            text: "fix the flicker".into(),
        },
        Shape::Rectangle {
            rect: Rect::new(0.0, 0.0, 2.0, 2.0),
            color: RED,
            width: 1.0,
            filled: true,
        },
    ];
    assert_eq!(rasterize(&shapes, Affine::IDENTITY, &mut c), 2);
    assert_eq!(c.pixel(1, 1), Some(RED));
    assert_eq!(c.pixel(6, 6).unwrap()[3], 0.0);
}
