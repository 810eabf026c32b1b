//! End-to-end editing scenarios: open, draw, undo, export.

use std::io::Cursor;

use glam::Vec2;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use markup::{ClientRect, PointerPhase, Session, SessionError, Tool, WidthClass};
use redline_config::{EditorConfig, ExportStrategy};

fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn white(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
}

fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    })
}

fn open(photo: &RgbaImage, config: EditorConfig) -> Session {
    let mut session =
        Session::open(encode_png(photo), Some("image/png"), Some("photo.png"), config).unwrap();
    let (width, height) = session.display_size();
    session.set_layout(ClientRect::new(0.0, 0.0, width as f32, height as f32));
    session
}

fn stroke(session: &mut Session, from: (f32, f32), to: (f32, f32)) {
    session.pointer(PointerPhase::Down, Vec2::new(from.0, from.1));
    session.pointer(PointerPhase::Move, Vec2::new(to.0, to.1));
    session.pointer(PointerPhase::Up, Vec2::new(to.0, to.1));
}

fn export(session: &mut Session) -> RgbaImage {
    let exported = session.export_now(Some("png")).unwrap();
    image::load_from_memory(&exported.data).unwrap().to_rgba8()
}

/// Coverage summed down a column, measured against a white photo
fn ink(image: &RgbaImage, x: u32) -> f32 {
    (0..image.height())
        .map(|y| (255 - image.get_pixel(x, y).0[1]) as f32 / 255.0)
        .sum()
}

#[test]
fn test_large_photo_stroke_width_scales() {
    let mut session = open(&white(4000, 3000), EditorConfig::with_display_caps(800, 600));
    assert!((session.scale().scale() - 0.2).abs() < 1e-6);
    assert_eq!(session.display_size(), (800, 600));

    // Medium at 800x600 is 5 display pixels
    session.set_width(WidthClass::Medium);
    stroke(&mut session, (100.0, 300.0), (700.0, 300.0));

    let output = export(&mut session);
    assert_eq!(output.dimensions(), (4000, 3000));
    let thickness = ink(&output, 2000);
    assert!((thickness - 25.0).abs() < 0.1, "thickness {thickness}");
    assert_eq!(output.get_pixel(2000, 1500).0, [255, 0, 0, 255]);
    assert_eq!(output.get_pixel(2000, 1000).0, [255, 255, 255, 255]);
}

#[test]
fn test_resample_export_keeps_resolution() {
    let mut config = EditorConfig::with_display_caps(300, 300);
    config.export.strategy = ExportStrategy::Resample;
    let mut session = open(&white(1001, 667), config);
    let (dw, dh) = session.display_size();
    assert_eq!(dw, 300);
    assert_eq!(dh, (667.0_f64 * 300.0 / 1001.0).round() as u32);

    session.set_width(WidthClass::Thick);
    stroke(&mut session, (20.0, 100.0), (280.0, 100.0));
    let output = export(&mut session);
    assert_eq!(output.dimensions(), (1001, 667));
    assert!(ink(&output, 500) > 8.0);
}

#[test]
fn test_three_strokes_two_undos_one_stroke() {
    let mut session = open(&white(800, 600), EditorConfig::with_display_caps(400, 300));
    stroke(&mut session, (20.0, 50.0), (380.0, 50.0));
    stroke(&mut session, (20.0, 150.0), (380.0, 150.0));
    stroke(&mut session, (20.0, 250.0), (380.0, 250.0));

    assert!(session.undo());
    assert!(session.undo());
    assert!(session.can_redo());

    session.set_tool(Tool::Rectangle);
    session.pointer(PointerPhase::Down, Vec2::new(100.0, 120.0));
    session.pointer(PointerPhase::Move, Vec2::new(300.0, 280.0));
    session.pointer(PointerPhase::Up, Vec2::ZERO);
    assert!(!session.can_redo());
    assert_eq!(session.annotations().len(), 2);

    let output = export(&mut session);
    let red = [255, 0, 0, 255];
    // First stroke and the rectangle survive; strokes two and three are gone
    assert_eq!(output.get_pixel(400, 100).0, red);
    assert_eq!(output.get_pixel(200, 400).0, red);
    assert_eq!(output.get_pixel(100, 300).0, [255, 255, 255, 255]);
    assert_eq!(output.get_pixel(700, 500).0, [255, 255, 255, 255]);
}

#[test]
fn test_clear_restores_original_pixels() {
    let photo = gradient(640, 480);
    let mut session = open(&photo, EditorConfig::with_display_caps(320, 240));
    let display_before = session.composite_display();

    stroke(&mut session, (10.0, 10.0), (300.0, 200.0));
    session.set_tool(Tool::Rectangle);
    session.pointer(PointerPhase::Down, Vec2::new(50.0, 50.0));
    session.pointer(PointerPhase::Move, Vec2::new(250.0, 180.0));
    session.pointer(PointerPhase::Up, Vec2::ZERO);
    assert_ne!(session.composite_display(), display_before);

    assert!(session.clear());
    assert_eq!(session.composite_display(), display_before);
    assert_eq!(export(&mut session), photo);

    // Clear is one undoable step
    assert!(session.undo());
    assert_eq!(session.annotations().len(), 2);
}

#[test]
fn test_eraser_reveals_photo_on_export() {
    let photo = gradient(600, 400);
    let mut session = open(&photo, EditorConfig::with_display_caps(300, 200));
    session.set_width(WidthClass::Thick);
    stroke(&mut session, (20.0, 100.0), (280.0, 100.0));

    session.set_tool(Tool::Eraser);
    stroke(&mut session, (150.0, 10.0), (150.0, 190.0));

    let output = export(&mut session);
    assert_eq!(output.get_pixel(300, 200), photo.get_pixel(300, 200));
    assert_eq!(output.get_pixel(100, 200).0, [255, 0, 0, 255]);
}

#[test]
fn test_undo_redo_pixel_identical() {
    let mut session = open(&gradient(300, 200), EditorConfig::with_display_caps(300, 200));
    let mut states = vec![session.composite_display()];
    for i in 0..4 {
        let y = 30.0 + i as f32 * 40.0;
        stroke(&mut session, (10.0, y), (290.0, y + 5.0));
        states.push(session.composite_display());
    }

    for expected in states.iter().rev().skip(1) {
        assert!(session.undo());
        assert_eq!(&session.composite_display(), expected);
    }
    assert!(!session.can_undo());

    for expected in states.iter().skip(1) {
        assert!(session.redo());
        assert_eq!(&session.composite_display(), expected);
    }
    assert!(!session.can_redo());
}

#[test]
fn test_rectangle_preview_single_outline() {
    let mut session = open(&white(400, 300), EditorConfig::with_display_caps(400, 300));
    session.set_tool(Tool::Rectangle);
    session.pointer(PointerPhase::Down, Vec2::new(20.0, 20.0));
    for step in 1..=20 {
        let t = step as f32 * 18.0;
        session.pointer(PointerPhase::Move, Vec2::new(20.0 + t, 20.0 + t * 0.7));
    }
    session.pointer(PointerPhase::Up, Vec2::ZERO);

    // Only the final outline (20,20)-(380,272) remains
    let display = session.composite_display();
    let marked_in_row = (0..400)
        .filter(|&x| display.get_pixel(x, 150).0 != [255, 255, 255, 255])
        .count();
    assert!(marked_in_row <= 8, "found {marked_in_row} marked pixels");
    assert_eq!(display.get_pixel(200, 200).0, [255, 255, 255, 255]);
}

#[test]
fn test_tap_leaves_visible_mark() {
    let mut session = open(&white(200, 200), EditorConfig::default());
    session.pointer(PointerPhase::Down, Vec2::new(100.5, 100.5));
    session.pointer(PointerPhase::Up, Vec2::new(100.5, 100.5));
    assert_eq!(session.composite_display().get_pixel(100, 100).0, [255, 0, 0, 255]);
}

#[test]
fn test_events_before_layout_are_dropped() {
    let mut session = Session::open(
        encode_png(&white(100, 100)),
        Some("image/png"),
        None,
        EditorConfig::default(),
    )
    .unwrap();
    session.pointer(PointerPhase::Down, Vec2::new(50.0, 50.0));
    session.pointer(PointerPhase::Move, Vec2::new(80.0, 50.0));
    session.pointer(PointerPhase::Up, Vec2::ZERO);
    assert!(!session.can_undo());
    assert!(!session.is_dirty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_async_save_full_resolution() {
    let mut session = open(&white(1200, 900), EditorConfig::with_display_caps(400, 300));
    stroke(&mut session, (10.0, 10.0), (390.0, 290.0));

    let exported = session.save(None).await.unwrap();
    assert_eq!((exported.width, exported.height), (1200, 900));
    assert_eq!(exported.file_name, "photo-edited.png");

    let pending = session.begin_save(None).unwrap();
    assert!(matches!(
        session.save(None).await,
        Err(SessionError::ExportInProgress)
    ));
    let outcome = pending.wait().await;
    assert!(session.finish_save(outcome).is_ok());
}
