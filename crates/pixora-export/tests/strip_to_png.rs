//! Integration test: compose a strip from stored photos, decorate it, and export to PNG.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use futures::executor::block_on;
use image::{ImageEncoder, Rgba, RgbaImage};
use pixora_strip::{
    DataUrlLoader, Fonts, ImageRef, MemoryStore, Point, SessionStore, StripEditor, StripStyle,
};

fn photo(rgba: [u8; 4]) -> ImageRef {
    let img = RgbaImage::from_pixel(64, 48, Rgba(rgba));
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), 64, 48, image::ExtendedColorType::Rgba8)
        .unwrap();
    ImageRef::from_upload("capture.png", &buf).unwrap()
}

#[test]
fn stored_session_to_png() {
    // Layout page, then capture page.
    let mut store = SessionStore::new(MemoryStore::default());
    store.choose_layout(3).unwrap();
    store
        .save_photos(&[photo([200, 30, 30, 255]), photo([30, 200, 30, 255])])
        .unwrap();

    // Strip page.
    let session = store.load().unwrap();
    let fonts = Fonts::embedded().expect("bundled fonts should parse");
    let mut editor = StripEditor::from_session(&session, StripStyle::default(), fonts);
    assert_eq!(editor.layout().photo_count, 3);

    assert!(editor.set_background("#ffd1dc").unwrap().is_requested());
    let _ = editor.add_sticker("★");
    let _ = editor.press(Point::new(55.0, 60.0));
    let _ = editor.drag_to(Point::new(125.0, 410.0));
    let _ = editor.release();

    let rendered = block_on(editor.compositor().render(
        &DataUrlLoader,
        editor.images(),
        &editor.snapshot(),
    ))
    .expect("render should succeed");
    eprintln!(
        "Rendered {}x{} strip, slots {:?}",
        rendered.pixmap.width(),
        rendered.pixmap.height(),
        rendered.slots
    );

    let bytes = pixora_export::encode_png(&rendered.pixmap).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();

    assert_eq!(decoded.dimensions(), (210, 3 * 150 + 40));
    assert_eq!(decoded.get_pixel(105, 85).0, [200, 30, 30, 255]);
    assert_eq!(decoded.get_pixel(105, 235).0, [30, 200, 30, 255]);
    // Third slot has no photo: placeholder grey near its corner.
    assert_eq!(decoded.get_pixel(25, 325).0, [204, 204, 204, 255]);
    // Top margin shows the chosen background.
    assert_eq!(decoded.get_pixel(105, 5).0, [255, 209, 220, 255]);
    // The dragged sticker left the first slot.
    assert_eq!(decoded.get_pixel(60, 60).0, [200, 30, 30, 255]);

    let output_path = std::env::temp_dir().join("pixora-strip-output.png");
    std::fs::write(&output_path, &bytes).unwrap();
    eprintln!("PNG written to {output_path:?} ({} bytes)", bytes.len());
}
