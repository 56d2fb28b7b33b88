use std::io::Cursor;

use super::*;

fn png_bytes(rgba: Vec<u8>, width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(width, height, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_straight_alpha() {
    let buf = png_bytes(vec![255, 0, 51, 128, 0, 255, 0, 255], 2, 1);
    let img = decode_image(&buf).unwrap();
    assert_eq!((img.width, img.height), (2, 1));
    assert_eq!(img.pixels[0], Rgba::from_rgba8([255, 0, 51, 128]));
    assert_eq!(img.pixels[1], Rgba::new(0.0, 1.0, 0.0, 1.0));
}

#[test]
fn encode_png_roundtrips_rgba8() {
    let src = vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120, 130, 140, 150, 160];
    let img = decode_image(&png_bytes(src.clone(), 2, 2)).unwrap();
    let again = decode_image(&encode_png(&img).unwrap()).unwrap();
    let back: Vec<u8> = again.pixels.iter().flat_map(|p| p.to_rgba8()).collect();
    assert_eq!(back, src);
}

#[test]
fn garbage_is_an_error() {
    assert!(decode_image(b"definitely not an image").is_err());
}

#[test]
fn mismatched_buffer_is_an_image_error() {
    let img = LinearImage {
        width: 2,
        height: 2,
        pixels: vec![Rgba::TRANSPARENT],
    };
    assert!(matches!(encode_png(&img), Err(TexError::Image(_))));
}

#[test]
fn save_and_load_file() {
    let dir = std::env::temp_dir().join(format!("texformula-decode-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("out.png");

    let img = LinearImage::new(3, 1, Rgba::new(1.0, 0.0, 0.0, 1.0));
    save_image(&img, &path).unwrap();
    let loaded = load_image(&path).unwrap();
    assert_eq!(loaded, img);

    let _ = std::fs::remove_dir_all(&dir);
}
