use std::io::Cursor;

use super::*;
use crate::foundation::core::Rgba8;

fn encode_png(width: u32, height: u32, rgba: Vec<u8>) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(width, height, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_dimensions_and_premul() {
    let buf = encode_png(1, 1, vec![100u8, 50u8, 200u8, 128u8]);
    let decoded = decode_image(&buf).unwrap();
    assert_eq!(decoded.width, 1);
    assert_eq!(decoded.height, 1);
    assert_eq!(
        decoded.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_jpeg_is_opaque() {
    let img = image::RgbImage::from_pixel(8, 4, image::Rgb([10, 200, 30]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .unwrap();
    let decoded = decode_image(&buf).unwrap();
    assert_eq!((decoded.width, decoded.height), (8, 4));
    assert_eq!(decoded.pixel(3, 2).unwrap()[3], 255);
}

#[test]
fn decode_svg_rasterizes_at_intrinsic_size() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="6" height="3">
        <rect width="6" height="3" fill="#ff0000"/></svg>"##;
    let decoded = decode_image(svg).unwrap();
    assert_eq!((decoded.width, decoded.height), (6, 3));
    assert_eq!(decoded.pixel(2, 1).unwrap(), [255, 0, 0, 255]);

    assert!(decode_svg(br#"<svg"#).is_err());
}

#[test]
fn garbage_and_empty_are_decode_errors() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(err.is_decode());
    assert!(decode_image(&[]).unwrap_err().is_decode());
}

#[test]
fn buffer_length_is_checked() {
    assert!(DecodedImage::from_premul(2, 2, vec![0; 15]).is_err());
    assert!(DecodedImage::from_premul(0, 2, vec![]).is_err());
    let img = DecodedImage::solid(2, 2, Rgba8::opaque(1, 2, 3)).unwrap();
    assert_eq!(img.pixel(1, 1), Some([1, 2, 3, 255]));
    assert_eq!(img.pixel(2, 0), None);
}
