#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

pub fn solid(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
}

pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("encode fixture image");
    bytes
}

pub fn ico_bytes(size: u32, color: [u8; 4]) -> Vec<u8> {
    encode(&solid(size, size, color), ImageFormat::Ico)
}

pub fn png_bytes(size: u32, color: [u8; 4]) -> Vec<u8> {
    encode(&solid(size, size, color), ImageFormat::Png)
}

pub fn page_with_icon(href: &str) -> String {
    format!(
        r#"<html><head><title>t</title><link rel="stylesheet" href="/s.css"><link rel="shortcut icon" href="{href}"></head><body>hi</body></html>"#
    )
}

pub fn page_with_refresh(content: &str) -> String {
    format!(
        r#"<html><head><meta http-equiv="refresh" content="{content}"></head><body>moved</body></html>"#
    )
}

pub const PLAIN_PAGE: &str = "<html><head><title>plain</title></head><body>no icon</body></html>";
