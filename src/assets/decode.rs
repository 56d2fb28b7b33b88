use std::io::Cursor;
use std::path::Path;

use anyhow::Context;

use crate::foundation::core::Rgba;
use crate::foundation::error::{TexError, TexResult};
use crate::render::combine::LinearImage;

/// Decode encoded image bytes into straight-alpha float RGBA.
pub fn decode_image(bytes: &[u8]) -> TexResult<LinearImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(from_dynamic(&dyn_img))
}

/// Read and decode an image file; the format is guessed from its contents.
pub fn load_image(path: &Path) -> TexResult<LinearImage> {
    let dyn_img = image::ImageReader::open(path)
        .with_context(|| format!("open image '{}'", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("sniff image format '{}'", path.display()))?
        .decode()
        .with_context(|| format!("decode image '{}'", path.display()))?;
    Ok(from_dynamic(&dyn_img))
}

/// Quantize to RGBA8 and encode as PNG.
pub fn encode_png(img: &LinearImage) -> TexResult<Vec<u8>> {
    let mut buf = Vec::new();
    to_rgba8_image(img)?
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

/// Quantize to RGBA8 and write to `path`; the format follows the file extension.
pub fn save_image(img: &LinearImage, path: &Path) -> TexResult<()> {
    to_rgba8_image(img)?
        .save(path)
        .with_context(|| format!("write image '{}'", path.display()))?;
    Ok(())
}

fn from_dynamic(dyn_img: &image::DynamicImage) -> LinearImage {
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = rgba.pixels().map(|p| Rgba::from_rgba8(p.0)).collect();
    LinearImage {
        width,
        height,
        pixels,
    }
}

fn to_rgba8_image(img: &LinearImage) -> TexResult<image::RgbaImage> {
    let raw: Vec<u8> = img.pixels.iter().flat_map(|p| p.to_rgba8()).collect();
    image::RgbaImage::from_raw(img.width, img.height, raw).ok_or_else(|| {
        TexError::image(format!(
            "pixel buffer does not match {}x{}",
            img.width, img.height
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
