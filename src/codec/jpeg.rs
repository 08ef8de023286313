use image::codecs::jpeg::JpegEncoder;
use image::ColorType;
use std::path::Path;

use crate::codec::nv21::{pack_nv21, packed_len};
use crate::codec::planar::PlanarImage;
use crate::error::{RecorderError, Result};

pub const DEFAULT_QUALITY: u8 = 90;

#[inline]
fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Full-range BT.601 conversion of an NV21 buffer to packed RGB8.
pub fn nv21_to_rgb(nv21: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    if nv21.len() < packed_len(width, height) {
        return Err(RecorderError::InvalidImage(format!(
            "NV21 buffer holds {} bytes, {}x{} needs {}",
            nv21.len(),
            width,
            height,
            packed_len(width, height)
        )));
    }

    let chroma_w = (width + 1) / 2;
    let (luma, chroma) = nv21.split_at(width * height);
    let mut rgb = Vec::with_capacity(width * height * 3);

    for row in 0..height {
        let chroma_row = (row / 2) * chroma_w * 2;
        for col in 0..width {
            let y = luma[row * width + col] as f32;
            let idx = chroma_row + (col / 2) * 2;
            let v = chroma[idx] as f32 - 128.0;
            let u = chroma[idx + 1] as f32 - 128.0;

            rgb.push(clamp_u8(y + 1.402 * v));
            rgb.push(clamp_u8(y - 0.344_136 * u - 0.714_136 * v));
            rgb.push(clamp_u8(y + 1.772 * u));
        }
    }

    Ok(rgb)
}

/// Planar image -> NV21 -> RGB -> JPEG byte stream.
pub fn encode_jpeg(image: &PlanarImage, quality: u8) -> Result<Vec<u8>> {
    let width = image.width as usize;
    let height = image.height as usize;
    let nv21 = pack_nv21(image)?;
    let rgb = nv21_to_rgb(&nv21, width, height)?;

    let mut bytes = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
        encoder.encode(&rgb, image.width, image.height, ColorType::Rgb8)?;
    }
    Ok(bytes)
}

/// Encodes the whole file in memory first, then writes it in one call.
pub fn write_jpeg(path: &Path, image: &PlanarImage, quality: u8) -> Result<usize> {
    let bytes = encode_jpeg(image, quality)?;
    std::fs::write(path, &bytes).map_err(|e| RecorderError::io(path, e))?;
    Ok(bytes.len())
}
