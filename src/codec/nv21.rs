use crate::codec::planar::{PlanarImage, Plane};
use crate::error::{RecorderError, Result};

fn check_plane(name: &str, plane: &Plane, rows: usize, cols: usize) -> Result<()> {
    if plane.pixel_stride == 0 {
        return Err(RecorderError::InvalidImage(format!("{} plane has zero pixel stride", name)));
    }
    let needed = plane.required_len(rows, cols);
    if plane.data.len() < needed {
        return Err(RecorderError::InvalidImage(format!(
            "{} plane holds {} bytes, {}x{} samples need {}",
            name,
            plane.data.len(),
            cols,
            rows,
            needed
        )));
    }
    Ok(())
}

/// Packed length of a `width` x `height` image: luma followed by VU pairs.
pub fn packed_len(width: usize, height: usize) -> usize {
    let chroma = ((width + 1) / 2) * ((height + 1) / 2);
    width * height + 2 * chroma
}

/// Repacks a planar 4:2:0 image into NV21 (Y plane, then interleaved V,U).
///
/// Every sample is addressed through its plane's row and pixel strides; rows
/// may be padded and chroma planes may alias one interleaved buffer.
pub fn pack_nv21(image: &PlanarImage) -> Result<Vec<u8>> {
    let width = image.width as usize;
    let height = image.height as usize;
    let chroma_w = image.chroma_width();
    let chroma_h = image.chroma_height();

    check_plane("Y", &image.y, height, width)?;
    check_plane("U", &image.u, chroma_h, chroma_w)?;
    check_plane("V", &image.v, chroma_h, chroma_w)?;

    let mut out = Vec::with_capacity(packed_len(width, height));

    // Luma
    if image.y.pixel_stride == 1 {
        for row in 0..height {
            let start = row * image.y.row_stride;
            out.extend_from_slice(&image.y.data[start..start + width]);
        }
    } else {
        for row in 0..height {
            let base = row * image.y.row_stride;
            for col in 0..width {
                out.push(image.y.data[base + col * image.y.pixel_stride]);
            }
        }
    }

    // Chroma, V first
    for row in 0..chroma_h {
        let u_base = row * image.u.row_stride;
        let v_base = row * image.v.row_stride;
        for col in 0..chroma_w {
            out.push(image.v.data[v_base + col * image.v.pixel_stride]);
            out.push(image.u.data[u_base + col * image.u.pixel_stride]);
        }
    }

    Ok(out)
}
