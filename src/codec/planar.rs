use std::fmt;

/// One plane of a planar image, copied out of the source buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    pub data: Vec<u8>,
    pub row_stride: usize,
    pub pixel_stride: usize,
}

impl Plane {
    pub fn new(data: Vec<u8>, row_stride: usize, pixel_stride: usize) -> Self {
        Self {
            data,
            row_stride,
            pixel_stride,
        }
    }

    /// Copies a transient view; the source may be invalidated afterwards.
    pub fn copy_from(view: &[u8], row_stride: usize, pixel_stride: usize) -> Self {
        Self::new(view.to_vec(), row_stride, pixel_stride)
    }

    /// Number of bytes needed to address `rows` x `cols` samples.
    pub fn required_len(&self, rows: usize, cols: usize) -> usize {
        if rows == 0 || cols == 0 {
            return 0;
        }
        (rows - 1) * self.row_stride + (cols - 1) * self.pixel_stride + 1
    }
}

struct ReleaseHook(Box<dyn FnOnce() + Send>);

impl fmt::Debug for ReleaseHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReleaseHook")
    }
}

/// 4:2:0 planar image: full-resolution luma plus two quarter-resolution
/// chroma planes, each with its own strides.
///
/// An optional release hook closes the source handle. It runs exactly once,
/// when the image is dropped, whichever owner ends up holding it.
#[derive(Debug)]
pub struct PlanarImage {
    pub width: u32,
    pub height: u32,
    pub y: Plane,
    pub u: Plane,
    pub v: Plane,
    release: Option<ReleaseHook>,
}

impl PlanarImage {
    pub fn new(width: u32, height: u32, y: Plane, u: Plane, v: Plane) -> Self {
        Self {
            width,
            height,
            y,
            u,
            v,
            release: None,
        }
    }

    pub fn on_release<F>(mut self, hook: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.release = Some(ReleaseHook(Box::new(hook)));
        self
    }

    pub fn chroma_width(&self) -> usize {
        (self.width as usize + 1) / 2
    }

    pub fn chroma_height(&self) -> usize {
        (self.height as usize + 1) / 2
    }
}

impl Drop for PlanarImage {
    fn drop(&mut self) {
        if let Some(ReleaseHook(hook)) = self.release.take() {
            hook();
        }
    }
}

/// Image captured for a frame, named by the common-basis timestamp of that frame.
#[derive(Debug)]
pub struct ImagePayload {
    image: PlanarImage,
    global_ns: i64,
}

impl ImagePayload {
    pub fn new(image: PlanarImage, global_ns: i64) -> Self {
        Self { image, global_ns }
    }

    pub fn image(&self) -> &PlanarImage {
        &self.image
    }

    pub fn global_ns(&self) -> i64 {
        self.global_ns
    }

    pub fn file_name(&self) -> String {
        format!("{}.jpg", self.global_ns)
    }

    /// Ends the payload's life; the source handle is closed here.
    pub fn release(self) {
        drop(self);
    }
}
