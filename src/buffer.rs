use crate::error::{BlurError, BlurResult};

/// Interleaved RGBA8 pixels, row-major.
///
/// Channel `c` of pixel `(x, y)` lives at `data[(x + y * width) * 4 + c]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub const CHANNELS: usize = 4;

    pub fn new(width: u32, height: u32, data: Vec<u8>) -> BlurResult<Self> {
        let expected = expected_len(width, height)?;
        if data.len() != expected {
            return Err(BlurError::validation(format!(
                "pixel buffer expects {expected} bytes for {width}x{height} RGBA, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Fully transparent black buffer.
    pub fn blank(width: u32, height: u32) -> BlurResult<Self> {
        let len = expected_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Bytes of one row, `width * 4` long.
    pub(crate) fn row_stride(&self) -> usize {
        self.width as usize * Self::CHANNELS
    }

    pub(crate) fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, u8> {
        let stride = self.row_stride().max(1);
        self.data.chunks_exact_mut(stride)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8; 4]> {
        let idx = self.index_of(x, y)?;
        <&[u8; 4]>::try_from(&self.data[idx..idx + Self::CHANNELS]).ok()
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8; 4]> {
        let idx = self.index_of(x, y)?;
        <&mut [u8; 4]>::try_from(&mut self.data[idx..idx + Self::CHANNELS]).ok()
    }

    /// Signed lookup used by kernel taps; anything outside the image is `None`.
    pub fn pixel_at(&self, x: i64, y: i64) -> Option<&[u8; 4]> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        self.pixel(x, y)
    }

    fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((x as usize + y as usize * self.width as usize) * Self::CHANNELS)
    }
}

impl From<image::RgbaImage> for PixelBuffer {
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

impl TryFrom<PixelBuffer> for image::RgbaImage {
    type Error = BlurError;

    fn try_from(buf: PixelBuffer) -> BlurResult<Self> {
        let (width, height) = (buf.width, buf.height);
        image::RgbaImage::from_raw(width, height, buf.data).ok_or_else(|| {
            BlurError::validation(format!("pixel data does not fit a {width}x{height} image"))
        })
    }
}

fn expected_len(width: u32, height: u32) -> BlurResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(PixelBuffer::CHANNELS))
        .ok_or_else(|| BlurError::validation("pixel buffer size overflow"))
}
