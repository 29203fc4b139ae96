use std::path::Path;

use crate::{
    buffer::PixelBuffer,
    error::{BlurError, BlurResult},
};

/// Decodes any format the `image` crate recognises into RGBA8.
pub fn load(path: &Path) -> BlurResult<PixelBuffer> {
    let dyn_img = image::open(path)
        .map_err(|e| BlurError::decode(format!("'{}': {e}", path.display())))?;
    let rgba = dyn_img.to_rgba8();
    tracing::debug!(
        path = %path.display(),
        width = rgba.width(),
        height = rgba.height(),
        "decoded image"
    );
    Ok(PixelBuffer::from(rgba))
}

/// Decodes an in-memory encoded image into RGBA8.
pub fn load_from_memory(bytes: &[u8]) -> BlurResult<PixelBuffer> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| BlurError::decode(format!("in-memory image: {e}")))?;
    Ok(PixelBuffer::from(dyn_img.to_rgba8()))
}

/// Writes `buf` as a PNG, creating the parent directory if needed.
pub fn save_png(path: &Path, buf: &PixelBuffer) -> BlurResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            BlurError::encode(format!("create output dir '{}': {e}", parent.display()))
        })?;
    }

    image::save_buffer_with_format(
        path,
        buf.as_bytes(),
        buf.width(),
        buf.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| BlurError::encode(format!("write png '{}': {e}", path.display())))?;

    tracing::debug!(path = %path.display(), "wrote png");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn load_from_memory_decodes_png_as_rgba() {
        let img = image::RgbaImage::from_raw(2, 1, vec![10, 20, 30, 40, 50, 60, 70, 80]).unwrap();
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let buf = load_from_memory(&bytes).unwrap();
        assert_eq!((buf.width(), buf.height()), (2, 1));
        assert_eq!(buf.as_bytes(), &[10, 20, 30, 40, 50, 60, 70, 80]);
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = load_from_memory(b"definitely not an image").unwrap_err();
        assert!(matches!(err, BlurError::Decode(_)));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = load(Path::new("target/io_tests/missing.png")).unwrap_err();
        assert!(matches!(err, BlurError::Decode(_)));
    }

    #[test]
    fn save_then_load_preserves_pixels() {
        let dir = Path::new("target").join("io_tests");
        let path = dir.join("roundtrip.png");
        let _ = std::fs::remove_file(&path);

        let data: Vec<u8> = (0..3 * 2 * 4).map(|i| (i * 11) as u8).collect();
        let buf = PixelBuffer::new(3, 2, data).unwrap();
        save_png(&path, &buf).unwrap();

        let back = load(&path).unwrap();
        assert_eq!(back, buf);
    }

    #[test]
    fn unwritable_target_is_an_encode_error() {
        let dir = Path::new("target").join("io_tests");
        std::fs::create_dir_all(&dir).unwrap();
        // A directory cannot be opened as an output file.
        let buf = PixelBuffer::blank(1, 1).unwrap();
        let err = save_png(&dir, &buf).unwrap_err();
        assert!(matches!(err, BlurError::Encode(_)));
    }
}
