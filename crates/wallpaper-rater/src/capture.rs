//! Image decoding and thumbnail generation.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::types::{ImageRef, ImageSource, RaterError, RaterResult};

/// Maximum thumbnail dimension (width or height).
const MAX_THUMBNAIL_SIZE: u32 = 256;

/// JPEG quality for thumbnails.
const THUMBNAIL_QUALITY: u8 = 85;

/// Decode raw encoded bytes, keeping them for later display.
pub fn load_bytes(bytes: Vec<u8>, name: &str) -> RaterResult<(DynamicImage, ImageRef)> {
    let img = image::load_from_memory(&bytes)?;
    let reference = ImageRef::new(
        ImageSource::Bytes {
            name: name.to_string(),
        },
        bytes,
    );
    Ok((img, reference))
}

/// Read and decode an image file.
pub fn load_file(path: &str) -> RaterResult<(DynamicImage, ImageRef)> {
    let bytes = std::fs::read(path)?;
    let img = image::load_from_memory(&bytes)?;
    let reference = ImageRef::new(
        ImageSource::File {
            path: path.to_string(),
        },
        bytes,
    );
    Ok((img, reference))
}

/// Decode base64-encoded image data.
pub fn load_base64(data: &str, mime: &str) -> RaterResult<(DynamicImage, ImageRef)> {
    use base64::Engine;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| RaterError::InvalidInput(format!("Invalid base64: {e}")))?;

    let format = match mime {
        "image/png" => Some(ImageFormat::Png),
        "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
        "image/webp" => Some(ImageFormat::WebP),
        "image/gif" => Some(ImageFormat::Gif),
        _ => None,
    };

    let img = if let Some(fmt) = format {
        image::load_from_memory_with_format(&bytes, fmt)?
    } else {
        image::load_from_memory(&bytes)?
    };

    let reference = ImageRef::new(
        ImageSource::Base64 {
            mime: mime.to_string(),
        },
        bytes,
    );
    Ok((img, reference))
}

/// Re-encode a retained image as a JPEG no larger than 256 px on either side.
///
/// Smaller images keep their size.
pub fn thumbnail_jpeg(reference: &ImageRef) -> RaterResult<Vec<u8>> {
    let img = image::load_from_memory(&reference.bytes)?;
    let (w, h) = img.dimensions();
    let fitted = if w.max(h) > MAX_THUMBNAIL_SIZE {
        img.thumbnail(MAX_THUMBNAIL_SIZE, MAX_THUMBNAIL_SIZE)
    } else {
        img
    };

    let mut buf = Vec::new();
    fitted
        .to_rgb8()
        .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, THUMBNAIL_QUALITY))?;
    tracing::debug!(
        "Thumbnail of {} is {}x{}, {} bytes",
        reference.source,
        fitted.width(),
        fitted.height(),
        buf.len()
    );
    Ok(buf)
}

/// Whether a path names a wallpaper the picker offers: PNG or JPEG.
///
/// Decoding accepts any format `image` understands; this only narrows file
/// suggestions.
pub fn is_supported_format(path: impl AsRef<Path>) -> bool {
    matches!(
        ImageFormat::from_path(path),
        Ok(ImageFormat::Png | ImageFormat::Jpeg)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn png_bytes(img: &DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        img.write_with_encoder(encoder).unwrap();
        buf
    }

    #[test]
    fn test_load_bytes_keeps_original() {
        let bytes = png_bytes(&DynamicImage::new_rgb8(4, 3));
        let (img, reference) = load_bytes(bytes.clone(), "upload.png").unwrap();
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(reference.bytes, bytes);
        assert_eq!(reference.source.to_string(), "upload.png");
    }

    #[test]
    fn test_load_bytes_rejects_garbage() {
        let err = load_bytes(b"definitely not an image".to_vec(), "x.png").unwrap_err();
        assert!(matches!(err, RaterError::Decode(_)));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        std::fs::write(&path, png_bytes(&DynamicImage::new_rgb8(2, 2))).unwrap();

        let (img, reference) = load_file(path.to_str().unwrap()).unwrap();
        assert_eq!(img.dimensions(), (2, 2));
        assert!(matches!(reference.source, ImageSource::File { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_file("/nonexistent/wallpaper.png").unwrap_err();
        assert!(matches!(err, RaterError::Io(_)));
    }

    #[test]
    fn test_load_base64() {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(png_bytes(&DynamicImage::new_rgb8(5, 5)));
        let (img, reference) = load_base64(&encoded, "image/png").unwrap();
        assert_eq!(img.dimensions(), (5, 5));
        assert_eq!(reference.source.to_string(), "<base64 image/png>");

        let err = load_base64("!!not base64!!", "image/png").unwrap_err();
        assert!(matches!(err, RaterError::InvalidInput(_)));
    }

    #[test]
    fn test_thumbnail_fits_large_image() {
        let (_, reference) =
            load_bytes(png_bytes(&DynamicImage::new_rgb8(2000, 1000)), "wide.png").unwrap();
        let thumb = thumbnail_jpeg(&reference).unwrap();

        let loaded = image::load_from_memory_with_format(&thumb, ImageFormat::Jpeg).unwrap();
        assert_eq!(loaded.dimensions(), (MAX_THUMBNAIL_SIZE, MAX_THUMBNAIL_SIZE / 2));
    }

    #[test]
    fn test_thumbnail_keeps_small_image_size() {
        let (_, reference) =
            load_bytes(png_bytes(&DynamicImage::new_rgb8(40, 30)), "small.png").unwrap();
        let loaded = image::load_from_memory(&thumbnail_jpeg(&reference).unwrap()).unwrap();
        assert_eq!(loaded.dimensions(), (40, 30));
    }

    #[test]
    fn test_thumbnail_of_corrupt_bytes_fails() {
        let reference = ImageRef::new(ImageSource::Bytes { name: "bad".into() }, vec![1, 2, 3]);
        assert!(matches!(thumbnail_jpeg(&reference), Err(RaterError::Decode(_))));
    }

    #[test]
    fn test_supported_formats() {
        assert!(is_supported_format("wall.png"));
        assert!(is_supported_format("wall.JPG"));
        assert!(is_supported_format("wall.jpeg"));
        assert!(!is_supported_format("wall.webp"));
        assert!(!is_supported_format("wall.gif"));
        assert!(!is_supported_format("wall.txt"));
        assert!(!is_supported_format("wall"));
    }
}
