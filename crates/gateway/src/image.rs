//! Upload re-encoding for vision requests.
//!
//! Vision endpoints accept images inline as data URIs. Uploads arrive as
//! png, jpeg or webp; they are normalised to RGB JPEG before base64
//! packing so the payload format is always the same.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;

/// Data URI prefix of every encoded upload.
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// JPEG quality used for re-encoding.
const JPEG_QUALITY: u8 = 85;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Image is empty")]
    Empty,

    #[error("Unsupported or corrupt image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode JPEG: {0}")]
    Encode(#[source] image::ImageError),
}

/// Decode `bytes`, re-encode as JPEG and return a base64 data URI.
pub fn encode_jpeg_data_uri(bytes: &[u8]) -> Result<String, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::Empty);
    }

    let decoded = image::load_from_memory(bytes).map_err(ImageError::Decode)?;
    // JPEG has no alpha channel.
    let rgb = decoded.to_rgb8();

    let mut jpeg = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(ImageError::Encode)?;

    let jpeg = jpeg.into_inner();
    tracing::debug!(
        input_bytes = bytes.len(),
        jpeg_bytes = jpeg.len(),
        "Re-encoded upload as JPEG"
    );

    Ok(format!("{JPEG_DATA_URI_PREFIX}{}", STANDARD.encode(jpeg)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(8, 8, Rgba([40, 160, 40, 200]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn png_is_reencoded_as_jpeg_data_uri() {
        let uri = encode_jpeg_data_uri(&png_bytes()).unwrap();
        assert!(uri.starts_with(JPEG_DATA_URI_PREFIX));

        let decoded = STANDARD.decode(&uri[JPEG_DATA_URI_PREFIX.len()..]).unwrap();
        // JPEG SOI marker.
        assert_eq!(&decoded[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn empty_upload_is_rejected() {
        assert!(matches!(encode_jpeg_data_uri(&[]), Err(ImageError::Empty)));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            encode_jpeg_data_uri(b"definitely not an image"),
            Err(ImageError::Decode(_))
        ));
    }
}
