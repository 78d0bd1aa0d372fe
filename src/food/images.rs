use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ImageError {
    #[error("image is {size} bytes, must be under {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("not an image (declared type: {0})")]
    NotAnImage(String),
    #[error("empty upload")]
    Empty,
}

fn mime_for(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::Tiff => Some("image/tiff"),
        ImageFormat::Avif => Some("image/avif"),
        _ => None,
    }
}

/// Sniffs the payload; a declared `image/*` type is trusted for formats the
/// sniffer does not know (HEIC from phones, for instance).
pub fn detect_mime(bytes: &[u8], declared: Option<&str>) -> Result<String, ImageError> {
    if let Some(mime) = image::guess_format(bytes).ok().and_then(mime_for) {
        return Ok(mime.to_string());
    }

    match declared.map(str::trim) {
        Some(mime) if mime.starts_with("image/") => Ok(mime.to_string()),
        other => Err(ImageError::NotAnImage(other.unwrap_or("none").to_string())),
    }
}

pub fn to_data_url(bytes: &[u8], declared: Option<&str>, max_bytes: usize) -> Result<String, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::Empty);
    }
    if bytes.len() >= max_bytes {
        return Err(ImageError::TooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }

    let mime = detect_mime(bytes, declared)?;
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

/// References the vision model can fetch: inline image data or a web URL.
pub fn is_image_reference(reference: &str) -> bool {
    let reference = reference.trim();
    reference.starts_with("data:image/")
        || reference.starts_with("https://")
        || reference.starts_with("http://")
}

/// Decoded size of a data URL, used to enforce the per-image limit on JSON uploads.
pub fn data_url_size(reference: &str) -> Option<usize> {
    let (_, payload) = reference.split_once(";base64,")?;
    Some(payload.trim().len() / 4 * 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn test_detect_mime_sniffs_bytes() {
        assert_eq!(detect_mime(PNG_HEADER, None).unwrap(), "image/png");
        assert_eq!(
            detect_mime(JPEG_HEADER, Some("application/octet-stream")).unwrap(),
            "image/jpeg"
        );
    }

    #[test]
    fn test_detect_mime_trusts_declared_image_type() {
        assert_eq!(detect_mime(b"ftypheic....", Some("image/heic")).unwrap(), "image/heic");
        assert_eq!(
            detect_mime(b"plain text", Some("text/plain")),
            Err(ImageError::NotAnImage("text/plain".to_string()))
        );
    }

    #[test]
    fn test_to_data_url() {
        let url = to_data_url(PNG_HEADER, None, 1024).unwrap();
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));

        assert_eq!(
            to_data_url(PNG_HEADER, None, 4),
            Err(ImageError::TooLarge { size: 12, limit: 4 })
        );
        assert_eq!(to_data_url(&[], None, 4), Err(ImageError::Empty));
    }

    #[test]
    fn test_size_limit_is_exclusive() {
        let len = PNG_HEADER.len();
        assert_eq!(
            to_data_url(PNG_HEADER, None, len),
            Err(ImageError::TooLarge { size: len, limit: len })
        );
        assert!(to_data_url(PNG_HEADER, None, len + 1).is_ok());
    }

    #[test]
    fn test_image_reference_and_size() {
        assert!(is_image_reference("data:image/jpeg;base64,AAAA"));
        assert!(is_image_reference("https://example.com/fridge.jpg"));
        assert!(!is_image_reference("data:text/plain;base64,AAAA"));
        assert!(!is_image_reference("fridge.jpg"));

        assert_eq!(data_url_size("data:image/png;base64,AAAAAAAA"), Some(6));
        assert_eq!(data_url_size("https://example.com/a.png"), None);
    }
}
