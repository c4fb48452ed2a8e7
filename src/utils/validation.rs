use anyhow::{Result, anyhow};
use std::path::Path;

/// Image formats the upload adapter accepts
pub const ALLOWED_IMAGE_FORMATS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates an uploaded image and returns its normalized extension.
///
/// Checks, in order: non-empty payload, size limit, extension against the
/// allowed set, and magic bytes against the claimed format.
pub fn validate_image(filename: &str, data: &[u8], max_size: usize) -> Result<String> {
    if data.is_empty() {
        return Err(anyhow!(ValidationError {
            code: "EMPTY_FILE",
            message: format!("Uploaded file '{}' is empty", filename),
        }));
    }

    if data.len() > max_size {
        return Err(anyhow!(ValidationError {
            code: "FILE_TOO_LARGE",
            message: format!(
                "File size {} bytes exceeds maximum allowed {} bytes ({} MB)",
                data.len(),
                max_size,
                max_size / 1024 / 1024
            ),
        }));
    }

    let extension = image_extension(filename).ok_or_else(|| {
        anyhow!(ValidationError {
            code: "INVALID_FORMAT",
            message: format!(
                "File '{}' is not an allowed image format ({})",
                filename,
                ALLOWED_IMAGE_FORMATS.join(", ")
            ),
        })
    })?;

    // The claimed extension is not trusted on its own; the content must
    // carry the magic bytes of one of the allowed formats.
    let detected = infer::get(data)
        .map(|kind| kind.extension())
        .filter(|ext| matches!(*ext, "jpg" | "png" | "webp"));

    if detected.is_none() {
        return Err(anyhow!(ValidationError {
            code: "INVALID_CONTENT",
            message: format!(
                "File '{}' does not contain valid {} image data",
                filename, extension
            ),
        }));
    }

    Ok(extension)
}

/// Lowercased extension of the filename, if it is in the allowed set
pub fn image_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())?
        .to_lowercase();

    ALLOWED_IMAGE_FORMATS.contains(&ext.as_str()).then_some(ext)
}

pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 10 * 1024 * 1024;

    fn jpeg_bytes() -> Vec<u8> {
        vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00]
    }

    fn png_bytes() -> Vec<u8> {
        vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00]
    }

    fn webp_bytes() -> Vec<u8> {
        let mut data = b"RIFF".to_vec();
        data.extend_from_slice(&[0x24, 0x00, 0x00, 0x00]);
        data.extend_from_slice(b"WEBPVP8 ");
        data
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("cover.jpg").as_deref(), Some("jpg"));
        assert_eq!(image_extension("cover.JPEG").as_deref(), Some("jpeg"));
        assert_eq!(image_extension("cover.webp").as_deref(), Some("webp"));
        assert_eq!(image_extension("cover.gif"), None);
        assert_eq!(image_extension("cover"), None);
        assert_eq!(image_extension("archive.tar.png").as_deref(), Some("png"));
    }

    #[test]
    fn test_validate_image_accepts_allowed_formats() {
        assert_eq!(validate_image("a.jpg", &jpeg_bytes(), MAX).unwrap(), "jpg");
        assert_eq!(validate_image("b.png", &png_bytes(), MAX).unwrap(), "png");
        assert_eq!(validate_image("c.webp", &webp_bytes(), MAX).unwrap(), "webp");
    }

    #[test]
    fn test_validate_image_rejects_bad_extension() {
        assert!(validate_image("clip.gif", &png_bytes(), MAX).is_err());
        assert!(validate_image("script.exe", &png_bytes(), MAX).is_err());
        assert!(validate_image("noext", &png_bytes(), MAX).is_err());
    }

    #[test]
    fn test_validate_image_rejects_bad_content() {
        assert!(validate_image("fake.png", b"plain text, not an image", MAX).is_err());
        assert!(validate_image("empty.jpg", &[], MAX).is_err());
        // GIF bytes behind an allowed extension
        assert!(validate_image("sneaky.jpg", b"GIF89a\x00\x00", MAX).is_err());
    }

    #[test]
    fn test_validate_image_rejects_oversize() {
        let data = jpeg_bytes();
        assert!(validate_image("a.jpg", &data, data.len()).is_ok());
        assert!(validate_image("a.jpg", &data, data.len() - 1).is_err());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("jpg"), "image/jpeg");
        assert_eq!(content_type_for("jpeg"), "image/jpeg");
        assert_eq!(content_type_for("png"), "image/png");
        assert_eq!(content_type_for("webp"), "image/webp");
    }
}
