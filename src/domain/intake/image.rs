//! Uploaded document images and the allow-list they must pass.

use thiserror::Error;

/// Default maximum image size (2 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// An accepted image, ready for the image extractor.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    /// Normalized media type, e.g. `image/png`.
    pub media_type: &'static str,
    pub file_name: Option<String>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("len", &self.bytes.len())
            .field("media_type", &self.media_type)
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// Why an upload was treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageRejection {
    #[error("image is empty")]
    Empty,

    #[error("image is {actual} bytes, limit is {max}")]
    TooLarge { max: usize, actual: usize },

    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
}

/// Allow-list and size limit for uploaded images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUploadPolicy {
    pub max_bytes: usize,
    /// Lowercase file extensions without the dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for ImageUploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
            allowed_extensions: ["png", "jpg", "jpeg", "webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ImageUploadPolicy {
    /// Validates an upload.
    ///
    /// The file extension decides the type when present; otherwise the
    /// declared content type is used.
    pub fn accept(
        &self,
        bytes: Vec<u8>,
        file_name: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<ImageUpload, ImageRejection> {
        if bytes.is_empty() {
            return Err(ImageRejection::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(ImageRejection::TooLarge {
                max: self.max_bytes,
                actual: bytes.len(),
            });
        }

        let extension = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());

        let extension = match extension {
            Some(ext) => ext,
            None => content_type
                .and_then(extension_for_media_type)
                .map(str::to_string)
                .ok_or_else(|| {
                    ImageRejection::UnsupportedType(content_type.unwrap_or("unknown").to_string())
                })?,
        };

        if !self.allowed_extensions.iter().any(|allowed| *allowed == extension) {
            return Err(ImageRejection::UnsupportedType(extension));
        }

        let media_type = media_type_for_extension(&extension)
            .ok_or_else(|| ImageRejection::UnsupportedType(extension.clone()))?;

        Ok(ImageUpload {
            bytes,
            media_type,
            file_name: file_name.map(str::to_string),
        })
    }
}

fn media_type_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn extension_for_media_type(media_type: &str) -> Option<&'static str> {
    match media_type.trim().to_ascii_lowercase().as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}
