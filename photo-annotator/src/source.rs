//! Selected or captured source images

use crate::error::AnnotatorError;
use base64::Engine;
use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

/// A picked or captured image blob
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    file_name: String,
    mime_type: String,
    bytes: Arc<Vec<u8>>,
}

impl SourceImage {
    /// Wraps an image blob. Anything whose MIME type is not `image/*` is rejected.
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, AnnotatorError> {
        let mime_type = mime_type.into();
        if !mime_type.starts_with("image/") {
            return Err(AnnotatorError::UnsupportedMimeType(mime_type));
        }
        Ok(Self {
            file_name: file_name.into(),
            mime_type,
            bytes: Arc::new(bytes),
        })
    }

    /// Reads a file, guessing its MIME type from the extension
    pub fn from_path(path: &Path) -> Result<Self, AnnotatorError> {
        let mime = guess_mime_from_ext(path).ok_or_else(|| {
            AnnotatorError::UnsupportedMimeType(format!(
                "unknown extension: {}",
                path.display()
            ))
        })?;
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("photo")
            .to_string();
        Self::new(file_name, mime, bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `data:` URL of the original bytes
    pub fn to_data_url(&self) -> String {
        let b64 = base64::engine::general_purpose::STANDARD.encode(self.bytes.as_slice());
        format!("data:{};base64,{}", self.mime_type, b64)
    }

    /// Reads the pixel size from the image header without decoding
    pub fn dimensions(&self) -> Result<(u32, u32), AnnotatorError> {
        image::ImageReader::new(Cursor::new(self.bytes.as_slice()))
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| AnnotatorError::Decode(format!("{}: {}", self.file_name, e)))
    }

    /// Decodes the image on the blocking pool
    pub async fn decode(&self) -> Result<DynamicImage, AnnotatorError> {
        let bytes = Arc::clone(&self.bytes);
        let name = self.file_name.clone();

        tokio::task::spawn_blocking(move || {
            log::debug!("Decoding {} ({} bytes)", name, bytes.len());
            image::load_from_memory(&bytes)
                .map_err(|e| AnnotatorError::Decode(format!("{}: {}", name, e)))
        })
        .await
        .map_err(|e| AnnotatorError::Task(format!("Decode task join error: {}", e)))?
    }
}

/// MIME type for the common image extensions, `None` for anything else
pub fn guess_mime_from_ext(path: &Path) -> Option<&'static str> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => Some("image/jpeg"),
        Some("png") => Some("image/png"),
        Some("webp") => Some("image/webp"),
        Some("gif") => Some("image/gif"),
        Some("bmp") => Some("image/bmp"),
        Some("heic") | Some("heif") => Some("image/heic"),
        _ => None,
    }
}
