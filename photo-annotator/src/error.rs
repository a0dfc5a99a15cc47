/// Error type for annotation and compression operations
#[derive(Debug)]
pub enum AnnotatorError {
    /// The selected blob is not an image
    UnsupportedMimeType(String),
    /// The source image could not be decoded
    Decode(String),
    /// Re-encoding the composed image failed
    Encode(String),
    /// Raster surface could not be created or written
    Raster(String),
    IoError(std::io::Error),
    /// A background decode/encode task panicked or was cancelled
    Task(String),
}

impl std::fmt::Display for AnnotatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnotatorError::UnsupportedMimeType(mime) => {
                write!(f, "Unsupported file type: {}", mime)
            }
            AnnotatorError::Decode(msg) => write!(f, "Image decode error: {}", msg),
            AnnotatorError::Encode(msg) => write!(f, "Image encode error: {}", msg),
            AnnotatorError::Raster(msg) => write!(f, "Raster error: {}", msg),
            AnnotatorError::IoError(e) => write!(f, "IO error: {}", e),
            AnnotatorError::Task(msg) => write!(f, "Task error: {}", msg),
        }
    }
}

impl std::error::Error for AnnotatorError {}

impl From<std::io::Error> for AnnotatorError {
    fn from(err: std::io::Error) -> Self {
        AnnotatorError::IoError(err)
    }
}

impl From<image::ImageError> for AnnotatorError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Encoding(e) => AnnotatorError::Encode(e.to_string()),
            other => AnnotatorError::Decode(other.to_string()),
        }
    }
}
