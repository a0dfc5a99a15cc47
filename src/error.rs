use crate::rpc::RpcError;
use photo_annotator::AnnotatorError;
use std::fmt;

/// Central error types for the inventory dialogs
#[derive(Debug)]
pub enum AppError {
    /// Validation error (e.g. no image selected)
    Validation(String),
    /// Image could not be read, decoded or compressed
    ImageProcessing(AnnotatorError),
    /// The backend reported a failure for the call
    Remote(String),
    /// Transport or protocol failure talking to the backend
    Rpc(RpcError),
    /// Configuration could not be loaded
    Config(String),
    /// Another upload from the same dialog is still running
    UploadInFlight,
    /// Filesystem error
    Filesystem(std::io::Error),
    /// General error
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::ImageProcessing(e) => write!(f, "Image processing error: {}", e),
            AppError::Remote(msg) => write!(f, "Remote error: {}", msg),
            AppError::Rpc(e) => write!(f, "RPC error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::UploadInFlight => write!(f, "An upload is already in progress"),
            AppError::Filesystem(e) => write!(f, "Filesystem error: {}", e),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Conversions from other error types
impl From<RpcError> for AppError {
    fn from(e: RpcError) -> Self {
        match e {
            RpcError::Remote(msg) => AppError::Remote(msg),
            other => AppError::Rpc(other),
        }
    }
}

impl From<AnnotatorError> for AppError {
    fn from(e: AnnotatorError) -> Self {
        match e {
            AnnotatorError::UnsupportedMimeType(mime) => {
                AppError::Validation(format!("The selected file is not an image ({})", mime))
            }
            other => AppError::ImageProcessing(other),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Filesystem(e)
    }
}

/// User-facing messages for the notification surface
impl AppError {
    /// Message to show the user; `fallback` is used when the backend gave no usable text
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::ImageProcessing(e) => format!("Error processing image: {}", e),
            AppError::Remote(msg) if !msg.trim().is_empty() => msg.clone(),
            AppError::Rpc(e) => e
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
            AppError::UploadInFlight => "Please wait, the upload is still running.".to_string(),
            AppError::Remote(_)
            | AppError::Config(_)
            | AppError::Filesystem(_)
            | AppError::Other(_) => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_message_shown_verbatim() {
        let err = AppError::from(RpcError::Remote("Lot not found".to_string()));
        assert_eq!(err.user_message("Error uploading photo"), "Lot not found");

        let blank = AppError::Remote(String::new());
        assert_eq!(blank.user_message("Error uploading photo"), "Error uploading photo");
    }

    #[test]
    fn test_transport_failure_uses_fallback() {
        let err = AppError::from(RpcError::NetworkError("connection refused".into()));
        assert_eq!(err.user_message("Error saving notes"), "Error saving notes");

        let server = AppError::from(RpcError::ServerError {
            code: 200,
            message: "Access denied".into(),
        });
        assert_eq!(server.user_message("Error saving notes"), "Access denied");
    }

    #[test]
    fn test_processing_error_includes_reason() {
        let err = AppError::from(AnnotatorError::Decode("truncated JPEG".into()));
        let msg = err.user_message("unused");
        assert!(msg.starts_with("Error processing image"));
        assert!(msg.contains("truncated JPEG"));
    }

    #[test]
    fn test_non_image_becomes_validation() {
        let err = AppError::from(AnnotatorError::UnsupportedMimeType("text/plain".into()));
        assert!(matches!(err, AppError::Validation(_)));
    }
}
