//! Compress an annotated photo and store it on the lot

use crate::config::UploadConfig;
use crate::error::AppError;
use crate::models::PhotoUploadRequest;
use crate::rpc::OrmService;
use crate::services::lot_service::LotService;
use photo_annotator::{AnnotatedPhoto, CompressionConfig, EncoderBackend, ImageCrateEncoder};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "heic", "heif"];

/// What the backend stored
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub photo_name: String,
    /// Message reported by the backend
    pub message: String,
    pub size_kb: f64,
    pub width: u32,
    pub height: u32,
}

impl UploadReceipt {
    /// Notification text, e.g. `Photo "A.jpg" saved (123 KB)`
    pub fn summary(&self) -> String {
        let message = if self.message.trim().is_empty() {
            format!("Photo \"{}\" saved", self.photo_name)
        } else {
            self.message.clone()
        };
        format!("{} ({:.0} KB)", message, self.size_kb)
    }
}

pub struct PhotoUploadService<S, B = ImageCrateEncoder> {
    lots: LotService<S>,
    compression: CompressionConfig,
    encoder: B,
    sequence: i32,
}

impl<S: OrmService> PhotoUploadService<S, ImageCrateEncoder> {
    pub fn new(lots: LotService<S>, compression: CompressionConfig, upload: &UploadConfig) -> Self {
        Self::with_encoder(lots, compression, upload, ImageCrateEncoder)
    }
}

impl<S: OrmService, B: EncoderBackend> PhotoUploadService<S, B> {
    pub fn with_encoder(
        lots: LotService<S>,
        compression: CompressionConfig,
        upload: &UploadConfig,
        encoder: B,
    ) -> Self {
        Self {
            lots,
            compression,
            encoder,
            sequence: upload.sequence,
        }
    }

    pub fn lots(&self) -> &LotService<S> {
        &self.lots
    }

    /// Compresses the photo with its annotations, then saves it on the lot of `quant_id`
    pub async fn upload(
        &self,
        quant_id: i64,
        photo_name: &str,
        note: &str,
        photo: &AnnotatedPhoto,
    ) -> Result<UploadReceipt, AppError> {
        let compressed = photo.compress(&self.compression, &self.encoder).await?;
        let name = photo_display_name(photo_name, compressed.extension());
        log::info!(
            "Uploading {} ({}x{}, {:.1} KB, quality {:.1})",
            name,
            compressed.width,
            compressed.height,
            compressed.size_kb,
            compressed.quality
        );

        let request = PhotoUploadRequest {
            quant_id,
            photo_name: name.clone(),
            photo_data: compressed.payload,
            sequence: self.sequence,
            note: note.to_string(),
        };
        let response = self.lots.save_lot_photo(&request).await?;
        if !response.success {
            log::warn!("Saving photo {} failed: {}", name, response.error);
            return Err(AppError::Remote(response.error));
        }

        Ok(UploadReceipt {
            photo_name: name,
            message: response.message,
            size_kb: compressed.size_kb,
            width: compressed.width,
            height: compressed.height,
        })
    }
}

/// Replaces a recognised image extension on `name` with `extension`
pub fn photo_display_name(name: &str, extension: &str) -> String {
    let name = name.trim();
    let stem = match name.rsplit_once('.') {
        Some((stem, ext))
            if IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext)) =>
        {
            stem.trim_end()
        }
        _ => name,
    };
    let stem = if stem.is_empty() { "Photo" } else { stem };
    format!("{}.{}", stem, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::RpcError;
    use crate::services::lot_service::tests::MockOrm;
    use photo_annotator::{DrawingHistory, SourceImage};
    use serde_json::json;
    use std::io::Cursor;
    use std::sync::Arc;

    fn photo() -> AnnotatedPhoto {
        let mut buf = Cursor::new(Vec::new());
        image::RgbImage::from_pixel(64, 48, image::Rgb([120, 90, 60]))
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        AnnotatedPhoto {
            source: SourceImage::new("slab.png", "image/png", buf.into_inner()).unwrap(),
            history: DrawingHistory::default(),
            recorded_canvas: (64, 48),
        }
    }

    fn service(orm: &Arc<MockOrm>) -> PhotoUploadService<MockOrm> {
        PhotoUploadService::new(
            LotService::new(Arc::clone(orm), "stock.quant"),
            CompressionConfig::default(),
            &UploadConfig::default(),
        )
    }

    #[test]
    fn test_display_name_extension() {
        assert_eq!(photo_display_name("Front.PNG", "jpg"), "Front.jpg");
        assert_eq!(photo_display_name("Photo - LOT-1", "webp"), "Photo - LOT-1.webp");
        assert_eq!(photo_display_name("v1.2 detail", "jpg"), "v1.2 detail.jpg");
        assert_eq!(photo_display_name("scan.heic", "jpg"), "scan.jpg");
        assert_eq!(photo_display_name("  ", "jpg"), "Photo.jpg");
        assert_eq!(photo_display_name(".png", "jpg"), "Photo.jpg");
        assert_eq!(photo_display_name(" .JPEG ", "webp"), "Photo.webp");
    }

    #[test]
    fn test_receipt_summary() {
        let receipt = UploadReceipt {
            photo_name: "A.jpg".into(),
            message: "Photo \"A.jpg\" saved".into(),
            size_kb: 122.6,
            width: 10,
            height: 10,
        };
        assert_eq!(receipt.summary(), "Photo \"A.jpg\" saved (123 KB)");
    }

    #[tokio::test]
    async fn test_upload_sends_compressed_payload() {
        let orm = Arc::new(MockOrm::default());
        orm.respond("save_lot_photo", Ok(json!({"success": true, "message": "ok"})));

        let receipt = service(&orm)
            .upload(12, "Front.png", "", &photo())
            .await
            .unwrap();
        assert_eq!(receipt.photo_name, "Front.jpg");
        assert_eq!((receipt.width, receipt.height), (64, 48));

        let kwargs = orm.last_kwargs().unwrap();
        assert_eq!(kwargs["quant_id"], 12);
        assert_eq!(kwargs["sequence"], 10);
        assert_eq!(kwargs["photo_name"], "Front.jpg");
        assert!(kwargs["photo_data"].as_str().unwrap().starts_with("/9j/"));
    }

    #[tokio::test]
    async fn test_remote_failure_is_reported() {
        let orm = Arc::new(MockOrm::default());
        orm.respond("save_lot_photo", Ok(json!({"success": false, "error": "X"})));

        let err = service(&orm).upload(1, "A", "", &photo()).await.unwrap_err();
        assert_eq!(err.user_message("Error uploading photo"), "X");
    }

    #[tokio::test]
    async fn test_transport_failure_uses_fallback() {
        let orm = Arc::new(MockOrm::default());
        orm.respond("save_lot_photo", Err(RpcError::NetworkError("timeout".into())));

        let err = service(&orm).upload(1, "A", "", &photo()).await.unwrap_err();
        assert_eq!(err.user_message("Error uploading photo"), "Error uploading photo");
    }

    #[tokio::test]
    async fn test_undecodable_source_is_not_sent() {
        let orm = Arc::new(MockOrm::default());
        let broken = AnnotatedPhoto {
            source: SourceImage::new("x.jpg", "image/jpeg", b"garbage".to_vec()).unwrap(),
            history: DrawingHistory::default(),
            recorded_canvas: (0, 0),
        };

        let err = service(&orm).upload(1, "A", "", &broken).await.unwrap_err();
        assert!(err.user_message("unused").starts_with("Error processing image"));
        assert_eq!(orm.call_count("save_lot_photo"), 0);
    }
}
