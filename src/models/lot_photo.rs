use super::string_or_false;
use serde::{Deserialize, Serialize};

/// A stored photo of a lot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LotPhoto {
    pub id: i64,
    #[serde(default, deserialize_with = "string_or_false")]
    pub name: String,
    /// Base64 image bytes, empty when the record has no image
    #[serde(default, deserialize_with = "string_or_false")]
    pub image: String,
    #[serde(rename = "fecha_captura", default, deserialize_with = "string_or_false")]
    pub capture_date: String,
    #[serde(rename = "notas", default, deserialize_with = "string_or_false")]
    pub notes: String,
}

impl LotPhoto {
    /// MIME type sniffed from the first base64 characters
    pub fn mime_type(&self) -> &'static str {
        if self.image.starts_with("/9j/") {
            "image/jpeg"
        } else if self.image.starts_with("UklGR") {
            "image/webp"
        } else if self.image.starts_with("R0lGOD") {
            "image/gif"
        } else {
            "image/png"
        }
    }

    /// `data:` URL for opening the photo in a new tab
    pub fn data_url(&self) -> Option<String> {
        if self.image.is_empty() {
            return None;
        }
        Some(format!("data:{};base64,{}", self.mime_type(), self.image))
    }
}

/// Result of `get_lot_photos`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LotPhotos {
    #[serde(default, deserialize_with = "string_or_false")]
    pub lot_name: String,
    #[serde(default, deserialize_with = "string_or_false")]
    pub product_name: String,
    #[serde(default)]
    pub photos: Vec<LotPhoto>,
}

/// Keyword arguments of `save_lot_photo`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PhotoUploadRequest {
    pub quant_id: i64,
    pub photo_name: String,
    /// Base64 encoded image
    pub photo_data: String,
    pub sequence: i32,
    #[serde(rename = "notas")]
    pub note: String,
}
