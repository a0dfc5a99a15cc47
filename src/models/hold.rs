use super::{falsy_as_none, string_or_false};
use serde::{Deserialize, Serialize};

/// Customer row of `search_partners`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Partner {
    pub id: i64,
    #[serde(deserialize_with = "string_or_false")]
    pub name: String,
    #[serde(deserialize_with = "string_or_false")]
    pub display_name: String,
    #[serde(deserialize_with = "string_or_false")]
    pub vat: String,
    #[serde(rename = "ref", deserialize_with = "string_or_false")]
    pub reference: String,
    #[serde(deserialize_with = "string_or_false")]
    pub email: String,
}

impl Partner {
    pub fn label(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

/// Keyword arguments of `create_lot_hold`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldRequest {
    pub quant_id: i64,
    pub partner_id: i64,
    #[serde(rename = "notas")]
    pub notes: String,
}

/// Result of `create_lot_hold`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldResponse {
    pub success: bool,
    #[serde(deserialize_with = "string_or_false")]
    pub message: String,
    #[serde(deserialize_with = "string_or_false")]
    pub error: String,
    #[serde(deserialize_with = "falsy_as_none")]
    pub hold_id: Option<i64>,
    #[serde(rename = "fecha_expiracion", deserialize_with = "string_or_false")]
    pub expiration: String,
}

impl HoldResponse {
    pub fn error_message(&self) -> Option<&str> {
        if self.success || self.error.trim().is_empty() {
            None
        } else {
            Some(&self.error)
        }
    }
}
