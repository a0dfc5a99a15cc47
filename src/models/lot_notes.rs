use super::string_or_false;
use serde::{Deserialize, Serialize};

/// Result of `get_lot_notes`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LotNotes {
    #[serde(default, deserialize_with = "string_or_false")]
    pub lot_name: String,
    #[serde(default, deserialize_with = "string_or_false")]
    pub product_name: String,
    #[serde(default, deserialize_with = "string_or_false")]
    pub notes: String,
}
