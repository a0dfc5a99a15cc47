use super::string_or_false;
use serde::{Deserialize, Serialize};

/// `{success, message?, error?}` payload of the save methods
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SaveResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "string_or_false")]
    pub message: String,
    #[serde(default, deserialize_with = "string_or_false")]
    pub error: String,
}

impl SaveResponse {
    /// Error text if the call failed and the backend explained why
    pub fn error_message(&self) -> Option<&str> {
        if self.success || self.error.trim().is_empty() {
            None
        } else {
            Some(&self.error)
        }
    }
}
