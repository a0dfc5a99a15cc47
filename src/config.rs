//! Process-wide settings loaded from TOML

use crate::error::AppError;
use photo_annotator::CompressionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Connection settings for the ERP JSON-RPC endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub base_url: String,
    /// Value of the `session_id` cookie of an authenticated web session
    pub session_id: Option<String>,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8069".to_string(),
            session_id: None,
            timeout_secs: 60,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Sort position given to uploaded photos
    pub sequence: i32,
    /// Model exposing the lot methods
    pub model: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            sequence: 10,
            model: "stock.quant".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rpc: RpcConfig,
    pub compression: CompressionConfig,
    pub upload: UploadConfig,
}

impl AppConfig {
    pub fn from_toml(s: &str) -> Result<Self, AppError> {
        toml::from_str(s).map_err(|e| AppError::Config(format!("Invalid configuration: {}", e)))
    }

    pub fn to_toml(&self) -> Result<String, AppError> {
        toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Serialize configuration failed: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Reading {} failed: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&raw)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
