//! Temporary preview references for selected images
//!
//! Every preview handed out must be released once it is superseded or the
//! editor goes away. The store keeps track of live references so leaks are
//! observable.

use crate::source::SourceImage;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Opaque `blob:` style reference to a previewable image
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewUrl(String);

impl PreviewUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PreviewUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry of live preview references, shared between sessions
#[derive(Debug, Clone, Default)]
pub struct PreviewStore {
    entries: Arc<Mutex<HashMap<PreviewUrl, String>>>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a preview for `source` and returns its reference
    pub fn create(&self, source: &SourceImage) -> PreviewUrl {
        let url = PreviewUrl(format!("blob:{}", Uuid::new_v4()));
        let data_url = source.to_data_url();
        self.lock().insert(url.clone(), data_url);
        log::debug!("Created preview {} for {}", url, source.file_name());
        url
    }

    /// Resolves a live reference to its `data:` URL
    pub fn resolve(&self, url: &PreviewUrl) -> Option<String> {
        self.lock().get(url).cloned()
    }

    /// Releases a reference; returns false if it was not live
    pub fn revoke(&self, url: &PreviewUrl) -> bool {
        let released = self.lock().remove(url).is_some();
        if released {
            log::debug!("Revoked preview {}", url);
        } else {
            log::warn!("Preview {} was already revoked", url);
        }
        released
    }

    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PreviewUrl, String>> {
        // A poisoned map is still consistent: every operation is a single insert/remove
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
