//! Dialog models shown on top of the inventory view
//!
//! A dialog talks to its host UI only through [`DialogHost`]. Submits are
//! single flight and results that arrive after the dialog closed are dropped.

pub mod history;
pub mod hold;
pub mod notes;
pub mod photo_gallery;
pub mod sale_order;

pub use history::{HistoryDialog, HistoryTab};
pub use hold::{CreateHoldDialog, HoldTarget};
pub use notes::NotesDialog;
pub use photo_gallery::PhotoGalleryDialog;
pub use sale_order::SaleOrderDialog;

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Warning,
    Danger,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Danger => "danger",
            NotificationKind::Info => "info",
        }
    }
}

/// Toast surface of the host UI
pub trait Notifier {
    fn notify(&self, message: &str, kind: NotificationKind);
}

/// Callbacks into the UI hosting a dialog
pub trait DialogHost: Notifier {
    /// Removes the dialog from screen
    fn close(&self);

    /// Refreshes the parent view after a successful save
    fn reload(&self) -> impl Future<Output = ()>;
}

/// In-flight marker for a dialog submit
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the flag busy; `None` when a submit is already running
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.0)))
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears the busy flag when dropped
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Counts dialog teardowns so late completions can be recognised
#[derive(Debug, Default)]
pub(crate) struct Generation(AtomicU64);

impl Generation {
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}
