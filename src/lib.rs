//! # Inventory Visual
//!
//! Lot photo and notes dialogs for an ERP inventory view.
//!
//! This crate provides:
//! - A JSON-RPC client for the backend's model methods
//! - Typed wrappers for the lot, hold and grid calls
//! - The upload flow: annotate, compress, save, then close and reload
//! - A searchable product/lot grid that opens the dialogs
//! - Dialog models that report to their host UI through [`dialogs::DialogHost`]
//!
//! Drawing and compression live in the `photo_annotator` crate.

pub mod config;
pub mod dialogs;
pub mod error;
pub mod models;
pub mod rpc;
pub mod services;
pub mod views;

pub use config::{AppConfig, RpcConfig, UploadConfig};
pub use dialogs::{
    CreateHoldDialog, DialogHost, HistoryDialog, NotesDialog, NotificationKind, Notifier,
    PhotoGalleryDialog, SaleOrderDialog,
};
pub use error::AppError;
pub use rpc::{JsonRpcClient, OrmService, RpcError};
pub use services::{InventoryService, LotService, PhotoUploadService, UploadReceipt};
pub use views::{DetailDialogHost, InventoryView};
