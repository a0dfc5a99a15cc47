pub mod inventory_service;
pub mod lot_service;
pub mod photo_upload_service;

pub use inventory_service::InventoryService;
pub use lot_service::LotService;
pub use photo_upload_service::{photo_display_name, PhotoUploadService, UploadReceipt};
