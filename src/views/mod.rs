//! Views that own the grid and open dialogs on top of it

pub mod inventory;

pub use inventory::{BlockGroup, DetailDialogHost, InventoryView};
