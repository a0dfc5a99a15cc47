pub mod hold;
pub mod inventory;
pub mod lot_history;
pub mod lot_notes;
pub mod lot_photo;
pub mod sale_order;
pub mod save_response;

pub use hold::{HoldRequest, HoldResponse, Partner};
pub use inventory::{InventorySearch, ProductGroup, QuantDetail, QuantHold, SearchFilters};
pub use lot_history::LotHistory;
pub use lot_notes::LotNotes;
pub use lot_photo::{LotPhoto, LotPhotos, PhotoUploadRequest};
pub use sale_order::{OrderBadge, SaleOrder, SaleOrderInfo};
pub use save_response::SaveResponse;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The backend sends `false` for empty char/binary fields
pub(crate) fn string_or_false<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// `false` or `null` for an unset many2one, number or sub-record
pub(crate) fn falsy_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => Ok(None),
        value => serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// `1,234.50`
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, decimals) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, decimals)
}

/// `$ 1,234.50`
pub fn format_currency(amount: f64, symbol: &str) -> String {
    format!("{} {}", symbol, format_amount(amount))
}
