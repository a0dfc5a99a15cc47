use super::{format_currency, string_or_false};
use serde::{Deserialize, Serialize};

/// Result of `get_sale_order_info`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleOrderInfo {
    pub count: usize,
    pub orders: Vec<SaleOrder>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleOrder {
    pub id: i64,
    #[serde(deserialize_with = "string_or_false")]
    pub name: String,
    #[serde(deserialize_with = "string_or_false")]
    pub partner_name: String,
    #[serde(deserialize_with = "string_or_false")]
    pub user_name: String,
    #[serde(deserialize_with = "string_or_false")]
    pub date_order: String,
    #[serde(deserialize_with = "string_or_false")]
    pub commitment_date: String,
    #[serde(deserialize_with = "string_or_false")]
    pub state: String,
    #[serde(deserialize_with = "string_or_false")]
    pub state_display: String,
    pub amount_total: f64,
    #[serde(deserialize_with = "string_or_false")]
    pub currency_symbol: String,
}

/// Badge colour of an order state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBadge {
    Secondary,
    Info,
    Success,
    Dark,
    Danger,
}

impl OrderBadge {
    pub fn from_state(state: &str) -> Self {
        match state {
            "sent" => OrderBadge::Info,
            "sale" => OrderBadge::Success,
            "done" => OrderBadge::Dark,
            "cancel" => OrderBadge::Danger,
            _ => OrderBadge::Secondary,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            OrderBadge::Secondary => "bg-secondary",
            OrderBadge::Info => "bg-info",
            OrderBadge::Success => "bg-success",
            OrderBadge::Dark => "bg-dark",
            OrderBadge::Danger => "bg-danger",
        }
    }
}

impl SaleOrder {
    pub fn badge(&self) -> OrderBadge {
        OrderBadge::from_state(&self.state)
    }

    pub fn formatted_total(&self) -> String {
        format_currency(self.amount_total, &self.currency_symbol)
    }
}
