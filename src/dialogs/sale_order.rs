//! Sale orders linked to a lot

use crate::models::{OrderBadge, SaleOrder, SaleOrderInfo};

pub struct SaleOrderDialog {
    info: SaleOrderInfo,
}

impl SaleOrderDialog {
    pub fn new(info: SaleOrderInfo) -> Self {
        Self { info }
    }

    pub fn title(&self) -> String {
        format!("Sale orders ({})", self.info.count)
    }

    pub fn orders(&self) -> &[SaleOrder] {
        &self.info.orders
    }

    pub fn badge(&self, state: &str) -> OrderBadge {
        OrderBadge::from_state(state)
    }

    /// `{symbol} 1,234.50`
    pub fn amount(&self, order: &SaleOrder) -> String {
        order.formatted_total()
    }
}
