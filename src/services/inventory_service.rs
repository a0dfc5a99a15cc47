//! Typed wrappers around the grid methods of the inventory model

use super::lot_service::{decode, kwargs};
use crate::models::{InventorySearch, QuantDetail, SaleOrderInfo, SearchFilters};
use crate::rpc::{reject_error_payload, OrmService, RpcError};
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub struct InventoryService<S> {
    orm: Arc<S>,
    model: String,
}

impl<S: OrmService> InventoryService<S> {
    pub fn new(orm: Arc<S>, model: impl Into<String>) -> Self {
        Self {
            orm,
            model: model.into(),
        }
    }

    /// Products matching `filters`, with stock totals
    pub async fn search(&self, filters: &SearchFilters) -> Result<InventorySearch, RpcError> {
        let value = self
            .call(
                "get_inventory_grouped_by_product",
                kwargs(json!({ "filters": serde_json::to_value(filters)? })),
            )
            .await?;
        let result: InventorySearch = decode(reject_error_payload(value)?)?;
        log::debug!(
            "Search returned {} products, {} lots not found",
            result.products.len(),
            result.missing_lots.len()
        );
        Ok(result)
    }

    pub async fn quant_details(&self, quant_ids: &[i64]) -> Result<Vec<QuantDetail>, RpcError> {
        let value = self
            .call("get_quant_details", kwargs(json!({ "quant_ids": quant_ids })))
            .await?;
        decode(reject_error_payload(value)?)
    }

    pub async fn sale_order_info(&self, sale_order_ids: &[i64]) -> Result<SaleOrderInfo, RpcError> {
        let value = self
            .call(
                "get_sale_order_info",
                kwargs(json!({ "sale_order_ids": sale_order_ids })),
            )
            .await?;
        decode(reject_error_payload(value)?)
    }

    async fn call(&self, method: &str, kwargs: Map<String, Value>) -> Result<Value, RpcError> {
        self.orm.call(&self.model, method, Vec::new(), kwargs).await
    }
}
