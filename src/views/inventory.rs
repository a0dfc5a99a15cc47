//! Searchable product grid with expandable lot rows

use crate::dialogs::{
    DialogHost, HistoryDialog, HoldTarget, NotificationKind, Notifier, SaleOrderDialog,
};
use crate::models::{LotNotes, LotPhotos, ProductGroup, QuantDetail, SearchFilters};
use crate::rpc::{OrmService, RpcError};
use crate::services::{InventoryService, LotService};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

const SEARCH_ERROR: &str = "Error loading products. Please try again.";
const NO_BLOCK: &str = "No block";

#[derive(Debug, Default)]
struct GridState {
    products: Vec<ProductGroup>,
    has_searched: bool,
    is_loading: bool,
    error: Option<String>,
    expanded: HashSet<i64>,
    details: HashMap<i64, Vec<QuantDetail>>,
}

/// Lots of one product that share a block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockGroup {
    pub block: String,
    pub count: usize,
    pub total_quantity: f64,
    pub tipo: String,
    pub details: Vec<QuantDetail>,
}

pub struct InventoryView<S, N> {
    inventory: InventoryService<S>,
    lots: Arc<LotService<S>>,
    notifier: Arc<N>,
    state: Mutex<GridState>,
}

impl<S: OrmService, N: Notifier> InventoryView<S, N> {
    pub fn new(orm: Arc<S>, model: &str, notifier: Arc<N>) -> Self {
        Self {
            inventory: InventoryService::new(Arc::clone(&orm), model),
            lots: Arc::new(LotService::new(orm, model)),
            notifier,
            state: Mutex::new(GridState::default()),
        }
    }

    /// Service the opened dialogs save through
    pub fn lots(&self) -> Arc<LotService<S>> {
        Arc::clone(&self.lots)
    }

    pub fn products(&self) -> Vec<ProductGroup> {
        self.state().products.clone()
    }

    pub fn has_searched(&self) -> bool {
        self.state().has_searched
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn is_expanded(&self, product_id: i64) -> bool {
        self.state().expanded.contains(&product_id)
    }

    pub fn details(&self, product_id: i64) -> Vec<QuantDetail> {
        self.state()
            .details
            .get(&product_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn search(&self, filters: &SearchFilters) {
        if !filters.is_active() {
            *self.state() = GridState::default();
            return;
        }

        {
            let mut state = self.state();
            state.is_loading = true;
            state.error = None;
        }
        let result = self.inventory.search(filters).await;

        let mut state = self.state();
        state.is_loading = false;
        match result {
            Ok(found) => {
                let empty = found.products.is_empty();
                state.products = found.products;
                state.has_searched = true;
                state.expanded.clear();
                state.details.clear();
                drop(state);

                if empty {
                    self.notifier.notify(
                        "No products found for the applied filters",
                        NotificationKind::Info,
                    );
                }
                if !found.missing_lots.is_empty() {
                    let missing = serde_json::to_string(&found.missing_lots)
                        .unwrap_or_else(|_| found.missing_lots.join(", "));
                    self.notifier.notify(
                        &format!("Lots not found: {}", missing),
                        NotificationKind::Warning,
                    );
                }
            }
            Err(e) => {
                state.error = Some(SEARCH_ERROR.to_string());
                drop(state);
                log::error!("Product search failed: {}", e);
                self.notifier
                    .notify("Error loading products", NotificationKind::Danger);
            }
        }
    }

    /// Expands or collapses a product row, fetching its lots once
    pub async fn toggle_product(&self, product_id: i64) {
        let quant_ids = {
            let mut state = self.state();
            if state.expanded.remove(&product_id) {
                return;
            }
            state.expanded.insert(product_id);
            if state.details.contains_key(&product_id) {
                return;
            }
            match state.products.iter().find(|p| p.product_id == product_id) {
                Some(product) => product.quant_ids.clone(),
                None => return,
            }
        };
        self.load_details(product_id, &quant_ids).await;
    }

    async fn load_details(&self, product_id: i64, quant_ids: &[i64]) {
        match self.inventory.quant_details(quant_ids).await {
            Ok(details) => {
                self.state().details.insert(product_id, details);
            }
            Err(e) => {
                log::error!("Loading details of product {} failed: {}", product_id, e);
                self.notifier
                    .notify("Error loading product details", NotificationKind::Danger);
            }
        }
    }

    /// Cached lots grouped by block, largest group first
    pub fn details_by_block(&self, product_id: i64) -> Vec<BlockGroup> {
        let mut groups: Vec<BlockGroup> = Vec::new();
        for detail in self.details(product_id) {
            let block = if detail.block.trim().is_empty() {
                NO_BLOCK.to_string()
            } else {
                detail.block.clone()
            };
            let index = match groups.iter().position(|g| g.block == block) {
                Some(index) => index,
                None => {
                    groups.push(BlockGroup {
                        block,
                        count: 0,
                        total_quantity: 0.0,
                        tipo: String::new(),
                        details: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[index];
            group.count += 1;
            group.total_quantity += detail.quantity;
            if group.tipo.is_empty() && !detail.tipo.trim().is_empty() {
                group.tipo = detail.tipo.clone();
            }
            group.details.push(detail);
        }
        groups.sort_by(|a, b| b.count.cmp(&a.count));
        groups
    }

    pub fn unit_label(tipo: &str) -> &'static str {
        if tipo.eq_ignore_ascii_case("pieza") {
            "pza"
        } else {
            "m²"
        }
    }

    /// Refetches the lots of whichever product lists `detail_id`
    pub async fn reload_details_for(&self, detail_id: i64) {
        let target = {
            let state = self.state();
            state
                .details
                .iter()
                .find(|(_, details)| details.iter().any(|d| d.id == detail_id))
                .and_then(|(product_id, _)| {
                    state
                        .products
                        .iter()
                        .find(|p| p.product_id == *product_id)
                        .map(|p| (p.product_id, p.quant_ids.clone()))
                })
        };
        if let Some((product_id, quant_ids)) = target {
            self.load_details(product_id, &quant_ids).await;
        }
    }

    pub async fn open_photos(&self, detail_id: i64) -> Option<LotPhotos> {
        let result = self.lots.get_lot_photos(detail_id).await;
        self.report(result, "Error loading photos")
    }

    pub async fn open_notes(&self, detail_id: i64) -> Option<LotNotes> {
        let result = self.lots.get_lot_notes(detail_id).await;
        self.report(result, "Error loading notes")
    }

    pub async fn open_history(&self, detail_id: i64) -> Option<HistoryDialog> {
        let result = self.lots.get_lot_history(detail_id).await;
        self.report(result, "Error loading lot history")
            .map(HistoryDialog::new)
    }

    pub async fn open_sale_orders(&self, sale_order_ids: &[i64]) -> Option<SaleOrderDialog> {
        if sale_order_ids.is_empty() {
            self.notifier
                .notify("No sale orders linked", NotificationKind::Info);
            return None;
        }
        let result = self.inventory.sale_order_info(sale_order_ids).await;
        self.report(result, "Error loading sale orders")
            .map(SaleOrderDialog::new)
    }

    pub fn hold_target(&self, detail_id: i64) -> Option<HoldTarget> {
        let target = {
            let state = self.state();
            state.details.iter().find_map(|(product_id, details)| {
                let detail = details.iter().find(|d| d.id == detail_id)?;
                let product_name = state
                    .products
                    .iter()
                    .find(|p| p.product_id == *product_id)
                    .map(|p| p.product_name.clone())
                    .unwrap_or_default();
                Some(HoldTarget {
                    quant_id: detail.id,
                    lot_name: detail.lot_name.clone(),
                    product_id: *product_id,
                    product_name,
                })
            })
        };
        if target.is_none() {
            self.notifier
                .notify("Lot information not found", NotificationKind::Danger);
        }
        target
    }

    /// Host for a dialog opened on `detail_id`
    pub fn detail_host(self: &Arc<Self>, detail_id: i64) -> DetailDialogHost<S, N> {
        DetailDialogHost {
            view: Arc::clone(self),
            detail_id,
            closed: AtomicBool::new(false),
        }
    }

    fn report<T>(&self, result: Result<T, RpcError>, fallback: &str) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(RpcError::Remote(message)) => {
                self.notifier.notify(&message, NotificationKind::Warning);
                None
            }
            Err(e) => {
                log::error!("{}: {}", fallback, e);
                self.notifier.notify(fallback, NotificationKind::Danger);
                None
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, GridState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Connects a dialog to the grid it was opened from
pub struct DetailDialogHost<S, N> {
    view: Arc<InventoryView<S, N>>,
    detail_id: i64,
    closed: AtomicBool,
}

impl<S, N> DetailDialogHost<S, N> {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl<S: OrmService, N: Notifier> Notifier for DetailDialogHost<S, N> {
    fn notify(&self, message: &str, kind: NotificationKind) {
        self.view.notifier.notify(message, kind);
    }
}

impl<S: OrmService, N: Notifier> DialogHost for DetailDialogHost<S, N> {
    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    async fn reload(&self) {
        self.view.reload_details_for(self.detail_id).await;
    }
}
