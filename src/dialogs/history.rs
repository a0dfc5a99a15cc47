//! Read-only lot history

use crate::models::LotHistory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryTab {
    General,
    Movements,
    Sales,
    Reservations,
    Deliveries,
    Purchases,
}

impl HistoryTab {
    pub fn label(&self) -> &'static str {
        match self {
            HistoryTab::General => "General",
            HistoryTab::Movements => "Movements",
            HistoryTab::Sales => "Sales",
            HistoryTab::Reservations => "Reservations",
            HistoryTab::Deliveries => "Deliveries",
            HistoryTab::Purchases => "Purchases",
        }
    }
}

pub struct HistoryDialog {
    history: LotHistory,
    active_tab: HistoryTab,
}

impl HistoryDialog {
    pub fn new(history: LotHistory) -> Self {
        Self {
            history,
            active_tab: HistoryTab::General,
        }
    }

    pub fn title(&self) -> String {
        format!("Lot history - {}", self.history.general_info.lot_name)
    }

    pub fn history(&self) -> &LotHistory {
        &self.history
    }

    /// Purchases is only listed for users allowed to see purchase data
    pub fn tabs(&self) -> Vec<HistoryTab> {
        let mut tabs = vec![
            HistoryTab::General,
            HistoryTab::Movements,
            HistoryTab::Sales,
            HistoryTab::Reservations,
            HistoryTab::Deliveries,
        ];
        if self.history.has_purchase_permissions {
            tabs.push(HistoryTab::Purchases);
        }
        tabs
    }

    pub fn active_tab(&self) -> HistoryTab {
        self.active_tab
    }

    /// Returns false and stays put for a tab that is not listed
    pub fn switch_tab(&mut self, tab: HistoryTab) -> bool {
        if !self.tabs().contains(&tab) {
            return false;
        }
        self.active_tab = tab;
        true
    }

    pub fn is_active_tab(&self, tab: HistoryTab) -> bool {
        self.active_tab == tab
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn history(purchases: bool) -> LotHistory {
        serde_json::from_value(json!({
            "general_info": {"lot_name": "L-1"},
            "purchase_info": [{"orden_compra": "P00001", "total": 10.0}],
            "has_purchase_permissions": purchases
        }))
        .unwrap()
    }

    #[test]
    fn test_starts_on_general() {
        let dialog = HistoryDialog::new(history(true));
        assert_eq!(dialog.title(), "Lot history - L-1");
        assert!(dialog.is_active_tab(HistoryTab::General));
        assert_eq!(dialog.tabs().len(), 6);
    }

    #[test]
    fn test_switch_tab() {
        let mut dialog = HistoryDialog::new(history(true));
        assert!(dialog.switch_tab(HistoryTab::Movements));
        assert!(dialog.is_active_tab(HistoryTab::Movements));
        assert!(!dialog.is_active_tab(HistoryTab::General));
        assert!(dialog.switch_tab(HistoryTab::Purchases));
        assert_eq!(dialog.active_tab().label(), "Purchases");
    }

    #[test]
    fn test_purchases_hidden_without_permission() {
        let mut dialog = HistoryDialog::new(history(false));
        assert!(!dialog.tabs().contains(&HistoryTab::Purchases));
        assert!(!dialog.switch_tab(HistoryTab::Purchases));
        assert!(dialog.is_active_tab(HistoryTab::General));
    }
}
