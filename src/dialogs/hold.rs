//! Reserving a lot for a customer

use super::{BusyFlag, DialogHost, Generation, NotificationKind};
use crate::error::AppError;
use crate::models::{HoldRequest, Partner};
use crate::rpc::OrmService;
use crate::services::LotService;
use std::sync::{Arc, Mutex, MutexGuard};

const CREATE_FALLBACK: &str = "Error creating hold";
const SEARCH_FALLBACK: &str = "Error searching customers";

/// The lot a hold is created on
#[derive(Debug, Clone, PartialEq)]
pub struct HoldTarget {
    pub quant_id: i64,
    pub lot_name: String,
    pub product_id: i64,
    pub product_name: String,
}

#[derive(Debug, Default)]
struct HoldState {
    search_term: String,
    partners: Vec<Partner>,
    selected: Option<(i64, String)>,
    notes: String,
}

pub struct CreateHoldDialog<S, H> {
    target: HoldTarget,
    lots: Arc<LotService<S>>,
    host: Arc<H>,
    state: Mutex<HoldState>,
    busy: BusyFlag,
    generation: Generation,
}

impl<S: OrmService, H: DialogHost> CreateHoldDialog<S, H> {
    pub fn new(target: HoldTarget, lots: Arc<LotService<S>>, host: Arc<H>) -> Self {
        Self {
            target,
            lots,
            host,
            state: Mutex::new(HoldState::default()),
            busy: BusyFlag::new(),
            generation: Generation::default(),
        }
    }

    pub fn title(&self) -> String {
        format!("Create hold - {}", self.target.lot_name)
    }

    pub fn target(&self) -> &HoldTarget {
        &self.target
    }

    pub fn set_search_term(&self, term: impl Into<String>) {
        self.state().search_term = term.into();
    }

    pub fn partners(&self) -> Vec<Partner> {
        self.state().partners.clone()
    }

    pub async fn search_partners(&self) -> Result<usize, AppError> {
        let term = self.state().search_term.trim().to_string();
        match self.lots.search_partners(&term).await {
            Ok(partners) => {
                let found = partners.len();
                self.state().partners = partners;
                Ok(found)
            }
            Err(e) => {
                let e = AppError::from(e);
                log::error!("Customer search for {:?} failed: {}", term, e);
                self.host
                    .notify(&e.user_message(SEARCH_FALLBACK), NotificationKind::Danger);
                Err(e)
            }
        }
    }

    pub fn select_partner(&self, partner: &Partner) {
        self.state().selected = Some((partner.id, partner.label().to_string()));
    }

    /// Display name of the chosen customer
    pub fn selected_partner(&self) -> Option<String> {
        self.state().selected.as_ref().map(|(_, name)| name.clone())
    }

    pub fn set_notes(&self, notes: impl Into<String>) {
        self.state().notes = notes.into();
    }

    pub fn is_creating(&self) -> bool {
        self.busy.is_busy()
    }

    pub async fn create_hold(&self) -> Result<String, AppError> {
        let (partner_id, notes) = {
            let state = self.state();
            (state.selected.as_ref().map(|(id, _)| *id), state.notes.clone())
        };
        let Some(partner_id) = partner_id else {
            let message = "A customer must be selected";
            self.host.notify(message, NotificationKind::Warning);
            return Err(AppError::Validation(message.to_string()));
        };
        let Some(_busy) = self.busy.try_acquire() else {
            return Err(AppError::UploadInFlight);
        };
        let generation = self.generation.current();

        let request = HoldRequest {
            quant_id: self.target.quant_id,
            partner_id,
            notes,
        };
        let result = match self.lots.create_lot_hold(&request).await {
            Ok(response) if response.success => Ok(response.message),
            Ok(response) => Err(AppError::Remote(response.error)),
            Err(e) => Err(AppError::from(e)),
        };

        if !self.generation.is_current(generation) {
            return result;
        }

        match &result {
            Ok(message) => {
                let message = if message.trim().is_empty() {
                    "Hold created"
                } else {
                    message.as_str()
                };
                self.host.notify(message, NotificationKind::Success);
                self.close();
                self.host.reload().await;
            }
            Err(e) => {
                log::error!(
                    "Creating hold on quant {} failed: {}",
                    self.target.quant_id,
                    e
                );
                self.host
                    .notify(&e.user_message(CREATE_FALLBACK), NotificationKind::Danger);
            }
        }
        result
    }

    pub fn close(&self) {
        self.generation.bump();
        self.host.close();
    }

    fn state(&self) -> MutexGuard<'_, HoldState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
