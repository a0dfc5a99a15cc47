//! Free-text notes of a lot

use super::{BusyFlag, DialogHost, Generation, NotificationKind};
use crate::error::AppError;
use crate::models::LotNotes;
use crate::rpc::OrmService;
use crate::services::LotService;
use std::sync::{Arc, Mutex, MutexGuard};

const SAVE_FALLBACK: &str = "Error saving notes";

#[derive(Debug)]
struct NotesState {
    notes: String,
    original_notes: String,
    is_editing: bool,
}

pub struct NotesDialog<S, H> {
    quant_id: i64,
    lot_name: String,
    lots: Arc<LotService<S>>,
    host: Arc<H>,
    state: Mutex<NotesState>,
    busy: BusyFlag,
    generation: Generation,
}

impl<S: OrmService, H: DialogHost> NotesDialog<S, H> {
    pub fn new(quant_id: i64, data: LotNotes, lots: Arc<LotService<S>>, host: Arc<H>) -> Self {
        let state = NotesState {
            is_editing: data.notes.is_empty(),
            original_notes: data.notes.clone(),
            notes: data.notes,
        };
        Self {
            quant_id,
            lot_name: data.lot_name,
            lots,
            host,
            state: Mutex::new(state),
            busy: BusyFlag::new(),
            generation: Generation::default(),
        }
    }

    pub fn title(&self) -> String {
        format!("Notes - {}", self.lot_name)
    }

    pub fn notes(&self) -> String {
        self.state().notes.clone()
    }

    pub fn set_notes(&self, notes: impl Into<String>) {
        self.state().notes = notes.into();
    }

    pub fn is_editing(&self) -> bool {
        self.state().is_editing
    }

    pub fn has_notes(&self) -> bool {
        !self.state().original_notes.trim().is_empty()
    }

    /// Leaving edit mode throws away unsaved changes
    pub fn toggle_edit(&self) {
        let mut state = self.state();
        state.is_editing = !state.is_editing;
        if !state.is_editing {
            state.notes = state.original_notes.clone();
        }
    }

    pub fn is_saving(&self) -> bool {
        self.busy.is_busy()
    }

    pub async fn save(&self) -> Result<String, AppError> {
        let Some(_busy) = self.busy.try_acquire() else {
            return Err(AppError::UploadInFlight);
        };
        let generation = self.generation.current();
        let notes = self.notes();

        let result = match self.lots.save_lot_notes(self.quant_id, &notes).await {
            Ok(response) if response.success => Ok(response.message),
            Ok(response) => Err(AppError::Remote(response.error)),
            Err(e) => Err(AppError::from(e)),
        };

        if !self.generation.is_current(generation) {
            return result;
        }

        match &result {
            Ok(message) => {
                {
                    let mut state = self.state();
                    state.original_notes = notes;
                    state.is_editing = false;
                }
                let message = if message.trim().is_empty() {
                    "Notes saved"
                } else {
                    message.as_str()
                };
                self.host.notify(message, NotificationKind::Success);
                self.close();
                self.host.reload().await;
            }
            Err(e) => {
                log::error!("Saving notes for quant {} failed: {}", self.quant_id, e);
                self.host
                    .notify(&e.user_message(SAVE_FALLBACK), NotificationKind::Danger);
            }
        }
        result
    }

    pub fn close(&self) {
        self.generation.bump();
        self.host.close();
    }

    fn state(&self) -> MutexGuard<'_, NotesState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogs::tests::MockHost;
    use crate::services::lot_service::tests::MockOrm;
    use serde_json::json;

    fn dialog(notes: &str, orm: &Arc<MockOrm>, host: &Arc<MockHost>) -> NotesDialog<MockOrm, MockHost> {
        let data = LotNotes {
            lot_name: "LOT-3".into(),
            product_name: "Travertine".into(),
            notes: notes.into(),
        };
        NotesDialog::new(
            3,
            data,
            Arc::new(LotService::new(Arc::clone(orm), "stock.quant")),
            Arc::clone(host),
        )
    }

    #[test]
    fn test_empty_notes_start_in_edit_mode() {
        let orm = Arc::new(MockOrm::default());
        let host = Arc::new(MockHost::default());
        assert!(dialog("", &orm, &host).is_editing());

        let existing = dialog("Polished side up", &orm, &host);
        assert!(!existing.is_editing());
        assert!(existing.has_notes());
        assert_eq!(existing.title(), "Notes - LOT-3");
    }

    #[test]
    fn test_cancel_edit_restores_original() {
        let dialog = dialog(
            "Polished side up",
            &Arc::new(MockOrm::default()),
            &Arc::new(MockHost::default()),
        );
        dialog.toggle_edit();
        dialog.set_notes("changed");
        dialog.toggle_edit();
        assert_eq!(dialog.notes(), "Polished side up");
    }

    #[tokio::test]
    async fn test_save_success() {
        let orm = Arc::new(MockOrm::default());
        orm.respond("save_lot_notes", Ok(json!({"success": true, "message": "Notes saved"})));
        let host = Arc::new(MockHost::default());
        let dialog = dialog("", &orm, &host);
        dialog.set_notes("Chipped edge");

        assert_eq!(dialog.save().await.unwrap(), "Notes saved");
        assert_eq!(
            host.events(),
            vec![
                "notify:success:Notes saved".to_string(),
                "close".to_string(),
                "reload".to_string()
            ]
        );
        assert!(dialog.has_notes());
        assert!(!dialog.is_saving());
        assert_eq!(orm.last_kwargs().unwrap()["notes"], "Chipped edge");
    }

    #[tokio::test]
    async fn test_save_failure_keeps_dialog_open() {
        let orm = Arc::new(MockOrm::default());
        orm.respond("save_lot_notes", Ok(json!({"success": false})));
        let host = Arc::new(MockHost::default());
        let dialog = dialog("", &orm, &host);

        assert!(dialog.save().await.is_err());
        assert_eq!(host.events(), vec![format!("notify:danger:{}", SAVE_FALLBACK)]);
        assert!(dialog.is_editing());
        assert!(!dialog.is_saving());
    }

    #[tokio::test]
    async fn test_concurrent_save_rejected() {
        let orm = Arc::new(MockOrm::default());
        orm.respond("save_lot_notes", Ok(json!({"success": true, "message": "ok"})));
        let host = Arc::new(MockHost::default());
        let dialog = dialog("", &orm, &host);

        let (first, second) = tokio::join!(dialog.save(), dialog.save());
        assert!(first.is_ok());
        assert!(matches!(second, Err(AppError::UploadInFlight)));
        assert_eq!(orm.call_count("save_lot_notes"), 1);
    }
}
