//! Photo gallery of a lot with an upload form for annotated photos

use super::{BusyFlag, DialogHost, Generation, NotificationKind};
use crate::error::AppError;
use crate::models::{LotPhoto, LotPhotos};
use crate::rpc::OrmService;
use crate::services::{PhotoUploadService, UploadReceipt};
use photo_annotator::{EditorSession, EncoderBackend, ImageCrateEncoder, PreviewStore, PreviewUrl};
use std::sync::{Arc, Mutex, MutexGuard};

const UPLOAD_FALLBACK: &str = "Error uploading photo";

#[derive(Debug)]
struct GalleryState {
    current_index: usize,
    show_upload_form: bool,
    photo_name: String,
    note: String,
}

pub struct PhotoGalleryDialog<S, H, B = ImageCrateEncoder> {
    quant_id: i64,
    photos: LotPhotos,
    uploads: Arc<PhotoUploadService<S, B>>,
    host: Arc<H>,
    previews: PreviewStore,
    state: Mutex<GalleryState>,
    session: Mutex<Option<EditorSession>>,
    busy: BusyFlag,
    generation: Generation,
}

impl<S, H, B> PhotoGalleryDialog<S, H, B>
where
    S: OrmService,
    H: DialogHost,
    B: EncoderBackend,
{
    pub fn new(
        quant_id: i64,
        photos: LotPhotos,
        uploads: Arc<PhotoUploadService<S, B>>,
        host: Arc<H>,
        previews: PreviewStore,
    ) -> Self {
        let state = GalleryState {
            current_index: 0,
            show_upload_form: false,
            photo_name: default_photo_name(&photos.lot_name),
            note: String::new(),
        };
        Self {
            quant_id,
            photos,
            uploads,
            host,
            previews,
            state: Mutex::new(state),
            session: Mutex::new(None),
            busy: BusyFlag::new(),
            generation: Generation::default(),
        }
    }

    pub fn title(&self) -> String {
        format!("Photos - {}", self.photos.lot_name)
    }

    pub fn photos(&self) -> &LotPhotos {
        &self.photos
    }

    pub fn has_photos(&self) -> bool {
        !self.photos.photos.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.state().current_index
    }

    pub fn current_photo(&self) -> Option<&LotPhoto> {
        self.photos.photos.get(self.current_index())
    }

    pub fn next_photo(&self) {
        let mut state = self.state();
        if state.current_index + 1 < self.photos.photos.len() {
            state.current_index += 1;
        }
    }

    pub fn prev_photo(&self) {
        let mut state = self.state();
        state.current_index = state.current_index.saturating_sub(1);
    }

    /// `data:` URL for opening a stored photo on its own
    pub fn photo_data_url(&self, photo: &LotPhoto) -> Option<String> {
        photo.data_url()
    }

    pub fn show_upload_form(&self) -> bool {
        self.state().show_upload_form
    }

    /// Opens or closes the upload form. Closing drops the editor session and resets the name.
    pub fn toggle_upload_form(&self) {
        let show = {
            let mut state = self.state();
            state.show_upload_form = !state.show_upload_form;
            if !state.show_upload_form {
                state.photo_name = default_photo_name(&self.photos.lot_name);
                state.note.clear();
            }
            state.show_upload_form
        };

        let mut session = self.session();
        if show {
            *session = Some(EditorSession::open(self.previews.clone()));
        } else if let Some(old) = session.take() {
            old.close();
        }
    }

    pub fn photo_name(&self) -> String {
        self.state().photo_name.clone()
    }

    pub fn set_photo_name(&self, name: impl Into<String>) {
        self.state().photo_name = name.into();
    }

    pub fn set_note(&self, note: impl Into<String>) {
        self.state().note = note.into();
    }

    /// Puts a picked or captured image into the editor
    pub fn select_image(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<PreviewUrl, AppError> {
        let mut guard = self.session();
        let Some(session) = guard.as_mut() else {
            return Err(AppError::Validation("The upload form is not open".to_string()));
        };
        match session.select_blob(file_name, mime_type, bytes) {
            Ok(url) => Ok(url.clone()),
            Err(e) => {
                let err = AppError::from(e);
                self.host
                    .notify(&err.user_message(UPLOAD_FALLBACK), NotificationKind::Warning);
                Err(err)
            }
        }
    }

    /// Runs `f` against the editor session while the upload form is open
    pub fn with_session<R>(&self, f: impl FnOnce(&mut EditorSession) -> R) -> Option<R> {
        self.session().as_mut().map(f)
    }

    pub fn is_uploading(&self) -> bool {
        self.busy.is_busy()
    }

    /// Compresses the annotated image and saves it on the lot.
    ///
    /// On success the dialog closes and the host reloads. Failures are
    /// notified and leave the dialog open for another try.
    pub async fn upload(&self) -> Result<UploadReceipt, AppError> {
        let photo = self.with_session(|s| s.annotated_photo()).flatten();
        let Some(photo) = photo else {
            let err = AppError::Validation("Please select an image".to_string());
            self.host
                .notify(&err.user_message(UPLOAD_FALLBACK), NotificationKind::Warning);
            return Err(err);
        };

        let Some(_busy) = self.busy.try_acquire() else {
            log::debug!("Upload for quant {} already running", self.quant_id);
            return Err(AppError::UploadInFlight);
        };
        let generation = self.generation.current();
        let (name, note) = {
            let state = self.state();
            (state.photo_name.clone(), state.note.clone())
        };

        let result = self
            .uploads
            .upload(self.quant_id, &name, &note, &photo)
            .await;

        if !self.generation.is_current(generation) {
            log::info!(
                "Dialog for quant {} closed during upload, dropping result",
                self.quant_id
            );
            return result;
        }

        match &result {
            Ok(receipt) => {
                self.host.notify(&receipt.summary(), NotificationKind::Success);
                self.close();
                self.host.reload().await;
            }
            Err(e) => {
                log::error!("Upload for quant {} failed: {}", self.quant_id, e);
                self.host
                    .notify(&e.user_message(UPLOAD_FALLBACK), NotificationKind::Danger);
            }
        }
        result
    }

    /// Tears down the editor and asks the host to close the dialog
    pub fn close(&self) {
        self.generation.bump();
        if let Some(session) = self.session().take() {
            session.close();
        }
        self.state().show_upload_form = false;
        self.host.close();
    }

    fn state(&self) -> MutexGuard<'_, GalleryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn session(&self) -> MutexGuard<'_, Option<EditorSession>> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn default_photo_name(lot_name: &str) -> String {
    format!("Photo - {}", lot_name)
}
