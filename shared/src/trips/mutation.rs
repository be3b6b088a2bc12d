//! Create, edit and delete, each gated by an explicit confirmation.
//!
//! A save runs `stage_save` -> `confirm` -> `finish_save`; a delete runs
//! `open_delete` -> `confirm` -> `finish_delete`. `confirm` takes no
//! arguments: whatever was staged last is what executes.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::draft::{TripDraft, TripForm, TripPayload};
use crate::api::ApiError;
use crate::capabilities::FileRef;
use crate::model::{Trip, TripId};

pub const SIGN_IN_ALERT: &str = "Please sign in to manage your trips.";
pub const SAVE_FAILED_ALERT: &str = "Failed to save trip. Please try again.";
pub const DELETE_FAILED_ALERT: &str = "Failed to delete trip.";
pub const UPLOAD_FAILED_ALERT: &str = "Error uploading image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("a trip request is already being submitted")]
    Busy,
    #[error("no trip form is open")]
    NoDraft,
    #[error("nothing is waiting for confirmation")]
    NothingPending,
    #[error("the trip being edited has no id")]
    MissingTripId,
    #[error("an image is already uploading")]
    UploadInProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalMode {
    Create,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripModal {
    pub mode: ModalMode,
    pub draft: TripDraft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Create,
    Edit,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmColor {
    Red,
    Cyan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconKind {
    Delete,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    pub title: String,
    pub message: String,
    pub confirm_text: String,
    pub confirm_color: ConfirmColor,
    pub icon: IconKind,
    pub action: ActionKind,
}

/// The operation waiting for the user's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Create(TripDraft),
    Edit { id: TripId, draft: TripDraft },
    Delete { id: TripId, title: String },
}

impl PendingAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            PendingAction::Create(_) => ActionKind::Create,
            PendingAction::Edit { .. } => ActionKind::Edit,
            PendingAction::Delete { .. } => ActionKind::Delete,
        }
    }

    pub fn confirmation(&self) -> ConfirmationRequest {
        let (title, message, confirm_text, confirm_color, icon) = match self {
            PendingAction::Create(_) => (
                "Create Trip?",
                "Are you sure you want to create this trip?".to_string(),
                "Create",
                ConfirmColor::Cyan,
                IconKind::Edit,
            ),
            PendingAction::Edit { draft, .. } => (
                "Update Trip?",
                format!("Are you sure you want to update \"{}\"?", draft.title),
                "Update",
                ConfirmColor::Cyan,
                IconKind::Edit,
            ),
            PendingAction::Delete { title, .. } => (
                "Delete Trip?",
                format!(
                    "Are you sure you want to delete \"{title}\"? This action cannot be undone."
                ),
                "Delete",
                ConfirmColor::Red,
                IconKind::Delete,
            ),
        };

        ConfirmationRequest {
            title: title.to_string(),
            message,
            confirm_text: confirm_text.to_string(),
            confirm_color,
            icon,
            action: self.kind(),
        }
    }

    pub fn execution(&self) -> Execution {
        match self {
            PendingAction::Create(draft) => Execution::Create(draft.to_payload()),
            PendingAction::Edit { id, draft } => Execution::Update {
                id: *id,
                payload: draft.to_payload(),
            },
            PendingAction::Delete { id, .. } => Execution::Delete { id: *id },
        }
    }
}

/// The request a confirmed action turns into.
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    Create(TripPayload),
    Update { id: TripId, payload: TripPayload },
    Delete { id: TripId },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripMutations {
    modal: Option<TripModal>,
    pending: Option<PendingAction>,
    in_flight: Option<PendingAction>,
    confirmation: Option<ConfirmationRequest>,
    submitting: bool,
    uploading: bool,
    upload_epoch: u64,
    alert: Option<String>,
}

impl TripMutations {
    pub fn modal(&self) -> Option<&TripModal> {
        self.modal.as_ref()
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn confirmation(&self) -> Option<&ConfirmationRequest> {
        self.confirmation.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Bumped after every upload so the shell can clear its file input.
    pub fn upload_epoch(&self) -> u64 {
        self.upload_epoch
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    fn ensure_idle(&self) -> Result<(), MutationError> {
        if self.submitting {
            Err(MutationError::Busy)
        } else {
            Ok(())
        }
    }

    pub fn open_create(&mut self) -> Result<(), MutationError> {
        self.ensure_idle()?;
        self.modal = Some(TripModal {
            mode: ModalMode::Create,
            draft: TripDraft::default(),
        });
        Ok(())
    }

    pub fn open_edit(&mut self, trip: &Trip) -> Result<(), MutationError> {
        self.ensure_idle()?;
        self.modal = Some(TripModal {
            mode: ModalMode::Edit,
            draft: TripDraft::from_trip(trip),
        });
        Ok(())
    }

    /// Goes straight to the confirmation; there is no form for a delete.
    pub fn open_delete(&mut self, trip: &Trip) -> Result<(), MutationError> {
        self.ensure_idle()?;
        self.stage(PendingAction::Delete {
            id: trip.id,
            title: trip.title.clone(),
        });
        Ok(())
    }

    /// Closes the form and drops a save staged from it.
    pub fn close_modal(&mut self) -> Result<(), MutationError> {
        self.ensure_idle()?;
        self.modal = None;
        if matches!(
            self.pending,
            Some(PendingAction::Create(_) | PendingAction::Edit { .. })
        ) {
            self.pending = None;
            self.confirmation = None;
        }
        Ok(())
    }

    /// The form, if any, stays open.
    pub fn cancel_confirmation(&mut self) -> Result<(), MutationError> {
        self.ensure_idle()?;
        self.pending = None;
        self.confirmation = None;
        Ok(())
    }

    pub fn stage_save(&mut self, form: TripForm) -> Result<(), MutationError> {
        self.ensure_idle()?;
        let modal = self.modal.as_mut().ok_or(MutationError::NoDraft)?;
        modal.draft.merge_form(form);

        let action = match modal.mode {
            ModalMode::Create => PendingAction::Create(modal.draft.clone()),
            ModalMode::Edit => PendingAction::Edit {
                id: modal.draft.id.ok_or(MutationError::MissingTripId)?,
                draft: modal.draft.clone(),
            },
        };
        self.stage(action);
        Ok(())
    }

    fn stage(&mut self, action: PendingAction) {
        debug!(action = ?action.kind(), "trip action staged");
        self.confirmation = Some(action.confirmation());
        self.pending = Some(action);
    }

    /// Consumes the staged action.
    pub fn confirm(&mut self) -> Result<Execution, MutationError> {
        self.ensure_idle()?;
        let action = self.pending.take().ok_or(MutationError::NothingPending)?;
        let execution = action.execution();
        self.in_flight = Some(action);
        self.submitting = true;
        Ok(execution)
    }

    /// Returns whether the trip list should be refreshed. On failure the
    /// staged action is restored so the user can confirm again.
    pub fn finish_save(&mut self, result: Result<(), ApiError>) -> bool {
        self.submitting = false;
        let action = self.in_flight.take();
        match result {
            Ok(()) => {
                self.modal = None;
                self.pending = None;
                self.confirmation = None;
                true
            }
            Err(error) => {
                warn!(%error, "failed to save trip");
                self.pending = action;
                self.alert = Some(SAVE_FAILED_ALERT.to_string());
                false
            }
        }
    }

    /// The delete target is cleared either way; on failure the confirmation
    /// stays up behind the alert.
    pub fn finish_delete(&mut self, result: Result<(), ApiError>) -> bool {
        self.submitting = false;
        self.in_flight = None;
        match result {
            Ok(()) => {
                self.confirmation = None;
                true
            }
            Err(error) => {
                warn!(%error, "failed to delete trip");
                self.alert = Some(DELETE_FAILED_ALERT.to_string());
                false
            }
        }
    }

    /// Picks the first file to upload. An empty selection does nothing.
    pub fn begin_upload(&mut self, files: Vec<FileRef>) -> Result<Option<FileRef>, MutationError> {
        if self.uploading {
            return Err(MutationError::UploadInProgress);
        }
        let file = files.into_iter().next();
        if file.is_some() {
            self.uploading = true;
        }
        Ok(file)
    }

    pub fn finish_upload(&mut self, result: Result<Option<String>, ApiError>) {
        self.uploading = false;
        self.upload_epoch += 1;
        match result {
            Ok(Some(url)) => match self.modal.as_mut() {
                Some(modal) => modal.draft.push_photo(url),
                None => warn!("photo uploaded with no trip form open"),
            },
            Ok(None) => warn!("upload response had no url"),
            Err(error) => {
                warn!(%error, "failed to upload photo");
                self.alert = Some(UPLOAD_FAILED_ALERT.to_string());
            }
        }
    }

    pub fn remove_photo(&mut self, index: usize) {
        if let Some(modal) = self.modal.as_mut() {
            modal.draft.remove_photo(index);
        }
    }

    pub fn raise_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }
}
