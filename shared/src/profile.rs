//! Profile form backed by `/auth/me`, with self-dismissing banners.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::ApiError;
use crate::model::AuthUser;

pub const LOAD_FAILED_BANNER: &str = "Unable to load your profile right now.";
pub const SIGN_IN_TO_UPDATE_BANNER: &str = "Please sign in to update your profile.";
pub const UPDATED_BANNER: &str = "Profile updated successfully.";
pub const UPDATE_FAILED_BANNER: &str = "Failed to update profile.";
pub const SIGN_IN_TO_UPLOAD_BANNER: &str = "Please sign in to upload a photo.";
pub const AVATAR_FAILED_BANNER: &str = "Avatar upload failed";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    pub display_name: String,
    pub email: String,
    pub avatar_url: String,
    pub bio: String,
}

impl ProfileForm {
    pub fn from_user(user: &AuthUser) -> Self {
        Self {
            display_name: user.display_name.clone().unwrap_or_default(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone().unwrap_or_default(),
            bio: user.bio.clone().unwrap_or_default(),
        }
    }

    /// Blank name and avatar are sent as `null`; bio is always a string.
    pub fn to_payload(&self) -> ProfilePayload {
        ProfilePayload {
            display_name: non_blank(&self.display_name),
            avatar_url: non_blank(&self.avatar_url),
            bio: self.bio.trim().to_string(),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Body of `PATCH /auth/me`. Email is not editable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    pub generation: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEditor {
    form: ProfileForm,
    dirty: bool,
    synced_once: bool,
    loading: bool,
    saving: bool,
    uploading: bool,
    banner: Option<Banner>,
    banner_generation: u64,
}

impl ProfileEditor {
    pub fn form(&self) -> &ProfileForm {
        &self.form
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    /// Fills the form the first time an identity shows up, unless the user
    /// already started typing.
    pub fn sync_from_user(&mut self, user: &AuthUser) {
        if self.synced_once {
            return;
        }
        self.synced_once = true;
        if !self.dirty {
            self.form = ProfileForm::from_user(user);
        }
    }

    pub fn set_form(&mut self, form: ProfileForm) {
        self.form = form;
        self.dirty = true;
    }

    /// Drops in-flight load and save state without a banner or form change.
    pub fn abandon_requests(&mut self) {
        self.loading = false;
        self.saving = false;
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Returns the generation of a banner to schedule, if one was shown.
    pub fn finish_load(&mut self, result: Result<&AuthUser, &ApiError>) -> Option<u64> {
        self.loading = false;
        match result {
            Ok(user) => {
                self.synced_once = true;
                if !self.dirty {
                    self.form = ProfileForm::from_user(user);
                }
                None
            }
            Err(error) => {
                warn!(%error, "failed to load profile");
                Some(self.show_banner(BannerKind::Error, LOAD_FAILED_BANNER))
            }
        }
    }

    pub fn begin_update(&mut self) -> ProfilePayload {
        self.saving = true;
        self.form.to_payload()
    }

    /// Always ends with a banner; returns its generation.
    pub fn finish_update(&mut self, result: Result<&AuthUser, &ApiError>) -> u64 {
        self.saving = false;
        match result {
            Ok(user) => {
                self.form = ProfileForm::from_user(user);
                self.dirty = false;
                self.synced_once = true;
                self.show_banner(BannerKind::Success, UPDATED_BANNER)
            }
            Err(error) => {
                warn!(%error, "failed to update profile");
                let message = error.server_message_or(UPDATE_FAILED_BANNER);
                self.show_banner(BannerKind::Error, message)
            }
        }
    }

    /// False when an upload is already running.
    pub fn begin_upload(&mut self) -> bool {
        if self.uploading {
            return false;
        }
        self.uploading = true;
        true
    }

    pub fn finish_upload(&mut self, result: Result<Option<String>, ApiError>) -> Option<u64> {
        self.uploading = false;
        match result {
            Ok(Some(url)) => {
                self.form.avatar_url = url;
                self.dirty = true;
                None
            }
            Ok(None) => {
                warn!("avatar upload response had no url");
                Some(self.show_banner(BannerKind::Error, AVATAR_FAILED_BANNER))
            }
            Err(error) => {
                warn!(%error, "failed to upload avatar");
                Some(self.show_banner(BannerKind::Error, AVATAR_FAILED_BANNER))
            }
        }
    }

    pub fn show_banner(&mut self, kind: BannerKind, message: impl Into<String>) -> u64 {
        self.banner_generation += 1;
        self.banner = Some(Banner {
            kind,
            message: message.into(),
            generation: self.banner_generation,
        });
        self.banner_generation
    }

    /// Clears the banner only if it is still the one the timer was set for.
    pub fn expire_banner(&mut self, generation: u64) -> bool {
        match &self.banner {
            Some(banner) if banner.generation == generation => {
                self.banner = None;
                true
            }
            _ => false,
        }
    }
}
