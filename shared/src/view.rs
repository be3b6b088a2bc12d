use serde::{Deserialize, Serialize};

use crate::model::{AuthUser, Model, Trip};
use crate::profile::{Banner, ProfileForm};
use crate::trips::{ConfirmationRequest, ModalMode, PageLabel, TripDraft, TRIPS_PER_PAGE};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub session: SessionView,
    pub trips: TripListView,
    pub editor: TripEditorView,
    pub profile: ProfileView,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub authenticated: bool,
    pub has_token: bool,
    pub hydrated: bool,
    pub fetching_user: bool,
    pub user: Option<AuthUser>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripListView {
    pub loading: bool,
    pub search_query: String,
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: usize,
    /// Trips left after the search filter.
    pub match_count: usize,
    pub total_count: usize,
    pub items: Vec<Trip>,
    pub pages: Vec<PageLabel>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TripEditorView {
    pub modal_open: bool,
    pub mode: Option<ModalMode>,
    pub draft: Option<TripDraft>,
    pub confirmation: Option<ConfirmationRequest>,
    pub submitting: bool,
    pub uploading: bool,
    /// Changes whenever the file input should be cleared.
    pub upload_input_epoch: u64,
    pub alert: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub form: ProfileForm,
    pub dirty: bool,
    pub loading: bool,
    pub saving: bool,
    pub uploading: bool,
    pub banner: Option<Banner>,
}

impl ViewModel {
    pub fn new(model: &Model) -> Self {
        let session = &model.session;
        let list = &model.trips;
        let mutations = &model.mutations;
        let profile = &model.profile;
        let modal = mutations.modal();

        Self {
            session: SessionView {
                authenticated: session.is_authenticated(),
                has_token: session.token().is_some(),
                hydrated: session.is_hydrated(),
                fetching_user: session.is_fetching_user(),
                user: session.user().cloned(),
            },
            trips: TripListView {
                loading: list.is_loading(),
                search_query: list.search_query().to_string(),
                current_page: list.current_page(),
                total_pages: list.total_pages(),
                page_size: TRIPS_PER_PAGE,
                match_count: list.filtered().len(),
                total_count: list.trips().len(),
                items: list.paginated().into_iter().cloned().collect(),
                pages: list.displayed_pages().collect(),
            },
            editor: TripEditorView {
                modal_open: modal.is_some(),
                mode: modal.map(|m| m.mode),
                draft: modal.map(|m| m.draft.clone()),
                confirmation: mutations.confirmation().cloned(),
                submitting: mutations.is_submitting(),
                uploading: mutations.is_uploading(),
                upload_input_epoch: mutations.upload_epoch(),
                alert: mutations.alert().map(str::to_string),
            },
            profile: ProfileView {
                form: profile.form().clone(),
                dirty: profile.is_dirty(),
                loading: profile.is_loading(),
                saving: profile.is_saving(),
                uploading: profile.is_uploading(),
                banner: profile.banner().cloned(),
            },
        }
    }
}
