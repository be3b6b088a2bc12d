use crux_core::App as _;
use serde::de::DeserializeOwned;
use tracing::{debug, info, info_span, warn};

use crate::api::{decode_json, expect_success, ApiClient, ApiError, UploadResponse};
use crate::capabilities::{Capabilities, HttpError, HttpRequest, HttpResult, KvResult, NamespacedKv};
use crate::event::Event;
use crate::model::{AuthUser, Model};
use crate::profile::{BannerKind, SIGN_IN_TO_UPDATE_BANNER, SIGN_IN_TO_UPLOAD_BANNER};
use crate::session::token_key;
use crate::trips::{Execution, TripList, SIGN_IN_ALERT};
use crate::view::ViewModel;

#[derive(Default)]
pub struct App;

type OnResponse = fn(Box<HttpResult>) -> Event;

impl App {
    /// Dispatches a built request, or feeds a build failure straight back in
    /// as the response event.
    fn send(
        &self,
        request: Result<HttpRequest, HttpError>,
        on_response: OnResponse,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        match request {
            Ok(request) => {
                debug!(
                    method = request.method().as_str(),
                    url = request.url().as_str(),
                    request_id = request.request_id(),
                    "sending request"
                );
                caps.http
                    .send(request, move |result| on_response(Box::new(result)));
            }
            Err(error) => {
                warn!(%error, "could not build request");
                self.update(on_response(Box::new(Err(error))), model, caps);
            }
        }
    }

    fn fetch_trips(&self, model: &mut Model, caps: &Capabilities) {
        let Some(token) = model.session.token() else {
            debug!("no session, skipping trip fetch");
            return;
        };
        let request = ApiClient::new(&model.config, token).my_trips();
        model.trips.begin_fetch();
        self.send(request, Event::TripsFetched, model, caps);
    }

    fn fetch_current_user(&self, model: &mut Model, caps: &Capabilities) {
        let Some(token) = model.session.token() else {
            model.session.logout();
            return;
        };
        let request = ApiClient::new(&model.config, token).current_user();
        model.session.begin_fetch_user();
        self.send(request, Event::CurrentUserFetched, model, caps);
    }

    fn persist_token(model: &Model, caps: &Capabilities) {
        let (Ok(key), Some(bytes)) = (token_key(), model.session.token_bytes()) else {
            return;
        };
        if let Err(error) = caps
            .kv
            .set_key(&key, bytes, |result| Event::TokenStored(Box::new(result)))
        {
            warn!(%error, "failed to persist session token");
        }
    }

    fn forget_token(caps: &Capabilities) {
        match token_key() {
            Ok(key) => caps
                .kv
                .delete_key(&key, |result| Event::TokenStored(Box::new(result))),
            Err(error) => warn!(%error, "invalid session storage key"),
        }
    }

    /// Responses that land after logout decode to `ApiError::SignedOut`.
    fn decode_for_session<T: DeserializeOwned>(
        model: &Model,
        result: HttpResult,
    ) -> Result<T, ApiError> {
        if model.session.token().is_none() {
            return Err(ApiError::SignedOut);
        }
        decode_json(result)
    }

    fn end_session(model: &mut Model, caps: &Capabilities) {
        model.session.logout();
        model.trips = TripList::default();
        Self::forget_token(caps);
    }

    fn schedule_banner_expiry(model: &Model, caps: &Capabilities, generation: u64) {
        caps.timer
            .after(model.config.banner_timeout_ms, move |_| Event::BannerExpired {
                generation,
            });
    }

    fn on_stored_token(&self, result: KvResult, model: &mut Model, caps: &Capabilities) {
        model.session.mark_hydrated();
        let bytes = match result {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("no stored session token");
                return;
            }
            Err(error) => {
                warn!(%error, "failed to read stored session token");
                return;
            }
        };

        let token = match String::from_utf8(bytes) {
            Ok(token) => token,
            Err(error) => {
                warn!(%error, "stored session token is not valid UTF-8");
                Self::forget_token(caps);
                return;
            }
        };

        if model.session.set_token(Some(token)) {
            info!("session restored from storage");
            self.fetch_current_user(model, caps);
            self.fetch_trips(model, caps);
        }
    }

    fn confirm_pending(&self, model: &mut Model, caps: &Capabilities) {
        let Some(token) = model.session.token() else {
            model.mutations.raise_alert(SIGN_IN_ALERT);
            return;
        };

        let execution = match model.mutations.confirm() {
            Ok(execution) => execution,
            Err(error) => {
                warn!(%error, "confirmation ignored");
                return;
            }
        };

        let api = ApiClient::new(&model.config, token);
        let (request, on_response) = match &execution {
            Execution::Create(payload) => {
                (api.create_trip(payload), Event::TripSaved as OnResponse)
            }
            Execution::Update { id, payload } => {
                (api.update_trip(*id, payload), Event::TripSaved as OnResponse)
            }
            Execution::Delete { id } => (api.delete_trip(*id), Event::TripDeleted as OnResponse),
        };
        self.send(request, on_response, model, caps);
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let _span = info_span!("update", event = event.name()).entered();
        if event.is_user_initiated() {
            debug!("user action");
        }

        match event {
            Event::Started => {
                match token_key() {
                    Ok(key) => caps
                        .kv
                        .get_key(&key, |result| Event::StoredTokenLoaded(Box::new(result))),
                    Err(error) => {
                        warn!(%error, "invalid session storage key");
                        model.session.mark_hydrated();
                    }
                }
                caps.render.render();
            }

            Event::Configured(config) => {
                info!(api_base_url = %config.api_base_url, "configuration replaced");
                model.config = config;
            }

            Event::StoredTokenLoaded(result) => {
                self.on_stored_token(*result, model, caps);
                caps.render.render();
            }

            Event::TokenIssued { token } => {
                if model.session.set_token(Some(token.into_inner())) {
                    info!("signed in");
                    Self::persist_token(model, caps);
                    self.fetch_current_user(model, caps);
                    self.fetch_trips(model, caps);
                } else {
                    Self::end_session(model, caps);
                }
                caps.render.render();
            }

            Event::TokenStored(result) => match *result {
                Ok(previous) => debug!(
                    replaced = previous.is_some(),
                    "session storage updated"
                ),
                Err(error) => warn!(%error, "session storage update failed"),
            },

            Event::CurrentUserRequested => {
                self.fetch_current_user(model, caps);
                caps.render.render();
            }

            Event::CurrentUserFetched(result) => {
                match Self::decode_for_session::<AuthUser>(model, *result) {
                    Ok(user) => {
                        model.profile.sync_from_user(&user);
                        model.session.finish_fetch_user(Some(user));
                    }
                    Err(ApiError::SignedOut) => {
                        debug!("discarding identity for a closed session");
                        model.session.finish_fetch_user(None);
                    }
                    Err(error) => {
                        warn!(
                            %error,
                            status = ?error.status(),
                            "failed to fetch current user, signing out"
                        );
                        model.session.finish_fetch_user(None);
                        Self::end_session(model, caps);
                    }
                }
                caps.render.render();
            }

            Event::LogoutRequested => {
                info!("signed out");
                Self::end_session(model, caps);
                caps.render.render();
            }

            Event::TripsRequested => {
                self.fetch_trips(model, caps);
                caps.render.render();
            }

            Event::TripsFetched(result) => {
                let trips = Self::decode_for_session(model, *result);
                model.trips.finish_fetch(trips);
                caps.render.render();
            }

            Event::SearchChanged { query } => {
                model.trips.set_search_query(query);
                caps.render.render();
            }

            Event::PageRequested { page } => {
                if model.trips.change_page(page) {
                    caps.render.render();
                }
            }

            Event::CreateTripRequested => {
                if let Err(error) = model.mutations.open_create() {
                    warn!(%error, "cannot open trip form");
                }
                caps.render.render();
            }

            Event::EditTripRequested { trip_id } => {
                let result = match model.trips.find(trip_id) {
                    Some(trip) => model.mutations.open_edit(trip),
                    None => {
                        warn!(%trip_id, "edit requested for unknown trip");
                        return;
                    }
                };
                if let Err(error) = result {
                    warn!(%error, "cannot open trip form");
                }
                caps.render.render();
            }

            Event::DeleteTripRequested { trip_id } => {
                let result = match model.trips.find(trip_id) {
                    Some(trip) => model.mutations.open_delete(trip),
                    None => {
                        warn!(%trip_id, "delete requested for unknown trip");
                        return;
                    }
                };
                if let Err(error) = result {
                    warn!(%error, "cannot stage delete");
                }
                caps.render.render();
            }

            Event::TripModalClosed => {
                if let Err(error) = model.mutations.close_modal() {
                    warn!(%error, "cannot close trip form");
                }
                caps.render.render();
            }

            Event::TripSubmitted(form) => {
                if let Err(error) = model.mutations.stage_save(form) {
                    warn!(%error, "cannot stage trip save");
                }
                caps.render.render();
            }

            Event::ConfirmationAccepted => {
                self.confirm_pending(model, caps);
                caps.render.render();
            }

            Event::ConfirmationCancelled => {
                if let Err(error) = model.mutations.cancel_confirmation() {
                    warn!(%error, "cannot cancel confirmation");
                }
                caps.render.render();
            }

            Event::TripSaved(result) => {
                if model.mutations.finish_save(expect_success(*result)) {
                    info!("trip saved");
                    self.fetch_trips(model, caps);
                }
                caps.render.render();
            }

            Event::TripDeleted(result) => {
                if model.mutations.finish_delete(expect_success(*result)) {
                    info!("trip deleted");
                    self.fetch_trips(model, caps);
                }
                caps.render.render();
            }

            Event::PhotosSelected { files } => {
                if files.is_empty() {
                    return;
                }
                let Some(token) = model.session.token() else {
                    model.mutations.raise_alert(SIGN_IN_ALERT);
                    caps.render.render();
                    return;
                };
                let request = match model.mutations.begin_upload(files) {
                    Ok(Some(file)) => ApiClient::new(&model.config, token).upload_file(file),
                    Ok(None) => return,
                    Err(error) => {
                        warn!(%error, "photo selection ignored");
                        return;
                    }
                };
                self.send(request, Event::PhotoUploaded, model, caps);
                caps.render.render();
            }

            Event::PhotoUploaded(result) => {
                let url = decode_json::<UploadResponse>(*result).map(|upload| upload.url);
                model.mutations.finish_upload(url);
                caps.render.render();
            }

            Event::PhotoRemoved { index } => {
                model.mutations.remove_photo(index);
                caps.render.render();
            }

            Event::AlertDismissed => {
                model.mutations.dismiss_alert();
                caps.render.render();
            }

            Event::ProfileRequested => {
                let Some(token) = model.session.token() else {
                    debug!("no session, skipping profile load");
                    return;
                };
                let request = ApiClient::new(&model.config, token).current_user();
                model.profile.begin_load();
                self.send(request, Event::ProfileUserFetched, model, caps);
                caps.render.render();
            }

            Event::ProfileUserFetched(result) => {
                match Self::decode_for_session::<AuthUser>(model, *result) {
                    Ok(user) => {
                        model.profile.finish_load(Ok(&user));
                        model.session.set_user(user);
                    }
                    Err(ApiError::SignedOut) => {
                        debug!("discarding profile for a closed session");
                        model.profile.abandon_requests();
                    }
                    Err(error) => {
                        if let Some(generation) = model.profile.finish_load(Err(&error)) {
                            Self::schedule_banner_expiry(model, caps, generation);
                        }
                        Self::end_session(model, caps);
                    }
                }
                caps.render.render();
            }

            Event::ProfileEdited(form) => {
                model.profile.set_form(form);
                caps.render.render();
            }

            Event::ProfileSubmitted => {
                let Some(token) = model.session.token() else {
                    let generation = model
                        .profile
                        .show_banner(BannerKind::Error, SIGN_IN_TO_UPDATE_BANNER);
                    Self::schedule_banner_expiry(model, caps, generation);
                    caps.render.render();
                    return;
                };
                if model.profile.is_saving() {
                    debug!("profile update already in flight");
                    return;
                }
                let payload = model.profile.begin_update();
                let request = ApiClient::new(&model.config, token).update_profile(&payload);
                self.send(request, Event::ProfileUpdated, model, caps);
                caps.render.render();
            }

            Event::ProfileUpdated(result) => {
                let generation = match Self::decode_for_session::<AuthUser>(model, *result) {
                    Ok(user) => {
                        let generation = model.profile.finish_update(Ok(&user));
                        model.session.set_user(user);
                        generation
                    }
                    Err(ApiError::SignedOut) => {
                        debug!("discarding profile update for a closed session");
                        model.profile.abandon_requests();
                        caps.render.render();
                        return;
                    }
                    Err(error) => model.profile.finish_update(Err(&error)),
                };
                Self::schedule_banner_expiry(model, caps, generation);
                caps.render.render();
            }

            Event::AvatarSelected { file } => {
                let Some(token) = model.session.token() else {
                    let generation = model
                        .profile
                        .show_banner(BannerKind::Error, SIGN_IN_TO_UPLOAD_BANNER);
                    Self::schedule_banner_expiry(model, caps, generation);
                    caps.render.render();
                    return;
                };
                let request = ApiClient::new(&model.config, token).upload_file(file);
                if !model.profile.begin_upload() {
                    debug!("avatar upload already in flight");
                    return;
                }
                self.send(request, Event::AvatarUploaded, model, caps);
                caps.render.render();
            }

            Event::AvatarUploaded(result) => {
                let url = decode_json::<UploadResponse>(*result).map(|upload| upload.url);
                if let Some(generation) = model.profile.finish_upload(url) {
                    Self::schedule_banner_expiry(model, caps, generation);
                }
                caps.render.render();
            }

            Event::BannerExpired { generation } => {
                if model.profile.expire_banner(generation) {
                    caps.render.render();
                }
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::new(model)
    }
}
