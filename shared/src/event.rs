use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capabilities::{FileRef, HttpResult, KvResult};
use crate::config::Config;
use crate::model::TripId;
use crate::profile::ProfileForm;
use crate::trips::{PageLabel, TripForm};

/// A bearer token handed over by the shell after login. Redacted in `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssuedToken(String);

impl IssuedToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Started,
    Configured(Config),

    // session
    StoredTokenLoaded(Box<KvResult>),
    TokenIssued { token: IssuedToken },
    TokenStored(Box<KvResult>),
    CurrentUserRequested,
    CurrentUserFetched(Box<HttpResult>),
    LogoutRequested,

    // trip list
    TripsRequested,
    TripsFetched(Box<HttpResult>),
    SearchChanged { query: String },
    PageRequested { page: PageLabel },

    // trip mutations
    CreateTripRequested,
    EditTripRequested { trip_id: TripId },
    DeleteTripRequested { trip_id: TripId },
    TripModalClosed,
    TripSubmitted(TripForm),
    ConfirmationAccepted,
    ConfirmationCancelled,
    TripSaved(Box<HttpResult>),
    TripDeleted(Box<HttpResult>),
    PhotosSelected { files: Vec<FileRef> },
    PhotoUploaded(Box<HttpResult>),
    PhotoRemoved { index: usize },
    AlertDismissed,

    // profile
    ProfileRequested,
    ProfileUserFetched(Box<HttpResult>),
    ProfileEdited(ProfileForm),
    ProfileSubmitted,
    ProfileUpdated(Box<HttpResult>),
    AvatarSelected { file: FileRef },
    AvatarUploaded(Box<HttpResult>),
    BannerExpired { generation: u64 },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Configured(_) => "configured",
            Self::StoredTokenLoaded(_) => "stored_token_loaded",
            Self::TokenIssued { .. } => "token_issued",
            Self::TokenStored(_) => "token_stored",
            Self::CurrentUserRequested => "current_user_requested",
            Self::CurrentUserFetched(_) => "current_user_fetched",
            Self::LogoutRequested => "logout_requested",
            Self::TripsRequested => "trips_requested",
            Self::TripsFetched(_) => "trips_fetched",
            Self::SearchChanged { .. } => "search_changed",
            Self::PageRequested { .. } => "page_requested",
            Self::CreateTripRequested => "create_trip_requested",
            Self::EditTripRequested { .. } => "edit_trip_requested",
            Self::DeleteTripRequested { .. } => "delete_trip_requested",
            Self::TripModalClosed => "trip_modal_closed",
            Self::TripSubmitted(_) => "trip_submitted",
            Self::ConfirmationAccepted => "confirmation_accepted",
            Self::ConfirmationCancelled => "confirmation_cancelled",
            Self::TripSaved(_) => "trip_saved",
            Self::TripDeleted(_) => "trip_deleted",
            Self::PhotosSelected { .. } => "photos_selected",
            Self::PhotoUploaded(_) => "photo_uploaded",
            Self::PhotoRemoved { .. } => "photo_removed",
            Self::AlertDismissed => "alert_dismissed",
            Self::ProfileRequested => "profile_requested",
            Self::ProfileUserFetched(_) => "profile_user_fetched",
            Self::ProfileEdited(_) => "profile_edited",
            Self::ProfileSubmitted => "profile_submitted",
            Self::ProfileUpdated(_) => "profile_updated",
            Self::AvatarSelected { .. } => "avatar_selected",
            Self::AvatarUploaded(_) => "avatar_uploaded",
            Self::BannerExpired { .. } => "banner_expired",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::LogoutRequested
                | Self::SearchChanged { .. }
                | Self::PageRequested { .. }
                | Self::CreateTripRequested
                | Self::EditTripRequested { .. }
                | Self::DeleteTripRequested { .. }
                | Self::TripModalClosed
                | Self::TripSubmitted(_)
                | Self::ConfirmationAccepted
                | Self::ConfirmationCancelled
                | Self::PhotosSelected { .. }
                | Self::PhotoRemoved { .. }
                | Self::AlertDismissed
                | Self::ProfileEdited(_)
                | Self::ProfileSubmitted
                | Self::AvatarSelected { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_is_redacted_in_debug() {
        let event = Event::TokenIssued {
            token: IssuedToken::new("eyJhbGciOi"),
        };
        let printed = format!("{event:?}");
        assert!(!printed.contains("eyJhbGciOi"));
    }

    #[test]
    fn issued_token_serializes_as_plain_string() {
        let event = Event::TokenIssued {
            token: IssuedToken::new("abc"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({"TokenIssued": {"token": "abc"}}));
    }

    #[test]
    fn page_request_accepts_numbers_from_the_shell() {
        let event: Event =
            serde_json::from_value(serde_json::json!({"PageRequested": {"page": 3}})).unwrap();
        assert!(matches!(
            event,
            Event::PageRequested {
                page: PageLabel::Page(3)
            }
        ));
        assert!(event.is_user_initiated());
        assert_eq!(event.name(), "page_requested");
    }
}
