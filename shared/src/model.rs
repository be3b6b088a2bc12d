use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Config;
use crate::profile::ProfileEditor;
use crate::session::Session;
use crate::trips::{TripList, TripMutations};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(pub i64);

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TripAuthor {
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: TripId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Upload order.
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub author: Option<TripAuthor>,
}

impl Trip {
    /// Case-insensitive substring match on title or description.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Everything the core owns. Each component keeps its own state; `App`
/// wires them together.
#[derive(Debug, Default)]
pub struct Model {
    pub config: Config,
    pub session: Session,
    pub trips: TripList,
    pub mutations: TripMutations,
    pub profile: ProfileEditor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trip_decodes_with_optional_fields_missing() {
        let json = r#"{"id": 7, "title": "Porto", "description": "Bridges"}"#;
        let trip: Trip = serde_json::from_str(json).unwrap();
        assert_eq!(trip.id, TripId(7));
        assert!(trip.photos.is_empty());
        assert!(trip.tags.is_empty());
        assert_eq!(trip.latitude, None);
        assert_eq!(trip.author, None);
    }

    #[test]
    fn trip_decodes_camel_case_fields() {
        let trip: Trip = serde_json::from_value(serde_json::json!({
            "id": 3,
            "title": "Kyoto",
            "description": "Temples",
            "photos": ["https://cdn.example.com/a.jpg"],
            "tags": ["temples", "food"],
            "latitude": 35.01,
            "longitude": 135.77,
            "createdAt": "2024-04-01T10:00:00Z",
            "author": {"name": "Ana", "avatarUrl": "https://cdn.example.com/ana.png"}
        }))
        .unwrap();

        assert_eq!(trip.created_at.as_deref(), Some("2024-04-01T10:00:00Z"));
        assert_eq!(trip.latitude, Some(35.01));
        let author = trip.author.unwrap();
        assert_eq!(author.avatar_url.as_deref(), Some("https://cdn.example.com/ana.png"));
        assert_eq!(author.bio, None);
    }

    #[test]
    fn matching_checks_title_and_description() {
        let trip = Trip {
            id: TripId(1),
            title: "Surf Week".into(),
            description: "Waves in PENICHE".into(),
            photos: vec![],
            tags: vec![],
            latitude: None,
            longitude: None,
            created_at: None,
            updated_at: None,
            author: None,
        };
        assert!(trip.matches("surf"));
        assert!(trip.matches("peniche"));
        assert!(!trip.matches("lisbon"));
    }

    #[test]
    fn auth_user_allows_null_profile_fields() {
        let user: AuthUser = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "email": "ana@example.com",
            "displayName": null
        }))
        .unwrap();
        assert_eq!(user.display_name, None);
        assert_eq!(user.bio, None);
    }
}
