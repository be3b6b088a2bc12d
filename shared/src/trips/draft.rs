use serde::{Deserialize, Serialize};

use crate::model::{Trip, TripId};

/// Editable form fields as the shell reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripForm {
    pub title: String,
    pub description: String,
    /// Comma separated.
    pub tags: String,
    pub latitude: String,
    pub longitude: String,
}

/// The trip being created or edited inside the modal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDraft {
    pub id: Option<TripId>,
    pub title: String,
    pub description: String,
    pub photos: Vec<String>,
    pub tags: String,
    pub latitude: String,
    pub longitude: String,
}

impl TripDraft {
    pub fn from_trip(trip: &Trip) -> Self {
        Self {
            id: Some(trip.id),
            title: trip.title.clone(),
            description: trip.description.clone(),
            photos: trip.photos.clone(),
            tags: trip.tags.join(", "),
            latitude: trip.latitude.map(|v| v.to_string()).unwrap_or_default(),
            longitude: trip.longitude.map(|v| v.to_string()).unwrap_or_default(),
        }
    }

    /// Form fields overwrite the draft; photos stay.
    pub fn merge_form(&mut self, form: TripForm) {
        self.title = form.title;
        self.description = form.description;
        self.tags = form.tags;
        self.latitude = form.latitude;
        self.longitude = form.longitude;
    }

    pub fn push_photo(&mut self, url: String) {
        self.photos.push(url);
    }

    /// Out-of-range indices are ignored.
    pub fn remove_photo(&mut self, index: usize) -> Option<String> {
        (index < self.photos.len()).then(|| self.photos.remove(index))
    }

    pub fn to_payload(&self) -> TripPayload {
        TripPayload {
            title: self.title.clone(),
            description: self.description.clone(),
            photos: self.photos.clone(),
            tags: normalize_tags(&self.tags),
            latitude: parse_coordinate(&self.latitude),
            longitude: parse_coordinate(&self.longitude),
        }
    }
}

/// Body of `POST /trips` and `PUT /trips/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPayload {
    pub title: String,
    pub description: String,
    pub photos: Vec<String>,
    pub tags: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Splits on commas, trims, drops empties. Order and duplicates are kept.
pub fn normalize_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Blank, unparsable and non-finite input all become `None`.
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
