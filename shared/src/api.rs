//! REST endpoints of the travel API and decoding of their responses.
//!
//! Requests are only *built* here; the shell executes them through the
//! `Http` capability and the outcome comes back as an event.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::{FileRef, HttpError, HttpRequest, HttpResult, MultipartPart};
use crate::config::Config;
use crate::model::TripId;
use crate::profile::ProfilePayload;
use crate::trips::TripPayload;

pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiError {
    #[error("not signed in")]
    SignedOut,

    #[error("transport failure: {0}")]
    Transport(#[from] HttpError),

    #[error("server responded with status {status}")]
    Status { status: u16, message: String },

    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server's own error text when it sent one, otherwise `fallback`.
    pub fn server_message_or(&self, fallback: &str) -> String {
        match self {
            ApiError::Status { message, .. } if !message.trim().is_empty() => {
                message.trim().to_string()
            }
            _ => fallback.to_string(),
        }
    }
}

/// `POST /files/upload` answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub url: Option<String>,
}

pub struct ApiClient<'a> {
    config: &'a Config,
    token: &'a SecretString,
}

impl<'a> ApiClient<'a> {
    pub fn new(config: &'a Config, token: &'a SecretString) -> Self {
        Self { config, token }
    }

    pub fn my_trips(&self) -> Result<HttpRequest, HttpError> {
        self.authorize(HttpRequest::get(self.config.endpoint("/trips/mine"))?)
    }

    pub fn create_trip(&self, payload: &TripPayload) -> Result<HttpRequest, HttpError> {
        self.authorize(HttpRequest::post(self.config.endpoint("/trips"))?)?
            .with_json(payload)
    }

    pub fn update_trip(&self, id: TripId, payload: &TripPayload) -> Result<HttpRequest, HttpError> {
        self.authorize(HttpRequest::put(self.config.endpoint(&format!("/trips/{id}")))?)?
            .with_json(payload)
    }

    pub fn delete_trip(&self, id: TripId) -> Result<HttpRequest, HttpError> {
        self.authorize(HttpRequest::delete(
            self.config.endpoint(&format!("/trips/{id}")),
        )?)
    }

    pub fn upload_file(&self, file: FileRef) -> Result<HttpRequest, HttpError> {
        self.authorize(HttpRequest::post(self.config.endpoint("/files/upload"))?)?
            .with_multipart(vec![MultipartPart::File {
                field: UPLOAD_FIELD.to_string(),
                file,
            }])
    }

    pub fn current_user(&self) -> Result<HttpRequest, HttpError> {
        self.authorize(HttpRequest::get(self.config.endpoint("/auth/me"))?)
    }

    pub fn update_profile(&self, payload: &ProfilePayload) -> Result<HttpRequest, HttpError> {
        self.authorize(HttpRequest::patch(self.config.endpoint("/auth/me"))?)?
            .with_json(payload)
    }

    fn authorize(&self, request: HttpRequest) -> Result<HttpRequest, HttpError> {
        request.with_header(
            "Authorization",
            format!("Bearer {}", self.token.expose_secret()),
        )
    }
}

/// Collapses transport errors and non-2xx statuses into `ApiError`, then
/// parses the JSON body.
pub fn decode_json<T: DeserializeOwned>(result: HttpResult) -> Result<T, ApiError> {
    let response = result?;
    if !response.is_success() {
        return Err(ApiError::Status {
            status: response.status(),
            message: response.body_text(),
        });
    }
    serde_json::from_slice(response.body()).map_err(|e| ApiError::MalformedBody(e.to_string()))
}

/// Like [`decode_json`] but for endpoints whose body the client ignores.
pub fn expect_success(result: HttpResult) -> Result<(), ApiError> {
    let response = result?;
    if response.is_success() {
        Ok(())
    } else {
        Err(ApiError::Status {
            status: response.status(),
            message: response.body_text(),
        })
    }
}
