//! Request extractors that reject with [`ApiError`] bodies.

use super::error::ApiError;
use super::state::AppState;
use crate::account::domain::User;
use crate::blob::Upload;
use axum::extract::{FromRequest, FromRequestParts, Multipart, Query, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";
const INVALID_TOKEN: &str = "Given token not valid for any token type.";

/// The active user named by the request's bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(ApiError::Unauthorized(MISSING_CREDENTIALS))?
            .to_str()
            .map_err(|_| ApiError::Unauthorized(INVALID_TOKEN))?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::Unauthorized(MISSING_CREDENTIALS))?;
        let user_id = state.tokens.verify(token).map_err(|err| {
            tracing::debug!(error = %err, "rejected bearer token");
            ApiError::Unauthorized(INVALID_TOKEN)
        })?;
        let user = state
            .accounts
            .find_active(user_id)
            .await?
            .ok_or(ApiError::Unauthorized(INVALID_TOKEN))?;
        Ok(Self(user))
    }
}

/// JSON body whose parse failures become 400 responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Query string whose parse failures become 400 responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct Params<T>(pub T);

impl<S, T> FromRequestParts<S> for Params<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Deserialises a present-but-null field as `Some(None)`.
///
/// Combined with `#[serde(default)]`, an absent field stays `None`, so
/// partial updates can tell "leave unchanged" from "clear".
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Multipart form holding one `file` part and plain text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    upload: Option<Upload>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Reads every part of `multipart`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] for malformed or oversized bodies.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| ApiError::BadRequest(err.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_owned();
            if name == "file" {
                let file_name = field.file_name().unwrap_or("upload").to_owned();
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| ApiError::BadRequest(err.body_text()))?;
                form.upload = Some(Upload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|err| ApiError::BadRequest(err.body_text()))?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    /// Text value of `name`, or an empty string.
    #[must_use]
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Takes the uploaded file.
    ///
    /// # Errors
    ///
    /// Returns a `file` field error when no file part was sent.
    pub fn take_upload(&mut self) -> Result<Upload, ApiError> {
        self.upload
            .take()
            .ok_or_else(|| ApiError::field("file", "No file was submitted."))
    }
}
