use crate::error::{AppError, Result};
use crate::model::{LinkInfoResponse, ShortenRequest, ShortenResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use kussx_core::ShortKey;
use tracing::debug;

/// A path segment that cannot be a [`ShortKey`] names no stored link.
fn parse_key(raw: String) -> Option<ShortKey> {
    match ShortKey::new(raw) {
        Ok(key) => Some(key),
        Err(e) => {
            debug!(error = %e, "Path is not a short key");
            None
        }
    }
}

/// `POST /shorten`
pub async fn shorten_handler(
    State(state): State<AppState>,
    request: std::result::Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>> {
    let Json(request) = request?;
    let url = request
        .url
        .ok_or_else(|| AppError::BadRequest("url is required".to_string()))?;

    let key = state.shortener().create(&url).await?;
    Ok(Json(ShortenResponse { key }))
}

/// `GET /{key}`
///
/// Answers with `307 Temporary Redirect` and queues the access count; the
/// count is written after the response has left.
pub async fn redirect_handler(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let key = parse_key(key).ok_or(AppError::NotFound)?;
    let record = state.shortener().resolve(&key).await?;

    let location = HeaderValue::from_str(&record.url).map_err(|e| {
        AppError::Internal(format!("stored url for '{key}' is not a valid header: {e}"))
    })?;

    debug!(key = %key, "Redirecting");
    state.shortener().record_access(key, record);

    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
}

/// `GET /{key}/info`
pub async fn info_url_handler(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkInfoResponse>> {
    let key = parse_key(key).ok_or(AppError::NotFound)?;
    let record = state.shortener().inspect(&key).await?;
    Ok(Json(record.into()))
}

/// `DELETE /{key}`
///
/// Always `200` unless the store fails, whether or not the key existed.
pub async fn delete_url_handler(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    let Some(key) = parse_key(key) else {
        return Ok(StatusCode::OK);
    };
    state.shortener().delete(&key).await?;
    Ok(StatusCode::OK)
}
