//! Message attachment and one-time retrieval endpoints.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

/// PUT /message/{code} - Attach a ciphertext payload to a reserved code.
///
/// The payload is opaque to the server: it is stored and later returned
/// byte for byte, with only incidental surrounding whitespace trimmed.
/// Every outcome maps to exactly one state: attached (204), untouched
/// conflict (409), untouched bad request (400), or backend failure (500).
pub async fn put_message(
    State(state): State<AppState>,
    Path(code): Path<String>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let trimmed = body.trim_ascii();
    if trimmed.is_empty() {
        tracing::debug!(endpoint = "message_put", "empty body rejected");
        return Err(ApiError::BadRequest(
            "message body must not be empty".to_string(),
        ));
    }
    let payload = body.slice_ref(trimmed);

    let ttl = state.config.server.message_ttl();
    match state.store.attach_cipher(&code, payload, ttl).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => {
            tracing::debug!(endpoint = "message_put", "attach conflict");
            Err(ApiError::Conflict(
                "code unknown, expired, or message already attached".to_string(),
            ))
        }
        Err(e) => {
            tracing::error!(endpoint = "message_put", error = %e, "attach failed");
            Err(e.into())
        }
    }
}

/// GET /message/{code} - Retrieve a message exactly once.
///
/// Retrieval is destructive by design: the first successful call removes
/// the record, and every later call for the same code sees 404.
pub async fn get_message(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Response> {
    match state.store.get_and_delete(&code).await {
        // Bare text/plain: the payload is opaque bytes, so declaring a
        // character encoding would be a lie.
        Ok(Some(payload)) => {
            Ok(([(header::CONTENT_TYPE, "text/plain")], payload).into_response())
        }
        Ok(None) => Err(ApiError::NotFound(
            "no message for this code".to_string(),
        )),
        Err(e) => {
            tracing::error!(endpoint = "message_get", error = %e, "destructive read failed");
            Err(e.into())
        }
    }
}
