//! Code reservation endpoint.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use deaddrop_core::code::generate_code;
use serde::Serialize;

/// Upper bound on reservation attempts. At 8 unambiguous characters a
/// collision is astronomically unlikely, but liveness must not depend on
/// that: after this many collisions the request fails with 503 instead of
/// spinning.
pub const MAX_RESERVE_ATTEMPTS: u32 = 10;

/// Response body for a freshly issued code.
#[derive(Debug, Serialize)]
pub struct CodeResponse {
    /// The reserved access code.
    pub code: String,
}

/// POST /code - Reserve a fresh access code.
pub async fn issue_code(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let ttl = state.config.server.placeholder_ttl();
    let length = state.config.server.code_length;

    for attempt in 1..=MAX_RESERVE_ATTEMPTS {
        let code = generate_code(length);
        match state.store.reserve_code(&code, ttl).await {
            Ok(true) => {
                let location = format!("/message/{code}");
                return Ok((
                    StatusCode::CREATED,
                    [(header::LOCATION, location)],
                    Json(CodeResponse { code }),
                ));
            }
            Ok(false) => {
                tracing::debug!(attempt, "code collision, retrying with a fresh code");
            }
            Err(e) => {
                tracing::error!(endpoint = "code", error = %e, "code reservation failed");
                return Err(e.into());
            }
        }
    }

    tracing::error!(
        endpoint = "code",
        attempts = MAX_RESERVE_ATTEMPTS,
        "giving up on code reservation, every candidate collided"
    );
    Err(ApiError::CodesExhausted {
        attempts: MAX_RESERVE_ATTEMPTS,
    })
}
