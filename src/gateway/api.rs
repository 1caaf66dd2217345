//! REST API handlers for the session/transcript endpoints.

use super::error::ApiError;
use super::AppState;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::sessions::{Message, Role, SessionId, StoreError};

// ── Request/response bodies ──────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateSessionBody {
    pub session_user: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
    pub session_user: String,
    pub created_at: String,
}

#[derive(Deserialize)]
pub struct CreateMessageBody {
    /// Kept as a free string here; decoded to [`Role`] in the handler so
    /// unknown values produce the domain 400, not a framework rejection.
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct RoleQuery {
    pub role: Option<String>,
}

// ── Helpers ──────────────────────────────────────────────────────

/// Path ids are positive integers; `0` parses but is out of range.
fn require_positive(session_id: SessionId) -> Result<(), ApiError> {
    if session_id == 0 {
        return Err(ApiError::Unprocessable(
            "Session ID must be a positive integer.",
        ));
    }
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────

/// POST /sessions — register a session for a username
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(body): Json<CreateSessionBody>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state.store.create_session(&body.session_user).await?;
    tracing::info!(session_id = session.id, user = %session.user, "Session created");
    Ok(Json(SessionResponse {
        session_id: session.id,
        created_at: session.created_at_iso(),
        session_user: session.user,
    }))
}

/// POST /sessions/{session_id}/messages — append one message
pub async fn handle_add_message(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    Json(body): Json<CreateMessageBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_positive(session_id)?;
    // Shape checks come first, domain checks second. Within the domain,
    // session existence outranks role validity: an unknown id with a bad
    // role still answers 404.
    if body.content.is_empty() {
        return Err(ApiError::Unprocessable("Content cannot be empty."));
    }
    if !state.store.session_exists(session_id).await {
        return Err(StoreError::SessionNotFound.into());
    }
    let role: Role = body.role.parse()?;

    state
        .store
        .append_message(session_id, role, body.content)
        .await?;
    Ok(Json(json!({ "detail": "Message added successfully." })))
}

/// GET /sessions/{session_id}/messages?role= — read the transcript
pub async fn handle_list_messages(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
    Query(params): Query<RoleQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    require_positive(session_id)?;
    if !state.store.session_exists(session_id).await {
        return Err(StoreError::SessionNotFound.into());
    }

    let role_filter = match params.role.as_deref() {
        // An absent or empty role query means "no filter".
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<Role>()
                .map_err(|_| StoreError::InvalidRoleFilter)?,
        ),
    };

    let messages = state.store.messages(session_id, role_filter).await?;
    Ok(Json(messages))
}

/// GET /health — process uptime and store totals
pub async fn handle_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let health = crate::health::snapshot();
    Json(json!({
        "status": "ok",
        "uptime_seconds": health.uptime_seconds,
        "sessions": state.store.session_count().await,
        "messages": state.store.message_count().await,
        "store_backend": state.store.name(),
    }))
}
