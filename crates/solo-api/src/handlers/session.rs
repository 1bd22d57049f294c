//! Session handlers: credential issuance and logout.

use axum::extract::State;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{removal_cookie, session_cookie};
use crate::error::ApiResult;
use crate::state::AppState;

/// Body of POST /jwt. The identity is opaque to issuance; anything
/// non-empty gets a token.
#[derive(Debug, Deserialize)]
pub struct IssueTokenRequest {
    pub email: String,
}

/// Response for session endpoints, mirroring the original API contract.
#[derive(Serialize)]
pub struct SessionResponse {
    pub success: bool,
}

/// POST /jwt
///
/// Issue a session credential for the given identity and attach it as an
/// http-only cookie.
pub async fn issue_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<IssueTokenRequest>,
) -> ApiResult<(CookieJar, Json<SessionResponse>)> {
    let token = state.keys.issue(&payload.email)?;
    info!(email = %payload.email, "Issued session token");

    let jar = jar.add(session_cookie(token, state.config.is_production()));
    Ok((jar, Json(SessionResponse { success: true })))
}

/// GET /logout
///
/// Clear the session cookie client-side. The expired cookie is sent
/// unconditionally, session or not. The token itself stays valid until
/// expiry; there is no revocation list.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<SessionResponse>) {
    (
        jar.add(removal_cookie()),
        Json(SessionResponse { success: true }),
    )
}
