//! Session endpoints

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::Value;

use crate::{error::AppResult, AppState};

use super::{ApiJson, SuccessResponse};

/// Session cookie with attributes for the current deployment environment.
/// Production front-ends are cross-site, so the cookie must be `Secure; SameSite=None`.
fn session_cookie(state: &AppState, value: String) -> Cookie<'static> {
    let production = state.config.environment.is_production();

    Cookie::build((state.services.auth.cookie_name().to_string(), value))
        .http_only(true)
        .path("/")
        .secure(production)
        .same_site(if production {
            SameSite::None
        } else {
            SameSite::Strict
        })
        .build()
}

/// Issue a session cookie for the given identity
#[utoipa::path(
    post,
    path = "/jwt",
    tag = "auth",
    request_body(content = Object, description = "Identity payload, must contain `email`"),
    responses(
        (status = 200, description = "Session cookie set", body = SuccessResponse),
        (status = 400, description = "Payload has no email", body = crate::error::ErrorResponse)
    )
)]
pub async fn issue_session(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(payload): ApiJson<Value>,
) -> AppResult<(CookieJar, Json<SuccessResponse>)> {
    let token = state.services.auth.issue_token(payload)?;
    let jar = jar.add(session_cookie(&state, token));

    Ok((jar, Json(SuccessResponse { success: true })))
}

/// Clear the session cookie
#[utoipa::path(
    get,
    path = "/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session cookie cleared", body = SuccessResponse)
    )
)]
pub async fn clear_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<SuccessResponse>) {
    let mut cookie = session_cookie(&state, String::new());
    cookie.make_removal();

    (jar.add(cookie), Json(SuccessResponse { success: true }))
}
