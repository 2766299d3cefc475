use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::{session, Principal};
use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires authentication.
/// Rejects with `Unauthorized` (a redirect to /login) when the session cookie
/// is missing, unknown or expired.
impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session::cookie_value(&parts.headers, &state.config.auth.cookie_name)
            .ok_or(AppError::Unauthorized)?;

        session::find_session(&state.db, token)?.ok_or(AppError::Unauthorized)
    }
}
