use askama::Template;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use crate::auth::{accounts, session};
use crate::error::{AppError, AppResult};
use crate::routes::{Found, Html};
use crate::state::AppState;

// -- Templates --

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/register.html")]
pub struct RegisterTemplate {
    pub notice: Option<String>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

/// Flash keys that may travel in the flash cookie.
const REGISTERED: &str = "registered";

fn flash_message(key: &str) -> Option<&'static str> {
    match key {
        REGISTERED => Some("Registered, log in now"),
        _ => None,
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page).post(register))
        .route("/logout", get(logout))
}

/// GET /login — render the form, consuming any pending flash notice
async fn login_page(headers: HeaderMap) -> Response {
    match session::cookie_value(&headers, session::FLASH_COOKIE) {
        Some(key) => {
            let notice = flash_message(key).map(str::to_string);
            (
                AppendHeaders([(header::SET_COOKIE, session::clear_cookie(session::FLASH_COOKIE))]),
                Html(LoginTemplate { notice }),
            )
                .into_response()
        }
        None => Html(LoginTemplate { notice: None }).into_response(),
    }
}

/// POST /login — check credentials and start a session
async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> AppResult<Response> {
    let principal = match accounts::login(&state.db, &form.username, &form.password) {
        Ok(principal) => principal,
        Err(AppError::InvalidCredentials) => {
            return Ok(Html(LoginTemplate {
                notice: Some("Bad login".to_string()),
            })
            .into_response());
        }
        Err(e) => return Err(e),
    };

    let auth = &state.config.auth;
    let token = session::create_session(&state.db, &principal, auth.session_hours)?;

    Ok((
        AppendHeaders([(
            header::SET_COOKIE,
            session::session_cookie(&auth.cookie_name, &token, auth.session_hours),
        )]),
        Found::to("/"),
    )
        .into_response())
}

/// GET /register
async fn register_page() -> Response {
    Html(RegisterTemplate { notice: None }).into_response()
}

/// POST /register — create a regular account, then send the user to log in
async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> AppResult<Response> {
    let notice = match accounts::register(&state.db, &form.username, &form.password) {
        Ok(_) => {
            return Ok((
                AppendHeaders([(header::SET_COOKIE, session::flash_cookie(REGISTERED))]),
                Found::to("/login"),
            )
                .into_response());
        }
        Err(AppError::DuplicateUsername) => "Username taken".to_string(),
        Err(AppError::BadRequest(msg)) => msg,
        Err(e) => return Err(e),
    };

    Ok(Html(RegisterTemplate {
        notice: Some(notice),
    })
    .into_response())
}

/// GET /logout — drop the session, whether or not there is one
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let cookie_name = &state.config.auth.cookie_name;
    if let Some(token) = session::cookie_value(&headers, cookie_name) {
        session::delete_session(&state.db, token)?;
    }

    Ok((
        AppendHeaders([(header::SET_COOKIE, session::clear_cookie(cookie_name))]),
        Found::to("/login"),
    )
        .into_response())
}
