use askama::Template;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::auth::Principal;
use crate::error::AppResult;
use crate::links::{self, VisibleLinks};
use crate::routes::{Found, Html};
use crate::state::AppState;

/// One line of the listing, already flattened for display.
pub struct LinkRow {
    pub owner: String,
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
}

#[derive(Template)]
#[template(path = "pages/index.html")]
pub struct IndexTemplate {
    pub username: String,
    pub is_admin: bool,
    pub rows: Vec<LinkRow>,
}

#[derive(Deserialize)]
pub struct ShortenForm {
    pub url: String,
}

/// GET / — the caller's visible links
pub async fn index(
    State(state): State<AppState>,
    principal: Principal,
    headers: HeaderMap,
) -> AppResult<Response> {
    render_listing(&state, &principal, &headers)
}

/// POST / — shorten a URL, then show the listing
pub async fn shorten(
    State(state): State<AppState>,
    principal: Principal,
    headers: HeaderMap,
    Form(form): Form<ShortenForm>,
) -> AppResult<Response> {
    links::create_or_update(&state.db, &principal, &form.url)?;
    render_listing(&state, &principal, &headers)
}

/// GET /{short_code} — public redirect to the stored target
pub async fn follow(
    State(state): State<AppState>,
    Path(short_code): Path<String>,
) -> AppResult<Response> {
    let long_url = links::resolve(&state.db, &short_code)?;
    Ok(Found::to(long_url).into_response())
}

/// GET /delete/{short_code} — always lands back on the listing, removed or not
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    Path(short_code): Path<String>,
) -> AppResult<Response> {
    links::delete(&state.db, &principal, &short_code)?;
    Ok(Found::to("/").into_response())
}

fn render_listing(
    state: &AppState,
    principal: &Principal,
    headers: &HeaderMap,
) -> AppResult<Response> {
    let base = base_url(state, headers);
    let rows = match links::list_visible(&state.db, principal)? {
        VisibleLinks::All(links) => links
            .into_iter()
            .map(|link| LinkRow {
                short_url: format!("{}/{}", base, link.short_code),
                owner: link.owner_username,
                short_code: link.short_code,
                long_url: link.long_url,
            })
            .collect(),
        VisibleLinks::Owned(links) => links
            .into_iter()
            .map(|link| LinkRow {
                short_url: format!("{}/{}", base, link.short_code),
                owner: principal.username.clone(),
                short_code: link.short_code,
                long_url: link.long_url,
            })
            .collect(),
    };

    Ok(Html(IndexTemplate {
        username: principal.username.clone(),
        is_admin: principal.is_admin,
        rows,
    })
    .into_response())
}

/// Absolute base for short URLs, without a trailing slash.
fn base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(ref public_url) = state.config.server.public_url {
        return public_url.trim_end_matches('/').to_string();
    }

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("http");
    format!("{}://{}", scheme, host)
}
