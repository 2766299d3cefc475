pub mod assets;
pub mod auth;
pub mod links;

use askama::Template;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(links::index).post(links::shorten))
        .route("/assets/{*path}", get(assets::serve))
        .route("/delete/{short_code}", get(links::delete))
        .route("/{short_code}", get(links::follow))
        .merge(auth::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

/// A `302 Found` redirect.
///
/// Stored link targets are arbitrary user text, so anything that is not
/// visible ASCII is percent-encoded before it goes into `Location`.
pub struct Found(String);

impl Found {
    pub fn to(location: impl Into<String>) -> Self {
        Found(location.into())
    }
}

impl IntoResponse for Found {
    fn into_response(self) -> Response {
        match HeaderValue::from_str(&encode_location(&self.0)) {
            Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
            Err(e) => {
                tracing::error!("Unusable redirect target {:?}: {}", self.0, e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Control bytes and spaces; non-ASCII is always encoded.
const LOCATION_UNSAFE: &AsciiSet = &CONTROLS.add(b' ');

fn encode_location(target: &str) -> String {
    utf8_percent_encode(target, LOCATION_UNSAFE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_is_a_302_with_location() {
        let response = Found::to("/login").into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
    }

    #[test]
    fn plain_urls_are_untouched() {
        assert_eq!(
            encode_location("https://example.com/a?b=c&d=%20"),
            "https://example.com/a?b=c&d=%20"
        );
    }

    #[test]
    fn spaces_and_unicode_are_percent_encoded() {
        assert_eq!(encode_location("https://a b"), "https://a%20b");
        assert_eq!(encode_location("https://é"), "https://%C3%A9");
        assert_eq!(encode_location("https://x\r\ny"), "https://x%0D%0Ay");
    }
}
