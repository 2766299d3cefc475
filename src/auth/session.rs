use axum::http::{header, HeaderMap};
use rand::Rng;
use rusqlite::{params, OptionalExtension};

use crate::auth::Principal;
use crate::error::AppResult;
use crate::state::DbPool;

/// Cookie carrying a one-shot notice across a redirect.
pub const FLASH_COOKIE: &str = "linkhash_flash";

/// Create a session holding a snapshot of `principal`. Returns the token.
pub fn create_session(pool: &DbPool, principal: &Principal, hours: u64) -> AppResult<String> {
    let conn = pool.get()?;

    conn.execute(
        "DELETE FROM sessions WHERE expires_at <= datetime('now')",
        [],
    )?;

    let token = generate_token();
    conn.execute(
        "INSERT INTO sessions (token, user_id, username, is_admin, expires_at) \
         VALUES (?1, ?2, ?3, ?4, datetime('now', ?5))",
        params![
            token,
            principal.user_id,
            principal.username,
            principal.is_admin,
            format!("+{} hours", hours)
        ],
    )?;

    Ok(token)
}

/// Principal for a live session token, if any.
pub fn find_session(pool: &DbPool, token: &str) -> AppResult<Option<Principal>> {
    let conn = pool.get()?;
    let principal = conn
        .query_row(
            "SELECT user_id, username, is_admin FROM sessions \
             WHERE token = ?1 AND expires_at > datetime('now')",
            params![token],
            |row| {
                Ok(Principal {
                    user_id: row.get(0)?,
                    username: row.get(1)?,
                    is_admin: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(principal)
}

/// Delete a session by token. Unknown tokens are fine.
pub fn delete_session(pool: &DbPool, token: &str) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}

// -- Cookie helpers --

pub fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours.saturating_mul(3600);
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

pub fn clear_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name)
}

pub fn flash_cookie(notice: &str) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age=60",
        FLASH_COOKIE, notice
    )
}

pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name && !val.is_empty() {
                Some(val)
            } else {
                None
            }
        })
}
