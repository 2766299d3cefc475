//! Link storage and the owner-versus-admin rules around it.
//!
//! Short codes are content-addressed: the same normalized URL always maps to
//! the same code, whoever submits it. Submitting a URL whose code already
//! exists overwrites that row's target and owner (last write wins).

pub mod code;

use rusqlite::{params, OptionalExtension};

use crate::auth::Principal;
use crate::db::models::{AnnotatedLink, OwnedLink};
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

pub use code::{generate_code, normalize_url};

/// Links a principal may see, shaped by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibleLinks {
    /// A regular user's own links.
    Owned(Vec<OwnedLink>),
    /// Every link in the system, with owner usernames. Admins only.
    All(Vec<AnnotatedLink>),
}

/// Store `raw_url` under its short code, owned by `principal`.
pub fn create_or_update(
    pool: &DbPool,
    principal: &Principal,
    raw_url: &str,
) -> AppResult<OwnedLink> {
    let long_url = normalize_url(raw_url);
    let short_code = code::code_for(&long_url);

    let conn = pool.get()?;
    // Single statement so two racing submissions can never leave two rows
    conn.execute(
        "INSERT INTO urls (short_code, long_url, user_id) VALUES (?1, ?2, ?3)
         ON CONFLICT(short_code) DO UPDATE SET
             long_url = excluded.long_url,
             user_id = excluded.user_id",
        params![short_code, long_url, principal.user_id],
    )?;

    tracing::info!(
        user = %principal.username,
        short_code = %short_code,
        "Stored link"
    );

    Ok(OwnedLink {
        short_code,
        long_url,
    })
}

/// Newest first, by insertion sequence.
pub fn list_visible(pool: &DbPool, principal: &Principal) -> AppResult<VisibleLinks> {
    let conn = pool.get()?;

    if principal.is_admin {
        let mut stmt = conn.prepare(
            "SELECT urls.short_code, urls.long_url, users.username FROM urls \
             JOIN users ON urls.user_id = users.id \
             ORDER BY urls.id DESC",
        )?;
        let links = stmt
            .query_map([], |row| {
                Ok(AnnotatedLink {
                    short_code: row.get(0)?,
                    long_url: row.get(1)?,
                    owner_username: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(VisibleLinks::All(links))
    } else {
        let mut stmt = conn.prepare(
            "SELECT short_code, long_url FROM urls WHERE user_id = ?1 ORDER BY id DESC",
        )?;
        let links = stmt
            .query_map(params![principal.user_id], |row| {
                Ok(OwnedLink {
                    short_code: row.get(0)?,
                    long_url: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(VisibleLinks::Owned(links))
    }
}

/// Target URL for a short code. Public; no principal involved.
pub fn resolve(pool: &DbPool, short_code: &str) -> AppResult<String> {
    let conn = pool.get()?;
    conn.query_row(
        "SELECT long_url FROM urls WHERE short_code = ?1",
        params![short_code],
        |row| row.get(0),
    )
    .optional()?
    .ok_or(AppError::NotFound)
}

/// Delete a link. Admins may delete any link, everyone else only their own.
///
/// Returns whether a row was removed. Unknown or foreign codes are a no-op,
/// not an error.
pub fn delete(pool: &DbPool, principal: &Principal, short_code: &str) -> AppResult<bool> {
    let conn = pool.get()?;
    let removed = if principal.is_admin {
        conn.execute(
            "DELETE FROM urls WHERE short_code = ?1",
            params![short_code],
        )?
    } else {
        conn.execute(
            "DELETE FROM urls WHERE short_code = ?1 AND user_id = ?2",
            params![short_code, principal.user_id],
        )?
    };

    if removed > 0 {
        tracing::info!(user = %principal.username, short_code = %short_code, "Deleted link");
    } else {
        tracing::debug!(user = %principal.username, short_code = %short_code, "Nothing to delete");
    }

    Ok(removed > 0)
}
