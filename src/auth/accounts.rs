//! Account registration and credential checks.
//!
//! Passwords are stored and compared verbatim. Logins depend on that, so
//! hashing them would be a change to the login contract, not a refactor.

use rusqlite::{params, ErrorCode, OptionalExtension};

use crate::auth::Principal;
use crate::db::models::User;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// Create a regular (non-admin) account. Returns the new user id.
pub fn register(pool: &DbPool, username: &str, password: &str) -> AppResult<i64> {
    if username.trim().is_empty() {
        return Err(AppError::BadRequest("Username is required".into()));
    }

    let conn = pool.get()?;
    match conn.execute(
        "INSERT INTO users (username, password, is_admin) VALUES (?1, ?2, 0)",
        params![username, password],
    ) {
        Ok(_) => {
            tracing::info!(user = %username, "Registered new account");
            Ok(conn.last_insert_rowid())
        }
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == ErrorCode::ConstraintViolation =>
        {
            tracing::warn!(user = %username, "Registration rejected: username taken");
            Err(AppError::DuplicateUsername)
        }
        Err(e) => Err(e.into()),
    }
}

/// Exact match on username and password.
pub fn login(pool: &DbPool, username: &str, password: &str) -> AppResult<Principal> {
    let user = find_by_credentials(pool, username, password)?;

    match user {
        Some(user) => {
            tracing::info!(user = %user.username, admin = user.is_admin, "Login succeeded");
            Ok(Principal {
                user_id: user.id,
                username: user.username,
                is_admin: user.is_admin,
            })
        }
        None => {
            tracing::warn!(user = %username, "Login failed: bad credentials");
            Err(AppError::InvalidCredentials)
        }
    }
}

fn find_by_credentials(pool: &DbPool, username: &str, password: &str) -> AppResult<Option<User>> {
    let conn = pool.get()?;
    let user = conn
        .query_row(
            "SELECT id, username, is_admin FROM users \
             WHERE username = ?1 AND password = ?2",
            params![username, password],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    is_admin: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

/// Make sure `username` exists with admin rights and the given password.
pub fn ensure_admin(pool: &DbPool, username: &str, password: &str) -> AppResult<i64> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO users (username, password, is_admin) VALUES (?1, ?2, 1)
         ON CONFLICT(username) DO UPDATE SET password = excluded.password, is_admin = 1",
        params![username, password],
    )?;
    let id: i64 = conn.query_row(
        "SELECT id FROM users WHERE username = ?1",
        params![username],
        |row| row.get(0),
    )?;

    tracing::info!(user = %username, "Administrator account ready");
    Ok(id)
}
