pub mod accounts;
pub mod session;

/// The authenticated identity attached to a request.
///
/// Captured when the session is created; `is_admin` is not re-read from the
/// users table until the next login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
}
