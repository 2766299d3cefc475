/// A registered account, without its password.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

/// A link as seen by its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedLink {
    pub short_code: String,
    pub long_url: String,
}

/// A link annotated with the username of whoever currently owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedLink {
    pub short_code: String,
    pub long_url: String,
    pub owner_username: String,
}
