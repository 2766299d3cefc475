use sha2::{Digest, Sha256};

/// Length of every short code, in hex characters.
pub const CODE_LEN: usize = 6;

/// Trim the submitted URL and default it to `https://` when it carries no
/// http(s) scheme. Nothing else is validated.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Short code for an already-normalized URL: the first six hex digits of
/// its SHA-256 digest. Codes depend on the URL alone, never on the submitter.
pub fn code_for(normalized: &str) -> String {
    let digest = Sha256::digest(normalized.as_bytes());
    let mut code = hex::encode(digest);
    code.truncate(CODE_LEN);
    code
}

/// Normalize then hash.
pub fn generate_code(long_url: &str) -> String {
    code_for(&normalize_url(long_url))
}
