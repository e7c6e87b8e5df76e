//! Extraction of the bearer token from the `Authorization` header.

use crate::errors::{AuthErrorKind, Error, Result};

/// Literal marker separating the scheme from the token: `Authorization: JWT <token>`.
pub const TOKEN_MARKER: &str = "JWT";

/// Hint returned to callers whose header is absent or malformed.
pub const EXPECTED_HEADER: &str = "Expecting Authorization: JWT id_token";

/// Pull the token out of an `Authorization` header value.
///
/// An absent or empty header is [`AuthErrorKind::MissingCredentials`]. Splitting on
/// the `JWT` marker must yield exactly two parts; anything else (a `Bearer` scheme,
/// a token that itself contains `JWT`) is [`AuthErrorKind::MalformedHeader`].
pub fn extract_token(header: Option<&str>) -> Result<String> {
    let header = match header {
        Some(value) if !value.is_empty() => value,
        _ => return Err(Error::auth(AuthErrorKind::MissingCredentials, EXPECTED_HEADER)),
    };

    let parts: Vec<&str> = header.split(TOKEN_MARKER).collect();
    if parts.len() != 2 {
        return Err(Error::auth(AuthErrorKind::MalformedHeader, EXPECTED_HEADER));
    }

    Ok(parts[1].trim().to_string())
}
