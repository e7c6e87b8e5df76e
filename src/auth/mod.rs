//! Caller authentication: bearer-token extraction and JWT verification.

pub mod credentials;
pub mod jwt;

pub use credentials::{extract_token, EXPECTED_HEADER, TOKEN_MARKER};
pub use jwt::{Claims, JwtVerifier, TokenVerifier};
