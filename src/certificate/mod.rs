//! SSH user certificate construction.
//!
//! - [`request`]: decoding the issuance body and parsing the caller key
//! - [`fingerprint`]: legacy MD5 (user keys) and SHA-256 (CA key) fingerprints
//! - [`builder`]: the unsigned certificate every signer consumes
//! - [`signed`]: fields read back from the certificate a signer returns

pub mod builder;
pub mod fingerprint;
pub mod request;
pub mod signed;

pub use builder::{CertificateBuilder, UnsignedCertificate, CLOCK_SKEW};
pub use request::{CertRequestBody, CertificateRequest};
pub use signed::SignedCertificate;
