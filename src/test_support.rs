//! Key and request fixtures shared by unit tests.

use chrono::{DateTime, Utc};
use ssh_key::rand_core::OsRng;
use ssh_key::{Algorithm, LineEnding, PrivateKey};

use crate::certificate::{CertRequestBody, CertificateBuilder, CertificateRequest, UnsignedCertificate};

pub fn generate_key() -> PrivateKey {
    PrivateKey::random(&mut OsRng, Algorithm::Ed25519).unwrap()
}

pub fn private_key_text(key: &PrivateKey) -> String {
    key.to_openssh(LineEnding::LF).unwrap().as_str().to_string()
}

pub fn public_key_text(key: &PrivateKey) -> String {
    key.public_key().to_openssh().unwrap()
}

pub fn request_body(key: &str) -> CertRequestBody {
    CertRequestBody {
        key: key.to_string(),
        remote_user: "deploy".to_string(),
        remote_host: "db01".to_string(),
        user_ip: "10.0.0.5".to_string(),
        command: "/usr/bin/uptime".to_string(),
        jwt: None,
    }
}

pub fn unsigned_certificate(now: DateTime<Utc>) -> UnsignedCertificate {
    let user = generate_key();
    let request = CertificateRequest::from_body(&request_body(&public_key_text(&user))).unwrap();
    CertificateBuilder::new(std::time::Duration::from_secs(300)).build(&request, "SHA256:test-ca", now).unwrap()
}
