//! Key fingerprints.
//!
//! User keys get the legacy MD5 form that `ssh-keygen -E md5 -l` prints, so
//! operators can search issued certificates by the fingerprint they already have.
//! The CA key uses SHA-256.

use md5::{Digest, Md5};
use ssh_key::{HashAlg, PublicKey};

use crate::errors::{Error, Result};

/// Colon-separated lowercase hex MD5 of the key's wire encoding (`aa:bb:...`).
pub fn legacy_md5(key: &PublicKey) -> Result<String> {
    let encoded = key
        .to_bytes()
        .map_err(|e| Error::validation("unparseable public key", e.to_string()))?;

    let digest = Md5::digest(&encoded);
    Ok(digest.iter().map(|byte| format!("{:02x}", byte)).collect::<Vec<_>>().join(":"))
}

/// `SHA256:<base64>` fingerprint.
pub fn sha256(key: &PublicKey) -> String {
    key.fingerprint(HashAlg::Sha256).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssh_key::rand_core::OsRng;
    use ssh_key::{Algorithm, PrivateKey};

    fn random_key() -> PublicKey {
        PrivateKey::random(&mut OsRng, Algorithm::Ed25519).unwrap().public_key().clone()
    }

    #[test]
    fn test_legacy_md5_format() {
        let fingerprint = legacy_md5(&random_key()).unwrap();
        let groups: Vec<&str> = fingerprint.split(':').collect();

        assert_eq!(groups.len(), 16);
        assert!(groups
            .iter()
            .all(|g| g.len() == 2 && g.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())));
    }

    #[test]
    fn test_fingerprints_are_stable_and_distinct() {
        let key = random_key();
        let other = random_key();

        assert_eq!(legacy_md5(&key).unwrap(), legacy_md5(&key).unwrap());
        assert_ne!(legacy_md5(&key).unwrap(), legacy_md5(&other).unwrap());
        assert_ne!(sha256(&key), sha256(&other));
    }

    #[test]
    fn test_md5_ignores_comment() {
        let key = random_key();
        let mut commented = key.clone();
        commented.set_comment("alice@laptop");
        assert_eq!(legacy_md5(&key).unwrap(), legacy_md5(&commented).unwrap());
    }

    #[test]
    fn test_sha256_prefix() {
        assert!(sha256(&random_key()).starts_with("SHA256:"));
    }
}
