//! JWT verification for certificate requests.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::errors::{AuthErrorKind, Error, Result};

/// Claims read from a caller's token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// String or array; checked by jsonwebtoken when an audience is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Verifies a bearer token and yields its claims.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Claims>;
}

/// jsonwebtoken-backed verifier
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Shared-secret HS256 verifier with no issuer or audience checks
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        Self { decoding_key: DecodingKey::from_secret(secret), validation }
    }

    /// Build a verifier from the `[auth]` configuration section
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let algorithm = config.algorithm()?;

        let decoding_key = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes())
            }
            _ => {
                let pem = config
                    .jwt_public_key
                    .as_deref()
                    .ok_or_else(|| Error::config("auth.jwt_public_key is required"))?
                    .as_bytes();
                let key = match algorithm {
                    Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem),
                    Algorithm::EdDSA => DecodingKey::from_ed_pem(pem),
                    _ => DecodingKey::from_rsa_pem(pem),
                };
                key.map_err(|e| Error::config(format!("Invalid JWT public key: {}", e)))?
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway_seconds;

        if let Some(issuer) = &config.jwt_issuer {
            validation.set_issuer(&[issuer]);
        }

        match &config.jwt_audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self { decoding_key, validation })
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| Error::auth(AuthErrorKind::InvalidToken, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::SecretString;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "unit-test-secret";

    fn now() -> usize {
        chrono::Utc::now().timestamp() as usize
    }

    fn token(claims: &Claims, secret: &str) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn claims() -> Claims {
        Claims {
            sub: "alice".to_string(),
            exp: now() + 600,
            iat: Some(now()),
            iss: Some("https://idp.example.com".to_string()),
            aud: Some(serde_json::json!("sshca")),
            jti: None,
        }
    }

    fn config() -> AuthConfig {
        AuthConfig { jwt_secret: SecretString::new(SECRET), ..Default::default() }
    }

    #[test]
    fn test_valid_token() {
        let verifier = JwtVerifier::from_config(&config()).unwrap();
        let verified = verifier.verify(&token(&claims(), SECRET)).unwrap();
        assert_eq!(verified.sub, "alice");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let verifier = JwtVerifier::new(SECRET.as_bytes());
        let err = verifier.verify(&token(&claims(), "other-secret")).unwrap_err();
        assert!(matches!(err, Error::Auth { kind: AuthErrorKind::InvalidToken, .. }));
    }

    #[test]
    fn test_expired_token_rejected() {
        let verifier = JwtVerifier::from_config(&AuthConfig { leeway_seconds: 0, ..config() }).unwrap();
        let expired = Claims { exp: now() - 120, ..claims() };
        assert!(verifier.verify(&token(&expired, SECRET)).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let verifier = JwtVerifier::new(SECRET.as_bytes());
        assert!(verifier.verify("not-a-token").is_err());
        assert!(verifier.verify("").is_err());
    }

    #[test]
    fn test_issuer_and_audience_checked_when_configured() {
        let strict = AuthConfig {
            jwt_issuer: Some("https://idp.example.com".to_string()),
            jwt_audience: Some("sshca".to_string()),
            ..config()
        };
        let verifier = JwtVerifier::from_config(&strict).unwrap();
        assert!(verifier.verify(&token(&claims(), SECRET)).is_ok());

        let wrong_issuer = Claims { iss: Some("https://evil.example.com".to_string()), ..claims() };
        assert!(verifier.verify(&token(&wrong_issuer, SECRET)).is_err());

        let wrong_audience = Claims { aud: Some(serde_json::json!("other")), ..claims() };
        assert!(verifier.verify(&token(&wrong_audience, SECRET)).is_err());
    }

    #[test]
    fn test_missing_public_key_for_rsa() {
        let config = AuthConfig { jwt_algorithm: "RS256".to_string(), ..config() };
        assert!(JwtVerifier::from_config(&config).is_err());
    }
}
