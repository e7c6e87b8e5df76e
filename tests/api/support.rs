#![allow(dead_code)]

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use ssh_key::{rand_core::OsRng, Algorithm, LineEnding, PrivateKey};
use sshca::{
    auth::Claims,
    config::AppConfig,
    secrets::SecretString,
    startup::{build_application, Application},
};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const CERT_DURATION_SECONDS: u64 = 600;

pub struct TestApp {
    pub app: Application,
    pub ca: PrivateKey,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.app.router.clone()
    }

    pub fn ca_public_key(&self) -> String {
        self.ca.public_key().to_openssh().expect("encode CA public key")
    }
}

pub fn generate_key() -> PrivateKey {
    PrivateKey::random(&mut OsRng, Algorithm::Ed25519).expect("generate key")
}

pub fn test_config(ca: &PrivateKey) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = "sqlite::memory:".to_string();
    config.auth.jwt_secret = SecretString::new(JWT_SECRET);
    config.ca.cert_duration_seconds = CERT_DURATION_SECONDS;
    config.ca.private_key =
        SecretString::new(ca.to_openssh(LineEnding::LF).expect("encode CA key").as_str());
    config.ca.public_key = ca.public_key().to_openssh().expect("encode CA public key");
    config.channels.channel_size = 8;
    config
}

pub async fn setup_test_app() -> TestApp {
    let ca = generate_key();
    let app = build_application(test_config(&ca)).await.expect("build application");
    TestApp { app, ca }
}

pub fn token_for(subject: &str) -> String {
    let claims = Claims {
        sub: subject.to_string(),
        exp: (chrono::Utc::now().timestamp() + 600) as usize,
        iat: None,
        iss: None,
        aud: None,
        jti: None,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes()))
        .expect("encode token")
}

pub fn issuance_body(user_key: &PrivateKey) -> Value {
    serde_json::json!({
        "key": user_key.public_key().to_openssh().expect("encode user key"),
        "remote_user": "deploy",
        "remote_host": "db01.example.net",
        "user_ip": "10.20.30.40",
        "command": "/usr/local/bin/backup --nightly",
    })
}

pub async fn send_request(
    app: &TestApp,
    method: Method,
    path: &str,
    authorization: Option<&str>,
    body: Option<Vec<u8>>,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header("x-request-id", "it-req-1")
        .header("x-forwarded-for", "203.0.113.9, 10.0.0.1");
    if let Some(authorization) = authorization {
        builder = builder.header("Authorization", authorization);
    }

    let request = match body {
        Some(bytes) => {
            builder.header("content-type", "application/json").body(Body::from(bytes)).expect("request")
        }
        None => builder.body(Body::empty()).expect("request"),
    };

    app.router().oneshot(request).await.expect("router response")
}

pub async fn post_certificate(app: &TestApp, authorization: Option<&str>, body: &Value) -> Response {
    send_request(
        app,
        Method::POST,
        "/certificates",
        authorization,
        Some(serde_json::to_vec(body).expect("serialize body")),
    )
    .await
}

pub async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Poll until the audit worker has written `expected` rows.
pub async fn wait_for_audit_rows(app: &TestApp, expected: i64) -> i64 {
    let mut count = 0;
    for _ in 0..50 {
        count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM audit_log")
            .fetch_one(&app.app.pool)
            .await
            .expect("count audit rows");
        if count >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    count
}
