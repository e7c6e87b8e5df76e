use axum::http::StatusCode;
use serde_json::json;
use ssh_key::{Certificate, HashAlg};

use crate::support::{
    generate_key, issuance_body, post_certificate, read_json, setup_test_app, token_for,
    wait_for_audit_rows, CERT_DURATION_SECONDS,
};

#[tokio::test]
async fn integration_issues_scoped_certificate() {
    let app = setup_test_app().await;
    let user = generate_key();
    let authorization = format!("JWT {}", token_for("alice"));

    let before = chrono::Utc::now().timestamp() as u64;
    let response = post_certificate(&app, Some(&authorization), &issuance_body(&user)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["result"], "success");

    let cert = Certificate::from_openssh(body["certificate"].as_str().expect("certificate text"))
        .expect("parse certificate");
    assert_eq!(cert.valid_principals(), &["deploy".to_string()]);
    assert_eq!(
        cert.critical_options().get("force-command").map(String::as_str),
        Some("/usr/local/bin/backup --nightly")
    );
    assert_eq!(cert.critical_options().get("source-address").map(String::as_str), Some("10.20.30.40"));
    assert!(cert.extensions().contains_key("permit-pty"));
    assert_eq!(cert.public_key(), user.public_key().key_data());
    assert!(cert.valid_after() < before);
    assert_eq!(cert.valid_before() - cert.valid_after(), CERT_DURATION_SECONDS + 30);
    assert!(cert.key_id().starts_with("user[deploy] from[10.20.30.40] command[/usr/local/bin/backup --nightly]"));

    let ca_fingerprint = app.ca.public_key().fingerprint(HashAlg::Sha256);
    assert!(cert.validate([&ca_fingerprint]).is_ok());

    let other_ca = generate_key().public_key().fingerprint(HashAlg::Sha256);
    assert!(cert.validate([&other_ca]).is_err());

    assert_eq!(wait_for_audit_rows(&app, 1).await, 1);
    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM certificates")
        .fetch_one(&app.app.pool)
        .await
        .expect("count certificates");
    assert_eq!(stored, 1);
}

#[tokio::test]
async fn integration_same_payload_twice_yields_distinct_certificates() {
    let app = setup_test_app().await;
    let user = generate_key();
    let authorization = format!("JWT {}", token_for("alice"));
    let body = issuance_body(&user);

    let first = read_json(post_certificate(&app, Some(&authorization), &body).await).await;
    let second = read_json(post_certificate(&app, Some(&authorization), &body).await).await;

    let first = Certificate::from_openssh(first["certificate"].as_str().unwrap()).unwrap();
    let second = Certificate::from_openssh(second["certificate"].as_str().unwrap()).unwrap();
    assert_ne!(first.nonce(), second.nonce());
    assert_ne!(first.key_id(), second.key_id());

    assert_eq!(wait_for_audit_rows(&app, 2).await, 2);
    let distinct: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT uid) FROM audit_log")
        .fetch_one(&app.app.pool)
        .await
        .expect("count audit uids");
    assert_eq!(distinct, 2);
}

#[tokio::test]
async fn integration_missing_authorization_is_unauthorized() {
    let app = setup_test_app().await;

    let response = post_certificate(&app, None, &issuance_body(&generate_key())).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = read_json(response).await;
    assert_eq!(body["result"], "fail");
    assert_eq!(body["message"], "missing credentials");
    assert_eq!(body["details"], "Expecting Authorization: JWT id_token");

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM certificates")
        .fetch_one(&app.app.pool)
        .await
        .expect("count certificates");
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn integration_bearer_scheme_is_bad_request() {
    let app = setup_test_app().await;

    let response = post_certificate(&app, Some("Bearer xyz"), &issuance_body(&generate_key())).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["result"], "fail");
}

#[tokio::test]
async fn integration_token_signed_with_other_secret_is_rejected() {
    let app = setup_test_app().await;
    let foreign = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &json!({ "sub": "mallory", "exp": chrono::Utc::now().timestamp() + 600 }),
        &jsonwebtoken::EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();

    let response =
        post_certificate(&app, Some(&format!("JWT {}", foreign)), &issuance_body(&generate_key())).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(response).await["message"], "invalid token");
}

#[tokio::test]
async fn integration_missing_required_fields_is_bad_request() {
    let app = setup_test_app().await;
    let authorization = format!("JWT {}", token_for("alice"));

    let response = post_certificate(&app, Some(&authorization), &json!({ "remote_user": "deploy" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["message"], "malformed request body");
}

#[tokio::test]
async fn integration_unparseable_key_is_bad_request() {
    let app = setup_test_app().await;
    let authorization = format!("JWT {}", token_for("alice"));
    let mut body = issuance_body(&generate_key());
    body["key"] = json!("ssh-rsa not-base64!!");

    let response = post_certificate(&app, Some(&authorization), &body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["message"], "unparseable public key");
}
