use axum::http::{Method, StatusCode};

use crate::support::{read_json, send_request, setup_test_app, JWT_SECRET};

#[tokio::test]
async fn integration_public_key_is_unauthenticated() {
    let app = setup_test_app().await;

    let response = send_request(&app, Method::GET, "/publickey", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["result"], "success");
    assert_eq!(body["public_key"], app.ca_public_key());
}

#[tokio::test]
async fn integration_liveness_and_readiness() {
    let app = setup_test_app().await;

    let live = send_request(&app, Method::GET, "/status/live", None, None).await;
    assert_eq!(live.status(), StatusCode::OK);
    assert_eq!(read_json(live).await["result"], "success");

    let ready = send_request(&app, Method::GET, "/status/ready", None, None).await;
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn integration_readiness_fails_without_database() {
    let app = setup_test_app().await;
    app.app.pool.close().await;

    let ready = send_request(&app, Method::GET, "/status/ready", None, None).await;
    assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(read_json(ready).await["result"], "fail");
}

#[tokio::test]
async fn integration_config_view_is_redacted() {
    let app = setup_test_app().await;

    let response = send_request(&app, Method::GET, "/status/config", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["config"]["auth"]["jwt_secret"], "[REDACTED]");
    assert_eq!(body["config"]["ca"]["private_key"], "[REDACTED]");
    assert_eq!(body["config"]["ca"]["public_key"], app.ca_public_key());

    let text = body.to_string();
    assert!(!text.contains(JWT_SECRET));
    assert!(!text.contains("OPENSSH PRIVATE KEY"));
}

#[tokio::test]
async fn integration_graceful_shutdown_drains_workers() {
    let app = setup_test_app().await;
    app.app.shutdown().await;
}
