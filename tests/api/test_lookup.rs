use axum::http::{Method, StatusCode};
use ssh_key::Certificate;
use sshca::certificate::fingerprint::legacy_md5;
use uuid::Uuid;

use crate::support::{
    generate_key, issuance_body, post_certificate, read_json, send_request, setup_test_app, token_for,
};

#[tokio::test]
async fn integration_lookup_returns_stored_issuance() {
    let app = setup_test_app().await;
    let authorization = format!("JWT {}", token_for("alice"));

    let issued = read_json(post_certificate(&app, Some(&authorization), &issuance_body(&generate_key())).await).await;
    let text = issued["certificate"].as_str().unwrap();
    let uid = Uuid::from_slice(Certificate::from_openssh(text).unwrap().nonce()).unwrap();

    let response =
        send_request(&app, Method::GET, &format!("/certificates/{}", uid), Some(&authorization), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["result"], "success");
    assert_eq!(body["certificate"]["uid"], uid.to_string());
    assert_eq!(body["certificate"]["remote_user"], "deploy");
    assert_eq!(body["certificate"]["remote_host"], "db01.example.net");
    assert_eq!(body["certificate"]["certificate"], text);
}

#[tokio::test]
async fn integration_lookup_unknown_uid_is_not_found() {
    let app = setup_test_app().await;
    let authorization = format!("JWT {}", token_for("alice"));

    let path = format!("/certificates/{}", Uuid::new_v4());
    let response = send_request(&app, Method::GET, &path, Some(&authorization), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn integration_lookup_requires_authorization() {
    let app = setup_test_app().await;

    let path = format!("/certificates/{}", Uuid::new_v4());
    let response = send_request(&app, Method::GET, &path, None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn integration_lookup_malformed_uid_is_bad_request() {
    let app = setup_test_app().await;
    let authorization = format!("JWT {}", token_for("alice"));

    let response = send_request(&app, Method::GET, "/certificates/not-a-uuid", Some(&authorization), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn integration_search_by_user_fingerprint() {
    let app = setup_test_app().await;
    let authorization = format!("JWT {}", token_for("alice"));
    let user = generate_key();

    for _ in 0..2 {
        let response = post_certificate(&app, Some(&authorization), &issuance_body(&user)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    post_certificate(&app, Some(&authorization), &issuance_body(&generate_key())).await;

    let fingerprint = legacy_md5(user.public_key()).unwrap();
    let path = format!("/certificates?fingerprint={}", fingerprint);
    let response = send_request(&app, Method::GET, &path, Some(&authorization), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["result"], "success");
    let certificates = body["certificates"].as_array().unwrap();
    assert_eq!(certificates.len(), 2);
    assert!(certificates.iter().all(|c| c["user_fingerprint"] == fingerprint.as_str()));
    assert!(certificates[0]["id"].as_i64() > certificates[1]["id"].as_i64());
}

#[tokio::test]
async fn integration_search_requires_fingerprint_and_authorization() {
    let app = setup_test_app().await;
    let authorization = format!("JWT {}", token_for("alice"));

    let response = send_request(&app, Method::GET, "/certificates", Some(&authorization), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send_request(&app, Method::GET, "/certificates?fingerprint=aa:bb", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
