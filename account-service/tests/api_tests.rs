mod common;

use std::sync::Arc;

use auth::FixedClock;
use auth::JwtHandler;
use auth::Principal;
use common::TestApp;
use common::TEST_SECRET;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

const PROFILE: &str = "/api/v1/users/profile";

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/health")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app.register("a@x.com", "alice", "secret1").await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 201);
    assert_eq!(body["data"]["email"], "a@x.com");
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["first_name"], "A");
    assert_eq!(body["data"]["last_name"], "Lice");
    assert_eq!(body["data"]["is_active"], true);
    assert!(body["data"]["id"].is_string());
    assert!(body["data"].get("password_hash").is_none());
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_wins_over_username() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "alice", "secret1").await;

    let response = app.register("a@x.com", "alice", "secret1").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "Email already exists: a@x.com");
    assert_eq!(app.repository.len(), 1);
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "alice", "secret1").await;

    let response = app.register("c@x.com", "alice", "secret1").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "Username already exists: alice");
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::spawn().await;

    let cases = [
        ("not-an-email", "alice", "secret1"),
        ("a@x.com", "al", "secret1"),
        ("a@x.com", "bad name", "secret1"),
        ("a@x.com", "alice", "short"),
    ];

    for (email, username, password) in cases {
        let response = app.register(email, username, password).await;
        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "expected 422 for {} / {}",
            email,
            username
        );
    }

    assert_eq!(app.repository.len(), 0);
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "alice", "secret1").await;

    let response = app.login("a@x.com", "secret1").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["user"]["email"], "a@x.com");

    let token = body["data"]["token"].as_str().expect("Missing token");
    let claims = app
        .authenticator
        .validate_token(token)
        .expect("Issued token should validate");
    assert_eq!(claims.username(), "alice");
    assert_eq!(claims.user_id(), body["data"]["user"]["id"].as_str().unwrap());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "alice", "secret1").await;

    let wrong_password = app.login("a@x.com", "wrong-password").await;
    let unknown_email = app.login("nobody@x.com", "secret1").await;
    let malformed_email = app.login("nobody", "secret1").await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(malformed_email.status(), StatusCode::UNAUTHORIZED);

    let wrong_password = wrong_password.text().await.unwrap();
    let unknown_email = unknown_email.text().await.unwrap();
    let malformed_email = malformed_email.text().await.unwrap();
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password, malformed_email);
}

#[tokio::test]
async fn test_login_inactive_account() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "alice", "secret1").await;
    app.repository.set_active("a@x.com", false);

    let response = app.login("a@x.com", "secret1").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_profile() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("a@x.com", "alice", "secret1").await;

    let response = app
        .get_authenticated(PROFILE, &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_update_profile() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("a@x.com", "alice", "secret1").await;

    let response = app
        .put_authenticated(PROFILE, &token)
        .json(&json!({"first_name": "Alicia", "last_name": "  "}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["first_name"], "Alicia");
    assert_eq!(body["data"]["last_name"], "Lice");

    // Password still works after a profile update
    assert_eq!(app.login("a@x.com", "secret1").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_profile_invalid_name() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("a@x.com", "alice", "secret1").await;

    let response = app
        .put_authenticated(PROFILE, &token)
        .json(&json!({"first_name": "x".repeat(101)}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_gate_rejections_are_uniform() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("a@x.com", "alice", "secret1").await;

    let claims = app.authenticator.validate_token(&token).unwrap();
    let expired = JwtHandler::new(TEST_SECRET, chrono::Duration::hours(1))
        .unwrap()
        .with_clock(Arc::new(FixedClock::at_timestamp(1_000_000)))
        .issue(&claims.principal())
        .unwrap();
    let foreign = JwtHandler::new(b"some-other-secret", chrono::Duration::hours(1))
        .unwrap()
        .issue(&claims.principal())
        .unwrap();

    let requests = [
        app.get(PROFILE),
        app.get(PROFILE).header("Authorization", format!("Basic {}", token)),
        app.get(PROFILE).header("Authorization", "Bearer "),
        app.get(PROFILE).bearer_auth(&expired),
        app.get(PROFILE).bearer_auth(&foreign),
        app.get(PROFILE).bearer_auth(format!("{}x", token)),
    ];

    let mut bodies = Vec::new();
    for request in requests {
        let response = request.send().await.expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        bodies.push(response.text().await.unwrap());
    }

    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
    let body: Value = serde_json::from_str(&bodies[0]).unwrap();
    assert_eq!(
        body,
        json!({"status_code": 401, "data": {"message": "Unauthorized"}})
    );
}

#[tokio::test]
async fn test_gate_rejects_token_for_principal_without_uuid() {
    let app = TestApp::spawn().await;

    let token = app
        .authenticator
        .generate_token(&Principal::new("user123", "a@x.com", "alice"))
        .unwrap();

    let response = app
        .get_authenticated(PROFILE, &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let app = TestApp::spawn().await;

    let registered = app.register("a@x.com", "alice", "secret1").await;
    assert_eq!(registered.status(), StatusCode::CREATED);

    let duplicate = app.register("a@x.com", "bob", "secret1").await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    assert_eq!(
        app.login("a@x.com", "wrong!!").await.status(),
        StatusCode::UNAUTHORIZED
    );

    let body: Value = app
        .login("a@x.com", "secret1")
        .await
        .json()
        .await
        .expect("Failed to parse response");
    let token = body["data"]["token"].as_str().unwrap();

    let profile = app
        .get_authenticated(PROFILE, token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(profile.status(), StatusCode::OK);

    let tampered = format!("{}A", token);
    let rejected = app
        .get_authenticated(PROFILE, &tampered)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
}
