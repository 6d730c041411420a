//! Login, token and rate-limit behaviour over HTTP

mod common;

use common::TestApp;
use http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::spawn().await;

    let (status, body) = app.request(Method::GET, "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["service"], "ems-server");
}

#[tokio::test]
async fn test_login_issues_valid_token() {
    let app = TestApp::spawn().await;

    let (status, body) = app.try_login("admin", "admin123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "admin");
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["expires_in"].as_i64().unwrap() > 0);

    let token = body["token"].as_str().unwrap();
    let claims = app.state.get_jwt_service().validate_token(token).unwrap();
    assert_eq!(claims.username, "admin");
    assert!(claims.exp > shared::util::now_millis() / 1000);
}

#[tokio::test]
async fn test_login_accepts_email() {
    let app = TestApp::spawn().await;

    let (status, _) = app.try_login("ADMIN@ems.local", "admin123").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_bad_credentials_share_one_error() {
    let app = TestApp::spawn().await;

    let (wrong_pw_status, wrong_pw) = app.try_login("admin", "nope").await;
    let (unknown_status, unknown) = app.try_login("ghost", "admin123").await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw["code"], unknown["code"]);
    assert_eq!(wrong_pw["message"], unknown["message"]);
}

#[tokio::test]
async fn test_empty_login_fields_rejected() {
    let app = TestApp::spawn().await;

    let (status, _) = app.try_login("", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::spawn().await;

    let (status, _) = app.request(Method::GET, "/api/employees", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/employees", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_profile() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    app.create_employee(&admin, "Jane Doe", "jane", "employee").await;

    let token = app.login("jane", "password1").await;
    let (status, body) = app.get("/api/auth/me", &token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "jane");
    assert_eq!(body["role"], "employee");
    assert_eq!(body["employee_id"], "E001");
    assert_eq!(body["employee"]["name"], "Jane Doe");
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    app.create_employee(&admin, "Jane Doe", "jane", "employee").await;
    let token = app.login("jane", "password1").await;

    let (status, _) = app
        .put(
            "/api/auth/password",
            &token,
            json!({ "current_password": "wrong-one", "new_password": "password2" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .put(
            "/api/auth/password",
            &token,
            json!({ "current_password": "password1", "new_password": "password2" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.try_login("jane", "password1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    app.login("jane", "password2").await;
}

#[tokio::test]
async fn test_disabled_account_cannot_login() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    app.create_employee(&admin, "Jane Doe", "jane", "employee").await;
    let token = app.login("jane", "password1").await;

    let (status, _) = app
        .put("/api/employees/E001/credentials", &admin, json!({ "is_active": false }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.try_login("jane", "password1").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Outstanding tokens stop working everywhere
    let (status, _) = app.get("/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.get("/api/employees", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app
        .post(
            "/api/leaves",
            &token,
            json!({ "leave_type": "annual", "start_date": "2026-07-01", "end_date": "2026-07-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_demoted_manager_loses_access() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    app.create_employee(&admin, "Helen HR", "helen", "hr").await;
    let token = app.login("helen", "password1").await;

    let (status, _) = app
        .put("/api/employees/E001/credentials", &admin, json!({ "role": "employee" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            "/api/employees",
            &token,
            json!({
                "name": "Late Hire",
                "email": "late@example.com",
                "department": "D",
                "position": "P",
                "salary": 1.0,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2002);

    let (_, me) = app.get("/api/auth/me", &token).await;
    assert_eq!(me["role"], "employee");
}

#[tokio::test]
async fn test_deleted_employee_token_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    app.create_employee(&admin, "Jane Doe", "jane", "employee").await;
    let token = app.login("jane", "password1").await;

    let (status, _) = app.delete("/api/employees/E001", &admin).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api/tasks", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_demo_token_rejected_once_demo_disabled() {
    let app = TestApp::spawn_with(|c| c.demo_users_enabled = true).await;
    let token = app.login("employee", "employee123").await;

    let (_, me) = app.get("/api/auth/me", &token).await;
    assert!(me["employee_id"].is_null());

    // Same signing key, demo table switched off
    let app = TestApp::spawn().await;
    let (status, _) = app.get("/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_slow_request_times_out() {
    let app = TestApp::spawn_with(|c| c.request_timeout_ms = 1).await;

    // Password hashing alone outlasts a 1ms budget
    let (status, _) = app.try_login("admin", "admin123").await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn test_demo_users_follow_config() {
    let app = TestApp::spawn().await;
    let (status, _) = app.try_login("hr", "hr123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let app = TestApp::spawn_with(|c| c.demo_users_enabled = true).await;
    let (status, body) = app.try_login("hr", "hr123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "hr");
    assert!(body["user"]["id"].as_i64().unwrap() < 0);
}

#[tokio::test]
async fn test_login_rate_limit() {
    let app = TestApp::spawn_with(|c| c.login_rate_limit = 3).await;

    for _ in 0..3 {
        let (status, _) = app.try_login("admin", "wrong").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, body) = app.try_login("admin", "admin123").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], 9);
}

#[tokio::test]
async fn test_logout() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let (status, _) = app.request(Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}
