//! Tests for account and session handlers.

use super::*;
use crate::inbound::http::test_utils::{test_app, test_backend};
use crate::inbound::http::token_cookie::TOKEN_COOKIE_NAME;
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::http::header::WWW_AUTHENTICATE;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::Value;

fn register_request(username: &str, email: &str, password: &str) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(&RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        })
}

fn login_request(username: &str, password: &str) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(&LoginRequest {
            username: username.into(),
            password: password.into(),
        })
}

fn token_cookie_from(response: &actix_web::dev::ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == TOKEN_COOKIE_NAME)
        .map(Cookie::into_owned)
        .expect("token cookie set")
}

#[actix_web::test]
async fn register_then_login_sets_http_only_cookie() {
    let backend = test_backend();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;

    let registered = actix_test::call_service(
        &app,
        register_request("alice", "alice@example.com", "correct-horse").to_request(),
    )
    .await;
    assert_eq!(registered.status(), StatusCode::CREATED);
    let user: UserResponse = actix_test::read_body_json(registered).await;
    assert_eq!(user.username, "alice");

    let logged_in =
        actix_test::call_service(&app, login_request("alice", "correct-horse").to_request()).await;
    assert_eq!(logged_in.status(), StatusCode::OK);
    let cookie = token_cookie_from(&logged_in);
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(actix_web::cookie::SameSite::Lax));

    let body: LoginResponse = actix_test::read_body_json(logged_in).await;
    assert_eq!(body.user, user);
    assert_eq!(body.access_token, cookie.value());
    assert_eq!(body.token_type, "Bearer");
}

#[actix_web::test]
async fn me_accepts_cookie_or_bearer_header() {
    let backend = test_backend();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;
    actix_test::call_service(
        &app,
        register_request("alice", "alice@example.com", "correct-horse").to_request(),
    )
    .await;
    let logged_in = actix_test::call_service(
        &app,
        login_request("alice@example.com", "correct-horse").to_request(),
    )
    .await;
    let cookie = token_cookie_from(&logged_in);

    let via_cookie = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(via_cookie.status(), StatusCode::OK);

    let via_header = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(("Authorization", format!("Bearer {}", cookie.value())))
            .to_request(),
    )
    .await;
    assert_eq!(via_header.status(), StatusCode::OK);
    let user: UserResponse = actix_test::read_body_json(via_header).await;
    assert_eq!(user.username, "alice");
}

#[actix_web::test]
async fn me_rejects_expired_token_with_bearer_challenge() {
    let backend = test_backend();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;
    actix_test::call_service(
        &app,
        register_request("alice", "alice@example.com", "correct-horse").to_request(),
    )
    .await;
    let logged_in =
        actix_test::call_service(&app, login_request("alice", "correct-horse").to_request()).await;
    let cookie = token_cookie_from(&logged_in);

    backend.clock.advance_minutes(30);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|value| value.to_str().ok()),
        Some("Bearer")
    );
}

#[rstest]
#[case("alice", "wrongpass")]
#[case("nouser", "anything")]
#[actix_web::test]
async fn login_failures_are_indistinguishable(#[case] username: &str, #[case] password: &str) {
    let backend = test_backend();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;
    actix_test::call_service(
        &app,
        register_request("alice", "alice@example.com", "correct-horse").to_request(),
    )
    .await;

    let response =
        actix_test::call_service(&app, login_request(username, password).to_request()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        value.get("code").and_then(Value::as_str),
        Some("invalid_credentials")
    );
    assert_eq!(
        value.get("message").and_then(Value::as_str),
        Some("invalid username or password")
    );
}

#[rstest]
#[case("   ", "password", "username", "empty_username")]
#[case("alice", "", "password", "empty_password")]
#[actix_web::test]
async fn login_rejects_blank_fields(
    #[case] username: &str,
    #[case] password: &str,
    #[case] field: &str,
    #[case] code: &str,
) {
    let backend = test_backend();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;

    let response =
        actix_test::call_service(&app, login_request(username, password).to_request()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        value.pointer("/details/field").and_then(Value::as_str),
        Some(field)
    );
    assert_eq!(value.pointer("/details/code").and_then(Value::as_str), Some(code));
}

#[rstest]
#[case("al", "alice@example.com", "correct-horse", "username")]
#[case("alice", "nope", "correct-horse", "email")]
#[case("alice", "alice@example.com", "short", "password")]
#[actix_web::test]
async fn register_reports_the_offending_field(
    #[case] username: &str,
    #[case] email: &str,
    #[case] password: &str,
    #[case] field: &str,
) {
    let backend = test_backend();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;

    let response = actix_test::call_service(
        &app,
        register_request(username, email, password).to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        value.pointer("/details/field").and_then(Value::as_str),
        Some(field)
    );
}

#[actix_web::test]
async fn duplicate_registration_is_a_conflict() {
    let backend = test_backend();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;
    actix_test::call_service(
        &app,
        register_request("alice", "alice@example.com", "correct-horse").to_request(),
    )
    .await;

    let response = actix_test::call_service(
        &app,
        register_request("alice", "other@example.com", "correct-horse").to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        value.pointer("/details/code").and_then(Value::as_str),
        Some("account_exists")
    );
}

#[actix_web::test]
async fn logout_clears_the_token_cookie() {
    let backend = test_backend();
    let app = actix_test::init_service(test_app(backend.state.clone())).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = token_cookie_from(&response);
    assert_eq!(cookie.value(), "");
    assert_eq!(
        cookie.max_age(),
        Some(actix_web::cookie::time::Duration::ZERO)
    );
}
