//! Account and session API handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"username":"alice","email":"alice@example.com","password":"..."}
//! POST /api/v1/auth/login {"username":"alice","password":"..."}
//! POST /api/v1/auth/logout
//! GET /api/v1/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    AccountValidationError, Error, Identity, LoginCredentials, LoginValidationError, Registration,
    RegistrationValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::RequiredIdentity;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::token_cookie::{removal_cookie, token_cookie};

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
}

impl From<&Identity> for UserResponse {
    fn from(value: &Identity) -> Self {
        Self {
            id: value.id().get(),
            username: value.username().to_string(),
        }
    }
}

/// Sign-up request body for `POST /api/v1/auth/register`.
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login request body for `POST /api/v1/auth/login`.
///
/// `username` may hold either the username or the email address.
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login payload.
///
/// The token is also set as the `access_token` cookie; clients that cannot
/// keep cookies send it back as a bearer header.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyIdentifier => {
            Error::invalid_request("username must not be empty")
                .with_details(json!({ "field": "username", "code": "empty_username" }))
        }
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

fn map_registration_error(err: RegistrationValidationError) -> Error {
    let (field, code) = match &err {
        RegistrationValidationError::Account(account) => match account {
            AccountValidationError::UsernameLength { .. } => ("username", "username_length"),
            AccountValidationError::UsernameWhitespace => ("username", "username_whitespace"),
            AccountValidationError::EmailLength { .. } => ("email", "email_length"),
            AccountValidationError::EmailShape => ("email", "email_shape"),
            AccountValidationError::InvalidId => ("id", "invalid_id"),
        },
        RegistrationValidationError::PasswordLength { .. } => ("password", "password_length"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

/// Create an account.
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let registration = Registration::try_from_parts(&username, &email, &password)
        .map_err(map_registration_error)?;
    let identity = state.registration.register(&registration).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&identity)))
}

/// Check credentials, issue a token, and set the token cookie.
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest { username, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&username, &password).map_err(map_login_validation_error)?;
    let identity = state.identity.authenticate(&credentials).await?;
    let token = state
        .identity
        .issue_token(&identity, state.token_cookie.ttl)?;

    let body = LoginResponse {
        user: UserResponse::from(&identity),
        access_token: token.as_str().to_owned(),
        token_type: "Bearer".to_owned(),
        expires_at: token.expires_at(),
    };
    Ok(HttpResponse::Ok()
        .cookie(token_cookie(&token, &state.token_cookie))
        .json(body))
}

/// Drop the token cookie. Tokens are stateless, so nothing is revoked.
#[post("/auth/logout")]
pub async fn logout(state: web::Data<HttpState>) -> HttpResponse {
    HttpResponse::NoContent()
        .cookie(removal_cookie(&state.token_cookie))
        .finish()
}

/// Return the authenticated caller.
#[get("/auth/me")]
pub async fn current_user(identity: RequiredIdentity) -> web::Json<UserResponse> {
    web::Json(UserResponse::from(&identity.0))
}

#[cfg(test)]
mod tests;
