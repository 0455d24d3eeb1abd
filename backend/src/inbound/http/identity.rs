//! Identity extractors for HTTP handlers.
//!
//! Handlers declare whether they need a caller by taking
//! [`OptionalIdentity`] or [`RequiredIdentity`]. Both read the token from the
//! `access_token` cookie first and the `Authorization: Bearer` header second,
//! then delegate to the [`crate::domain::ports::IdentityResolver`] port.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{CredentialSource, Error, Identity};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::token_cookie::TOKEN_COOKIE_NAME;

/// Collect the token candidates carried by `req`.
pub fn credential_source(req: &HttpRequest) -> CredentialSource {
    let cookie = req
        .cookie(TOKEN_COOKIE_NAME)
        .map(|cookie| cookie.value().to_owned());
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_owned);
    CredentialSource::new(cookie, bearer)
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token.trim())
}

fn http_state(req: &HttpRequest) -> Result<web::Data<HttpState>, Error> {
    req.app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))
}

/// The caller's identity when a valid token is present.
#[derive(Debug, Clone)]
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = http_state(req);
        let source = credential_source(req);
        Box::pin(async move {
            let state = state?;
            state.identity.resolve_optional(&source).await.map(Self)
        })
    }
}

/// The caller's identity; extraction fails with `401` when absent or invalid.
#[derive(Debug, Clone)]
pub struct RequiredIdentity(pub Identity);

impl FromRequest for RequiredIdentity {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = http_state(req);
        let source = credential_source(req);
        Box::pin(async move {
            let state = state?;
            state.identity.resolve_required(&source).await.map(Self)
        })
    }
}
