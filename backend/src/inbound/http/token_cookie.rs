//! Access token cookie construction.
//!
//! Login sets an HTTP-only `access_token` cookie; logout replaces it with an
//! expired one. The cookie carries the same signed token a client may send as
//! a bearer header instead.

use actix_web::cookie::{Cookie, SameSite, time};
use chrono::Duration;

use crate::domain::{AccessToken, default_token_ttl};

/// Name of the cookie carrying the access token.
pub const TOKEN_COOKIE_NAME: &str = "access_token";

/// Cookie and lifetime settings applied when issuing tokens over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCookieSettings {
    /// Whether the cookie is marked `Secure`.
    pub secure: bool,
    /// Lifetime of issued tokens and of the cookie carrying them.
    pub ttl: Duration,
}

impl Default for TokenCookieSettings {
    fn default() -> Self {
        Self {
            secure: true,
            ttl: default_token_ttl(),
        }
    }
}

/// Build the cookie delivering `token` to the client.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use qa_backend::domain::AccessToken;
/// use qa_backend::inbound::http::token_cookie::{TokenCookieSettings, token_cookie};
///
/// let token = AccessToken::new("h.p.s".to_owned(), Utc::now());
/// let cookie = token_cookie(&token, &TokenCookieSettings::default());
/// assert_eq!(cookie.name(), "access_token");
/// assert_eq!(cookie.http_only(), Some(true));
/// ```
pub fn token_cookie(token: &AccessToken, settings: &TokenCookieSettings) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE_NAME, token.as_str().to_owned())
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(settings.ttl.num_seconds()))
        .finish()
}

/// Build a cookie instructing the client to drop its access token.
pub fn removal_cookie(settings: &TokenCookieSettings) -> Cookie<'static> {
    let mut cookie = Cookie::build(TOKEN_COOKIE_NAME, "")
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}
