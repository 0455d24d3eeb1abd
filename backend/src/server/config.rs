//! Application settings and the server configuration built from them.
//!
//! Settings are layered by OrthoConfig: defaults, then configuration file,
//! then `QA_*` environment variables, then command-line flags.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chrono::Duration;
use ortho_config::OrthoConfig;
use qa_backend::domain::{DEFAULT_TOKEN_TTL_MINUTES, TokenSecret};
use qa_backend::inbound::http::token_cookie::TokenCookieSettings;
use qa_backend::outbound::persistence::DbPool;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_SECRET_FILE: &str = "/var/run/secrets/token_secret";
/// One year.
const MAX_TOKEN_TTL_MINUTES: i64 = 365 * 24 * 60;

/// Build mode deciding how strictly secrets are handled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds fall back to a generated secret with a warning.
    Debug,
    /// Release builds require a readable secret unless explicitly allowed.
    Release,
}

impl BuildMode {
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    pub(crate) fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while turning settings into a runnable configuration.
#[derive(thiserror::Error, Debug)]
pub enum ServerConfigError {
    #[error("database URL is not configured; set QA_DATABASE_URL")]
    MissingDatabaseUrl,
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error(
        "token lifetime must be between 1 and {max} minutes, got {minutes}",
        max = MAX_TOKEN_TTL_MINUTES
    )]
    InvalidTokenTtl { minutes: i64 },
    #[error("failed to read token secret at {path}: {source}")]
    SecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("token secret at {path} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Settings for the `qa-backend` binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "QA")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// File holding the token signing secret.
    pub token_secret_file: Option<PathBuf>,
    /// Lifetime of issued access tokens.
    pub token_ttl_minutes: Option<i64>,
    /// Mark the token cookie `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// Generate a throwaway secret when the secret file is unreadable.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secret: bool,
}

impl AppSettings {
    /// Configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, ServerConfigError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|source| ServerConfigError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    pub fn database_url(&self) -> Result<&str, ServerConfigError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(ServerConfigError::MissingDatabaseUrl)
    }

    pub fn token_secret_file(&self) -> &Path {
        self.token_secret_file
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_TOKEN_SECRET_FILE))
    }

    /// Token lifetime, falling back to the domain default.
    pub fn token_ttl(&self) -> Result<Duration, ServerConfigError> {
        let minutes = self.token_ttl_minutes.unwrap_or(DEFAULT_TOKEN_TTL_MINUTES);
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes) {
            return Err(ServerConfigError::InvalidTokenTtl { minutes });
        }
        Duration::try_minutes(minutes).ok_or(ServerConfigError::InvalidTokenTtl { minutes })
    }

    /// Cookie settings matching the configured token lifetime.
    pub fn token_cookie(&self) -> Result<TokenCookieSettings, ServerConfigError> {
        Ok(TokenCookieSettings {
            secure: self.cookie_secure,
            ttl: self.token_ttl()?,
        })
    }
}

/// Everything `create_server` needs, resolved from [`AppSettings`].
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) token_secret: TokenSecret,
    pub(crate) token_cookie: TokenCookieSettings,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        db_pool: DbPool,
        token_secret: TokenSecret,
        token_cookie: TokenCookieSettings,
    ) -> Self {
        Self {
            bind_addr,
            db_pool,
            token_secret,
            token_cookie,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "QA_BIND_ADDR",
        "QA_DATABASE_URL",
        "QA_TOKEN_SECRET_FILE",
        "QA_TOKEN_TTL_MINUTES",
        "QA_COOKIE_SECURE",
        "QA_ALLOW_EPHEMERAL_SECRET",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("qa-backend")]).expect("config should load")
    }

    fn load_from_empty_args_locked() -> AppSettings {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));
        load_from_empty_args()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("valid literal")
        );
        assert!(matches!(
            settings.database_url(),
            Err(ServerConfigError::MissingDatabaseUrl)
        ));
        assert_eq!(
            settings.token_secret_file(),
            Path::new(DEFAULT_TOKEN_SECRET_FILE)
        );
        assert_eq!(
            settings.token_ttl().expect("default ttl"),
            Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES)
        );
        assert!(settings.cookie_secure);
        assert!(!settings.allow_ephemeral_secret);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("QA_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            ("QA_DATABASE_URL", Some("postgres://qa@db/qa".to_owned())),
            ("QA_TOKEN_SECRET_FILE", Some("/tmp/qa-secret".to_owned())),
            ("QA_TOKEN_TTL_MINUTES", Some("45".to_owned())),
            ("QA_COOKIE_SECURE", Some("false".to_owned())),
            ("QA_ALLOW_EPHEMERAL_SECRET", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("address"),
            "127.0.0.1:9090".parse::<SocketAddr>().expect("valid literal")
        );
        assert_eq!(
            settings.database_url().expect("url"),
            "postgres://qa@db/qa"
        );
        assert_eq!(settings.token_secret_file(), Path::new("/tmp/qa-secret"));
        let cookie = settings.token_cookie().expect("cookie settings");
        assert!(!cookie.secure);
        assert_eq!(cookie.ttl, Duration::minutes(45));
        assert!(settings.allow_ephemeral_secret);
    }

    #[rstest]
    #[case("0")]
    #[case("-10")]
    #[case("525601")]
    #[case("4611686018427387903")]
    fn out_of_range_ttl_is_rejected(#[case] minutes: &str) {
        let mut vars = VARS.map(|name| (name, None::<String>));
        vars[3] = ("QA_TOKEN_TTL_MINUTES", Some(minutes.to_owned()));
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.token_ttl(),
            Err(ServerConfigError::InvalidTokenTtl { .. })
        ));
        assert!(settings.token_cookie().is_err());
    }

    #[rstest]
    fn one_year_ttl_is_accepted() {
        let settings = AppSettings {
            token_ttl_minutes: Some(MAX_TOKEN_TTL_MINUTES),
            ..load_from_empty_args_locked()
        };
        assert_eq!(
            settings.token_ttl().expect("upper bound is inclusive"),
            Duration::days(365)
        );
    }

    #[rstest]
    fn malformed_bind_address_is_rejected() {
        let mut vars = VARS.map(|name| (name, None::<String>));
        vars[0] = ("QA_BIND_ADDR", Some("not-an-address".to_owned()));
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.bind_addr(),
            Err(ServerConfigError::InvalidBindAddr { .. })
        ));
    }
}
