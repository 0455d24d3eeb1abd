//! Shared world for HTTP behaviour scenarios.
//!
//! The world owns an Actix runtime and the in-memory stores behind the real
//! domain services. Each request builds a fresh service over the same
//! `HttpState`, so state persists across steps while handlers stay isolated.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::{self, HeaderMap};
use actix_web::rt::Runtime;
use actix_web::test::{self as actix_test, TestRequest};
use actix_web::{App, web};
use argon2::Params;
use chrono::{TimeZone, Utc};
use qa_backend::Trace;
use qa_backend::domain::{
    Argon2Passwords, IdentityService, TokenCodec, TokenSecret, VoteLedgerService,
};
use qa_backend::inbound::http::configure_api;
use qa_backend::inbound::http::state::{HttpState, HttpStatePorts};
use qa_backend::inbound::http::token_cookie::TokenCookieSettings;
use qa_backend::test_support::{
    InMemoryAccountRepository, InMemoryVoteRepository, InMemoryVoteTargetCatalogue, MutableClock,
};
use serde_json::{Value, json};

/// Question ids the catalogue knows about.
pub(crate) const KNOWN_QUESTIONS: [i64; 2] = [42, 43];
/// Tag id the catalogue knows about.
pub(crate) const KNOWN_TAG: i64 = 5;

/// Password shared by every scenario account.
pub(crate) const PASSWORD: &str = "correct horse battery";

/// Status, headers, and JSON body of the last response.
pub(crate) struct Recorded {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Value,
}

pub(crate) struct HttpWorld {
    runtime: Runtime,
    state: HttpState,
    pub(crate) votes: Arc<InMemoryVoteRepository>,
    pub(crate) accounts: Arc<InMemoryAccountRepository>,
    pub(crate) clock: Arc<MutableClock>,
    tokens: RefCell<HashMap<String, String>>,
    user_ids: RefCell<HashMap<String, i64>>,
    last: RefCell<Option<Recorded>>,
}

impl HttpWorld {
    pub(crate) fn new() -> Self {
        let runtime = Runtime::new().expect("actix runtime");
        let accounts = Arc::new(InMemoryAccountRepository::default());
        let votes = Arc::new(InMemoryVoteRepository::default());
        let catalogue = KNOWN_QUESTIONS
            .iter()
            .fold(InMemoryVoteTargetCatalogue::default(), |catalogue, id| {
                catalogue.with_question(*id)
            })
            .with_tag(KNOWN_TAG);
        let start = Utc
            .with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        let clock = Arc::new(MutableClock::new(start));

        let passwords =
            Argon2Passwords::with_params(Params::new(8, 1, 1, None).expect("argon2 params"))
                .expect("hasher");
        let codec = TokenCodec::new(TokenSecret::new(vec![b's'; 32]).expect("secret"));
        let identity = Arc::new(IdentityService::new(
            accounts.clone(),
            passwords,
            codec,
            clock.clone(),
        ));
        let ledger = Arc::new(VoteLedgerService::new(
            votes.clone(),
            Arc::new(catalogue),
            clock.clone(),
        ));
        let state = HttpState::new(
            HttpStatePorts {
                identity: identity.clone(),
                registration: identity,
                votes: ledger,
            },
            TokenCookieSettings {
                secure: false,
                ..TokenCookieSettings::default()
            },
        );

        Self {
            runtime,
            state,
            votes,
            accounts,
            clock,
            tokens: RefCell::new(HashMap::new()),
            user_ids: RefCell::new(HashMap::new()),
            last: RefCell::new(None),
        }
    }

    /// Send `request` through the API and record the response.
    pub(crate) fn send(&self, request: TestRequest) {
        let state = self.state.clone();
        let recorded = self.runtime.block_on(async move {
            let app = actix_test::init_service(
                App::new()
                    .app_data(web::Data::new(state))
                    .wrap(Trace)
                    .service(web::scope("/api/v1").configure(configure_api)),
            )
            .await;
            let response = actix_test::call_service(&app, request.to_request()).await;
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = actix_test::read_body(response).await;
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).expect("json body")
            };
            Recorded {
                status,
                headers,
                body,
            }
        });
        *self.last.borrow_mut() = Some(recorded);
    }

    /// Register `username` through the API.
    pub(crate) fn register(&self, username: &str) {
        self.send(
            TestRequest::post()
                .uri("/api/v1/auth/register")
                .set_json(json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": PASSWORD,
                })),
        );
        if let Some(id) = self.body_i64("/id") {
            self.user_ids.borrow_mut().insert(username.to_owned(), id);
        }
    }

    /// Register `username` and remember a bearer token for them.
    pub(crate) fn sign_up(&self, username: &str) {
        self.register(username);
        self.assert_status(StatusCode::CREATED);
        self.log_in(username, PASSWORD);
        self.assert_status(StatusCode::OK);
    }

    /// Attempt a login and keep the issued token when it succeeds.
    pub(crate) fn log_in(&self, identifier: &str, password: &str) {
        self.send(
            TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({ "username": identifier, "password": password })),
        );
        let token = self.with_last(|last| {
            (last.status == StatusCode::OK).then(|| {
                last.body
                    .get("accessToken")
                    .and_then(Value::as_str)
                    .expect("access token")
                    .to_owned()
            })
        });
        if let Some(token) = token {
            self.tokens.borrow_mut().insert(identifier.to_owned(), token);
        }
    }

    pub(crate) fn token_for(&self, username: &str) -> String {
        self.tokens
            .borrow()
            .get(username)
            .cloned()
            .expect("user has signed in")
    }

    pub(crate) fn user_id_for(&self, username: &str) -> i64 {
        self.user_ids
            .borrow()
            .get(username)
            .copied()
            .expect("user has registered")
    }

    /// Build a request carrying `username`'s token as a bearer header.
    pub(crate) fn authorised(&self, request: TestRequest, username: &str) -> TestRequest {
        let token = self.token_for(username);
        request.insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
    }

    pub(crate) fn with_last<R>(&self, f: impl FnOnce(&Recorded) -> R) -> R {
        let last = self.last.borrow();
        f(last.as_ref().expect("a request was sent"))
    }

    pub(crate) fn assert_status(&self, expected: StatusCode) {
        self.with_last(|last| assert_eq!(last.status, expected, "body: {}", last.body));
    }

    pub(crate) fn body_str(&self, pointer: &str) -> Option<String> {
        self.with_last(|last| {
            last.body
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
    }

    pub(crate) fn body_i64(&self, pointer: &str) -> Option<i64> {
        self.with_last(|last| last.body.pointer(pointer).and_then(Value::as_i64))
    }
}
