//! Q&A backend library: the vote ledger, the identity resolver, and their
//! HTTP and PostgreSQL adapters.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use middleware::Trace;
