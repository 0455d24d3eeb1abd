//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`VoteRepository`, `VoteTargetCatalogue`, `AccountRepository`)
//! are implemented by outbound adapters. Driving ports (`VoteLedger`,
//! `IdentityResolver`, `AccountRegistration`) are what inbound adapters call.
//! `CredentialHasher` is driven too, but its only implementation lives in
//! the domain.

mod macros;
pub(crate) use macros::define_port_error;

mod account_registration;
mod account_repository;
mod credential_hasher;
mod identity_resolver;
mod vote_ledger;
mod vote_repository;
mod vote_target_catalogue;

#[cfg(test)]
pub use account_registration::MockAccountRegistration;
pub use account_registration::AccountRegistration;
#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountPersistenceError, AccountRepository};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::CredentialHasher;
#[cfg(test)]
pub use identity_resolver::MockIdentityResolver;
pub use identity_resolver::IdentityResolver;
#[cfg(test)]
pub use vote_ledger::MockVoteLedger;
pub use vote_ledger::VoteLedger;
#[cfg(test)]
pub use vote_repository::MockVoteRepository;
pub use vote_repository::{VotePersistenceError, VoteRepository};
#[cfg(test)]
pub use vote_target_catalogue::MockVoteTargetCatalogue;
pub use vote_target_catalogue::{VoteTargetCatalogue, VoteTargetCatalogueError};
