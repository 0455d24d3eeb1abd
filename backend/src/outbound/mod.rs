//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//!
//! Adapters convert between domain types and storage representations and
//! carry no business rules.

pub mod persistence;
