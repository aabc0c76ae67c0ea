//! Core domain types
//!
//! Every type here is an ephemeral view of state owned by the CI platform.
//! Nothing is persisted locally; each request re-reads what it needs.

pub mod group;
pub mod identity;
pub mod repository;
pub mod token;
