//! Domain layer for the YaMDb review service.
//!
//! Everything here is pure: no database, no HTTP. The `db` and `api` crates
//! build on these types, and the access policy and rating math are tested
//! here in isolation.

pub mod access;
pub mod authored;
pub mod confirmation;
pub mod error;
pub mod pagination;
pub mod rating;
pub mod roles;
pub mod types;
pub mod validation;
