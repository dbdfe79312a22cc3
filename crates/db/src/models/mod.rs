//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Serialize` projection used in API responses where the row itself
//!   carries data that must not leak (ids of other tables, code hashes)
//! - Repository input structs for inserts and partial updates

pub mod comment;
pub mod review;
pub mod title;
pub mod user;
pub mod vocabulary;
