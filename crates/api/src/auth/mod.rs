//! Authentication primitives.
//!
//! - [`code`] -- Argon2id hashing and verification of confirmation codes.
//! - [`jwt`] -- JWT access-token generation and validation.

pub mod code;
pub mod jwt;
