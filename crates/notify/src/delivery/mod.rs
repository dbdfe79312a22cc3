//! Delivery channels for confirmation codes.

pub mod email;
pub mod log;
pub mod memory;
