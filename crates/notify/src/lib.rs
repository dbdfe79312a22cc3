//! Out-of-band delivery of signup confirmation codes.
//!
//! The API only sees the [`ConfirmationMailer`] trait. The binary picks an
//! implementation at startup: SMTP when `SMTP_HOST` is configured, otherwise
//! [`delivery::log::LogMailer`], which writes the code to the trace log for
//! local development. Tests use [`delivery::memory::MemoryMailer`] to read
//! back the codes that were "sent".

pub mod delivery;

use async_trait::async_trait;

pub use delivery::email::{EmailConfig, EmailError, SmtpMailer};
pub use delivery::log::LogMailer;
pub use delivery::memory::MemoryMailer;

/// A confirmation code addressed to one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationMessage {
    pub username: String,
    pub email: String,
    pub code: String,
}

/// Delivers confirmation codes to the owner of an email address.
#[async_trait]
pub trait ConfirmationMailer: Send + Sync {
    async fn send_confirmation(&self, message: &ConfirmationMessage) -> Result<(), EmailError>;
}
