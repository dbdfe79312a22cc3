//! Log-only delivery for environments without SMTP.

use async_trait::async_trait;

use crate::{ConfirmationMailer, ConfirmationMessage, EmailError};

/// Writes confirmation codes to the trace log instead of sending them.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl ConfirmationMailer for LogMailer {
    async fn send_confirmation(&self, message: &ConfirmationMessage) -> Result<(), EmailError> {
        tracing::warn!(
            username = %message.username,
            to = %message.email,
            code = %message.code,
            "SMTP not configured; confirmation code logged instead of emailed"
        );
        Ok(())
    }
}
