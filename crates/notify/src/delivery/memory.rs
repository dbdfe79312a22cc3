//! In-memory delivery that records every message. Used by integration tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{ConfirmationMailer, ConfirmationMessage, EmailError};

#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<ConfirmationMessage>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message delivered so far, oldest first.
    pub fn sent(&self) -> Vec<ConfirmationMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// The most recent code sent to `username`, if any.
    pub fn last_code_for(&self, username: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|m| m.username == username)
            .map(|m| m.code)
    }
}

#[async_trait]
impl ConfirmationMailer for MemoryMailer {
    async fn send_confirmation(&self, message: &ConfirmationMessage) -> Result<(), EmailError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.clone());
        }
        Ok(())
    }
}
