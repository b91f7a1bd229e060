//! Email capability handler.
//!
//! Lists recent messages as speakable lines. Sending is acknowledged only.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CapabilityError;
use crate::handler::CapabilityHandler;
use crate::provider::MailProvider;
use crate::types::{CapabilityKind, CapabilityRequest, EmailAction, MailMessage};

/// Snippets longer than this many characters are cut and suffixed with `...`.
pub const SNIPPET_PREVIEW_CHARS: usize = 120;

pub const NO_EMAILS: &str = "You have no new emails.";

/// Handler for `email-action`.
pub struct EmailCapability {
    provider: Arc<dyn MailProvider>,
    max_results: usize,
}

impl EmailCapability {
    pub fn new(provider: Arc<dyn MailProvider>, max_results: usize) -> Self {
        Self {
            provider,
            max_results,
        }
    }

    async fn read_recent(&self) -> Result<String, CapabilityError> {
        let messages = self.provider.recent_messages(self.max_results).await?;
        tracing::debug!(count = messages.len(), "Recent messages fetched");

        if messages.is_empty() {
            return Ok(NO_EMAILS.to_string());
        }

        let lines: Vec<String> = messages
            .iter()
            .take(self.max_results)
            .enumerate()
            .map(|(i, msg)| render_message(i + 1, msg))
            .collect();
        Ok(lines.join("\n"))
    }
}

fn render_message(n: usize, msg: &MailMessage) -> String {
    format!(
        "Email {}: From {}, Subject: {}, Date: {}. Summary: {}",
        n,
        msg.sender.as_deref().unwrap_or("Unknown sender"),
        msg.subject.as_deref().unwrap_or("No Subject"),
        msg.date.as_deref().unwrap_or("Unknown date"),
        preview(&msg.snippet),
    )
}

fn preview(snippet: &str) -> String {
    if snippet.chars().count() > SNIPPET_PREVIEW_CHARS {
        let cut: String = snippet.chars().take(SNIPPET_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        snippet.to_string()
    }
}

#[async_trait]
impl CapabilityHandler for EmailCapability {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Email
    }

    async fn execute(&self, request: &CapabilityRequest) -> Result<String, CapabilityError> {
        match request {
            CapabilityRequest::Email(EmailAction::ReadRecent) => self.read_recent().await,
            CapabilityRequest::Email(EmailAction::Send { subject, .. }) => {
                tracing::info!(subject = %subject, "Send email acknowledged");
                Ok(format!("Sending email with subject: {}", subject))
            }
            other => Err(CapabilityError::Unsupported {
                handler: CapabilityKind::Email,
                requested: other.kind(),
            }),
        }
    }

    fn describe(&self, request: &CapabilityRequest) -> String {
        match request {
            CapabilityRequest::Email(EmailAction::ReadRecent) => {
                format!("Read the {} most recent emails", self.max_results)
            }
            CapabilityRequest::Email(EmailAction::Send { subject, .. }) => {
                format!("Send email: {}", subject)
            }
            other => format!("Unsupported request for email: {}", other.operation()),
        }
    }
}
