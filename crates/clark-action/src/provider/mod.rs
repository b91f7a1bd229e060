//! Provider traits for the external mail and calendar services.
//!
//! Handlers depend on these traits only; the Google REST clients live in the
//! submodules and tests substitute in-memory fakes.

pub mod gmail;
pub mod google_calendar;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ProviderError;
use crate::types::{CalendarEvent, MailMessage};

pub use gmail::GmailClient;
pub use google_calendar::GoogleCalendarClient;

/// Read access to a mailbox.
#[async_trait]
pub trait MailProvider: Send + Sync {
    /// Most recent messages, newest first, at most `limit`.
    async fn recent_messages(&self, limit: usize) -> Result<Vec<MailMessage>, ProviderError>;
}

/// Read access to a calendar.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Events starting after `after`, ordered by start time, at most `limit`.
    async fn upcoming_events(
        &self,
        after: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CalendarEvent>, ProviderError>;
}

/// Turn a non-success response into [`ProviderError::Status`].
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(ProviderError::Status { status, body })
}
