//! Calendar capability handler.
//!
//! Lists upcoming events soonest first. Event creation is acknowledged only.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CapabilityError;
use crate::handler::CapabilityHandler;
use crate::provider::CalendarProvider;
use crate::types::{CalendarAction, CalendarEvent, CapabilityKind, CapabilityRequest};

pub const NO_EVENTS: &str = "You have no upcoming events.";

/// Source of the current instant.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Handler for `calendar-action`.
pub struct CalendarCapability {
    provider: Arc<dyn CalendarProvider>,
    max_results: usize,
    clock: Clock,
}

impl CalendarCapability {
    pub fn new(provider: Arc<dyn CalendarProvider>, max_results: usize) -> Self {
        Self::with_clock(provider, max_results, Arc::new(Utc::now))
    }

    pub fn with_clock(
        provider: Arc<dyn CalendarProvider>,
        max_results: usize,
        clock: Clock,
    ) -> Self {
        Self {
            provider,
            max_results,
            clock,
        }
    }

    async fn check_upcoming(&self) -> Result<String, CapabilityError> {
        let now = (self.clock)();
        let fetched = self.provider.upcoming_events(now, self.max_results).await?;
        let events = upcoming(fetched, now, self.max_results);
        tracing::debug!(count = events.len(), "Upcoming events selected");

        if events.is_empty() {
            return Ok(NO_EVENTS.to_string());
        }

        let lines: Vec<String> = events
            .iter()
            .map(|e| format!("{} on {}", e.title.as_deref().unwrap_or("No Title"), e.start))
            .collect();
        Ok(lines.join("\n"))
    }
}

/// Keep events starting at or after `now`, soonest first, at most `limit`.
fn upcoming(mut events: Vec<CalendarEvent>, now: DateTime<Utc>, limit: usize) -> Vec<CalendarEvent> {
    events.retain(|e| e.start.is_upcoming(now));
    // Stable: ties keep provider order.
    events.sort_by_key(|e| e.start.sort_key());
    events.truncate(limit);
    events
}

#[async_trait]
impl CapabilityHandler for CalendarCapability {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Calendar
    }

    async fn execute(&self, request: &CapabilityRequest) -> Result<String, CapabilityError> {
        match request {
            CapabilityRequest::Calendar(CalendarAction::CheckUpcoming) => {
                self.check_upcoming().await
            }
            CapabilityRequest::Calendar(CalendarAction::CreateEvent { details }) => {
                tracing::info!(details = %details, "Create event acknowledged");
                Ok(format!("Adding event: {}", details))
            }
            other => Err(CapabilityError::Unsupported {
                handler: CapabilityKind::Calendar,
                requested: other.kind(),
            }),
        }
    }

    fn describe(&self, request: &CapabilityRequest) -> String {
        match request {
            CapabilityRequest::Calendar(CalendarAction::CheckUpcoming) => {
                format!("List the next {} calendar events", self.max_results)
            }
            CapabilityRequest::Calendar(CalendarAction::CreateEvent { details }) => {
                format!("Create event: {}", details)
            }
            other => format!("Unsupported request for calendar: {}", other.operation()),
        }
    }
}
