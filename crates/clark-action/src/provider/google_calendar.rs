//! Google Calendar REST client (read-only).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

use crate::credentials::CredentialStore;
use crate::error::ProviderError;
use crate::provider::{check_status, CalendarProvider};
use crate::types::{CalendarEvent, EventStart};

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<EventItem>,
}

#[derive(Debug, Deserialize)]
struct EventItem {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    start: Option<EventTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    #[serde(default)]
    date_time: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

/// Calendar client for one calendar of the authenticated user.
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    base_url: reqwest::Url,
    calendar_id: String,
    credentials: Arc<CredentialStore>,
}

impl GoogleCalendarClient {
    /// `base_url` is the API root, e.g. `https://www.googleapis.com/calendar/v3`.
    pub fn new(
        base_url: impl Into<String>,
        calendar_id: impl Into<String>,
        credentials: Arc<CredentialStore>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into();
        let base_url = reqwest::Url::parse(&base_url)
            .map_err(|e| ProviderError::Http(format!("invalid base URL {}: {}", base_url, e)))?;
        Ok(Self {
            http,
            base_url,
            calendar_id: calendar_id.into(),
            credentials,
        })
    }

    /// `{base}/calendars/{id}/events`, with the id encoded as one path segment.
    fn events_url(&self) -> Result<reqwest::Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ProviderError::Http(format!("base URL cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarClient {
    async fn upcoming_events(
        &self,
        after: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CalendarEvent>, ProviderError> {
        let token = self.credentials.access_token().await?;

        let url = self.events_url()?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(&token)
            .query(&[
                ("timeMin", after.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("maxResults", limit.to_string()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await?;
        let list: EventList = check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let mut events = Vec::with_capacity(list.items.len());
        for item in list.items {
            let start = item
                .start
                .as_ref()
                .and_then(|s| EventStart::parse(s.date_time.as_deref(), s.date.as_deref()));
            match start {
                Some(start) => events.push(CalendarEvent {
                    title: item.summary,
                    start,
                }),
                None => tracing::warn!(
                    summary = item.summary.as_deref().unwrap_or(""),
                    "Skipping calendar event with unreadable start"
                ),
            }
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials(dir: &tempfile::TempDir) -> Arc<CredentialStore> {
        let path = dir.path().join("token.json");
        std::fs::write(&path, json!({"token": "cal-token"}).to_string()).unwrap();
        Arc::new(CredentialStore::new(path, Duration::from_secs(5)).unwrap())
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[tokio::test]
    async fn test_upcoming_events_query_and_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param("timeMin", "2025-02-25T12:00:00Z"))
            .and(query_param("maxResults", "5"))
            .and(query_param("singleEvents", "true"))
            .and(query_param("orderBy", "startTime"))
            .and(header("authorization", "Bearer cal-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"summary": "Standup", "start": {"dateTime": "2025-02-25T10:00:00-08:00"}},
                    {"start": {"date": "2025-03-01"}},
                    {"summary": "Broken", "start": {"dateTime": "someday"}}
                ]
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = GoogleCalendarClient::new(
            server.uri(),
            "primary",
            credentials(&dir),
            Duration::from_secs(5),
        )
        .unwrap();
        let events = client
            .upcoming_events(at("2025-02-25T12:00:00Z"), 5)
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title.as_deref(), Some("Standup"));
        assert_eq!(events[0].start.to_string(), "2025-02-25T10:00:00-08:00");
        assert_eq!(events[1].title, None);
        assert_eq!(events[1].start, EventStart::parse(None, Some("2025-03-01")).unwrap());
    }

    #[tokio::test]
    async fn test_no_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"kind": "calendar#events"})))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = GoogleCalendarClient::new(
            server.uri(),
            "primary",
            credentials(&dir),
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(client.upcoming_events(Utc::now(), 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = GoogleCalendarClient::new(
            server.uri(),
            "primary",
            credentials(&dir),
            Duration::from_secs(5),
        )
        .unwrap();
        let err = client.upcoming_events(Utc::now(), 5).await.unwrap_err();
        assert_eq!(err.to_string(), "provider returned status 503: backend unavailable");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = GoogleCalendarClient::new(
            server.uri(),
            "primary",
            credentials(&dir),
            Duration::from_secs(5),
        )
        .unwrap();
        let err = client.upcoming_events(Utc::now(), 5).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_calendar_id_is_path_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/calendar/v3/calendars/en.usa%23holiday@group.v.calendar.google.com/events",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"summary": "Presidents' Day", "start": {"date": "2025-02-17"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = GoogleCalendarClient::new(
            format!("{}/calendar/v3/", server.uri()),
            "en.usa#holiday@group.v.calendar.google.com",
            credentials(&dir),
            Duration::from_secs(5),
        )
        .unwrap();
        let events = client.upcoming_events(at("2025-02-01T00:00:00Z"), 5).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title.as_deref(), Some("Presidents' Day"));
    }
}
