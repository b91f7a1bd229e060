//! Gmail REST client (read-only).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::credentials::CredentialStore;
use crate::error::ProviderError;
use crate::provider::{check_status, MailProvider};
use crate::types::MailMessage;

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageMetadata {
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    payload: Option<Payload>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    headers: Vec<Header>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    value: String,
}

impl MessageMetadata {
    fn header(&self, name: &str) -> Option<String> {
        self.payload
            .as_ref()?
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.clone())
    }

    fn into_message(self) -> MailMessage {
        MailMessage {
            subject: self.header("Subject"),
            sender: self.header("From"),
            date: self.header("Date"),
            snippet: self.snippet,
        }
    }
}

/// Gmail client for the authenticated user's mailbox.
pub struct GmailClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<CredentialStore>,
}

impl GmailClient {
    /// `base_url` is the API root, e.g. `https://gmail.googleapis.com/gmail/v1`.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Arc<CredentialStore>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    async fn message_metadata(
        &self,
        token: &str,
        id: &str,
    ) -> Result<MessageMetadata, ProviderError> {
        let url = format!("{}/users/me/messages/{}", self.base_url, id);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("format", "metadata"),
                ("metadataHeaders", "Subject"),
                ("metadataHeaders", "From"),
                ("metadataHeaders", "Date"),
            ])
            .send()
            .await?;
        let resp = check_status(resp).await?;
        resp.json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl MailProvider for GmailClient {
    async fn recent_messages(&self, limit: usize) -> Result<Vec<MailMessage>, ProviderError> {
        let token = self.credentials.access_token().await?;

        let url = format!("{}/users/me/messages", self.base_url);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .query(&[("maxResults", limit.to_string())])
            .send()
            .await?;
        let list: MessageList = check_status(resp)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        tracing::debug!(count = list.messages.len(), "Gmail message ids listed");

        let mut messages = Vec::with_capacity(list.messages.len());
        for msg in list.messages.iter().take(limit) {
            let meta = self.message_metadata(&token, &msg.id).await?;
            messages.push(meta.into_message());
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials(dir: &tempfile::TempDir) -> Arc<CredentialStore> {
        let path = dir.path().join("token.json");
        let expiry = (Utc::now() + chrono::Duration::hours(1)).to_rfc3339();
        std::fs::write(&path, json!({"token": "tkn", "expiry": expiry}).to_string()).unwrap();
        Arc::new(CredentialStore::new(path, Duration::from_secs(5)).unwrap())
    }

    #[tokio::test]
    async fn test_recent_messages_reads_headers_in_list_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me/messages"))
            .and(query_param("maxResults", "5"))
            .and(header("authorization", "Bearer tkn"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "messages": [{"id": "m2", "threadId": "t"}, {"id": "m1", "threadId": "t"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/me/messages/m2"))
            .and(query_param("format", "metadata"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "m2",
                "snippet": "Agenda attached",
                "payload": {"headers": [
                    {"name": "Subject", "value": "Planning"},
                    {"name": "From", "value": "Ana <ana@example.com>"},
                    {"name": "Date", "value": "Tue, 25 Feb 2025 09:00:00 -0800"}
                ]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/me/messages/m1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "m1",
                "snippet": "",
                "payload": {"headers": []}
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = GmailClient::new(server.uri(), credentials(&dir), Duration::from_secs(5))
            .unwrap();
        let messages = client.recent_messages(5).await.unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].subject.as_deref(), Some("Planning"));
        assert_eq!(messages[0].sender.as_deref(), Some("Ana <ana@example.com>"));
        assert_eq!(messages[0].snippet, "Agenda attached");
        assert_eq!(messages[1], MailMessage::default());
    }

    #[tokio::test]
    async fn test_empty_mailbox() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resultSizeEstimate": 0})))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = GmailClient::new(server.uri(), credentials(&dir), Duration::from_secs(5))
            .unwrap();
        assert!(client.recent_messages(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Credentials"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = GmailClient::new(server.uri(), credentials(&dir), Duration::from_secs(5))
            .unwrap();
        let err = client.recent_messages(5).await.unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_missing_credentials_short_circuit() {
        let dir = tempfile::tempdir().unwrap();
        let creds = Arc::new(
            CredentialStore::new(dir.path().join("none.json"), Duration::from_secs(1)).unwrap(),
        );
        let client = GmailClient::new("http://127.0.0.1:9", creds, Duration::from_secs(1)).unwrap();
        let err = client.recent_messages(5).await.unwrap_err();
        assert!(matches!(err, ProviderError::Credential(_)));
    }
}
