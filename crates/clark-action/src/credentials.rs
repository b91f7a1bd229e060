//! Delegated-access credentials for the Google APIs.
//!
//! Reads an "authorized user" token file, reuses the access token while it is
//! valid, and exchanges the refresh token for a new one when it is missing or
//! about to expire. The refreshed token is written back to the same file.
//! Acquiring the first token (the interactive consent flow) is not handled
//! here; the file must already exist.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::CredentialError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens expiring within this window are refreshed ahead of use.
const EXPIRY_SKEW_SECS: i64 = 60;

/// On-disk token record (the Google authorized-user JSON layout).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
    /// Fields this store does not interpret (scopes, account, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl AuthorizedUser {
    /// Whether the access token can be used at `now` without refreshing.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match (&self.token, self.expiry) {
            (Some(token), Some(expiry)) if !token.is_empty() => {
                expiry - chrono::Duration::seconds(EXPIRY_SKEW_SECS) > now
            }
            // No recorded expiry: trust the token until the provider rejects it.
            (Some(token), None) => !token.is_empty(),
            _ => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Token-file backed credential store with refresh support.
pub struct CredentialStore {
    path: PathBuf,
    http: reqwest::Client,
    cached: Mutex<Option<AuthorizedUser>>,
}

impl CredentialStore {
    /// Create a store reading `path`. The file is read lazily on first use.
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Result<Self, CredentialError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CredentialError::Refresh(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            path: path.into(),
            http,
            cached: Mutex::new(None),
        })
    }

    /// Return a usable access token, refreshing it first if needed.
    pub async fn access_token(&self) -> Result<String, CredentialError> {
        let mut cached = self.cached.lock().await;

        let mut creds = match cached.take() {
            Some(c) => c,
            None => self.read_file().await?,
        };

        if !creds.is_valid_at(Utc::now()) {
            tracing::info!(path = %self.path.display(), "Access token expired, refreshing");
            if let Err(e) = self.refresh(&mut creds).await {
                *cached = Some(creds);
                return Err(e);
            }
            self.write_file(&creds).await?;
        }

        let token = creds.token.clone().unwrap_or_default();
        *cached = Some(creds);
        Ok(token)
    }

    async fn read_file(&self) -> Result<AuthorizedUser, CredentialError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CredentialError::Missing(self.path.display().to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map_err(|e| CredentialError::Invalid(e.to_string()))
    }

    async fn write_file(&self, creds: &AuthorizedUser) -> Result<(), CredentialError> {
        let content = serde_json::to_string_pretty(creds)
            .map_err(|e| CredentialError::Invalid(e.to_string()))?;
        tokio::fs::write(&self.path, content).await?;
        tracing::debug!(path = %self.path.display(), "Refreshed token saved");
        Ok(())
    }

    async fn refresh(&self, creds: &mut AuthorizedUser) -> Result<(), CredentialError> {
        let refresh_token = creds
            .refresh_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(CredentialError::NoRefreshToken)?;

        let mut form = vec![
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token),
        ];
        if let Some(id) = &creds.client_id {
            form.push(("client_id", id.clone()));
        }
        if let Some(secret) = &creds.client_secret {
            form.push(("client_secret", secret.clone()));
        }

        let resp = self
            .http
            .post(&creds.token_uri)
            .form(&form)
            .send()
            .await
            .map_err(|e| CredentialError::Refresh(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(CredentialError::Refresh(format!(
                "status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let refreshed: RefreshResponse = resp
            .json()
            .await
            .map_err(|e| CredentialError::Refresh(format!("invalid token response: {}", e)))?;

        creds.token = Some(refreshed.access_token);
        creds.expiry = refreshed
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));
        if let Some(rotated) = refreshed.refresh_token {
            creds.refresh_token = Some(rotated);
        }
        Ok(())
    }
}
