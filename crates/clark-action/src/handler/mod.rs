//! Capability handler registry and trait definition.
//!
//! Defines the `CapabilityHandler` async trait and the registry that maps
//! each [`CapabilityKind`] to its implementation.

pub mod calendar;
pub mod email;

use std::collections::BTreeMap;
use std::sync::Arc;

use std::time::Duration;

use async_trait::async_trait;
use clark_core::config::GoogleConfig;

use crate::credentials::CredentialStore;
use crate::error::{CapabilityError, ProviderError};
use crate::provider::{GmailClient, GoogleCalendarClient};
use crate::types::{CapabilityKind, CapabilityRequest, ToolSchema};

use self::calendar::CalendarCapability;
use self::email::EmailCapability;

/// A handler that executes one kind of capability request.
#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    /// The capability kind this handler serves.
    fn kind(&self) -> CapabilityKind;

    /// Execute the request and return the plain-text result for the user.
    ///
    /// Provider failures surface as [`CapabilityError::Provider`]; callers
    /// decide how to phrase them.
    async fn execute(&self, request: &CapabilityRequest) -> Result<String, CapabilityError>;

    /// Short human-readable description of what `request` will do.
    fn describe(&self, request: &CapabilityRequest) -> String;
}

/// Registry of capability handlers keyed by kind.
#[derive(Default)]
pub struct CapabilityRegistry {
    handlers: BTreeMap<CapabilityKind, Arc<dyn CapabilityHandler>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous handler of the same kind.
    pub fn register(&mut self, handler: Arc<dyn CapabilityHandler>) {
        let kind = handler.kind();
        if self.handlers.insert(kind, handler).is_some() {
            tracing::warn!(capability = %kind, "Replacing registered capability handler");
        }
    }

    /// Register the Gmail and Google Calendar handlers, sharing one
    /// credential store read from `config.token_file`.
    pub fn register_google(&mut self, config: &GoogleConfig) -> Result<(), ProviderError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let credentials = Arc::new(CredentialStore::new(&config.token_file, timeout)?);

        let gmail = GmailClient::new(&config.gmail_base_url, Arc::clone(&credentials), timeout)?;
        let calendar = GoogleCalendarClient::new(
            &config.calendar_base_url,
            &config.calendar_id,
            credentials,
            timeout,
        )?;

        self.register(Arc::new(EmailCapability::new(
            Arc::new(gmail),
            config.max_results,
        )));
        self.register(Arc::new(CalendarCapability::new(
            Arc::new(calendar),
            config.max_results,
        )));
        tracing::info!(token_file = %config.token_file, "Google capabilities registered");
        Ok(())
    }

    pub fn get(&self, kind: CapabilityKind) -> Option<&Arc<dyn CapabilityHandler>> {
        self.handlers.get(&kind)
    }

    /// Registered kinds in stable order.
    pub fn kinds(&self) -> Vec<CapabilityKind> {
        self.handlers.keys().copied().collect()
    }

    /// Tool schemas for every registered capability, advertised to the model.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.handlers.keys().map(|k| k.schema()).collect()
    }

    /// Resolve a model-produced call into a typed request.
    ///
    /// Names that are valid capabilities but have no registered handler are
    /// reported as unknown, same as names outside the closed set.
    pub fn resolve(
        &self,
        name: &str,
        raw_arguments: &str,
    ) -> Result<CapabilityRequest, CapabilityError> {
        let known = name
            .parse::<CapabilityKind>()
            .map(|k| self.handlers.contains_key(&k))
            .unwrap_or(false);
        if !known {
            return Err(CapabilityError::UnknownCapability(name.to_string()));
        }
        CapabilityRequest::parse(name, raw_arguments)
    }

    /// Execute a request with its registered handler.
    pub async fn execute(&self, request: &CapabilityRequest) -> Result<String, CapabilityError> {
        let kind = request.kind();
        let handler = self
            .get(kind)
            .ok_or(CapabilityError::Unregistered(kind))?;

        tracing::info!(
            capability = %kind,
            operation = request.operation(),
            action = %handler.describe(request),
            "Executing capability"
        );
        handler.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CalendarAction, EmailAction};

    struct EchoHandler(CapabilityKind);

    #[async_trait]
    impl CapabilityHandler for EchoHandler {
        fn kind(&self) -> CapabilityKind {
            self.0
        }

        async fn execute(&self, request: &CapabilityRequest) -> Result<String, CapabilityError> {
            Ok(format!("{} {}", self.0, request.operation()))
        }

        fn describe(&self, request: &CapabilityRequest) -> String {
            request.operation().to_string()
        }
    }

    fn email_only() -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::new();
        registry.register(Arc::new(EchoHandler(CapabilityKind::Email)));
        registry
    }

    #[test]
    fn test_empty_registry() {
        let registry = CapabilityRegistry::new();
        assert!(registry.kinds().is_empty());
        assert!(registry.schemas().is_empty());
        assert!(registry.get(CapabilityKind::Email).is_none());
    }

    #[test]
    fn test_register_and_schemas_in_order() {
        let mut registry = CapabilityRegistry::new();
        registry.register(Arc::new(EchoHandler(CapabilityKind::Calendar)));
        registry.register(Arc::new(EchoHandler(CapabilityKind::Email)));

        assert_eq!(
            registry.kinds(),
            vec![CapabilityKind::Email, CapabilityKind::Calendar]
        );
        let names: Vec<_> = registry.schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["email-action", "calendar-action"]);
    }

    #[test]
    fn test_resolve_registered() {
        let req = email_only()
            .resolve("email-action", r#"{"operation":"read-recent"}"#)
            .unwrap();
        assert_eq!(req, CapabilityRequest::Email(EmailAction::ReadRecent));
    }

    #[test]
    fn test_resolve_unregistered_is_unknown() {
        let err = email_only()
            .resolve("calendar-action", r#"{"operation":"check-upcoming"}"#)
            .unwrap_err();
        assert!(matches!(err, CapabilityError::UnknownCapability(ref n) if n == "calendar-action"));

        let err = email_only().resolve("weather-action", "{}").unwrap_err();
        assert!(matches!(err, CapabilityError::UnknownCapability(_)));
    }

    #[test]
    fn test_resolve_invalid_arguments() {
        let err = email_only()
            .resolve("email-action", r#"{"operation":"send"}"#)
            .unwrap_err();
        assert!(matches!(err, CapabilityError::InvalidArguments { .. }));
    }

    #[test]
    fn test_register_google() {
        let dir = tempfile::tempdir().unwrap();
        let config = GoogleConfig {
            token_file: dir.path().join("token.json").display().to_string(),
            ..GoogleConfig::default()
        };
        let mut registry = CapabilityRegistry::new();
        registry.register_google(&config).unwrap();
        assert_eq!(registry.kinds(), CapabilityKind::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_google_handlers_report_missing_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = GoogleConfig {
            token_file: dir.path().join("absent.json").display().to_string(),
            ..GoogleConfig::default()
        };
        let mut registry = CapabilityRegistry::new();
        registry.register_google(&config).unwrap();

        let err = registry
            .execute(&CapabilityRequest::Email(EmailAction::ReadRecent))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("credential file not found"));
    }

    #[tokio::test]
    async fn test_execute_dispatches_by_kind() {
        let out = email_only()
            .execute(&CapabilityRequest::Email(EmailAction::ReadRecent))
            .await
            .unwrap();
        assert_eq!(out, "email-action read-recent");
    }

    #[tokio::test]
    async fn test_execute_unregistered() {
        let err = email_only()
            .execute(&CapabilityRequest::Calendar(CalendarAction::CheckUpcoming))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CapabilityError::Unregistered(CapabilityKind::Calendar)
        ));
    }
}
