//! Capability engine for Clark.
//!
//! Declares the closed set of tool actions the language model may invoke,
//! validates model-produced arguments into typed requests, and dispatches
//! them to pluggable handlers backed by Gmail and Google Calendar.

pub mod credentials;
pub mod error;
pub mod handler;
pub mod provider;
pub mod types;

pub use credentials::CredentialStore;
pub use error::{CapabilityError, CredentialError, ProviderError};
pub use handler::calendar::CalendarCapability;
pub use handler::email::EmailCapability;
pub use handler::{CapabilityHandler, CapabilityRegistry};
pub use provider::{CalendarProvider, MailProvider};
pub use types::{
    CalendarAction, CalendarEvent, CapabilityKind, CapabilityRequest, EmailAction, EventStart,
    MailMessage, ToolSchema,
};
