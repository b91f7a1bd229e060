//! Core types and value objects for the capability engine.
//!
//! Defines the closed set of capabilities, their typed requests, the schemas
//! advertised to the language model, and the provider records handlers read.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::CapabilityError;

// =============================================================================
// Enums
// =============================================================================

/// Capability kinds the language model may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CapabilityKind {
    Email,
    Calendar,
}

impl CapabilityKind {
    /// Every kind, in registration order.
    pub const ALL: [CapabilityKind; 2] = [CapabilityKind::Email, CapabilityKind::Calendar];

    /// Name the language model uses to call this capability.
    pub fn name(&self) -> &'static str {
        match self {
            CapabilityKind::Email => "email-action",
            CapabilityKind::Calendar => "calendar-action",
        }
    }

    /// Allowed values of the `operation` argument.
    pub fn operations(&self) -> &'static [&'static str] {
        match self {
            CapabilityKind::Email => &[EmailAction::READ_RECENT, EmailAction::SEND],
            CapabilityKind::Calendar => {
                &[CalendarAction::CHECK_UPCOMING, CalendarAction::CREATE_EVENT]
            }
        }
    }

    /// Noun used in user-facing failure sentences ("Error fetching emails: ...").
    pub fn subject_noun(&self) -> &'static str {
        match self {
            CapabilityKind::Email => "emails",
            CapabilityKind::Calendar => "calendar events",
        }
    }

    /// Function schema advertised to the language model.
    pub fn schema(&self) -> ToolSchema {
        match self {
            CapabilityKind::Email => ToolSchema {
                name: self.name().to_string(),
                description: "Perform actions related to the user's email: read the most \
                              recent messages or send a message."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "operation": {
                            "type": "string",
                            "enum": self.operations(),
                            "description": "read-recent lists the latest messages; send sends a message."
                        },
                        "subject": {
                            "type": "string",
                            "description": "Subject line. Required for send."
                        },
                        "body": {
                            "type": "string",
                            "description": "Message body for send."
                        }
                    },
                    "required": ["operation"]
                }),
            },
            CapabilityKind::Calendar => ToolSchema {
                name: self.name().to_string(),
                description: "Perform actions related to the user's calendar: check upcoming \
                              events or create a new event."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "operation": {
                            "type": "string",
                            "enum": self.operations(),
                            "description": "check-upcoming lists the next events; create-event schedules one."
                        },
                        "details": {
                            "type": "string",
                            "description": "Free-text event details (title, time, attendees). Required for create-event."
                        }
                    },
                    "required": ["operation"]
                }),
            },
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for CapabilityKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email-action" => Ok(CapabilityKind::Email),
            "calendar-action" => Ok(CapabilityKind::Calendar),
            _ => Err(format!("Unknown capability: {}", s)),
        }
    }
}

/// Validated email operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailAction {
    /// List the most recent messages.
    ReadRecent,
    /// Acknowledge a send request. No provider write happens.
    Send {
        subject: String,
        body: Option<String>,
    },
}

impl EmailAction {
    pub const READ_RECENT: &'static str = "read-recent";
    pub const SEND: &'static str = "send";
}

/// Validated calendar operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarAction {
    /// List the next events after now.
    CheckUpcoming,
    /// Acknowledge an event creation request. No provider write happens.
    CreateEvent { details: String },
}

impl CalendarAction {
    pub const CHECK_UPCOMING: &'static str = "check-upcoming";
    pub const CREATE_EVENT: &'static str = "create-event";
}

/// A capability invocation whose arguments passed schema validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityRequest {
    Email(EmailAction),
    Calendar(CalendarAction),
}

impl CapabilityRequest {
    /// Resolve a model-produced call (`name` + JSON `raw_arguments`) into a
    /// typed request.
    ///
    /// Unknown names yield [`CapabilityError::UnknownCapability`]; a payload
    /// that is not a JSON object of strings, misses a required field, or uses
    /// an undeclared operation yields [`CapabilityError::InvalidArguments`].
    /// `null` values count as absent. An empty payload is treated as `{}`.
    pub fn parse(name: &str, raw_arguments: &str) -> Result<Self, CapabilityError> {
        let kind: CapabilityKind = name
            .parse()
            .map_err(|_| CapabilityError::UnknownCapability(name.to_string()))?;
        let args = parse_arguments(kind, raw_arguments)?;
        let operation = required(kind, &args, "operation")?;

        match kind {
            CapabilityKind::Email => match operation {
                EmailAction::READ_RECENT => Ok(CapabilityRequest::Email(EmailAction::ReadRecent)),
                EmailAction::SEND => Ok(CapabilityRequest::Email(EmailAction::Send {
                    subject: required(kind, &args, "subject")?.to_string(),
                    body: args.get("body").cloned(),
                })),
                other => Err(unknown_operation(kind, other)),
            },
            CapabilityKind::Calendar => match operation {
                CalendarAction::CHECK_UPCOMING => {
                    Ok(CapabilityRequest::Calendar(CalendarAction::CheckUpcoming))
                }
                CalendarAction::CREATE_EVENT => {
                    Ok(CapabilityRequest::Calendar(CalendarAction::CreateEvent {
                        details: required(kind, &args, "details")?.to_string(),
                    }))
                }
                other => Err(unknown_operation(kind, other)),
            },
        }
    }

    pub fn kind(&self) -> CapabilityKind {
        match self {
            CapabilityRequest::Email(_) => CapabilityKind::Email,
            CapabilityRequest::Calendar(_) => CapabilityKind::Calendar,
        }
    }

    /// Wire name of the requested operation.
    pub fn operation(&self) -> &'static str {
        match self {
            CapabilityRequest::Email(EmailAction::ReadRecent) => EmailAction::READ_RECENT,
            CapabilityRequest::Email(EmailAction::Send { .. }) => EmailAction::SEND,
            CapabilityRequest::Calendar(CalendarAction::CheckUpcoming) => {
                CalendarAction::CHECK_UPCOMING
            }
            CapabilityRequest::Calendar(CalendarAction::CreateEvent { .. }) => {
                CalendarAction::CREATE_EVENT
            }
        }
    }
}

fn parse_arguments(
    kind: CapabilityKind,
    raw: &str,
) -> Result<BTreeMap<String, String>, CapabilityError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(BTreeMap::new());
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| invalid(kind, format!("arguments are not valid JSON: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| invalid(kind, "arguments must be a JSON object".to_string()))?;

    let mut args = BTreeMap::new();
    for (key, value) in object {
        match value {
            Value::String(s) => {
                args.insert(key.clone(), s.clone());
            }
            Value::Null => {}
            other => {
                return Err(invalid(
                    kind,
                    format!("argument '{}' must be a string, got {}", key, other),
                ))
            }
        }
    }
    Ok(args)
}

fn required<'a>(
    kind: CapabilityKind,
    args: &'a BTreeMap<String, String>,
    field: &str,
) -> Result<&'a str, CapabilityError> {
    args.get(field)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid(kind, format!("missing required field '{}'", field)))
}

fn unknown_operation(kind: CapabilityKind, operation: &str) -> CapabilityError {
    invalid(
        kind,
        format!(
            "operation must be one of [{}], got '{}'",
            kind.operations().join(", "),
            operation
        ),
    )
}

fn invalid(kind: CapabilityKind, reason: String) -> CapabilityError {
    CapabilityError::InvalidArguments {
        capability: kind,
        reason,
    }
}

// =============================================================================
// Schemas
// =============================================================================

/// Function declaration advertised to the language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// JSON Schema of the argument object.
    pub parameters: Value,
}

// =============================================================================
// Provider records
// =============================================================================

/// Header metadata and preview of one email, as returned by the mail provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailMessage {
    pub subject: Option<String>,
    pub sender: Option<String>,
    pub date: Option<String>,
    pub snippet: String,
}

/// Start of a calendar event: a timed instant or an all-day date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStart {
    At(DateTime<FixedOffset>),
    AllDay(NaiveDate),
}

impl EventStart {
    /// Parse the provider's `dateTime` (RFC 3339) or all-day `date` (YYYY-MM-DD).
    pub fn parse(date_time: Option<&str>, date: Option<&str>) -> Option<Self> {
        if let Some(dt) = date_time {
            return DateTime::parse_from_rfc3339(dt).ok().map(EventStart::At);
        }
        date.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(EventStart::AllDay)
    }

    /// Instant used for ordering. All-day events sort at midnight UTC.
    pub fn sort_key(&self) -> DateTime<Utc> {
        match self {
            EventStart::At(dt) => dt.with_timezone(&Utc),
            EventStart::AllDay(date) => date.and_time(NaiveTime::default()).and_utc(),
        }
    }

    /// Whether the event starts at or after `now`, compared on `sort_key`.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.sort_key() >= now
    }
}

impl fmt::Display for EventStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventStart::At(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            EventStart::AllDay(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// One calendar event, as returned by the calendar provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub title: Option<String>,
    pub start: EventStart,
}
