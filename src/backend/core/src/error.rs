//! Error handling for Punchclock Core.
//!
//! This module provides:
//! - A single error type carrying a machine-readable code and a user-facing message
//! - Stable numeric codes used verbatim in JSON-RPC error objects
//! - Severity classification driving log levels
//! - Metrics integration for error tracking
//!
//! # Usage
//!
//! ```rust,ignore
//! use punchclock_core::error::{ErrorCode, ErrorContext, Result};
//!
//! fn read_log(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path).with_error_code(ErrorCode::PersistenceFailed)
//! }
//! ```

use metrics::counter;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

use crate::events::ClockStatus;

// ═══════════════════════════════════════════════════════════════════════════════
// Result Type Alias
// ═══════════════════════════════════════════════════════════════════════════════

/// A specialized Result type for Punchclock operations.
pub type Result<T> = std::result::Result<T, PunchError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Error Codes
// ═══════════════════════════════════════════════════════════════════════════════

/// Machine-readable error codes.
///
/// These codes are stable and can be used by clients for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Clock Errors (1000-1099)
    InvalidIdentifier,
    InvalidStateTransition,
    ClockAlreadyActive,
    MissingClockIn,
    ClockNotFound,

    // Input Errors (1100-1199)
    InvalidEventKind,
    InvalidFormat,

    // Storage Errors (2000-2099)
    PersistenceFailed,
    CorruptStore,
    SerializationError,

    // Configuration Errors (5000-5099)
    ConfigurationError,

    // Protocol Errors (JSON-RPC reserved range)
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

impl ErrorCode {
    /// Get the numeric code for this error.
    ///
    /// Protocol errors use the JSON-RPC 2.0 reserved values so that they can be
    /// placed into an error object unchanged.
    pub const fn numeric_code(&self) -> i64 {
        match self {
            Self::InvalidIdentifier => 1000,
            Self::InvalidStateTransition => 1001,
            Self::ClockAlreadyActive => 1002,
            Self::MissingClockIn => 1003,
            Self::ClockNotFound => 1004,

            Self::InvalidEventKind => 1100,
            Self::InvalidFormat => 1101,

            Self::PersistenceFailed => 2000,
            Self::CorruptStore => 2001,
            Self::SerializationError => 2002,

            Self::ConfigurationError => 5000,

            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }

    /// Get the error category for grouping.
    pub const fn category(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier
            | Self::InvalidStateTransition
            | Self::ClockAlreadyActive
            | Self::MissingClockIn
            | Self::ClockNotFound => "clock",
            Self::InvalidEventKind | Self::InvalidFormat => "input",
            Self::PersistenceFailed | Self::CorruptStore | Self::SerializationError => "storage",
            Self::ConfigurationError => "config",
            Self::ParseError
            | Self::InvalidRequest
            | Self::MethodNotFound
            | Self::InvalidParams => "protocol",
            Self::InternalError => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Severity
// ═══════════════════════════════════════════════════════════════════════════════

/// Severity level for errors (affects logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Caller errors (bad input, rejected transitions)
    Low,
    /// Operational issues
    Medium,
    /// System errors (disk failures, inconsistent history)
    High,
    /// The stored log can no longer be trusted
    Critical,
}

impl ErrorSeverity {
    /// Get severity based on error code.
    pub const fn from_code(code: &ErrorCode) -> Self {
        match code {
            ErrorCode::InvalidIdentifier
            | ErrorCode::InvalidStateTransition
            | ErrorCode::ClockAlreadyActive
            | ErrorCode::ClockNotFound
            | ErrorCode::InvalidEventKind
            | ErrorCode::InvalidFormat
            | ErrorCode::ParseError
            | ErrorCode::InvalidRequest
            | ErrorCode::MethodNotFound
            | ErrorCode::InvalidParams => Self::Low,

            ErrorCode::SerializationError | ErrorCode::ConfigurationError => Self::Medium,

            ErrorCode::MissingClockIn | ErrorCode::PersistenceFailed => Self::High,

            ErrorCode::CorruptStore | ErrorCode::InternalError => Self::Critical,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Details
// ═══════════════════════════════════════════════════════════════════════════════

/// Additional structured details about an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Additional context key-value pairs
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,

    /// Related entity ID (usually a clock id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    /// Related entity type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
}

impl ErrorDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.context.is_empty() && self.entity_id.is_none() && self.entity_type.is_none()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Main Error Type
// ═══════════════════════════════════════════════════════════════════════════════

/// The main error type for Punchclock Core.
#[derive(Error, Debug)]
pub struct PunchError {
    /// Machine-readable error code
    code: ErrorCode,

    /// User-facing error message
    message: Cow<'static, str>,

    /// Detailed internal message (for logging only)
    internal_message: Option<String>,

    /// Additional structured details
    details: ErrorDetails,

    /// The source error that caused this error
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl fmt::Display for PunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref internal) = self.internal_message {
            write!(f, " (internal: {})", internal)?;
        }
        Ok(())
    }
}

impl PunchError {
    // ─────────────────────────────────────────────────────────────────────────
    // Constructors
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new error with code and message.
    pub fn new(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        let error = Self {
            code,
            message: message.into(),
            internal_message: None,
            details: ErrorDetails::default(),
            source: None,
        };
        error.record_metrics();
        error
    }

    /// Create an error with both user and internal messages.
    pub fn with_internal(
        code: ErrorCode,
        message: impl Into<Cow<'static, str>>,
        internal_message: impl Into<String>,
    ) -> Self {
        let mut error = Self::new(code, message);
        error.internal_message = Some(internal_message.into());
        error
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_internal(ErrorCode::InternalError, "An internal error occurred", message)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder Methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Add error details.
    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = details;
        self
    }

    /// Add context to details.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.details.context.insert(key.into(), v);
        }
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn internal_message(&self) -> Option<&str> {
        self.internal_message.as_deref()
    }

    pub fn details(&self) -> &ErrorDetails {
        &self.details
    }

    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::from_code(&self.code)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────────────────────

    /// Log this error with appropriate severity.
    pub fn log(&self) {
        let code = self.code.to_string();
        let category = self.code.category();

        match self.severity() {
            ErrorSeverity::Critical => {
                error!(
                    error_code = %code,
                    category = category,
                    message = %self.message,
                    internal_message = ?self.internal_message,
                    details = ?self.details,
                    source = ?self.source,
                    "CRITICAL ERROR"
                );
            }
            ErrorSeverity::High => {
                error!(
                    error_code = %code,
                    category = category,
                    message = %self.message,
                    internal_message = ?self.internal_message,
                    "High severity error"
                );
            }
            ErrorSeverity::Medium => {
                warn!(
                    error_code = %code,
                    category = category,
                    message = %self.message,
                    "Medium severity error"
                );
            }
            ErrorSeverity::Low => {
                tracing::debug!(
                    error_code = %code,
                    category = category,
                    message = %self.message,
                    "Rejected request"
                );
            }
        }
    }

    fn record_metrics(&self) {
        counter!(
            "punchclock_errors_total",
            "code" => self.code.to_string(),
            "category" => self.code.category().to_string(),
        )
        .increment(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Context Extension Trait
// ═══════════════════════════════════════════════════════════════════════════════

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Wrap the error with a specific error code.
    fn with_error_code(self, code: ErrorCode) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_error_code(self, code: ErrorCode) -> Result<T> {
        self.map_err(|e| PunchError::new(code, e.to_string()).with_source(e))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// From Implementations for Common Error Types
// ═══════════════════════════════════════════════════════════════════════════════

impl From<serde_json::Error> for PunchError {
    fn from(error: serde_json::Error) -> Self {
        let code = if error.is_syntax() || error.is_data() || error.is_eof() {
            ErrorCode::CorruptStore
        } else {
            ErrorCode::SerializationError
        };

        Self::with_internal(code, "Failed to process JSON data", error.to_string()).with_source(error)
    }
}

impl From<std::io::Error> for PunchError {
    fn from(error: std::io::Error) -> Self {
        Self::with_internal(
            ErrorCode::PersistenceFailed,
            "Failed to access the clock store",
            error.to_string(),
        )
        .with_source(error)
    }
}

impl From<config::ConfigError> for PunchError {
    fn from(error: config::ConfigError) -> Self {
        Self::with_internal(
            ErrorCode::ConfigurationError,
            "Configuration error occurred",
            error.to_string(),
        )
        .with_source(error)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Convenience Constructors for Domain Errors
// ═══════════════════════════════════════════════════════════════════════════════

impl PunchError {
    // ─────────────────────────────────────────────────────────────────────────
    // Clock Errors
    // ─────────────────────────────────────────────────────────────────────────

    /// The clock identifier was empty.
    pub fn invalid_identifier() -> Self {
        Self::new(ErrorCode::InvalidIdentifier, "Clock id must not be empty")
    }

    /// A start was attempted on a clock that is already running.
    pub fn already_clocked_in(id: &str) -> Self {
        Self::new(
            ErrorCode::InvalidStateTransition,
            format!("Clock {} must be stopped before it can be started", id),
        )
        .with_details(transition_details(id, ClockStatus::ClockedIn))
    }

    /// A stop was attempted on a clock that is not running.
    pub fn not_clocked_in(id: &str, status: ClockStatus) -> Self {
        Self::new(
            ErrorCode::InvalidStateTransition,
            format!("Clock {} must be started before it can be stopped", id),
        )
        .with_details(transition_details(id, status))
    }

    /// A reset was attempted on a clock that is not stopped.
    pub fn not_clocked_out(id: &str, status: ClockStatus) -> Self {
        Self::new(
            ErrorCode::InvalidStateTransition,
            format!("Clock {} must be stopped before it can be reset", id),
        )
        .with_details(transition_details(id, status))
    }

    /// Another clock is already running.
    pub fn clock_already_active(id: &str, active: &str) -> Self {
        Self::new(
            ErrorCode::ClockAlreadyActive,
            format!("Cannot clock in {} while {} is already clocked in", id, active),
        )
        .with_details(ErrorDetails::new().with_entity("clock", id).with_context("active", active))
    }

    /// A running clock has no start event to pair a stop with.
    pub fn missing_clock_in(id: &str) -> Self {
        Self::with_internal(
            ErrorCode::MissingClockIn,
            format!("Cannot find last clock-in event for {}", id),
            "clock is clocked in but its history holds no start event",
        )
        .with_details(ErrorDetails::new().with_entity("clock", id))
    }

    /// The clock does not exist.
    pub fn clock_not_found(id: &str) -> Self {
        Self::new(ErrorCode::ClockNotFound, format!("Clock not found: {}", id))
            .with_details(ErrorDetails::new().with_entity("clock", id))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input Errors
    // ─────────────────────────────────────────────────────────────────────────

    /// An event kind outside `start`, `stop` and `reset`.
    pub fn invalid_event_kind(kind: &str) -> Self {
        Self::new(
            ErrorCode::InvalidEventKind,
            format!("Unknown event kind '{}': expected start, stop or reset", kind),
        )
        .with_context("kind", kind)
    }

    /// Malformed text input.
    pub fn invalid_format(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::InvalidFormat, message)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Storage Errors
    // ─────────────────────────────────────────────────────────────────────────

    /// The persisted event log does not replay.
    pub fn corrupt_store(cause: PunchError) -> Self {
        Self::with_internal(
            ErrorCode::CorruptStore,
            "Stored event log does not replay",
            cause.to_string(),
        )
        .with_source(cause)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Protocol Errors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::with_internal(ErrorCode::ParseError, "Parse error", message)
    }

    pub fn invalid_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(ErrorCode::MethodNotFound, format!("Method not found: {}", method))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::with_internal(ErrorCode::InvalidParams, "Invalid params", message)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigurationError, message.into())
    }
}

fn transition_details(id: &str, status: ClockStatus) -> ErrorDetails {
    ErrorDetails::new()
        .with_entity("clock", id)
        .with_context("status", status.as_str())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
