//! Error types for the service-center client.

use std::fmt;

/// Result type for client, cache and invoice operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown when the backend cannot be reached at all.
pub const UNREACHABLE_MESSAGE: &str =
    "Cannot connect to server. Please make sure the backend is running.";

/// Error types for the service-center client.
///
/// The variants follow the four failure classes a form or view has to deal
/// with, plus the cache-internal failures inherited from the storage layer:
///
/// | Class | Variant |
/// |-------|---------|
/// | Missing or invalid input, caught before submission | [`Error::ValidationError`] |
/// | Write or read refused by the server | [`Error::ServerRejected`] |
/// | Session missing or expired (401/403) | [`Error::Unauthenticated`] |
/// | Server unreachable | [`Error::TransportError`] |
///
/// `Error` is `Clone` because one failed in-flight load is handed to every
/// caller that joined it.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input rejected locally before anything was sent.
    ///
    /// Raised for missing required fields, an empty wizard selection, or
    /// percentages refused by the configured
    /// [`PercentagePolicy`](crate::invoice::PercentagePolicy).
    ValidationError(String),

    /// The server answered with a non-success status other than 401/403.
    ///
    /// `message` is already flattened from the response body: the
    /// field-keyed `validationErrors` map joined with `", "`, else `message`,
    /// else `error`, else the raw body or status text.
    ServerRejected {
        /// HTTP status code
        status: u16,
        /// Message suitable for display as-is
        message: String,
    },

    /// 401 or 403: the caller is not logged in.
    ///
    /// Views treat this as "redirect to login", never as an alert, and it is
    /// only logged at debug level.
    Unauthenticated {
        /// HTTP status code (401 or 403)
        status: u16,
    },

    /// Connection refused, DNS failure, timeout or a broken transfer.
    TransportError(String),

    /// Serialization failed when converting a value to cache bytes or a
    /// request body.
    SerializationError(String),

    /// A response body or cache entry could not be decoded.
    DeserializationError(String),

    /// Cache storage failure.
    BackendError(String),

    /// Invalid cache entry: corrupted envelope or bad magic.
    ///
    /// **Recovery:** the entry is evicted and the read falls through to the
    /// network.
    InvalidCacheEntry(String),

    /// Schema version mismatch between code and cached data.
    VersionMismatch {
        /// Expected schema version (from compiled code)
        expected: u32,
        /// Found schema version (from cached entry)
        found: u32,
    },

    /// Invalid configuration value (environment variable, URL, policy name).
    ConfigError(String),

    /// A wizard operation was called in a step that does not allow it.
    InvalidTransition(String),

    /// Generic error with custom message.
    Other(String),
}

impl Error {
    /// Build a `ServerRejected` error.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Error::ServerRejected {
            status,
            message: message.into(),
        }
    }

    /// True for 401/403 responses.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Error::Unauthenticated { .. })
    }

    /// True when the server could not be reached.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::TransportError(_))
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::ServerRejected { status, .. } | Error::Unauthenticated { status } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Text a form banner or toast shows for this error.
    ///
    /// Server messages are shown verbatim; transport failures collapse to
    /// [`UNREACHABLE_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            Error::ValidationError(msg) => msg.clone(),
            Error::ServerRejected { message, .. } => message.clone(),
            Error::Unauthenticated { .. } => "Please log in to continue.".to_string(),
            Error::TransportError(_) => UNREACHABLE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Banner text for a failed form submission.
    ///
    /// Like [`user_message`](Self::user_message), but a server rejection
    /// with an empty message, or an internal failure, shows `fallback`.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            Error::ValidationError(_)
            | Error::Unauthenticated { .. }
            | Error::TransportError(_) => self.user_message(),
            Error::ServerRejected { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            _ => fallback.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Error::ServerRejected { status, message } => {
                write!(f, "Server rejected request ({}): {}", status, message)
            }
            Error::Unauthenticated { status } => write!(f, "Not authenticated ({})", status),
            Error::TransportError(msg) => write!(f, "Transport error: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidCacheEntry(msg) => {
                write!(f, "Invalid cache entry: {}", msg)
            }
            Error::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Cache version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::InvalidTransition(msg) => write!(f, "Invalid transition: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::TransportError(e.to_string())
        } else if e.is_syntax() || e.is_data() || e.is_eof() {
            Error::DeserializationError(e.to_string())
        } else {
            Error::SerializationError(e.to_string())
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::DeserializationError(e.to_string())
        } else if e.is_builder() {
            Error::ConfigError(e.to_string())
        } else if let Some(status) = e.status() {
            match status.as_u16() {
                401 | 403 => Error::Unauthenticated {
                    status: status.as_u16(),
                },
                code => Error::rejected(code, e.to_string()),
            }
        } else {
            Error::TransportError(e.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::TransportError(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}
