//! Error types for the anonbox crate.
//!
//! All errors implement [`std::error::Error`] and provide context about what went wrong.
//! Errors are split into fatal and transient classes - see [`Error::is_fatal`]. During a
//! watch session transient errors are reported and polling continues; fatal errors end
//! the session.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the anonbox service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Boundary errors (FATAL - surfaced immediately, never retried)
    // ─────────────────────────────────────────────────────────────────────────
    /// A mailbox credential token could not be parsed.
    #[error("malformed mailbox credentials '{token}': {reason}")]
    MalformedCredentials {
        /// The token as supplied by the caller.
        token: String,
        /// Why the token was rejected.
        reason: String,
    },

    /// Invalid configuration provided.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Transport errors (TRANSIENT - the poll cadence is the retry mechanism)
    // ─────────────────────────────────────────────────────────────────────────
    /// Connection-level failure (connect, DNS, timeout, interrupted body).
    #[error("request to {target} failed")]
    Network {
        /// The URL the request was addressed to.
        target: String,
        /// The underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success HTTP status.
    #[error("service at {target} returned HTTP {status}")]
    ServiceStatus {
        /// The URL the request was addressed to.
        target: String,
        /// The HTTP status code.
        status: reqwest::StatusCode,
    },

    /// A response body did not have the expected shape.
    #[error("unexpected response from service: {context}")]
    UnexpectedResponse {
        /// What was being looked for when the response failed to match.
        context: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Credential rejection (FATAL - the mailbox is gone, polling is pointless)
    // ─────────────────────────────────────────────────────────────────────────
    /// The service no longer recognises the mailbox credentials.
    ///
    /// anonbox mailboxes expire; once the access URL answers 404 the mailbox
    /// cannot come back.
    #[error("mailbox credentials rejected by service at {target}")]
    CredentialsRejected {
        /// The access URL that was rejected.
        target: String,
    },
}

impl Error {
    /// Returns `true` if this error should end a watch session.
    ///
    /// Transient failures (`Network`, `ServiceStatus`, `UnexpectedResponse`) are
    /// reported and the watch loop keeps its cadence; fatal failures stop it.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::MalformedCredentials { .. }
            | Error::InvalidConfig { .. }
            | Error::CredentialsRejected { .. } => true,

            Error::Network { .. }
            | Error::ServiceStatus { .. }
            | Error::UnexpectedResponse { .. } => false,
        }
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MalformedCredentials { .. } => ErrorCategory::Credentials,
            Error::InvalidConfig { .. } => ErrorCategory::Configuration,
            Error::Network { .. } => ErrorCategory::Network,
            Error::ServiceStatus { .. } => ErrorCategory::Service,
            Error::UnexpectedResponse { .. } => ErrorCategory::Protocol,
            Error::CredentialsRejected { .. } => ErrorCategory::Auth,
        }
    }
}

/// Error categories for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed credential tokens.
    Credentials,
    /// Configuration or validation errors.
    Configuration,
    /// Network connectivity errors.
    Network,
    /// HTTP-level service errors.
    Service,
    /// Unexpected response shape.
    Protocol,
    /// Credentials rejected by the service.
    Auth,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Credentials => write!(f, "credentials"),
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Service => write!(f, "service"),
            ErrorCategory::Protocol => write!(f, "protocol"),
            ErrorCategory::Auth => write!(f, "auth"),
        }
    }
}
