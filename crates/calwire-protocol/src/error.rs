//! Error types for CalDAV protocol operations.
//!
//! Transport failures are created by the [`Transport`](crate::Transport)
//! implementation and pass through the operation layer unchanged.

use std::fmt;
use thiserror::Error;

/// The category of a [`DavError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DavErrorCode {
    /// Connection failed, timed out, or the body could not be read.
    Network,
    /// The server rejected the credentials (401).
    Authentication,
    /// The server refused access (403).
    Authorization,
    /// The resource does not exist (404).
    NotFound,
    /// Too many requests (429).
    RateLimited,
    /// The server failed (5xx).
    Server,
    /// The response could not be parsed or had an unexpected status.
    InvalidResponse,
    /// Bad caller-supplied configuration, e.g. an unknown namespace prefix.
    Configuration,
    /// Unexpected internal state.
    Internal,
}

impl DavErrorCode {
    /// Returns true if the failure is transient.
    ///
    /// This layer never retries; the flag is for callers that do.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::RateLimited | Self::Server)
    }

    /// Returns a stable machine-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network_error",
            Self::Authentication => "authentication_failed",
            Self::Authorization => "authorization_failed",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Server => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::Configuration => "configuration_error",
            Self::Internal => "internal_error",
        }
    }
}

impl fmt::Display for DavErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised by a CalDAV operation or its transport.
#[derive(Debug, Error)]
pub struct DavError {
    code: DavErrorCode,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DavError {
    /// Creates a new error with the given code and message.
    pub fn new(code: DavErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::Network, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::Authentication, message)
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::Authorization, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::NotFound, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::RateLimited, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::Server, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::InvalidResponse, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::Configuration, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(DavErrorCode::Internal, message)
    }

    /// Attaches the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> DavErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for DavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<quick_xml::Error> for DavError {
    fn from(err: quick_xml::Error) -> Self {
        Self::invalid_response(format!("malformed XML: {}", err)).with_source(err)
    }
}

impl From<url::ParseError> for DavError {
    fn from(err: url::ParseError) -> Self {
        Self::invalid_response(format!("invalid URL: {}", err)).with_source(err)
    }
}

/// A specialized Result type for CalDAV operations.
pub type DavResult<T> = Result<T, DavError>;
