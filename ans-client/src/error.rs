//! Client error type.

use ans_name::ParseError;
use ans_trust::TrustError;

/// Errors returned by [`AgentClient`](crate::AgentClient).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The registry URL cannot carry API paths.
    #[error("invalid registry URL '{0}'")]
    InvalidUrl(String),

    /// The request could not be sent or the response not received.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The registry did not answer within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The registry answered with an error status.
    #[error("registry returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The registry's `error` message, or the raw body
        message: String,
    },

    /// The response body was not what the API promises.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The agent name could not be built.
    #[error(transparent)]
    Name(#[from] ParseError),

    /// Key, certificate or token handling failed.
    #[error(transparent)]
    Trust(#[from] TrustError),

    /// A named client operation failed.
    #[error("failed to {operation} {target}: {source}")]
    Operation {
        /// What the client was doing
        operation: &'static str,
        /// What it was doing it to
        target: String,
        /// Why it failed
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// Wraps this error with the operation that failed.
    #[must_use]
    pub fn during(self, operation: &'static str, target: impl Into<String>) -> Self {
        Self::Operation {
            operation,
            target: target.into(),
            source: Box::new(self),
        }
    }

    /// Returns the HTTP status if the registry rejected the request.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Operation { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Returns true if the registry could not be reached or did not answer
    /// in time.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Operation { source, .. } => source.is_transport(),
            _ => false,
        }
    }

    /// Returns true if the registry reported the agent as unknown.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Transport(error)
        }
    }
}
