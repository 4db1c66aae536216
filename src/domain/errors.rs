use thiserror::Error;

/// Failures raised by an [`HttpTransport`](crate::domain::ports::HttpTransport)
/// before any HTTP status was obtained.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("connection failed: {reason}")]
    Connect { reason: String },

    #[error("request failed: {reason}")]
    Request { reason: String },
}

/// Why a prediction could not be obtained.
///
/// None of these are fatal: every variant is folded into an invalid
/// [`Prediction`](crate::domain::ml::prediction::Prediction) and the caller
/// falls back to rule-based behaviour.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PredictionError {
    #[error("disabled")]
    Disabled,

    #[error("not connected")]
    NotConnected,

    #[error("request build failed: {reason}")]
    RequestBuild { reason: String },

    #[error("transport failure: {reason}")]
    Transport { reason: String },

    #[error("client error (HTTP {status}): {body}")]
    ClientError { status: u16, body: String },

    #[error("server error (HTTP {status}): {body}")]
    ServerError { status: u16, body: String },

    #[error("protocol failure: {reason}")]
    Protocol {
        reason: String,
        status: Option<u16>,
        body: Option<String>,
    },
}

impl PredictionError {
    /// Maps a non-200 prediction response onto the error taxonomy.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            400..=499 => PredictionError::ClientError { status, body },
            500..=599 => PredictionError::ServerError { status, body },
            _ => PredictionError::Protocol {
                reason: format!("unexpected HTTP status {}", status),
                status: Some(status),
                body: Some(body),
            },
        }
    }

    pub fn protocol(reason: impl Into<String>) -> Self {
        PredictionError::Protocol {
            reason: reason.into(),
            status: None,
            body: None,
        }
    }

    /// Short category label, stable enough for log filtering.
    pub fn category(&self) -> &'static str {
        match self {
            PredictionError::Disabled => "disabled",
            PredictionError::NotConnected => "not_connected",
            PredictionError::RequestBuild { .. } => "request_build",
            PredictionError::Transport { .. } => "transport",
            PredictionError::ClientError { .. } => "client_error",
            PredictionError::ServerError { .. } => "server_error",
            PredictionError::Protocol { .. } => "protocol",
        }
    }

    /// Raw HTTP status attached to the failure, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            PredictionError::ClientError { status, .. }
            | PredictionError::ServerError { status, .. } => Some(*status),
            PredictionError::Protocol { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<TransportError> for PredictionError {
    fn from(err: TransportError) -> Self {
        PredictionError::Transport {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            PredictionError::from_status(404, "not found"),
            PredictionError::ClientError { status: 404, .. }
        ));
        assert!(matches!(
            PredictionError::from_status(503, "busy"),
            PredictionError::ServerError { status: 503, .. }
        ));

        let err = PredictionError::from_status(302, "moved");
        assert_eq!(err.category(), "protocol");
        assert_eq!(err.status(), Some(302));
    }

    #[test]
    fn test_error_formatting() {
        let err = PredictionError::ServerError {
            status: 500,
            body: "model crashed".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("model crashed"));

        assert_eq!(PredictionError::NotConnected.to_string(), "not connected");
        assert_eq!(PredictionError::Disabled.to_string(), "disabled");
    }

    #[test]
    fn test_transport_error_folds_into_transport_category() {
        let err: PredictionError = TransportError::Timeout { timeout_ms: 5000 }.into();
        assert_eq!(err.category(), "transport");
        assert!(err.to_string().contains("5000ms"));
        assert_eq!(err.status(), None);
    }
}
