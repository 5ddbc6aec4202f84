use thiserror::Error;

pub type NoxResult<T> = Result<T, NoxError>;

/// Errors surfaced by the API clients and the webhook receiver.
#[derive(Debug, Error)]
pub enum NoxError {
    /// Webhook payload or signature was empty.
    #[error("Missing payload or signature")]
    MissingCredentials,

    /// Presented signature does not match the one computed over the payload.
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid payload: {message}")]
    InvalidPayload { message: String },

    /// No response was received from the remote API.
    #[error("Error: {message}")]
    Transport { message: String },

    /// The remote API answered with an error-bearing response.
    #[error("Api Error: {body}")]
    Api { status: u16, body: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Server error: {message}")]
    Server { message: String },
}

impl NoxError {
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// HTTP status of the remote response, for `Api` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<std::io::Error> for NoxError {
    fn from(err: std::io::Error) -> Self {
        NoxError::server(format!("I/O error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_contains_body_verbatim() {
        let body = r#"{"detail":"amount must be positive"}"#;
        let err = NoxError::api(422, body);
        assert!(err.to_string().contains(body));
        assert_eq!(err.status(), Some(422));
        assert!(err.is_api());
    }

    #[test]
    fn test_transport_error_message() {
        let err = NoxError::transport("connection refused");
        assert_eq!(err.to_string(), "Error: connection refused");
        assert!(err.is_transport());
        assert_eq!(err.status(), None);
    }
}
