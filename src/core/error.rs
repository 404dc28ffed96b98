use thiserror::Error;

/// Failure of a single conversion request. None of these are fatal to a session.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse conversion response: {message}")]
    Parse { message: String },
}

impl ConversionError {
    /// Whether resubmitting the same input may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ConversionError::Network(_) => true,
            ConversionError::Api { status, .. } => *status == 429 || *status >= 500,
            ConversionError::InvalidAmount { .. } | ConversionError::Parse { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ConversionError::Api {
            status: 401,
            message: "Invalid authentication credentials".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error (401): Invalid authentication credentials"
        );

        let err = ConversionError::Parse {
            message: "missing field `result`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse conversion response: missing field `result`"
        );
    }

    #[test]
    fn test_retryable_errors() {
        let server_error = ConversionError::Api {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        let auth_error = ConversionError::Api {
            status: 401,
            message: "Unauthorized".to_string(),
        };
        assert!(server_error.is_retryable());
        assert!(!auth_error.is_retryable());
        assert!(
            !ConversionError::Parse {
                message: "bad".to_string()
            }
            .is_retryable()
        );
    }
}
