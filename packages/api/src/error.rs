//! Errors raised by API requests.

use thiserror::Error;

/// Failure of an outbound API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response (DNS, connection reset, CORS, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not the JSON we expected.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status carried by the error, if the server responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_carries_body() {
        let err = ApiError::Status {
            status: 500,
            body: "Internal Server Error".to_string(),
        };
        assert_eq!(err.to_string(), "500: Internal Server Error");
        assert_eq!(err.status(), Some(500));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_unauthorized() {
        let err = ApiError::Status {
            status: 401,
            body: String::new(),
        };
        assert!(err.is_unauthorized());
        assert_eq!(ApiError::Transport("offline".into()).status(), None);
    }
}
