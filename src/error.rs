/// Error types shared by the background dispatcher and the JS bridge
use thiserror::Error;

/// `X-Error-Code` the service returns when the access token is no longer valid
pub const AUTH_EXPIRED_CODE: &str = "107";

/// Failure of a remote Pocket API call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The server rejected the access token. Recoverable by logging in again.
    #[error("access token rejected by server")]
    AuthExpired,

    /// The server answered with some other error code
    #[error("request rejected ({code}): {message}")]
    Rejected { code: String, message: String },

    /// Network failure or a rejection that carried no error code
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be decoded
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Classify a rejection by its `xErrorCode`, if it carried one.
    pub fn from_code(code: Option<&str>, message: impl Into<String>) -> Self {
        match code {
            Some(AUTH_EXPIRED_CODE) => ApiError::AuthExpired,
            Some(code) => ApiError::Rejected {
                code: code.to_string(),
                message: message.into(),
            },
            None => ApiError::Transport(message.into()),
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ApiError::AuthExpired)
    }
}

/// Failure inside the browser bridge itself
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error("browser API call `{call}` failed: {message}")]
    Browser { call: &'static str, message: String },

    #[error("failed to convert value across the JS boundary: {0}")]
    Serialization(String),
}

/// Failure anywhere in the login sequence (guid fetch, token exchange, or
/// persisting the session)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthFlowError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] HostError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_code_is_auth_expired() {
        let err = ApiError::from_code(Some("107"), "Invalid access token");
        assert_eq!(err, ApiError::AuthExpired);
        assert!(err.is_auth_expired());
    }

    #[test]
    fn test_other_codes_are_rejections() {
        let err = ApiError::from_code(Some("199"), "Pocket server issue");
        assert_eq!(
            err,
            ApiError::Rejected {
                code: "199".to_string(),
                message: "Pocket server issue".to_string(),
            }
        );
        assert!(!err.is_auth_expired());
    }

    #[test]
    fn test_missing_code_is_transport() {
        let err = ApiError::from_code(None, "Failed to fetch");
        assert_eq!(err, ApiError::Transport("Failed to fetch".to_string()));
    }

    #[test]
    fn test_display() {
        let err = HostError::Browser {
            call: "tabs.sendMessage",
            message: "Receiving end does not exist".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "browser API call `tabs.sendMessage` failed: Receiving end does not exist"
        );
    }
}
