use reqwest::StatusCode;
use thiserror::Error;

/// Default message when the service reports failure without saying why.
pub const DEFAULT_API_ERROR: &str = "API ส่งกลับมาไม่ถูกต้อง";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("API endpoint is empty")]
    EmptyEndpoint,
    #[error("{0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {}", .0.as_u16())]
    Http(StatusCode),
    #[error("{0}")]
    Api(String),
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),
    /// An HTML page came back where JSON was expected, typically a tunnel
    /// provider's interstitial warning.
    #[error("tunnel warning page returned instead of JSON")]
    TunnelWarning,
}

/// Coarse error classes shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Api,
    Parse,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::EmptyEndpoint | ClientError::Network(_) | ClientError::Http(_) => {
                ErrorKind::Network
            }
            ClientError::Api(_) => ErrorKind::Api,
            ClientError::Parse(_) | ClientError::TunnelWarning => ErrorKind::Parse,
        }
    }

    /// Single-line message for the view's error banner.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Api => self.to_string(),
            ErrorKind::Network | ErrorKind::Parse => {
                format!("ไม่สามารถเชื่อมต่อกับ API ได้: {self}")
            }
        }
    }
}
