//! エラー型定義 (gh-agent)

use std::fmt;

/// Failures while talking to the gh-agent server
#[derive(Debug)]
pub enum ClientError {
    /// The server could not be reached
    Connect(reqwest::Error),
    /// The server answered 401
    NotLoggedIn,
    /// Any other non-2xx answer
    Server { status: u16, message: String },
    /// `server_url` is not an http(s) base URL
    InvalidUrl(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(e) => write!(f, "Failed to connect to the server: {}", e),
            Self::NotLoggedIn => write!(
                f,
                "Error: You are not logged in. Please restart the app to authenticate."
            ),
            Self::Server { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            Self::InvalidUrl(url) => write!(f, "Invalid server URL: {}", url),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connect(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Connect(e)
    }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            ClientError::NotLoggedIn.to_string(),
            "Error: You are not logged in. Please restart the app to authenticate."
        );
        assert_eq!(
            ClientError::Server {
                status: 500,
                message: "boom".into()
            }
            .to_string(),
            "Server error (500): boom"
        );
    }
}
