//! エラー型定義 (gh-github)

use thiserror::Error;

/// gh-github のエラー型
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid GitHub token or unable to access API: {0}")]
    InvalidToken(u16),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Failed to decode file content: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    Url(String),
}

impl GitHubError {
    /// HTTP status reported by GitHub, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::InvalidToken(status) => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// 422 Unprocessable Entity, GitHub's answer to "already exists"
    pub fn is_unprocessable(&self) -> bool {
        self.status() == Some(422)
    }
}

impl From<GitHubError> for gh_core::Error {
    fn from(e: GitHubError) -> Self {
        gh_core::Error::ToolExecution(e.to_string())
    }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, GitHubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status() {
        let err = GitHubError::Api {
            status: 422,
            message: "Validation Failed".to_string(),
        };
        assert_eq!(err.status(), Some(422));
        assert!(err.is_unprocessable());
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "GitHub API error (422): Validation Failed");

        let err = GitHubError::NotFound("Not Found".to_string());
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());

        assert_eq!(GitHubError::Parse("x".into()).status(), None);
    }

    #[test]
    fn test_into_core_error() {
        let err: gh_core::Error = GitHubError::InvalidToken(401).into();
        assert!(matches!(err, gh_core::Error::ToolExecution(_)));
        assert!(err.to_string().contains("401"));
    }
}
