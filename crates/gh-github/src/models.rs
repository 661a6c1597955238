//! GitHub REST API response models
//!
//! Only the fields the operations read are modelled; everything else in
//! the payloads is ignored.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{GitHubError, Result};

/// Account as returned by `/user` and `/users/{login}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    /// Only present for the authenticated user
    #[serde(default)]
    pub owned_private_repos: Option<u64>,
    #[serde(default)]
    pub followers: u64,
}

impl User {
    /// Display name, falling back to the login
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.login)
    }

    /// Multi-line profile summary of the authenticated user
    pub fn summary(&self) -> String {
        format!(
            "Logged in user: {} ({})\nPublic Repos: {}\nPrivate Repos (Owned): {}\nFollowers: {}",
            self.login,
            self.display_name(),
            self.public_repos,
            self.owned_private_repos.unwrap_or(0),
            self.followers
        )
    }
}

/// Minimal account reference (owners, collaborators, search hits)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleUser {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub owner: SimpleUser,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    /// Watchers in the UI sense; only present on the full repository object
    #[serde(default)]
    pub subscribers_count: Option<u64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// Entry of the contents API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub name: String,
    pub path: String,
    /// `file`, `dir`, `symlink` or `submodule`
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

impl ContentItem {
    /// Decode the base64 payload of a file entry as UTF-8 text
    pub fn decoded_content(&self) -> Result<String> {
        let raw = self
            .content
            .as_deref()
            .ok_or_else(|| GitHubError::Decode(format!("'{}' has no inline content", self.path)))?;

        if let Some(encoding) = self.encoding.as_deref() {
            if encoding != "base64" {
                return Err(GitHubError::Decode(format!(
                    "unsupported encoding '{}' for '{}'",
                    encoding, self.path
                )));
            }
        }

        // GitHub wraps the base64 body at 60 columns
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| GitHubError::Decode(e.to_string()))?;

        String::from_utf8(bytes).map_err(|_| {
            GitHubError::Decode(format!("'{}' is not a UTF-8 text file", self.path))
        })
    }
}

/// Response of `GET /repos/{repo}/contents/{path}`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Contents {
    Dir(Vec<ContentItem>),
    File(ContentItem),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub state: String,
    /// Set when the issue is actually a pull request
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub commit: CommitRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub object: CommitRef,
}

/// Envelope of the search endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults<T> {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Response of the contents create/update endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct FileCommit {
    #[serde(default)]
    pub content: Option<ContentItem>,
}
