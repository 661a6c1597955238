//! GitHub operations callable by the model
//!
//! Each operation is a [`Tool`](gh_core::Tool) over an authenticated
//! [`GitHubClient`]. Upstream failures come back as user-facing
//! `ToolResult::error` text; only malformed arguments produce `Err`.

pub mod branches;
pub mod collaborators;
pub mod files;
pub mod issues;
pub mod repos;
pub mod search;
pub mod user;

pub use branches::{CreateBranchTool, ListBranchesTool};
pub use collaborators::{AddCollaboratorTool, ListCollaboratorsTool, RemoveCollaboratorTool};
pub use files::{CreateFileTool, DeleteFileTool, GetFileContentTool, ListFilesTool, UpdateFileTool};
pub use issues::{CloseIssueTool, CreateIssueTool, ListIssuesTool};
pub use repos::{CreateRepoTool, DeleteRepoTool, ForkRepoTool, GetRepoStatsTool, ListReposTool};
pub use search::{SearchReposTool, SearchUsersTool};
pub use user::{GetAnyUserInfoTool, GetUserInfoTool};

use gh_core::ToolResult;

use crate::client::GitHubClient;
use crate::models::Repository;

pub(crate) const REPO_FULL_NAME_DESC: &str = "Full name of the repository.";

/// Fetch a repository, turning failures into the message shown to the user
pub(crate) async fn load_repo(
    gh: &GitHubClient,
    full_name: &str,
) -> std::result::Result<Repository, ToolResult> {
    match gh.repo(full_name).await {
        Ok(repo) => Ok(repo),
        Err(e) if e.is_not_found() => Err(ToolResult::error(format!(
            "Error: Repository '{}' not found.",
            full_name
        ))),
        Err(e) => Err(ToolResult::error(format!(
            "Error accessing repository '{}': {}",
            full_name, e
        ))),
    }
}

/// Header line followed by one entry per line
pub(crate) fn listing<I, S>(header: String, lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = header;
    for line in lines {
        out.push('\n');
        out.push_str(line.as_ref());
    }
    out
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) use crate::client::tests::connected_client;

    /// Mock `GET /repos/{full_name}` for a repository owned by `owner`
    pub(crate) async fn mount_repo(server: &MockServer, full_name: &str) {
        let (owner, name) = full_name.split_once('/').unwrap_or(("octocat", full_name));
        Mock::given(method("GET"))
            .and(path(format!("/repos/{}", full_name)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": name,
                "full_name": full_name,
                "owner": {"login": owner},
                "stargazers_count": 42,
                "forks_count": 7,
                "subscribers_count": 5,
                "language": "Rust",
                "default_branch": "main"
            })))
            .mount(server)
            .await;
    }

    pub(crate) async fn mount_missing_repo(server: &MockServer, full_name: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/repos/{}", full_name)))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .mount(server)
            .await;
    }
}
