//! Repository operations

use async_trait::async_trait;
use gh_core::{Result, SchemaBuilder, Tool, ToolArgs, ToolResult};
use serde_json::Value;
use tracing::info;

use super::{REPO_FULL_NAME_DESC, listing, load_repo};
use crate::client::GitHubClient;

const VISIBILITIES: &[&str] = &["all", "public", "private"];

/// Repositories owned by the user
pub struct ListReposTool;

#[async_trait]
impl Tool<GitHubClient> for ListReposTool {
    fn name(&self) -> &str {
        "list_repos"
    }

    fn description(&self) -> &str {
        "List all repositories of the user."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[(
            "visibility",
            "string",
            "Visibility of the repository ('all', 'public', 'private')",
            false,
        )])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let visibility = input
            .optional_str("visibility")
            .map(str::to_lowercase)
            .unwrap_or_else(|| "all".to_string());

        if !VISIBILITIES.contains(&visibility.as_str()) {
            return Ok(ToolResult::error(format!(
                "Error: Unknown visibility '{}'. Use 'all', 'public' or 'private'.",
                visibility
            )));
        }

        let repos = match gh.list_own_repos(&visibility).await {
            Ok(repos) => repos,
            Err(e) => return Ok(ToolResult::error(format!("Error listing repositories: {}", e))),
        };

        if repos.is_empty() {
            return Ok(ToolResult::success(format!(
                "You have no '{}' repositories.",
                visibility
            )));
        }

        Ok(ToolResult::success(listing(
            format!("Your {} repositories:", visibility),
            repos.iter().map(|r| r.full_name.as_str()),
        )))
    }
}

pub struct CreateRepoTool;

#[async_trait]
impl Tool<GitHubClient> for CreateRepoTool {
    fn name(&self) -> &str {
        "create_repo"
    }

    fn description(&self) -> &str {
        "Create a new GitHub repository."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[
            ("name", "string", "Name of the repository.", true),
            ("description", "string", "Description of the repository.", false),
            ("private", "boolean", "Whether the repository should be private.", false),
        ])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let name = input.required_str("name")?;
        let description = input.optional_str("description");
        let private = input.optional_bool("private").unwrap_or(false);

        match gh.create_repo(name, description, private).await {
            Ok(repo) => Ok(ToolResult::success(format!(
                "Repository '{}' created successfully.",
                repo.full_name
            ))),
            Err(e) if e.is_unprocessable() => Ok(ToolResult::error(format!(
                "Error: Repository with name '{}' might already exist.",
                name
            ))),
            Err(e) => Ok(ToolResult::error(format!("Error creating repository: {}", e))),
        }
    }
}

/// Deletes a repository, but only one the user owns
pub struct DeleteRepoTool;

#[async_trait]
impl Tool<GitHubClient> for DeleteRepoTool {
    fn name(&self) -> &str {
        "delete_repo"
    }

    fn description(&self) -> &str {
        "Delete a GitHub repository."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[(
            "repo_full_name",
            "string",
            "Full name of the repository to delete (e.g. 'username/repo-name')",
            true,
        )])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let full_name = input.required_str("repo_full_name")?;

        let repo = match load_repo(gh, full_name).await {
            Ok(repo) => repo,
            Err(result) => return Ok(result),
        };

        // logins are case-insensitive on GitHub
        if !repo.owner.login.eq_ignore_ascii_case(gh.login()) {
            return Ok(ToolResult::error(
                "Error: You can only delete your own repository.",
            ));
        }

        match gh.delete_repo(&repo.full_name).await {
            Ok(()) => {
                info!("Repository {} deleted on behalf of {}", repo.full_name, gh.login());
                Ok(ToolResult::success(format!(
                    "Repository '{}' deleted successfully.",
                    full_name
                )))
            }
            Err(e) => Ok(ToolResult::error(format!("Error deleting repository: {}", e))),
        }
    }
}

pub struct ForkRepoTool;

#[async_trait]
impl Tool<GitHubClient> for ForkRepoTool {
    fn name(&self) -> &str {
        "fork_repo"
    }

    fn description(&self) -> &str {
        "Fork another user's repository into your account."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[(
            "repo_full_name",
            "string",
            "Full name of the repository to fork (e.g. 'owner/repo-name')",
            true,
        )])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let full_name = input.required_str("repo_full_name")?;

        let repo = match load_repo(gh, full_name).await {
            Ok(repo) => repo,
            Err(result) => return Ok(result),
        };

        match gh.fork_repo(&repo.full_name).await {
            Ok(fork) => Ok(ToolResult::success(format!(
                "Repository '{}' successfully forked as '{}'.",
                repo.full_name, fork.full_name
            ))),
            Err(e) => Ok(ToolResult::error(format!("Error forking repository: {}", e))),
        }
    }
}

/// Stars, forks, watchers and language of a repository
pub struct GetRepoStatsTool;

#[async_trait]
impl Tool<GitHubClient> for GetRepoStatsTool {
    fn name(&self) -> &str {
        "get_repo_stats"
    }

    fn description(&self) -> &str {
        "Get stats (stars, forks, watchers) of a repository."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[("repo_full_name", "string", REPO_FULL_NAME_DESC, true)])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let full_name = input.required_str("repo_full_name")?;

        let repo = match load_repo(gh, full_name).await {
            Ok(repo) => repo,
            Err(result) => return Ok(result),
        };

        Ok(ToolResult::success(format!(
            "Stats for '{}':\n  - Stars: {}\n  - Forks: {}\n  - Watchers: {}\n  - Language: {}",
            repo.full_name,
            repo.stargazers_count,
            repo.forks_count,
            repo.subscribers_count.unwrap_or(0),
            repo.language.as_deref().unwrap_or("n/a")
        )))
    }
}
