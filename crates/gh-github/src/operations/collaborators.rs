//! Collaborator management

use async_trait::async_trait;
use gh_core::{Result, SchemaBuilder, Tool, ToolArgs, ToolResult};
use serde_json::Value;

use super::{listing, load_repo};
use crate::client::GitHubClient;

const PERMISSIONS: &[&str] = &["pull", "triage", "push", "maintain", "admin"];

pub struct ListCollaboratorsTool;

#[async_trait]
impl Tool<GitHubClient> for ListCollaboratorsTool {
    fn name(&self) -> &str {
        "list_collaborators"
    }

    fn description(&self) -> &str {
        "List all collaborators of a repository."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[(
            "repo_full_name",
            "string",
            "Full name of the repository",
            true,
        )])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let full_name = input.required_str("repo_full_name")?;

        let repo = match load_repo(gh, full_name).await {
            Ok(repo) => repo,
            Err(result) => return Ok(result),
        };

        // requires push access; GitHub answers 403 otherwise
        let collaborators = match gh.collaborators(&repo.full_name).await {
            Ok(list) => list,
            Err(e) => {
                return Ok(ToolResult::error(format!(
                    "Error listing collaborators: {}",
                    e
                )));
            }
        };

        if collaborators.is_empty() {
            return Ok(ToolResult::success(format!(
                "No collaborators found in '{}'.",
                repo.full_name
            )));
        }

        Ok(ToolResult::success(listing(
            format!("Collaborators in '{}':", repo.full_name),
            collaborators.iter().map(|c| c.login.as_str()),
        )))
    }
}

/// Invites a user to a repository
pub struct AddCollaboratorTool;

#[async_trait]
impl Tool<GitHubClient> for AddCollaboratorTool {
    fn name(&self) -> &str {
        "add_collaborator"
    }

    fn description(&self) -> &str {
        "Add a collaborator to a repository."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[
            ("repo_full_name", "string", "Full name of the repository", true),
            ("username", "string", "Username of the collaborator", true),
            (
                "permission",
                "string",
                "Permission level ('pull', 'push', 'admin')",
                false,
            ),
        ])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let full_name = input.required_str("repo_full_name")?;
        let username = input.required_str("username")?;
        let permission = input
            .optional_str("permission")
            .map(str::to_lowercase)
            .unwrap_or_else(|| "push".to_string());

        if !PERMISSIONS.contains(&permission.as_str()) {
            return Ok(ToolResult::error(format!(
                "Error: Unknown permission '{}'. Use one of: {}.",
                permission,
                PERMISSIONS.join(", ")
            )));
        }

        let repo = match load_repo(gh, full_name).await {
            Ok(repo) => repo,
            Err(result) => return Ok(result),
        };

        match gh
            .add_collaborator(&repo.full_name, username, &permission)
            .await
        {
            Ok(()) => Ok(ToolResult::success(format!(
                "Invitation sent to user '{}' as collaborator in '{}'.",
                username, repo.full_name
            ))),
            Err(e) => Ok(ToolResult::error(format!("Error adding collaborator: {}", e))),
        }
    }
}

pub struct RemoveCollaboratorTool;

#[async_trait]
impl Tool<GitHubClient> for RemoveCollaboratorTool {
    fn name(&self) -> &str {
        "remove_collaborator"
    }

    fn description(&self) -> &str {
        "Remove a collaborator from a repository."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[
            ("repo_full_name", "string", "Full name of the repository", true),
            ("username", "string", "Username of the collaborator to remove", true),
        ])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let full_name = input.required_str("repo_full_name")?;
        let username = input.required_str("username")?;

        let repo = match load_repo(gh, full_name).await {
            Ok(repo) => repo,
            Err(result) => return Ok(result),
        };

        match gh.remove_collaborator(&repo.full_name, username).await {
            Ok(()) => Ok(ToolResult::success(format!(
                "User '{}' removed as collaborator from '{}'.",
                username, repo.full_name
            ))),
            Err(e) => Ok(ToolResult::error(format!(
                "Error removing collaborator: {}",
                e
            ))),
        }
    }
}
