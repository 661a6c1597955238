//! Branch operations

use async_trait::async_trait;
use gh_core::{Result, SchemaBuilder, Tool, ToolArgs, ToolResult};
use serde_json::Value;

use super::{REPO_FULL_NAME_DESC, listing, load_repo};
use crate::client::GitHubClient;

pub struct ListBranchesTool;

#[async_trait]
impl Tool<GitHubClient> for ListBranchesTool {
    fn name(&self) -> &str {
        "list_branches"
    }

    fn description(&self) -> &str {
        "List all branches of a repository."
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

        match gh.branches(&repo.full_name).await {
            Ok(branches) if branches.is_empty() => Ok(ToolResult::success(format!(
                "No branches found in '{}'.",
                repo.full_name
            ))),
            Ok(branches) => Ok(ToolResult::success(listing(
                format!("Branches in '{}':", repo.full_name),
                branches.iter().map(|b| b.name.as_str()),
            ))),
            Err(e) => Ok(ToolResult::error(format!("Error listing branches: {}", e))),
        }
    }
}

/// Creates `refs/heads/<branch_name>` at the head of the source branch
pub struct CreateBranchTool;

#[async_trait]
impl Tool<GitHubClient> for CreateBranchTool {
    fn name(&self) -> &str {
        "create_branch"
    }

    fn description(&self) -> &str {
        "Create a new branch in a repository."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[
            ("repo_full_name", "string", REPO_FULL_NAME_DESC, true),
            ("branch_name", "string", "Name of the new branch.", true),
            (
                "source_branch",
                "string",
                "Name of the source branch (e.g. 'main').",
                true,
            ),
        ])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let full_name = input.required_str("repo_full_name")?;
        let branch_name = input.required_str("branch_name")?;
        let source_branch = input.optional_str("source_branch").unwrap_or("main");

        let repo = match load_repo(gh, full_name).await {
            Ok(repo) => repo,
            Err(result) => return Ok(result),
        };

        let source = match gh.branch(&repo.full_name, source_branch).await {
            Ok(branch) => branch,
            Err(e) if e.is_not_found() => {
                return Ok(ToolResult::error(format!(
                    "Error: Source branch '{}' not found in '{}'.",
                    source_branch, repo.full_name
                )));
            }
            Err(e) => return Ok(ToolResult::error(format!("Error creating branch: {}", e))),
        };

        let ref_name = format!("refs/heads/{}", branch_name);
        match gh
            .create_ref(&repo.full_name, &ref_name, &source.commit.sha)
            .await
        {
            Ok(_) => Ok(ToolResult::success(format!(
                "Branch '{}' created successfully from '{}'.",
                branch_name, source_branch
            ))),
            Err(e) if e.is_unprocessable() => Ok(ToolResult::error(format!(
                "Error: Branch '{}' might already exist.",
                branch_name
            ))),
            Err(e) => Ok(ToolResult::error(format!("Error creating branch: {}", e))),
        }
    }
}
