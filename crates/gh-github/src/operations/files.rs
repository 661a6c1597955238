//! File and content management

use async_trait::async_trait;
use gh_core::{Result, SchemaBuilder, Tool, ToolArgs, ToolResult};
use serde_json::Value;

use super::{REPO_FULL_NAME_DESC, listing, load_repo};
use crate::client::GitHubClient;
use crate::models::{ContentItem, Contents};

/// Look up the file at `file_path`, mapping a missing path or a folder
/// to the message shown to the user. `doing` names the action for
/// other failures ("updating", "deleting").
async fn existing_file(
    gh: &GitHubClient,
    full_name: &str,
    file_path: &str,
    doing: &str,
) -> std::result::Result<ContentItem, ToolResult> {
    match gh.contents(full_name, file_path).await {
        Ok(Contents::File(item)) => Ok(item),
        Ok(Contents::Dir(_)) => Err(ToolResult::error(format!(
            "Error: '{}' is a folder, not a file.",
            file_path
        ))),
        Err(e) if e.is_not_found() => Err(ToolResult::error(format!(
            "Error: File '{}' not found.",
            file_path
        ))),
        Err(e) => Err(ToolResult::error(format!("Error {} file: {}", doing, e))),
    }
}

pub struct ListFilesTool;

#[async_trait]
impl Tool<GitHubClient> for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List contents of a folder in a repository."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[
            ("repo_full_name", "string", REPO_FULL_NAME_DESC, true),
            (
                "path",
                "string",
                "Path of the file or folder to view. Leave empty for root.",
                false,
            ),
        ])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let full_name = input.required_str("repo_full_name")?;
        let path = input.optional_str("path").unwrap_or("").trim_matches('/');

        let repo = match load_repo(gh, full_name).await {
            Ok(repo) => repo,
            Err(result) => return Ok(result),
        };

        let items = match gh.contents(&repo.full_name, path).await {
            Ok(Contents::Dir(items)) => items,
            Ok(Contents::File(item)) => vec![item],
            Err(e) if e.is_not_found() => {
                return Ok(ToolResult::error(format!(
                    "Error: Path '{}' not found in '{}'.",
                    path, repo.full_name
                )));
            }
            Err(e) => return Ok(ToolResult::error(format!("Error listing files: {}", e))),
        };

        Ok(ToolResult::success(listing(
            format!("Contents of '{}/{}':", repo.full_name, path),
            items.iter().map(|item| format!("[{}] {}", item.kind, item.name)),
        )))
    }
}

pub struct GetFileContentTool;

#[async_trait]
impl Tool<GitHubClient> for GetFileContentTool {
    fn name(&self) -> &str {
        "get_file_content"
    }

    fn description(&self) -> &str {
        "Read the content of a file in a repository."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[
            ("repo_full_name", "string", REPO_FULL_NAME_DESC, true),
            ("file_path", "string", "Path of the file to read.", true),
        ])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let full_name = input.required_str("repo_full_name")?;
        let file_path = input.required_str("file_path")?;

        let repo = match load_repo(gh, full_name).await {
            Ok(repo) => repo,
            Err(result) => return Ok(result),
        };

        let item = match gh.contents(&repo.full_name, file_path).await {
            Ok(Contents::File(item)) if item.kind == "file" => item,
            Ok(_) => {
                return Ok(ToolResult::error(format!(
                    "Error: Is '{}' a folder? I can only read file content.",
                    file_path
                )));
            }
            Err(e) if e.is_not_found() => {
                return Ok(ToolResult::error(format!(
                    "Error: File '{}' not found.",
                    file_path
                )));
            }
            Err(e) => return Ok(ToolResult::error(format!("Error reading file: {}", e))),
        };

        match item.decoded_content() {
            Ok(text) => Ok(ToolResult::success(format!(
                "--- Content of '{}' ---\n{}",
                file_path, text
            ))),
            Err(e) => Ok(ToolResult::error(format!("Error reading file: {}", e))),
        }
    }
}

pub struct CreateFileTool;

#[async_trait]
impl Tool<GitHubClient> for CreateFileTool {
    fn name(&self) -> &str {
        "create_file"
    }

    fn description(&self) -> &str {
        "Create a new file in a repository."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[
            ("repo_full_name", "string", REPO_FULL_NAME_DESC, true),
            ("file_path", "string", "Path of the file to create.", true),
            ("commit_message", "string", "Commit message.", true),
            ("content", "string", "Content of the file.", true),
        ])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let full_name = input.required_str("repo_full_name")?;
        let file_path = input.required_str("file_path")?;
        let message = input.required_str("commit_message")?;
        // empty files are allowed, so the content is not trimmed
        let content = input.get("content").and_then(Value::as_str).ok_or_else(|| {
            gh_core::Error::ToolExecution("Missing 'content' parameter".to_string())
        })?;

        let repo = match load_repo(gh, full_name).await {
            Ok(repo) => repo,
            Err(result) => return Ok(result),
        };

        match gh
            .put_file(&repo.full_name, file_path, message, content, None)
            .await
        {
            Ok(_) => Ok(ToolResult::success(format!(
                "File '{}' created successfully in '{}'.",
                file_path, repo.full_name
            ))),
            Err(e) if e.is_unprocessable() => Ok(ToolResult::error(format!(
                "Error: File '{}' might already exist.",
                file_path
            ))),
            Err(e) => Ok(ToolResult::error(format!("Error creating file: {}", e))),
        }
    }
}

/// Replaces the content of an existing file
pub struct UpdateFileTool;

#[async_trait]
impl Tool<GitHubClient> for UpdateFileTool {
    fn name(&self) -> &str {
        "update_file"
    }

    fn description(&self) -> &str {
        "Update an existing file in a repository."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[
            ("repo_full_name", "string", REPO_FULL_NAME_DESC, true),
            ("file_path", "string", "Path of the file to update.", true),
            ("commit_message", "string", "Commit message.", true),
            ("content", "string", "New file content.", true),
        ])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let full_name = input.required_str("repo_full_name")?;
        let file_path = input.required_str("file_path")?;
        let message = input.required_str("commit_message")?;
        let content = input.get("content").and_then(Value::as_str).ok_or_else(|| {
            gh_core::Error::ToolExecution("Missing 'content' parameter".to_string())
        })?;

        let repo = match load_repo(gh, full_name).await {
            Ok(repo) => repo,
            Err(result) => return Ok(result),
        };

        let current = match existing_file(gh, &repo.full_name, file_path, "updating").await {
            Ok(item) => item,
            Err(result) => return Ok(result),
        };

        match gh
            .put_file(&repo.full_name, file_path, message, content, Some(&current.sha))
            .await
        {
            Ok(_) => Ok(ToolResult::success(format!(
                "File '{}' updated successfully in '{}'.",
                file_path, repo.full_name
            ))),
            Err(e) => Ok(ToolResult::error(format!("Error updating file: {}", e))),
        }
    }
}

pub struct DeleteFileTool;

#[async_trait]
impl Tool<GitHubClient> for DeleteFileTool {
    fn name(&self) -> &str {
        "delete_file"
    }

    fn description(&self) -> &str {
        "Delete a file from a repository."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[
            ("repo_full_name", "string", REPO_FULL_NAME_DESC, true),
            ("file_path", "string", "Path of the file to delete.", true),
            ("commit_message", "string", "Commit message.", true),
        ])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let full_name = input.required_str("repo_full_name")?;
        let file_path = input.required_str("file_path")?;
        let message = input.required_str("commit_message")?;

        let repo = match load_repo(gh, full_name).await {
            Ok(repo) => repo,
            Err(result) => return Ok(result),
        };

        let current = match existing_file(gh, &repo.full_name, file_path, "deleting").await {
            Ok(item) => item,
            Err(result) => return Ok(result),
        };

        match gh
            .delete_file(&repo.full_name, file_path, message, &current.sha)
            .await
        {
            Ok(()) => Ok(ToolResult::success(format!(
                "File '{}' deleted successfully.",
                file_path
            ))),
            Err(e) => Ok(ToolResult::error(format!("Error deleting file: {}", e))),
        }
    }
}
