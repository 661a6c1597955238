//! Issue operations

use async_trait::async_trait;
use gh_core::{Result, SchemaBuilder, Tool, ToolArgs, ToolResult};
use serde_json::Value;

use super::{REPO_FULL_NAME_DESC, listing, load_repo};
use crate::client::GitHubClient;

const STATES: &[&str] = &["open", "closed", "all"];

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub struct CreateIssueTool;

#[async_trait]
impl Tool<GitHubClient> for CreateIssueTool {
    fn name(&self) -> &str {
        "create_issue"
    }

    fn description(&self) -> &str {
        "Create a new issue in a repository."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[
            ("repo_full_name", "string", REPO_FULL_NAME_DESC, true),
            ("title", "string", "Title of the issue.", true),
            ("body", "string", "Optional description of the issue.", false),
            (
                "assignee",
                "string",
                "Username to assign the issue to (optional).",
                false,
            ),
        ])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let full_name = input.required_str("repo_full_name")?;
        let title = input.required_str("title")?;
        let body = input.optional_str("body");
        let assignee = input.optional_str("assignee");

        let repo = match load_repo(gh, full_name).await {
            Ok(repo) => repo,
            Err(result) => return Ok(result),
        };

        match gh.create_issue(&repo.full_name, title, body, assignee).await {
            Ok(issue) => Ok(ToolResult::success(format!(
                "Issue #{} ('{}') created successfully.",
                issue.number, title
            ))),
            Err(e) => Ok(ToolResult::error(format!("Error creating issue: {}", e))),
        }
    }
}

/// Lists issues, leaving out pull requests
pub struct ListIssuesTool;

#[async_trait]
impl Tool<GitHubClient> for ListIssuesTool {
    fn name(&self) -> &str {
        "list_issues"
    }

    fn description(&self) -> &str {
        "List issues of a repository."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[
            ("repo_full_name", "string", REPO_FULL_NAME_DESC, true),
            (
                "state",
                "string",
                "State of the issue ('open', 'closed', 'all').",
                false,
            ),
        ])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let full_name = input.required_str("repo_full_name")?;
        let state = input
            .optional_str("state")
            .map(str::to_lowercase)
            .unwrap_or_else(|| "open".to_string());

        if !STATES.contains(&state.as_str()) {
            return Ok(ToolResult::error(format!(
                "Error: Unknown state '{}'. Use 'open', 'closed' or 'all'.",
                state
            )));
        }

        let repo = match load_repo(gh, full_name).await {
            Ok(repo) => repo,
            Err(result) => return Ok(result),
        };

        let issues = match gh.issues(&repo.full_name, &state).await {
            Ok(issues) => issues,
            Err(e) => return Ok(ToolResult::error(format!("Error listing issues: {}", e))),
        };

        let lines: Vec<String> = issues
            .iter()
            .filter(|i| i.pull_request.is_none())
            .map(|i| format!("#{}: {}", i.number, i.title))
            .collect();

        if lines.is_empty() {
            return Ok(ToolResult::success(format!(
                "No '{}' issues found in '{}'.",
                state, repo.full_name
            )));
        }

        Ok(ToolResult::success(listing(
            format!("{} issues in '{}':", capitalize(&state), repo.full_name),
            lines,
        )))
    }
}

pub struct CloseIssueTool;

#[async_trait]
impl Tool<GitHubClient> for CloseIssueTool {
    fn name(&self) -> &str {
        "close_issue"
    }

    fn description(&self) -> &str {
        "Close an issue."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[
            ("repo_full_name", "string", REPO_FULL_NAME_DESC, true),
            ("issue_number", "integer", "Number of the issue to close.", true),
        ])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let full_name = input.required_str("repo_full_name")?;
        let number = input.required_u64("issue_number")?;

        let repo = match load_repo(gh, full_name).await {
            Ok(repo) => repo,
            Err(result) => return Ok(result),
        };

        if let Err(e) = gh.issue(&repo.full_name, number).await {
            if e.is_not_found() {
                return Ok(ToolResult::error(format!("Error: Issue #{} not found.", number)));
            }
            return Ok(ToolResult::error(format!("Error closing issue: {}", e)));
        }

        match gh.close_issue(&repo.full_name, number).await {
            Ok(_) => Ok(ToolResult::success(format!(
                "Issue #{} closed successfully.",
                number
            ))),
            Err(e) => Ok(ToolResult::error(format!("Error closing issue: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::test_support::{connected_client, mount_repo};
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const REPO: &str = "octocat/demo";

    async fn setup() -> (MockServer, GitHubClient) {
        let server = MockServer::start().await;
        let gh = connected_client(&server).await;
        mount_repo(&server, REPO).await;
        (server, gh)
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("open"), "Open");
        assert_eq!(capitalize(""), "");
    }

    #[tokio::test]
    async fn test_create_issue_with_assignee() {
        let (server, gh) = setup().await;

        Mock::given(method("POST"))
            .and(path("/repos/octocat/demo/issues"))
            .and(body_partial_json(json!({
                "title": "Crash on start",
                "assignees": ["hubot"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "number": 12, "title": "Crash on start", "state": "open"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = CreateIssueTool
            .execute(
                &gh,
                json!({"repo_full_name": REPO, "title": "Crash on start", "assignee": "hubot"}),
            )
            .await
            .unwrap();
        assert_eq!(result.output, "Issue #12 ('Crash on start') created successfully.");
    }

    #[tokio::test]
    async fn test_list_issues_skips_pull_requests() {
        let (server, gh) = setup().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/demo/issues"))
            .and(query_param("state", "open"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"number": 3, "title": "Bug", "state": "open"},
                {"number": 4, "title": "Fix bug", "state": "open", "pull_request": {"url": "x"}},
                {"number": 5, "title": "Docs", "state": "open"}
            ])))
            .mount(&server)
            .await;

        let result = ListIssuesTool
            .execute(&gh, json!({"repo_full_name": REPO}))
            .await
            .unwrap();
        assert_eq!(result.output, "Open issues in 'octocat/demo':\n#3: Bug\n#5: Docs");
    }

    #[tokio::test]
    async fn test_list_issues_empty() {
        let (server, gh) = setup().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/demo/issues"))
            .and(query_param("state", "closed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let result = ListIssuesTool
            .execute(&gh, json!({"repo_full_name": REPO, "state": "closed"}))
            .await
            .unwrap();
        assert_eq!(result.output, "No 'closed' issues found in 'octocat/demo'.");
    }

    #[tokio::test]
    async fn test_close_issue() {
        let (server, gh) = setup().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/demo/issues/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "number": 7, "title": "Old", "state": "open"
            })))
            .mount(&server)
            .await;

        Mock::given(method("PATCH"))
            .and(path("/repos/octocat/demo/issues/7"))
            .and(body_json(json!({"state": "closed"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "number": 7, "title": "Old", "state": "closed"
            })))
            .expect(1)
            .mount(&server)
            .await;

        // models often send integers as floats
        let result = CloseIssueTool
            .execute(&gh, json!({"repo_full_name": REPO, "issue_number": 7.0}))
            .await
            .unwrap();
        assert_eq!(result.output, "Issue #7 closed successfully.");
    }

    #[tokio::test]
    async fn test_close_issue_not_found() {
        let (server, gh) = setup().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/demo/issues/99"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .mount(&server)
            .await;

        let result = CloseIssueTool
            .execute(&gh, json!({"repo_full_name": REPO, "issue_number": 99}))
            .await
            .unwrap();
        assert!(result.is_error);
        assert_eq!(result.output, "Error: Issue #99 not found.");
    }
}
