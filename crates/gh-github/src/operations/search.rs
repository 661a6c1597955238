//! Search across GitHub (top 10 hits)

use async_trait::async_trait;
use gh_core::{Result, SchemaBuilder, Tool, ToolArgs, ToolResult};
use serde_json::Value;

use super::listing;
use crate::client::GitHubClient;

const MAX_RESULTS: usize = 10;

fn query_schema() -> Value {
    SchemaBuilder::object(&[(
        "query",
        "string",
        "Query or keyword to search for.",
        true,
    )])
}

pub struct SearchReposTool;

#[async_trait]
impl Tool<GitHubClient> for SearchReposTool {
    fn name(&self) -> &str {
        "search_repos"
    }

    fn description(&self) -> &str {
        "Search for repositories on GitHub by keyword."
    }

    fn input_schema(&self) -> Value {
        query_schema()
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let query = input.required_str("query")?;

        let results = match gh.search_repos(query).await {
            Ok(results) => results,
            Err(e) => {
                return Ok(ToolResult::error(format!(
                    "Error searching repositories: {}",
                    e
                )));
            }
        };

        if results.items.is_empty() {
            return Ok(ToolResult::success(format!(
                "No repositories found for '{}'.",
                query
            )));
        }

        Ok(ToolResult::success(listing(
            format!("Search results for '{}':", query),
            results
                .items
                .iter()
                .take(MAX_RESULTS)
                .map(|r| r.full_name.as_str()),
        )))
    }
}

pub struct SearchUsersTool;

#[async_trait]
impl Tool<GitHubClient> for SearchUsersTool {
    fn name(&self) -> &str {
        "search_users"
    }

    fn description(&self) -> &str {
        "Search for users on GitHub by keyword."
    }

    fn input_schema(&self) -> Value {
        query_schema()
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let query = input.required_str("query")?;

        let results = match gh.search_users(query).await {
            Ok(results) => results,
            Err(e) => return Ok(ToolResult::error(format!("Error searching users: {}", e))),
        };

        if results.items.is_empty() {
            return Ok(ToolResult::success(format!("No users found for '{}'.", query)));
        }

        Ok(ToolResult::success(listing(
            format!("Search results for '{}':", query),
            results
                .items
                .iter()
                .take(MAX_RESULTS)
                .map(|u| u.login.as_str()),
        )))
    }
}
