//! Account information

use async_trait::async_trait;
use gh_core::{Result, SchemaBuilder, Tool, ToolArgs, ToolResult};
use serde_json::Value;

use crate::client::GitHubClient;

/// Profile of the authenticated user
pub struct GetUserInfoTool;

#[async_trait]
impl Tool<GitHubClient> for GetUserInfoTool {
    fn name(&self) -> &str {
        "get_user_info"
    }

    fn description(&self) -> &str {
        "Get authenticated user's GitHub information."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::empty()
    }

    async fn execute(&self, gh: &GitHubClient, _input: Value) -> Result<ToolResult> {
        let user = match gh.authenticated_user().await {
            Ok(user) => user,
            Err(e) => return Ok(ToolResult::error(format!("Error fetching user info: {}", e))),
        };

        Ok(ToolResult::success(user.summary()))
    }
}

/// Public profile of any account
pub struct GetAnyUserInfoTool;

#[async_trait]
impl Tool<GitHubClient> for GetAnyUserInfoTool {
    fn name(&self) -> &str {
        "get_any_user_info"
    }

    fn description(&self) -> &str {
        "Get public information of any GitHub user."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::object(&[(
            "username",
            "string",
            "GitHub username of the user.",
            true,
        )])
    }

    async fn execute(&self, gh: &GitHubClient, input: Value) -> Result<ToolResult> {
        let username = input.required_str("username")?;

        match gh.user_by_login(username).await {
            Ok(user) => Ok(ToolResult::success(format!(
                "User: {} ({})\nBio: {}\nPublic Repos: {}\nFollowers: {}",
                user.login,
                user.display_name(),
                user.bio.as_deref().unwrap_or("-"),
                user.public_repos,
                user.followers
            ))),
            Err(e) if e.is_not_found() => Ok(ToolResult::error(format!(
                "Error: User '{}' not found.",
                username
            ))),
            Err(e) => Ok(ToolResult::error(format!("Error fetching user info: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::test_support::connected_client;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_user_info() {
        let server = MockServer::start().await;
        let gh = connected_client(&server).await;

        let result = GetUserInfoTool.execute(&gh, json!({})).await.unwrap();
        assert!(!result.is_error);
        assert_eq!(
            result.output,
            "Logged in user: octocat (The Octocat)\nPublic Repos: 8\nPrivate Repos (Owned): 2\nFollowers: 20"
        );
    }

    #[tokio::test]
    async fn test_get_any_user_info() {
        let server = MockServer::start().await;
        let gh = connected_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/users/torvalds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "login": "torvalds",
                "name": "Linus Torvalds",
                "bio": null,
                "public_repos": 7,
                "followers": 200000
            })))
            .mount(&server)
            .await;

        let result = GetAnyUserInfoTool
            .execute(&gh, json!({"username": "torvalds"}))
            .await
            .unwrap();
        assert_eq!(
            result.output,
            "User: torvalds (Linus Torvalds)\nBio: -\nPublic Repos: 7\nFollowers: 200000"
        );
    }

    #[tokio::test]
    async fn test_get_any_user_info_not_found() {
        let server = MockServer::start().await;
        let gh = connected_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/users/ghost-404"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .mount(&server)
            .await;

        let result = GetAnyUserInfoTool
            .execute(&gh, json!({"username": "ghost-404"}))
            .await
            .unwrap();
        assert!(result.is_error);
        assert_eq!(result.output, "Error: User 'ghost-404' not found.");
    }

    #[tokio::test]
    async fn test_get_any_user_info_requires_username() {
        let server = MockServer::start().await;
        let gh = connected_client(&server).await;

        let err = GetAnyUserInfoTool.execute(&gh, json!({})).await.unwrap_err();
        assert!(err.to_string().contains("username"));
    }
}
