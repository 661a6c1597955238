//! GitHub REST API client
//!
//! Thin wrapper over the v3 REST API authenticated with a user's OAuth
//! token. Every method maps to exactly one endpoint (or one paginated
//! listing); interpretation of the results happens in the operations.

use base64::Engine;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{GitHubError, Result};
use crate::models::*;

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = "gh-agent";
const PER_PAGE: usize = 100;
const MAX_PAGES: usize = 10;
const SEARCH_LIMIT: &str = "10";

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Client bound to one authenticated GitHub account
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: Url,
    token: String,
    user: User,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url.as_str())
            .field("login", &self.user.login)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Build a client for `token` and validate it against `GET /user`.
    ///
    /// Any rejection from GitHub is reported as [`GitHubError::InvalidToken`];
    /// transport failures are passed through unchanged.
    pub async fn connect(token: &str, api_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(GitHubError::Http)?;

        let base_url = Url::parse(api_url.trim_end_matches('/'))
            .map_err(|e| GitHubError::Url(format!("{}: {}", api_url, e)))?;

        let mut this = Self {
            client,
            base_url,
            token: token.to_string(),
            user: User::default(),
        };

        this.user = this.authenticated_user().await.map_err(|e| match e.status() {
            Some(status) => GitHubError::InvalidToken(status),
            None => e,
        })?;

        info!("GitHub token accepted for {}", this.user.login);
        Ok(this)
    }

    /// The account the token belongs to, as fetched by [`connect`](Self::connect)
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn login(&self) -> &str {
        &self.user.login
    }

    // ---- request plumbing ----

    /// Resolve `path` below the API root, percent-encoding each segment
    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| GitHubError::Url(self.base_url.to_string()))?;
            segments.pop_if_empty();
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        debug!("GitHub {} {}", method, url);

        Ok(self
            .client
            .request(method, url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(GitHubError::Http)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&error_text)
            .map(|b| b.message)
            .unwrap_or(error_text);

        warn!("GitHub API error: {} - {}", status, message);

        if status == StatusCode::NOT_FOUND {
            Err(GitHubError::NotFound(message))
        } else {
            Err(GitHubError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.text().await.map_err(GitHubError::Http)?;
        serde_json::from_str(&body).map_err(|e| GitHubError::Parse(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self
            .execute(self.request(Method::GET, path)?.query(query))
            .await?;
        Self::parse(response).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let response = self.execute(self.request(method, path)?.json(body)).await?;
        Self::parse(response).await
    }

    /// For endpoints answering 204 No Content
    async fn send_empty(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<()> {
        let mut request = self.request(method, path)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request).await?;
        Ok(())
    }

    /// Follow `page=` until a short page or the page cap is reached
    async fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let per_page = PER_PAGE.to_string();
        let mut all = Vec::new();

        for page in 1..=MAX_PAGES {
            let page = page.to_string();
            let request = self
                .request(Method::GET, path)?
                .query(query)
                .query(&[("per_page", per_page.as_str()), ("page", page.as_str())]);

            let items: Vec<T> = Self::parse(self.execute(request).await?).await?;
            let count = items.len();
            all.extend(items);

            if count < PER_PAGE {
                break;
            }
        }

        Ok(all)
    }

    // ---- users ----

    pub async fn authenticated_user(&self) -> Result<User> {
        self.get_json("user", &[]).await
    }

    pub async fn user_by_login(&self, login: &str) -> Result<User> {
        self.get_json(&format!("users/{}", login), &[]).await
    }

    // ---- repositories ----

    /// Repositories owned by the authenticated user.
    /// `visibility` is `all`, `public` or `private`.
    pub async fn list_own_repos(&self, visibility: &str) -> Result<Vec<Repository>> {
        self.get_paginated(
            "user/repos",
            &[("affiliation", "owner"), ("visibility", visibility)],
        )
        .await
    }

    pub async fn create_repo(
        &self,
        name: &str,
        description: Option<&str>,
        private: bool,
    ) -> Result<Repository> {
        let body = json!({
            "name": name,
            "description": description.unwrap_or(""),
            "private": private,
        });
        let repo: Repository = self.send_json(Method::POST, "user/repos", &body).await?;
        info!("Created repository {}", repo.full_name);
        Ok(repo)
    }

    pub async fn repo(&self, full_name: &str) -> Result<Repository> {
        self.get_json(&format!("repos/{}", full_name), &[]).await
    }

    pub async fn delete_repo(&self, full_name: &str) -> Result<()> {
        self.send_empty(Method::DELETE, &format!("repos/{}", full_name), None)
            .await?;
        info!("Deleted repository {}", full_name);
        Ok(())
    }

    /// Fork into the authenticated account. GitHub creates forks
    /// asynchronously, the returned repository may still be empty.
    pub async fn fork_repo(&self, full_name: &str) -> Result<Repository> {
        self.send_json(
            Method::POST,
            &format!("repos/{}/forks", full_name),
            &json!({}),
        )
        .await
    }

    // ---- contents ----

    /// File or directory listing at `path` (empty for the root)
    pub async fn contents(&self, full_name: &str, path: &str) -> Result<Contents> {
        self.get_json(&format!("repos/{}/contents/{}", full_name, path), &[])
            .await
    }

    /// Create (`sha` = None) or update a file with UTF-8 `content`
    pub async fn put_file(
        &self,
        full_name: &str,
        path: &str,
        message: &str,
        content: &str,
        sha: Option<&str>,
    ) -> Result<FileCommit> {
        let mut body = json!({
            "message": message,
            "content": base64::engine::general_purpose::STANDARD.encode(content),
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }

        self.send_json(
            Method::PUT,
            &format!("repos/{}/contents/{}", full_name, path),
            &body,
        )
        .await
    }

    pub async fn delete_file(
        &self,
        full_name: &str,
        path: &str,
        message: &str,
        sha: &str,
    ) -> Result<()> {
        let body = json!({"message": message, "sha": sha});
        let _: serde_json::Value = self
            .send_json(
                Method::DELETE,
                &format!("repos/{}/contents/{}", full_name, path),
                &body,
            )
            .await?;
        Ok(())
    }

    // ---- collaborators ----

    pub async fn collaborators(&self, full_name: &str) -> Result<Vec<SimpleUser>> {
        self.get_paginated(&format!("repos/{}/collaborators", full_name), &[])
            .await
    }

    /// Sends an invitation; GitHub answers 201 for a new invitation and 204
    /// when the user already has access.
    pub async fn add_collaborator(
        &self,
        full_name: &str,
        username: &str,
        permission: &str,
    ) -> Result<()> {
        let body = json!({"permission": permission});
        self.send_empty(
            Method::PUT,
            &format!("repos/{}/collaborators/{}", full_name, username),
            Some(&body),
        )
        .await
    }

    pub async fn remove_collaborator(&self, full_name: &str, username: &str) -> Result<()> {
        self.send_empty(
            Method::DELETE,
            &format!("repos/{}/collaborators/{}", full_name, username),
            None,
        )
        .await
    }

    // ---- issues ----

    pub async fn create_issue(
        &self,
        full_name: &str,
        title: &str,
        body: Option<&str>,
        assignee: Option<&str>,
    ) -> Result<Issue> {
        let mut payload = json!({"title": title, "body": body.unwrap_or("")});
        if let Some(assignee) = assignee {
            payload["assignees"] = json!([assignee]);
        }

        self.send_json(
            Method::POST,
            &format!("repos/{}/issues", full_name),
            &payload,
        )
        .await
    }

    /// Issues in `state` (`open`, `closed` or `all`). The listing includes
    /// pull requests; see [`Issue::pull_request`].
    pub async fn issues(&self, full_name: &str, state: &str) -> Result<Vec<Issue>> {
        self.get_paginated(&format!("repos/{}/issues", full_name), &[("state", state)])
            .await
    }

    pub async fn issue(&self, full_name: &str, number: u64) -> Result<Issue> {
        self.get_json(&format!("repos/{}/issues/{}", full_name, number), &[])
            .await
    }

    pub async fn close_issue(&self, full_name: &str, number: u64) -> Result<Issue> {
        self.send_json(
            Method::PATCH,
            &format!("repos/{}/issues/{}", full_name, number),
            &json!({"state": "closed"}),
        )
        .await
    }

    // ---- branches ----

    pub async fn branches(&self, full_name: &str) -> Result<Vec<Branch>> {
        self.get_paginated(&format!("repos/{}/branches", full_name), &[])
            .await
    }

    pub async fn branch(&self, full_name: &str, branch: &str) -> Result<Branch> {
        self.get_json(&format!("repos/{}/branches/{}", full_name, branch), &[])
            .await
    }

    /// Create a git reference such as `refs/heads/<name>` pointing at `sha`
    pub async fn create_ref(&self, full_name: &str, ref_name: &str, sha: &str) -> Result<GitRef> {
        self.send_json(
            Method::POST,
            &format!("repos/{}/git/refs", full_name),
            &json!({"ref": ref_name, "sha": sha}),
        )
        .await
    }

    // ---- search ----

    pub async fn search_repos(&self, query: &str) -> Result<SearchResults<Repository>> {
        self.get_json(
            "search/repositories",
            &[("q", query), ("per_page", SEARCH_LIMIT)],
        )
        .await
    }

    pub async fn search_users(&self, query: &str) -> Result<SearchResults<SimpleUser>> {
        self.get_json("search/users", &[("q", query), ("per_page", SEARCH_LIMIT)])
            .await
    }
}
