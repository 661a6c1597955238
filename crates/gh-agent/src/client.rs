//! HTTP client for the gh-agent server

use std::time::Duration;

use gh_core::ClientConfig;
use gh_server::CheckAuthResponse;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::error::{ClientError, Result};

/// Talks to `/check_auth`, `/chat` and `/logout` on behalf of one user id
pub struct ServerClient {
    http: reqwest::Client,
    base_url: Url,
    user_id: String,
}

impl ServerClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        // LLM + GitHub round trips can take a while
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        let base_url = Url::parse(&config.server_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.server_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.server_url.clone()));
        }

        Ok(Self {
            http,
            base_url,
            user_id: config.user_id.clone(),
        })
    }

    fn endpoint(&self, name: &str) -> Url {
        let mut url = self.base_url.clone();
        // cannot-be-a-base URLs are rejected in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        url
    }

    /// Browser URL that starts the OAuth flow
    pub fn login_url(&self) -> String {
        let mut url = self.endpoint("login");
        url.query_pairs_mut().append_pair("user_id", &self.user_id);
        url.into()
    }

    pub async fn check_auth(&self) -> Result<CheckAuthResponse> {
        let response = self
            .http
            .get(self.endpoint("check_auth"))
            .query(&[("user_id", &self.user_id)])
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Send one prompt and return the bot's answer
    pub async fn chat(&self, prompt: &str) -> Result<String> {
        debug!("POST /chat ({} chars)", prompt.len());

        let response = self
            .http
            .post(self.endpoint("chat"))
            .json(&json!({"user_id": self.user_id, "prompt": prompt}))
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(Self::response_text(response).await)
    }

    pub async fn logout(&self) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint("logout"))
            .json(&json!({"user_id": self.user_id}))
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(Self::response_text(response).await)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::NotLoggedIn);
        }

        // prefer the server's {"response": ...} over the raw body
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("response").and_then(Value::as_str).map(String::from))
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("unknown error").to_string()
                } else {
                    body
                }
            });

        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }

    async fn response_text(response: reqwest::Response) -> String {
        response
            .json::<Value>()
            .await
            .ok()
            .and_then(|v| v.get("response").and_then(Value::as_str).map(String::from))
            .unwrap_or_else(|| "No response received.".to_string())
    }
}
