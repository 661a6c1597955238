//! GitHub OAuth app flow (authorization code)
//!
//! Quirks:
//! - Scopes are comma-separated in the authorize URL.
//! - The token endpoint answers JSON only with `Accept: application/json`.
//! - A bad or reused code still returns 200, with an `error` field.
//! - OAuth app tokens do not expire, so there is no refresh.

use gh_core::GitHubConfig;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{Result, ServerError};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Clone)]
pub struct GitHubOAuth {
    client_id: String,
    client_secret: String,
    redirect_uri: Option<String>,
    scope: String,
    oauth_url: String,
    http: reqwest::Client,
}

impl GitHubOAuth {
    /// `None` when no client id is configured
    pub fn from_config(config: &GitHubConfig) -> Option<Self> {
        let client_id = config.client_id.clone()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Some(Self {
            client_id,
            client_secret: config.client_secret.clone().unwrap_or_default(),
            redirect_uri: config.redirect_uri.clone(),
            scope: config.scope_param(),
            oauth_url: config.oauth_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Browser URL of the consent page for `state`
    pub fn authorize_url(&self, state: &str) -> Result<String> {
        let mut url = Url::parse(&format!("{}/login/oauth/authorize", self.oauth_url))
            .map_err(|e| ServerError::NotConfigured(format!("Invalid GitHub OAuth URL: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.client_id)
                .append_pair("scope", &self.scope)
                .append_pair("state", state);
            if let Some(redirect_uri) = &self.redirect_uri {
                query.append_pair("redirect_uri", redirect_uri);
            }
        }

        Ok(url.into())
    }

    /// Trade an authorization code for an access token
    pub async fn exchange_code(&self, code: &str) -> Result<String> {
        let url = format!("{}/login/oauth/access_token", self.oauth_url);

        let mut form = vec![
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
        ];
        if let Some(redirect_uri) = &self.redirect_uri {
            form.push(("redirect_uri", redirect_uri.as_str()));
        }

        debug!("Exchanging OAuth code at {}", url);

        let resp = self
            .http
            .post(&url)
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| ServerError::TokenExchange(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ServerError::TokenExchange(format!("{status}: {body}")));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ServerError::TokenExchange(format!("failed to parse token response: {e}")))?;

        match token.access_token.filter(|t| !t.is_empty()) {
            Some(access_token) => Ok(access_token),
            None => Err(ServerError::TokenExchange(
                token
                    .error_description
                    .or(token.error)
                    .unwrap_or_else(|| "no access_token in response".to_string()),
            )),
        }
    }
}
