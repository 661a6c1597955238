//! HTTP Server
//!
//! Builds the shared state and serves the axum router.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use gh_core::{Config, LlmClient, ToolManager};
use gh_github::{GitHubClient, register_default_tools};

use crate::oauth::GitHubOAuth;
use crate::routes::routes;
use crate::store::TokenStore;

/// System instruction sent with every intent-parsing request
pub const SYSTEM_PROMPT: &str = "You map a user's request about GitHub to exactly one of the \
available functions. Repositories are named 'owner/repo'. Do not answer in prose when a \
function fits.";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// `None` when no LLM API key is configured; `/chat` then answers 500
    pub llm: Option<Arc<LlmClient>>,
    pub tools: Arc<ToolManager<GitHubClient>>,
    pub store: TokenStore,
    /// `None` when no OAuth client id is configured
    pub oauth: Option<GitHubOAuth>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let llm = if config.llm.is_configured() {
            match LlmClient::new(&config.llm) {
                Ok(client) => Some(Arc::new(client.with_system_prompt(SYSTEM_PROMPT))),
                Err(e) => {
                    error!("Error initializing LLM client: {}", e);
                    None
                }
            }
        } else {
            warn!("LLM API key not set; /chat will report a configuration error");
            None
        };

        let oauth = GitHubOAuth::from_config(&config.github);
        if oauth.is_none() {
            warn!("GITHUB_CLIENT_ID not set; /login is disabled");
        }

        let mut tools = ToolManager::new();
        register_default_tools(&mut tools);

        let store = TokenStore::with_login_ttl_secs(config.server.login_ttl_secs);

        Self {
            config: Arc::new(config),
            llm,
            tools: Arc::new(tools),
            store,
            oauth,
        }
    }

    /// The requested user id, or the configured default
    pub fn user_id(&self, requested: Option<String>) -> String {
        requested
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| self.config.server.default_user_id.clone())
    }
}

/// The application router with tracing and CORS layers
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn start_server(
    config: Config,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = config.server.bind_addr();
    let state = AppState::new(config);

    info!(
        "Registered {} GitHub operations, LLM {}",
        state.tools.len(),
        state
            .llm
            .as_ref()
            .map(|l| l.model().to_string())
            .unwrap_or_else(|| "disabled".to_string())
    );

    info!(
        "Pending logins expire after {}s",
        state.store.login_ttl().num_seconds()
    );

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP server stopped");
    Ok(())
}
