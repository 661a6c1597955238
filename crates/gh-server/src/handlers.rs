//! HTTP handlers
//!
//! OAuth login/callback, session check and the chat relay.

use axum::{
    Json,
    extract::{Query, State},
    response::Redirect,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use gh_github::{GitHubClient, GitHubError};

use crate::error::{Result, ServerError};
use crate::server::AppState;

pub const HOME_TEXT: &str = "GitHub chatbot server is running. Use the client to authenticate.";
pub const AUTH_SUCCESS: &str =
    "Authentication successful! You can close this window and return to the client.";
pub const EMPTY_PROMPT: &str = "Please provide a message so I can understand.";
pub const NOT_LOGGED_IN: &str = "You are not logged in. Please log in first.";
pub const LLM_NOT_CONFIGURED: &str = "Gemini handler is not properly configured.";
pub const NO_ACTION: &str =
    "I couldn't understand which GitHub action to perform. Please clarify.";

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by GitHub when the user denies access
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CheckAuthResponse {
    pub logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: Option<String>,
    pub prompt: Option<String>,
}

/// Reply of `/chat` and `/logout`
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub user_id: Option<String>,
}

// ============================================================================
// OAuth
// ============================================================================

/// GET /
pub async fn home() -> &'static str {
    HOME_TEXT
}

/// GET /login?user_id= : redirect the browser to GitHub's consent page
pub async fn login(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> Result<Redirect> {
    let oauth = state
        .oauth
        .as_ref()
        .ok_or_else(|| ServerError::NotConfigured("GitHub OAuth is not configured.".into()))?;

    let user_id = state.user_id(q.user_id);
    let nonce = state.store.begin_login(&user_id);
    let url = oauth.authorize_url(&nonce)?;

    info!("Starting GitHub login for '{}'", user_id);
    Ok(Redirect::temporary(&url))
}

/// GET /callback?code&state : exchange the code and remember the token
pub async fn callback(
    State(state): State<AppState>,
    Query(q): Query<CallbackQuery>,
) -> Result<&'static str> {
    let oauth = state
        .oauth
        .as_ref()
        .ok_or_else(|| ServerError::NotConfigured("GitHub OAuth is not configured.".into()))?;

    let nonce = q
        .state
        .ok_or_else(|| ServerError::TokenExchange("missing state".into()))?;

    let user_id = state
        .store
        .complete_login(&nonce)
        .ok_or_else(|| ServerError::TokenExchange("unknown or expired state".into()))?;

    let code = q.code.filter(|c| !c.is_empty()).ok_or_else(|| {
        ServerError::TokenExchange(q.error.unwrap_or_else(|| "missing code".into()))
    })?;

    let token = oauth.exchange_code(&code).await?;
    state.store.insert_token(&user_id, token);

    info!("Token successfully obtained for user '{}'", user_id);
    Ok(AUTH_SUCCESS)
}

/// POST /logout : forget the stored token
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> Json<ChatResponse> {
    let user_id = state.user_id(req.user_id);

    let response = if state.store.remove_token(&user_id) {
        info!("User '{}' logged out", user_id);
        "Logged out successfully."
    } else {
        "You were not logged in."
    };

    Json(ChatResponse {
        response: response.to_string(),
    })
}

// ============================================================================
// API
// ============================================================================

/// GET /check_auth?user_id= : validate the stored token against GitHub
pub async fn check_auth(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> Json<CheckAuthResponse> {
    let user_id = state.user_id(q.user_id);

    let Some(token) = state.store.token(&user_id) else {
        return Json(CheckAuthResponse {
            logged_in: false,
            user: None,
            error: None,
        });
    };

    match GitHubClient::connect(&token, &state.config.github.api_url).await {
        Ok(gh) => Json(CheckAuthResponse {
            logged_in: true,
            user: Some(gh.user().summary()),
            error: None,
        }),
        Err(e) => {
            // only a rejected token is dropped; GitHub being unreachable is not
            // the token's fault
            if matches!(e, GitHubError::InvalidToken(_)) {
                warn!("Stored token for '{}' is no longer valid", user_id);
                state.store.remove_token(&user_id);
            }
            Json(CheckAuthResponse {
                logged_in: false,
                user: None,
                error: Some(format!("Invalid token: {}", e)),
            })
        }
    }
}

/// POST /chat : prompt → LLM function call → GitHub operation → text
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let prompt = req
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ServerError::BadRequest(EMPTY_PROMPT.into()))?;

    let user_id = state.user_id(req.user_id.clone());
    let token = state
        .store
        .token(&user_id)
        .ok_or_else(|| ServerError::Unauthorized(NOT_LOGGED_IN.into()))?;

    let llm = state
        .llm
        .as_ref()
        .ok_or_else(|| ServerError::NotConfigured(LLM_NOT_CONFIGURED.into()))?;

    debug!("Chat from '{}': {}", user_id, prompt);

    let Some(call) = llm
        .resolve_function_call(prompt, &state.tools.definitions())
        .await?
    else {
        return Ok(Json(ChatResponse {
            response: NO_ACTION.to_string(),
        }));
    };

    if !state.tools.contains(&call.name) {
        return Err(ServerError::BadRequest(format!(
            "Error: No action named '{}' found.",
            call.name
        )));
    }

    let gh = GitHubClient::connect(&token, &state.config.github.api_url).await?;
    let result = state.tools.execute(&gh, &call.name, call.args).await?;

    info!(
        "'{}' ran {} ({})",
        user_id,
        call.name,
        if result.is_error { "error" } else { "ok" }
    );

    Ok(Json(ChatResponse {
        response: result.output,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TOKEN_EXCHANGE_FAILED;
    use crate::server::router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use gh_core::Config;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GEMINI_PATH: &str = "/models/gemini-1.5-flash:generateContent";

    /// State whose GitHub, OAuth and LLM upstreams all point at `server`
    fn test_state(server: &MockServer, with_llm: bool) -> AppState {
        let mut config = Config::default();
        config.github.client_id = Some("cid".to_string());
        config.github.client_secret = Some("secret".to_string());
        config.github.api_url = server.uri();
        config.github.oauth_url = server.uri();
        if with_llm {
            config.llm.api_key = "test-key".to_string();
            config.llm.base_url = Some(server.uri());
        }
        AppState::new(config)
    }

    async fn mount_user(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "login": "octocat",
                "name": "The Octocat",
                "public_repos": 8,
                "owned_private_repos": 2,
                "followers": 20
            })))
            .mount(server)
            .await;
    }

    async fn mount_function_call(server: &MockServer, name: &str, args: Value) {
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"functionCall": {"name": name, "args": args}}]}
                }]
            })))
            .mount(server)
            .await;
    }

    async fn get(state: &AppState, uri: &str) -> axum::response::Response {
        router(state.clone())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_json(state: &AppState, uri: &str, body: Value) -> axum::response::Response {
        router(state.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        serde_json::from_str(&text(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_home() {
        let server = MockServer::start().await;
        let state = test_state(&server, false);

        let response = get(&state, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await, HOME_TEXT);
    }

    #[tokio::test]
    async fn test_login_redirects_to_github() {
        let server = MockServer::start().await;
        let state = test_state(&server, false);

        let response = get(&state, "/login?user_id=alice").await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

        let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
        assert!(location.starts_with(&format!("{}/login/oauth/authorize?", server.uri())));
        assert!(location.contains("client_id=cid"));
        assert!(location.contains("scope=repo%2Cdelete_repo%2Cuser"));
        assert!(location.contains("state="));
        assert_eq!(state.store.pending_logins(), 1);
    }

    #[tokio::test]
    async fn test_login_without_client_id() {
        let state = AppState::new(Config::default());

        let response = get(&state, "/login").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({"response": "GitHub OAuth is not configured."})
        );
    }

    #[tokio::test]
    async fn test_callback_stores_token_once() {
        let server = MockServer::start().await;
        let state = test_state(&server, false);

        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "gho_new", "token_type": "bearer", "scope": "repo"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let nonce = state.store.begin_login("main_user");
        let uri = format!("/callback?code=abc&state={}", nonce);

        let response = get(&state, &uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await, AUTH_SUCCESS);
        assert_eq!(state.store.token("main_user").as_deref(), Some("gho_new"));

        // a replayed state is refused before reaching GitHub
        let response = get(&state, &uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(text(response).await, TOKEN_EXCHANGE_FAILED);
    }

    #[tokio::test]
    async fn test_callback_with_out_of_range_login_ttl() {
        let server = MockServer::start().await;
        let mut config = Config::default();
        config.github.client_id = Some("cid".to_string());
        config.github.oauth_url = server.uri();
        config.server.login_ttl_secs = u64::MAX;
        let state = AppState::new(config);

        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access_token": "gho_ttl"})),
            )
            .mount(&server)
            .await;

        let nonce = state.store.begin_login("main_user");
        let response = get(&state, &format!("/callback?code=abc&state={}", nonce)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.store.token("main_user").as_deref(), Some("gho_ttl"));
    }

    #[tokio::test]
    async fn test_callback_rejects_unknown_state() {
        let server = MockServer::start().await;
        let state = test_state(&server, false);

        let response = get(&state, "/callback?code=abc&state=main_user").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(text(response).await, TOKEN_EXCHANGE_FAILED);
        assert!(!state.store.is_logged_in("main_user"));
    }

    #[tokio::test]
    async fn test_callback_denied_by_user() {
        let server = MockServer::start().await;
        let state = test_state(&server, false);
        let nonce = state.store.begin_login("main_user");

        let response = get(&state, &format!("/callback?error=access_denied&state={}", nonce)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.store.pending_logins(), 0);
    }

    #[tokio::test]
    async fn test_callback_without_access_token() {
        let server = MockServer::start().await;
        let state = test_state(&server, false);

        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": "bad_verification_code"
            })))
            .mount(&server)
            .await;

        let nonce = state.store.begin_login("main_user");
        let response = get(&state, &format!("/callback?code=stale&state={}", nonce)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!state.store.is_logged_in("main_user"));
    }

    #[tokio::test]
    async fn test_check_auth_logged_out() {
        let server = MockServer::start().await;
        let state = test_state(&server, false);

        let response = get(&state, "/check_auth").await;
        assert_eq!(json_body(response).await, json!({"logged_in": false}));
    }

    #[tokio::test]
    async fn test_check_auth_valid_token() {
        let server = MockServer::start().await;
        let state = test_state(&server, false);
        mount_user(&server).await;
        state.store.insert_token("main_user", "gho_ok");

        let body = json_body(get(&state, "/check_auth?user_id=main_user").await).await;
        assert_eq!(body["logged_in"], true);
        assert!(
            body["user"]
                .as_str()
                .unwrap()
                .starts_with("Logged in user: octocat (The Octocat)")
        );
    }

    #[tokio::test]
    async fn test_check_auth_drops_invalid_token() {
        let server = MockServer::start().await;
        let state = test_state(&server, false);

        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})))
            .mount(&server)
            .await;
        state.store.insert_token("main_user", "gho_revoked");

        let body = json_body(get(&state, "/check_auth").await).await;
        assert_eq!(body["logged_in"], false);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid token:"));
        assert!(!state.store.is_logged_in("main_user"));
    }

    #[tokio::test]
    async fn test_chat_empty_prompt() {
        let server = MockServer::start().await;
        let state = test_state(&server, true);

        let response = post_json(&state, "/chat", json!({"prompt": "   "})).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["response"], EMPTY_PROMPT);
    }

    #[tokio::test]
    async fn test_chat_not_logged_in() {
        let server = MockServer::start().await;
        let state = test_state(&server, true);

        let response = post_json(&state, "/chat", json!({"prompt": "list my repos"})).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["response"], NOT_LOGGED_IN);
    }

    #[tokio::test]
    async fn test_chat_without_llm() {
        let server = MockServer::start().await;
        let state = test_state(&server, false);
        state.store.insert_token("main_user", "gho_ok");

        let response = post_json(&state, "/chat", json!({"prompt": "list my repos"})).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["response"], LLM_NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn test_chat_no_function_call() {
        let server = MockServer::start().await;
        let state = test_state(&server, true);
        state.store.insert_token("main_user", "gho_ok");

        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Hello there!"}]}}]
            })))
            .mount(&server)
            .await;

        let response = post_json(&state, "/chat", json!({"prompt": "hi"})).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["response"], NO_ACTION);
    }

    #[tokio::test]
    async fn test_chat_unknown_function() {
        let server = MockServer::start().await;
        let state = test_state(&server, true);
        state.store.insert_token("main_user", "gho_ok");
        mount_function_call(&server, "merge_pull_request", json!({})).await;

        let response = post_json(&state, "/chat", json!({"prompt": "merge it"})).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["response"],
            "Error: No action named 'merge_pull_request' found."
        );
    }

    #[tokio::test]
    async fn test_chat_runs_operation() {
        let server = MockServer::start().await;
        let state = test_state(&server, true);
        state.store.insert_token("alice", "gho_ok");
        mount_user(&server).await;
        mount_function_call(&server, "list_repos", json!({"visibility": "public"})).await;

        Mock::given(method("GET"))
            .and(path("/user/repos"))
            .and(query_param("visibility", "public"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "hello", "full_name": "octocat/hello", "owner": {"login": "octocat"}}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let response = post_json(
            &state,
            "/chat",
            json!({"user_id": "alice", "prompt": "show my public repos"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await["response"],
            "Your public repositories:\noctocat/hello"
        );
    }

    #[tokio::test]
    async fn test_chat_llm_failure() {
        let server = MockServer::start().await;
        let state = test_state(&server, true);
        state.store.insert_token("main_user", "gho_ok");

        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let response = post_json(&state, "/chat", json!({"prompt": "list my repos"})).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let message = json_body(response).await["response"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(message.starts_with("An unexpected error occurred:"));
        assert!(message.contains("overloaded"));
    }

    #[tokio::test]
    async fn test_chat_missing_argument_is_unexpected() {
        let server = MockServer::start().await;
        let state = test_state(&server, true);
        state.store.insert_token("main_user", "gho_ok");
        mount_user(&server).await;
        mount_function_call(&server, "delete_repo", json!({})).await;

        let response = post_json(&state, "/chat", json!({"prompt": "delete it"})).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            json_body(response).await["response"]
                .as_str()
                .unwrap()
                .contains("Missing 'repo_full_name' parameter")
        );
    }

    #[tokio::test]
    async fn test_logout() {
        let server = MockServer::start().await;
        let state = test_state(&server, false);
        state.store.insert_token("main_user", "gho_ok");

        let response = post_json(&state, "/logout", json!({})).await;
        assert_eq!(json_body(response).await["response"], "Logged out successfully.");
        assert!(!state.store.is_logged_in("main_user"));

        let response = post_json(&state, "/logout", json!({"user_id": "main_user"})).await;
        assert_eq!(json_body(response).await["response"], "You were not logged in.");
    }
}
