//! Configuration management
//!
//! 設定は以下の優先順位で読み込まれます:
//! 1. 環境変数
//! 2. gh-agent.toml 設定ファイル
//! 3. デフォルト値
//!
//! 設定ファイル内では `${VAR_NAME}` 形式で環境変数を展開できます。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Error;

/// Default config file looked up by [`Config::load`]
pub const DEFAULT_CONFIG_FILE: &str = "gh-agent.toml";

/// LLM Provider type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini generateContent API
    #[default]
    Gemini,
    /// OpenAI-compatible chat completions API
    OpenAi,
}

impl LlmProvider {
    /// Map a provider name to a provider. Unknown names fall back to Gemini.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "openai" | "glm" | "zai" | "openrouter" => LlmProvider::OpenAi,
            _ => LlmProvider::Gemini,
        }
    }

    /// Default API endpoint for the provider
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            LlmProvider::OpenAi => "https://api.openai.com/v1",
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key (empty when not configured)
    #[serde(default)]
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// API provider
    #[serde(default)]
    pub provider: LlmProvider,

    /// Base URL (optional, for custom endpoints)
    pub base_url: Option<String>,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            provider: LlmProvider::Gemini,
            base_url: None,
            temperature: 0.0,
        }
    }
}

impl LlmConfig {
    /// Whether an API key has been provided
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Effective base URL (override or provider default)
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string()
    }
}

/// GitHub OAuth app and REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// OAuth app client ID
    pub client_id: Option<String>,

    /// OAuth app client secret
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,

    /// Scopes requested at login
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Callback URL registered with the OAuth app (GitHub uses the app default when unset)
    pub redirect_uri: Option<String>,

    /// REST API base URL
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    /// Base URL hosting `/login/oauth/*`
    #[serde(default = "default_github_oauth_url")]
    pub oauth_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            scopes: default_scopes(),
            redirect_uri: None,
            api_url: default_github_api_url(),
            oauth_url: default_github_oauth_url(),
        }
    }
}

impl GitHubConfig {
    /// Scopes joined the way the authorize endpoint expects them
    pub fn scope_param(&self) -> String {
        self.scopes.join(",")
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// User id used when a request does not name one
    #[serde(default = "default_user_id")]
    pub default_user_id: String,

    /// Seconds a `/login` state stays valid for its callback
    #[serde(default = "default_login_ttl_secs")]
    pub login_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            default_user_id: default_user_id(),
            login_ttl_secs: default_login_ttl_secs(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Terminal client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the gh-agent server
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Identifier this client authenticates as
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            user_id: default_user_id(),
        }
    }
}

/// Main configuration for gh-agent
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// GitHub configuration
    #[serde(default)]
    pub github: GitHubConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Terminal client configuration
    #[serde(default)]
    pub client: ClientConfig,
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_scopes() -> Vec<String> {
    vec!["repo".to_string(), "delete_repo".to_string(), "user".to_string()]
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_oauth_url() -> String {
    "https://github.com".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_user_id() -> String {
    "main_user".to_string()
}

fn default_login_ttl_secs() -> u64 {
    600
}

fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

impl Config {
    /// 設定ファイルから環境変数を展開する
    ///
    /// `${VAR_NAME}` 形式の文字列を環境変数の値に置換します。
    /// 環境変数が存在しない場合は空文字列になります。
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // '{' を消費

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// TOML 設定ファイルから設定を読み込む
    ///
    /// 設定ファイル内の `${VAR_NAME}` は環境変数の値に置換され、
    /// その後環境変数による上書きが適用されます。
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&toml_content)?;
        cfg.apply_env_overrides();

        Ok(cfg)
    }

    /// Parse a TOML document (after `${VAR}` expansion) without env overrides
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let expanded = Self::expand_env_vars(content);
        let toml_config: TomlConfig = toml::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        Ok(Self::from_toml_config(toml_config))
    }

    /// デフォルトパスから設定を読み込む
    ///
    /// `./gh-agent.toml` があればそれを使い、なければ環境変数のみ。
    pub fn load() -> crate::Result<Self> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_toml_file(DEFAULT_CONFIG_FILE);
        }

        Self::from_env()
    }

    /// Load configuration from environment variables on top of defaults
    pub fn from_env() -> crate::Result<Self> {
        let mut cfg = Config::default();
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// TOML 構造から Config を構築
    fn from_toml_config(toml: TomlConfig) -> Self {
        let llm = toml.llm.unwrap_or_default();
        let llm_config = LlmConfig {
            api_key: llm.api_key.unwrap_or_default(),
            model: llm.model.unwrap_or_else(default_model),
            provider: llm
                .provider
                .as_deref()
                .map(LlmProvider::from_name)
                .unwrap_or_default(),
            base_url: llm.base_url,
            temperature: llm.temperature.unwrap_or(0.0),
        };

        let github = toml.github.unwrap_or_default();
        let github_config = GitHubConfig {
            client_id: github.client_id.filter(|s| !s.is_empty()),
            client_secret: github.client_secret.filter(|s| !s.is_empty()),
            scopes: github.scopes.unwrap_or_else(default_scopes),
            redirect_uri: github.redirect_uri.filter(|s| !s.is_empty()),
            api_url: github.api_url.unwrap_or_else(default_github_api_url),
            oauth_url: github.oauth_url.unwrap_or_else(default_github_oauth_url),
        };

        let server = toml.server.unwrap_or_default();
        let server_config = ServerConfig {
            host: server.host.unwrap_or_else(default_host),
            port: server.port.unwrap_or_else(default_port),
            default_user_id: server.default_user_id.unwrap_or_else(default_user_id),
            login_ttl_secs: server.login_ttl_secs.unwrap_or_else(default_login_ttl_secs),
        };

        let client = toml.client.unwrap_or_default();
        let client_config = ClientConfig {
            server_url: client.server_url.unwrap_or_else(default_server_url),
            user_id: client.user_id.unwrap_or_else(default_user_id),
        };

        Config {
            llm: llm_config,
            github: github_config,
            server: server_config,
            client: client_config,
        }
    }

    /// 環境変数で設定を上書きする
    fn apply_env_overrides(&mut self) {
        // LLM 設定の上書き
        if let Some(api_key) = non_empty_var("LLM_API_KEY") {
            self.llm.api_key = api_key;
        }
        if let Some(api_key) = non_empty_var("GEMINI_API_KEY") {
            self.llm.api_key = api_key;
        }
        if let Some(model) = non_empty_var("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(provider) = non_empty_var("LLM_PROVIDER") {
            self.llm.provider = LlmProvider::from_name(&provider);
        }
        if let Some(base_url) = non_empty_var("LLM_BASE_URL") {
            self.llm.base_url = Some(base_url);
        }
        if let Some(temperature) = non_empty_var("LLM_TEMPERATURE") {
            if let Ok(t) = temperature.parse() {
                self.llm.temperature = t;
            }
        }

        // GitHub 設定の上書き
        if let Some(id) = non_empty_var("GITHUB_CLIENT_ID") {
            self.github.client_id = Some(id);
        }
        if let Some(secret) = non_empty_var("GITHUB_CLIENT_SECRET") {
            self.github.client_secret = Some(secret);
        }
        if let Some(uri) = non_empty_var("GITHUB_REDIRECT_URI") {
            self.github.redirect_uri = Some(uri);
        }
        if let Some(url) = non_empty_var("GITHUB_API_URL") {
            self.github.api_url = url;
        }
        if let Some(url) = non_empty_var("GITHUB_OAUTH_URL") {
            self.github.oauth_url = url;
        }

        // Server 設定の上書き
        if let Some(host) = non_empty_var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = non_empty_var("SERVER_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Some(user_id) = non_empty_var("DEFAULT_USER_ID") {
            self.server.default_user_id = user_id;
        }
        if let Some(ttl) = non_empty_var("LOGIN_TTL_SECS") {
            if let Ok(t) = ttl.parse() {
                self.server.login_ttl_secs = t;
            }
        }

        // Client 設定の上書き
        if let Some(url) = non_empty_var("SERVER_URL") {
            self.client.server_url = url;
        }
        if let Some(user_id) = non_empty_var("AGENT_USER_ID") {
            self.client.user_id = user_id;
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// ============================================================================
// TOML 構造体定義（ファイル解析用）
// ============================================================================

/// TOML ファイル用のトップレベル構造
#[derive(Debug, Deserialize)]
struct TomlConfig {
    /// LLM 設定
    llm: Option<TomlLlmConfig>,
    /// GitHub 設定
    github: Option<TomlGitHubConfig>,
    /// サーバー設定
    server: Option<TomlServerConfig>,
    /// クライアント設定
    client: Option<TomlClientConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlLlmConfig {
    /// API プロバイダー ("gemini" または "openai")
    provider: Option<String>,
    /// モデル名
    model: Option<String>,
    /// API キー
    api_key: Option<String>,
    /// ベース URL (オプション)
    base_url: Option<String>,
    /// temperature
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlGitHubConfig {
    client_id: Option<String>,
    client_secret: Option<String>,
    scopes: Option<Vec<String>>,
    redirect_uri: Option<String>,
    api_url: Option<String>,
    oauth_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlServerConfig {
    host: Option<String>,
    port: Option<u16>,
    default_user_id: Option<String>,
    login_ttl_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlClientConfig {
    server_url: Option<String>,
    user_id: Option<String>,
}
