//! LLM API HTTP Client
//!
//! Supports both the Gemini API and OpenAI-compatible APIs.

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::{LlmConfig, LlmProvider};
use crate::error::{Error, Result};

use super::types::*;

/// LLM API client used to map free text to a single function call
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    provider: LlmProvider,
    temperature: f32,
    system_prompt: Option<String>,
}

impl LlmClient {
    /// Create a new LLM client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if !config.is_configured() {
            return Err(Error::Config("LLM API key not provided".to_string()));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.effective_base_url(),
            provider: config.provider.clone(),
            temperature: config.temperature,
            system_prompt: None,
        })
    }

    /// Create with custom base URL (for testing or custom endpoints)
    pub fn with_base_url(config: &LlmConfig, base_url: impl Into<String>) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(client)
    }

    /// Attach a system instruction sent with every request
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model which of `tools` the prompt implies.
    ///
    /// Returns `None` when the model answers with plain text.
    pub async fn resolve_function_call(
        &self,
        prompt: &str,
        tools: &[ToolDefinition],
    ) -> Result<Option<FunctionCall>> {
        let call = match self.provider {
            LlmProvider::Gemini => self.send_gemini_request(prompt, tools).await?,
            LlmProvider::OpenAi => self.send_openai_request(prompt, tools).await?,
        };

        match &call {
            Some(c) => info!("LLM selected function: {} args={}", c.name, c.args),
            None => info!("LLM returned no function call"),
        }

        Ok(call)
    }

    /// Send request to the Gemini API
    async fn send_gemini_request(
        &self,
        prompt: &str,
        tools: &[ToolDefinition],
    ) -> Result<Option<FunctionCall>> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        debug!("Sending request to Gemini API: {}", url);

        let request = GeminiRequest::single_turn(
            prompt,
            self.system_prompt.as_deref(),
            tools,
            self.temperature,
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("Gemini API error: {} - {}", status, body);
            return Err(Error::LlmApi(format!("{}: {}", status, body)));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            Error::LlmApi(format!("Failed to parse response: {} - {}", e, body))
        })?;

        Ok(parsed.first_function_call())
    }

    /// Send request to an OpenAI-compatible API
    async fn send_openai_request(
        &self,
        prompt: &str,
        tools: &[ToolDefinition],
    ) -> Result<Option<FunctionCall>> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!("Sending request to OpenAI-compatible API: {}", url);

        let request = ChatCompletionRequest::single_turn(
            &self.model,
            prompt,
            self.system_prompt.as_deref(),
            tools,
            self.temperature,
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("OpenAI API error: {} - {}", status, body);
            return Err(Error::LlmApi(format!("{}: {}", status, body)));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            Error::LlmApi(format!("Failed to parse response: {} - {}", e, body))
        })?;

        parsed.first_function_call()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(provider: LlmProvider) -> LlmConfig {
        LlmConfig {
            api_key: "test-key".to_string(),
            model: "gemini-1.5-flash".to_string(),
            provider,
            base_url: None,
            temperature: 0.0,
        }
    }

    fn tools() -> Vec<ToolDefinition> {
        vec![ToolDefinition::new(
            "list_repos",
            "List all repositories of the user.",
            json!({
                "type": "object",
                "properties": {"visibility": {"type": "string"}},
                "required": []
            }),
        )]
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = LlmClient::new(&LlmConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_gemini_function_call() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "meri public repos list karo"}]}],
                "tools": [{"functionDeclarations": [{"name": "list_repos"}]}],
                "generationConfig": {"temperature": 0.0}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{
                        "functionCall": {"name": "list_repos", "args": {"visibility": "public"}}
                    }]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            LlmClient::with_base_url(&config(LlmProvider::Gemini), server.uri()).unwrap();
        let call = client
            .resolve_function_call("meri public repos list karo", &tools())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(call.name, "list_repos");
        assert_eq!(call.args, json!({"visibility": "public"}));
    }

    #[tokio::test]
    async fn test_gemini_text_answer_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "What do you mean?"}]}}]
            })))
            .mount(&server)
            .await;

        let client =
            LlmClient::with_base_url(&config(LlmProvider::Gemini), server.uri()).unwrap();
        let call = client.resolve_function_call("hello", &tools()).await.unwrap();
        assert!(call.is_none());
    }

    #[tokio::test]
    async fn test_gemini_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client =
            LlmClient::with_base_url(&config(LlmProvider::Gemini), server.uri()).unwrap();
        let err = client.resolve_function_call("hello", &tools()).await.unwrap_err();

        match err {
            Error::LlmApi(msg) => {
                assert!(msg.contains("429"));
                assert!(msg.contains("quota exceeded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_gemini_malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client =
            LlmClient::with_base_url(&config(LlmProvider::Gemini), server.uri()).unwrap();
        let err = client.resolve_function_call("hello", &tools()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse response"));
    }

    #[tokio::test]
    async fn test_openai_function_call() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "list_repos", "arguments": "{\"visibility\":\"private\"}"}
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            LlmClient::with_base_url(&config(LlmProvider::OpenAi), server.uri()).unwrap();
        let call = client
            .resolve_function_call("list my private repos", &tools())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(call.name, "list_repos");
        assert_eq!(call.args["visibility"], "private");
    }

    #[tokio::test]
    async fn test_system_prompt_is_sent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "systemInstruction": {"parts": [{"text": "Only call GitHub functions."}]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = LlmClient::with_base_url(&config(LlmProvider::Gemini), server.uri())
            .unwrap()
            .with_system_prompt("Only call GitHub functions.");
        let call = client.resolve_function_call("hi", &tools()).await.unwrap();
        assert!(call.is_none());
    }
}
