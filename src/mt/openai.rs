//! OpenAI-compatible chat-completion provider
//!
//! Each chunk becomes one chat-completion request. The model is handed a
//! single tool, `upload`, whose parameters are an object with one required
//! string property per chunk key (the source text is the property
//! description). The translated values come back as the arguments of the
//! model's tool calls.
//!
//! # Authentication
//!
//! The provider loads the API key from the `OPENAI_API_KEY` environment
//! variable. `OPENAI_BASE_URL` overrides the endpoint for compatible services.
//!
//! # Example
//!
//! ```ignore
//! use l10n_mt::mt::{MachineTranslator, OpenAiProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = OpenAiProvider::from_env()?;
//!     let pairs = provider.translate(&chunk, "German", "gpt-4o-mini").await?;
//!     println!("{:?}", pairs);
//!     Ok(())
//! }
//! ```

use crate::mt::chunking::Chunk;
use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{MachineTranslator, TranslatedPair};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the API base URL
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Name of the tool the model is asked to call
const TOOL_NAME: &str = "upload";

/// Chat-completion provider for OpenAI and API-compatible services
#[derive(Clone)]
pub struct OpenAiProvider {
    /// API key for authentication
    api_key: String,
    /// HTTP client for async requests
    client: reqwest::Client,
    /// Base URL, without the trailing `/chat/completions`
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    #[serde(default)]
    name: String,
    arguments: String,
}

impl OpenAiProvider {
    /// Completion models can take a while on large chunks
    const REQUEST_TIMEOUT_SECS: u64 = 120;

    /// Create a new provider with an explicit API key and base URL
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(MtError)` - If API key is empty or HTTP client creation fails
    pub fn new(api_key: String, base_url: &str) -> MtResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MtError::ConfigError("API key cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(Self::REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a provider from `OPENAI_API_KEY` and optional `OPENAI_BASE_URL`
    pub fn from_env() -> MtResult<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            MtError::ConfigError(format!("{} environment variable not set", API_KEY_ENV))
        })?;
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Self::new(api_key, &base_url)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Chunk keys in sorted order, so prompts are reproducible
fn sorted_entries(chunk: &Chunk) -> Vec<(&String, &String)> {
    let mut entries: Vec<(&String, &String)> = chunk.iter().collect();
    entries.sort();
    entries
}

/// System instruction naming the target language
fn system_prompt(target_language: &str) -> String {
    format!(
        "You will be provided key value pair English phrases, and your task is to translate \
         the english values into concise {} and upload them. The messages are for a \
         localization for a mobile application. respond with json",
        target_language
    )
}

/// User message listing `key:value` pairs, one per line
fn user_prompt(chunk: &Chunk) -> String {
    sorted_entries(chunk)
        .into_iter()
        .map(|(key, value)| format!("{}:{}\n", key, value))
        .collect()
}

/// Tool parameter schema with one required string property per key
fn parameters_schema(chunk: &Chunk) -> Value {
    let entries = sorted_entries(chunk);
    let mut properties = Map::new();
    for (key, value) in &entries {
        properties.insert(
            key.to_string(),
            json!({ "type": "string", "description": value }),
        );
    }
    let required: Vec<&String> = entries.iter().map(|(key, _)| *key).collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Build the chat-completion request body for a chunk
fn build_request(chunk: &Chunk, target_language: &str, model: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": system_prompt(target_language) },
            { "role": "user", "content": user_prompt(chunk) },
        ],
        "tools": [{
            "type": "function",
            "function": {
                "name": TOOL_NAME,
                "description": format!("uploads the {} phrases", target_language),
                "parameters": parameters_schema(chunk),
            }
        }],
        "tool_choice": { "type": "function", "function": { "name": TOOL_NAME } },
    })
}

/// Extract translated pairs from a decoded response
///
/// Exactly one choice is required. Every tool call contributes its arguments
/// in order, so a key answered by two calls appears twice.
fn extract_pairs(response: CompletionResponse) -> MtResult<Vec<TranslatedPair>> {
    if response.choices.len() != 1 {
        return Err(MtError::ResponseError(format!(
            "expected exactly one choice, got {}",
            response.choices.len()
        )));
    }

    let mut pairs = Vec::new();
    let tool_calls = response
        .choices
        .into_iter()
        .flat_map(|choice| choice.message.tool_calls.unwrap_or_default());
    for call in tool_calls {
        if !call.function.name.is_empty() && call.function.name != TOOL_NAME {
            debug!(tool = %call.function.name, "ignoring call to unknown tool");
            continue;
        }
        pairs.extend(parse_arguments(&call.function.arguments)?);
    }
    Ok(pairs)
}

/// Decode tool-call arguments, a JSON object of key → translated text
fn parse_arguments(arguments: &str) -> MtResult<Vec<TranslatedPair>> {
    let object: Map<String, Value> = serde_json::from_str(arguments).map_err(|e| {
        MtError::ResponseError(format!("tool arguments are not a JSON object: {}", e))
    })?;

    Ok(object
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, text)
        })
        .collect())
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for OpenAiProvider {
    async fn translate_chunk(
        &self,
        chunk: &Chunk,
        target_language: &str,
        model: &str,
    ) -> MtResult<Vec<TranslatedPair>> {
        let body = build_request(chunk, target_language, model);
        debug!(keys = chunk.len(), bytes = chunk.byte_len(), model, "sending chunk");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        // Check HTTP status
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(
                if status == reqwest::StatusCode::UNAUTHORIZED
                    || status == reqwest::StatusCode::FORBIDDEN
                {
                    MtError::ConfigError(format!("API rejected credentials ({}): {}", status, error_text))
                } else {
                    MtError::TranslationError(format!("API error ({}): {}", status, error_text))
                },
            );
        }

        let text = response.text().await?;
        let decoded: CompletionResponse = serde_json::from_str(&text)?;
        extract_pairs(decoded)
    }

    fn provider_name(&self) -> &str {
        "OpenAI Chat Completions"
    }
}
