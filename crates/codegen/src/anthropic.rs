//! Anthropic Claude API Implementation
//!
//! Calls the Anthropic Messages API (https://api.anthropic.com/v1/messages)
//! using reqwest HTTP client.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{AppSpec, CodegenConfig, CodegenError, GeneratedApp, GenerationBackend};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str = "You are a mini-app code generator. Respond with a single, \
complete, self-contained source file implementing the requested app. Respond with code \
only, no commentary.";

/// Anthropic Messages API request body
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<MessageBody>,
}

#[derive(Debug, Serialize)]
struct MessageBody {
    role: String,
    content: String,
}

/// Anthropic Messages API response body
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    model: String,
    stop_reason: Option<String>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: i32,
    output_tokens: i32,
}

/// Anthropic API error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

/// Anthropic codegen backend implementation
pub struct AnthropicBackend {
    client: Client,
    config: CodegenConfig,
    base_url: String,
}

impl AnthropicBackend {
    /// Create a new Anthropic backend
    pub fn new(config: CodegenConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            client: Client::new(),
            config,
            base_url,
        }
    }

    /// Render the app spec into a generation prompt
    fn build_prompt(spec: &AppSpec) -> String {
        format!(
            "Generate a {category} app.\n\
             Description: {description}\n\
             Behavior: {behavior}\n\
             Style: {style}\n\
             Primary color: {color}\n\
             Pricing model: {pricing}",
            category = spec.category,
            description = spec.description,
            behavior = spec.behavior,
            style = spec.style,
            color = spec.color,
            pricing = spec.pricing,
        )
    }
}

#[async_trait::async_trait]
impl GenerationBackend for AnthropicBackend {
    async fn generate(&self, spec: &AppSpec) -> Result<GeneratedApp, CodegenError> {
        let model = self.config.default_model.clone();

        let body = MessagesRequest {
            model: model.clone(),
            max_tokens: self.config.max_tokens,
            system: SYSTEM_PROMPT.to_string(),
            messages: vec![MessageBody {
                role: "user".to_string(),
                content: Self::build_prompt(spec),
            }],
        };

        let url = format!("{}/v1/messages", self.base_url);

        tracing::debug!(model = %model, category = %spec.category, "Sending Anthropic API request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CodegenError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CodegenError::RateLimit);
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            // Try to parse as API error
            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_body) {
                if error_response.error.error_type == "invalid_request_error" {
                    return Err(CodegenError::Rejected(error_response.error.message));
                }
                return Err(CodegenError::Response(format!(
                    "Anthropic API error ({}): {}",
                    error_response.error.error_type, error_response.error.message
                )));
            }

            return Err(CodegenError::Response(format!(
                "Anthropic API returned {}: {}",
                status, error_body
            )));
        }

        let api_response: MessagesResponse = response
            .json()
            .await
            .map_err(|e| CodegenError::Response(format!("Failed to parse response: {}", e)))?;

        // Extract text content from response blocks
        let code = api_response
            .content
            .iter()
            .filter_map(|block| {
                if block.content_type == "text" {
                    block.text.clone()
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");

        if code.is_empty() {
            return Err(CodegenError::Response(
                "Anthropic API returned no text content".to_string(),
            ));
        }

        Ok(GeneratedApp {
            code,
            model: api_response.model,
            input_tokens: api_response.usage.input_tokens,
            output_tokens: api_response.usage.output_tokens,
            stop_reason: api_response
                .stop_reason
                .unwrap_or_else(|| "end_turn".to_string()),
        })
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}
