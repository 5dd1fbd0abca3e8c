//! Appmint Code Generation Service
//!
//! Produces mini-app source code from a caller-supplied app spec with
//! support for:
//! - Anthropic Messages API integration for production
//! - Mock backend for testing and development
//! - Configurable model, token budget, and base URL

pub mod anthropic;
pub mod mock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Codegen configuration error: {0}")]
    Configuration(String),

    #[error("Codegen request error: {0}")]
    Request(String),

    #[error("Codegen response error: {0}")]
    Response(String),

    #[error("Codegen rate limit exceeded")]
    RateLimit,

    #[error("Codegen rejected the spec: {0}")]
    Rejected(String),
}

/// App marketplace category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppCategory {
    MiniWorld,
    ExternalWorld,
}

impl std::fmt::Display for AppCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MiniWorld => write!(f, "mini-world"),
            Self::ExternalWorld => write!(f, "external-world"),
        }
    }
}

/// Pricing model of the app being generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppPricing {
    #[default]
    Free,
    Paid,
}

impl std::fmt::Display for AppPricing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

/// Prompt parameters describing the app to generate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSpec {
    pub description: String,
    pub behavior: String,
    pub style: String,
    pub color: String,
    pub category: AppCategory,
    #[serde(default)]
    pub pricing: AppPricing,
}

/// A generated app artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedApp {
    pub code: String,
    pub model: String,
    pub input_tokens: i32,
    pub output_tokens: i32,
    pub stop_reason: String,
}

/// Codegen service configuration
#[derive(Clone)]
pub struct CodegenConfig {
    /// Codegen provider (anthropic, mock)
    pub provider: String,
    /// API key for the Anthropic Messages API
    pub api_key: String,
    /// Model used when the request does not name one
    pub default_model: String,
    /// Token budget per generation
    pub max_tokens: u32,
    /// Override for the API base URL
    pub base_url: Option<String>,
}

impl std::fmt::Debug for CodegenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodegenConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("default_model", &self.default_model)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CodegenConfig {
    /// Create codegen config from environment variables
    pub fn from_env() -> Result<Self, CodegenError> {
        let provider = std::env::var("CODEGEN_PROVIDER").unwrap_or_else(|_| "mock".to_string());

        let api_key = std::env::var("ANTHROPIC_API_KEY").unwrap_or_default();

        let default_model = std::env::var("CODEGEN_MODEL")
            .unwrap_or_else(|_| "claude-sonnet-4-5".to_string());

        let max_tokens = std::env::var("CODEGEN_MAX_TOKENS")
            .unwrap_or_else(|_| "8192".to_string())
            .parse()
            .unwrap_or(8192);

        let base_url = std::env::var("CODEGEN_BASE_URL").ok();

        if provider != "mock" && api_key.is_empty() {
            return Err(CodegenError::Configuration(
                "ANTHROPIC_API_KEY is required for the anthropic provider".to_string(),
            ));
        }

        Ok(Self {
            provider,
            api_key,
            default_model,
            max_tokens,
            base_url,
        })
    }
}

/// Generation backend trait for different implementations.
///
/// A failure here never consumes caller entitlement; the orchestrator
/// treats timeouts identically to any other failure.
#[async_trait::async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate app source code for the given spec.
    async fn generate(&self, spec: &AppSpec) -> Result<GeneratedApp, CodegenError>;

    /// Default model identifier for this backend.
    fn default_model(&self) -> &str;
}

/// Factory for creating GenerationBackend implementations
pub struct CodegenFactory;

impl CodegenFactory {
    /// Create a GenerationBackend based on configuration
    pub fn create(config: CodegenConfig) -> Result<Box<dyn GenerationBackend>, CodegenError> {
        match config.provider.as_str() {
            "anthropic" => {
                tracing::info!("Creating Anthropic codegen backend");
                if config.api_key.is_empty() {
                    return Err(CodegenError::Configuration(
                        "ANTHROPIC_API_KEY is required for the anthropic provider".to_string(),
                    ));
                }
                Ok(Box::new(anthropic::AnthropicBackend::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock codegen backend");
                Ok(Box::new(mock::MockBackend::new()))
            }
            provider => Err(CodegenError::Configuration(format!(
                "Unknown codegen provider: {}. Supported providers: anthropic, mock",
                provider
            ))),
        }
    }
}
