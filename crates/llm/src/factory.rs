//! LLM provider factory.
//!
//! This module creates LLM clients from resolved configuration: it matches
//! the provider name, checks required secrets and builds the HTTP client.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use qagen_core::{AppConfig, AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Connection options for a provider.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Base URL; the provider default is used when absent
    pub endpoint: Option<String>,

    /// API key (required by OpenAI)
    pub api_key: Option<String>,

    /// Request timeout; the HTTP client default applies when absent
    pub timeout_secs: Option<u64>,
}

impl ClientOptions {
    /// Derive options for the active provider of an application config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            endpoint: Some(config.endpoint()),
            api_key: config.api_key.clone(),
            timeout_secs: config.timeout_secs(),
        }
    }
}

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "ollama")
/// * `options` - Endpoint, API key and timeout
///
/// # Errors
/// Returns `AppError::Config` if:
/// - Provider is unknown
/// - Required secrets are missing
/// - The HTTP client cannot be built
pub fn create_client(provider: &str, options: &ClientOptions) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    let http = build_http_client(options.timeout_secs)?;

    let client: Arc<dyn LlmClient> = match provider_type {
        ProviderType::OpenAI => {
            let api_key = options
                .api_key
                .as_deref()
                .ok_or_else(|| AppError::Config("OpenAI provider requires API key".to_string()))?;
            let base_url = options
                .endpoint
                .as_deref()
                .unwrap_or(qagen_core::config::DEFAULT_OPENAI_ENDPOINT);
            Arc::new(OpenAiClient::with_base_url(base_url, api_key).with_http_client(http))
        }
        ProviderType::Ollama => {
            let base_url = options
                .endpoint
                .as_deref()
                .unwrap_or(qagen_core::config::DEFAULT_OLLAMA_ENDPOINT);
            Arc::new(OllamaClient::with_base_url(base_url).with_http_client(http))
        }
    };

    tracing::debug!(
        "Created {} client (timeout: {:?})",
        provider_type.as_str(),
        options.timeout_secs
    );

    Ok(client)
}

fn build_http_client(timeout_secs: Option<u64>) -> AppResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", &ClientOptions::default()).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let options = ClientOptions {
            endpoint: Some("http://localhost:8080".to_string()),
            timeout_secs: Some(5),
            ..ClientOptions::default()
        };
        assert!(create_client("ollama", &options).is_ok());
    }

    #[test]
    fn test_create_openai_client() {
        let options = ClientOptions {
            api_key: Some("sk-test".to_string()),
            ..ClientOptions::default()
        };
        let client = create_client("openai", &options).unwrap();
        assert_eq!(client.provider_name(), "openai");
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client("openai", &ClientOptions::default()) {
            Err(err) => assert!(err.to_string().contains("OpenAI provider requires API key")),
            Ok(_) => panic!("Expected error for OpenAI without API key"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", &ClientOptions::default()) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }

    #[test]
    fn test_options_from_config() {
        let config = AppConfig {
            api_key: Some("sk-test".to_string()),
            ..AppConfig::default()
        };
        let options = ClientOptions::from_config(&config);
        assert_eq!(options.api_key.as_deref(), Some("sk-test"));
        assert_eq!(
            options.endpoint.as_deref(),
            Some(qagen_core::config::DEFAULT_OPENAI_ENDPOINT)
        );
        assert_eq!(options.timeout_secs, None);
    }
}
