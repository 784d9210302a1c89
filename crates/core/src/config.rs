//! Configuration management for the qagen CLI.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - A `.env` file in the working directory
//! - Config files (.qagen/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is resolved once at process start and passed explicitly
//! to everything that needs it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Environment variable holding the OpenAI API key unless a provider
/// config names another one.
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

const KNOWN_PROVIDERS: [&str; 2] = ["openai", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (may contain .qagen/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider ("openai" or "ollama")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// API key for the active provider, if one was found
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Directory CSV datasets are written to
    pub output_dir: PathBuf,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations from config.yaml
    pub llm: Option<LlmConfig>,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
        timeout: Option<u64>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Model configured for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    /// Request timeout in seconds, if configured.
    pub fn timeout(&self) -> Option<u64> {
        match self {
            Self::OpenAI { timeout, .. } | Self::Ollama { timeout, .. } => *timeout,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    logging: Option<LoggingConfig>,
    output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OutputConfig {
    dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let workspace = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            output_dir: workspace.clone(),
            workspace,
            config_file: None,
            provider: "openai".to_string(),
            model: default_model("openai").to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
        }
    }
}

/// Default model for a provider.
fn default_model(provider: &str) -> &'static str {
    match provider {
        "ollama" => "llama3.2",
        _ => "gpt-4o-mini",
    }
}

impl AppConfig {
    /// Load configuration from `.env`, the config file and environment variables.
    ///
    /// Environment variables:
    /// - `QAGEN_WORKSPACE`: Override workspace path
    /// - `QAGEN_CONFIG`: Path to config file
    /// - `QAGEN_PROVIDER`: LLM provider
    /// - `QAGEN_MODEL`: Model identifier
    /// - `QAGEN_OUTPUT_DIR`: Directory for CSV output
    /// - `OPENAI_API_KEY`: API key (or the variable named by `apiKeyEnv`)
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use qagen_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Model: {}", config.model);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration with an explicit workspace and/or config file.
    ///
    /// Explicit arguments take precedence over `QAGEN_WORKSPACE` and
    /// `QAGEN_CONFIG`.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        // Values already present in the environment win over .env
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(AppError::Config(format!("Failed to load .env file: {}", e)));
            }
        }

        let mut config = Self::default();

        if let Some(workspace) =
            workspace.or_else(|| std::env::var("QAGEN_WORKSPACE").ok().map(PathBuf::from))
        {
            config.output_dir = workspace.clone();
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("QAGEN_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => {
                if !cf.exists() {
                    return Err(AppError::Config(format!("Config file not found: {:?}", cf)));
                }
                cf.clone()
            }
            None => config.qagen_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("QAGEN_PROVIDER") {
            config.select_provider(provider);
        }

        if let Ok(model) = std::env::var("QAGEN_MODEL") {
            config.model = model;
        }

        if let Ok(dir) = std::env::var("QAGEN_OUTPUT_DIR") {
            config.output_dir = config.workspace_path(dir);
        }

        config.api_key = config.resolve_api_key();

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var_os("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(dir) = config_file.output.and_then(|o| o.dir) {
            result.output_dir = result.workspace_path(dir);
        }

        if let Some(llm) = config_file.llm {
            let active = llm.active_provider.clone();
            result.llm = Some(llm);
            result.select_provider(active);
        }

        Ok(result)
    }

    /// Resolve a path against the workspace unless it is absolute.
    fn workspace_path(&self, path: impl Into<PathBuf>) -> PathBuf {
        let path = path.into();
        if path.is_relative() {
            self.workspace.join(path)
        } else {
            path
        }
    }

    /// Switch the active provider and pick up its configured model.
    fn select_provider(&mut self, provider: String) {
        self.model = match self.get_provider_config(&provider) {
            Some(pc) => pc.model().to_string(),
            None => default_model(&provider).to_string(),
        };
        self.provider = provider;
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and
    /// the config file.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            if provider != self.provider {
                self.select_provider(provider);
                self.api_key = self.resolve_api_key();
            }
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .qagen directory.
    pub fn qagen_dir(&self) -> PathBuf {
        self.workspace.join(".qagen")
    }

    /// Get the configuration for a provider, if the config file defines one.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Name of the environment variable holding the active provider's API key.
    pub fn api_key_env(&self) -> &str {
        match self.get_provider_config(&self.provider) {
            Some(ProviderConfig::OpenAI { api_key_env, .. }) => api_key_env.as_str(),
            _ => DEFAULT_API_KEY_ENV,
        }
    }

    /// Resolve the API key for the active provider from the environment.
    fn resolve_api_key(&self) -> Option<String> {
        if self.provider != "openai" {
            return None;
        }

        std::env::var(self.api_key_env())
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    /// Endpoint of the active provider.
    pub fn endpoint(&self) -> String {
        match self.get_provider_config(&self.provider) {
            Some(ProviderConfig::OpenAI {
                endpoint: Some(endpoint),
                ..
            }) => endpoint.clone(),
            Some(ProviderConfig::Ollama { endpoint, .. }) => endpoint.clone(),
            _ if self.provider == "ollama" => DEFAULT_OLLAMA_ENDPOINT.to_string(),
            _ => DEFAULT_OPENAI_ENDPOINT.to_string(),
        }
    }

    /// Request timeout of the active provider, if configured.
    pub fn timeout_secs(&self) -> Option<u64> {
        self.get_provider_config(&self.provider)
            .and_then(ProviderConfig::timeout)
    }

    /// Validate configuration for the active provider.
    ///
    /// A missing API key for the OpenAI provider is fatal: no run can start
    /// until the key is provided.
    pub fn validate(&self) -> AppResult<()> {
        let provider = &self.provider;

        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if provider == "openai" && self.api_key.is_none() {
            return Err(AppError::Config(format!(
                "{} not found. Set it in the environment or in a .env file in the working directory.",
                self.api_key_env()
            )));
        }

        if self.model.trim().is_empty() {
            return Err(AppError::Config("Model cannot be empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(dir: &Path) -> AppConfig {
        AppConfig {
            workspace: dir.to_path_buf(),
            output_dir: dir.to_path_buf(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "gpt-4o-mini");
        assert!(!config.verbose);
        assert!(!config.no_color);
        assert_eq!(config.endpoint(), DEFAULT_OPENAI_ENDPOINT);
        assert_eq!(config.api_key_env(), "OPENAI_API_KEY");
    }

    #[test]
    fn test_qagen_dir() {
        let config = AppConfig::default();
        assert!(config.qagen_dir().ends_with(".qagen"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            Some("ollama".to_string()),
            Some("mistral".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "mistral");
        assert_eq!(overridden.endpoint(), DEFAULT_OLLAMA_ENDPOINT);
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_provider_override_picks_default_model() {
        let overridden =
            AppConfig::default().with_overrides(Some("ollama".to_string()), None, None, false, false);
        assert_eq!(overridden.model, "llama3.2");
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_missing_api_key() {
        let mut config = AppConfig::default();
        config.api_key = None;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_validate_openai_with_key() {
        let mut config = AppConfig::default();
        config.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_ollama() {
        let config = AppConfig {
            provider: "ollama".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(
            &path,
            r#"
llm:
  activeProvider: openai
  providers:
    openai:
      apiKeyEnv: QAGEN_TEST_KEY
      model: gpt-4o
      endpoint: http://localhost:9999/v1
      timeout: 20
    ollama:
      endpoint: http://gpu-box:11434
      model: qwen2.5
logging:
  level: info
  color: false
output:
  dir: datasets
"#,
        )
        .unwrap();

        let merged = config_in(temp_dir.path()).merge_yaml(&path).unwrap();
        assert_eq!(merged.provider, "openai");
        assert_eq!(merged.model, "gpt-4o");
        assert_eq!(merged.endpoint(), "http://localhost:9999/v1");
        assert_eq!(merged.timeout_secs(), Some(20));
        assert_eq!(merged.api_key_env(), "QAGEN_TEST_KEY");
        assert_eq!(merged.log_level, Some("info".to_string()));
        assert!(merged.no_color);
        assert_eq!(merged.output_dir, temp_dir.path().join("datasets"));

        let switched = merged.with_overrides(Some("ollama".to_string()), None, None, false, false);
        assert_eq!(switched.model, "qwen2.5");
        assert_eq!(switched.endpoint(), "http://gpu-box:11434");
    }

    #[test]
    fn test_workspace_path_resolution() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());

        assert_eq!(config.workspace_path("out"), temp_dir.path().join("out"));

        let absolute = temp_dir.path().join("elsewhere");
        assert_eq!(config.workspace_path(absolute.clone()), absolute);
    }

    #[test]
    fn test_merge_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "llm: [unclosed").unwrap();

        let result = config_in(temp_dir.path()).merge_yaml(&path);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
