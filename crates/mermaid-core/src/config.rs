//! Configuration management for Mermaid
//!
//! The config file is a small JSON object. Only `model_id` matters for
//! generation: when it is missing or empty the front-ends run disabled and
//! every generate action answers with the "no model loaded" message.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Errors raised while loading or saving the config file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    NotFound { path: String },

    #[error("Failed to read config from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config from {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write config to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Inference engine used to load the configured model
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// llama.cpp via the llama-cpp-2 bindings
    #[default]
    LlamaCpp,
    /// mistral.rs (requires the `mistralrs` feature)
    MistralRs,
}

impl Backend {
    /// Parse a user-supplied backend name (`llama-cpp`, `llamacpp`, `mistral.rs`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.to_lowercase().replace(['-', '.', '_'], "");
        match normalized.as_str() {
            "llamacpp" | "llama" => Some(Self::LlamaCpp),
            "mistralrs" | "mistral" => Some(Self::MistralRs),
            _ => None,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::LlamaCpp => "llama.cpp",
            Self::MistralRs => "mistral.rs",
        }
    }

    /// Whether the backend feeds the prompt through the model's chat template
    ///
    /// llama.cpp continues the prompt as raw text. mistral.rs only exposes chat
    /// requests, so the prompt arrives as a single user turn.
    pub fn wraps_prompt_in_chat_template(&self) -> bool {
        matches!(self, Self::MistralRs)
    }
}

/// Sampling parameters handed to the text generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    /// Maximum number of new tokens to generate
    pub max_new_tokens: u32,
    /// Sample from the distribution; greedy decoding when false
    pub do_sample: bool,
    /// Temperature (0.0 = deterministic, 1.0 = creative)
    pub temperature: f32,
    /// Top-p nucleus sampling threshold
    pub top_p: f32,
    /// Prepend the prompt to the generated continuation
    pub return_full_text: bool,
    /// Fixed sampling seed; a fresh random seed is drawn per call when unset
    pub seed: Option<u32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_new_tokens: 256,
            do_sample: true,
            temperature: 0.6,
            top_p: 0.9,
            return_full_text: false,
            seed: None,
        }
    }
}

impl GenerationOptions {
    /// Seed for one generation call
    pub fn sampling_seed(&self) -> u32 {
        self.seed.unwrap_or_else(rand::random)
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Model to load; GGUF path or id relative to the models directory
    #[serde(default)]
    pub model_id: Option<String>,
    /// Inference engine
    #[serde(default)]
    pub backend: Backend,
}

impl Config {
    /// Load configuration, falling back to a disabled config when the file is missing
    ///
    /// Any other failure (unreadable file, malformed JSON) is returned to the caller.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        match Self::read(path) {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound { path }) => {
                tracing::warn!("Config file not found. ({})", path);
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Read configuration from file without any fallback
    pub fn read(path: Option<&str>) -> Result<Self, ConfigError> {
        let config_path = Self::config_path(path);
        let path_str = config_path.display().to_string();

        let contents = match std::fs::read_to_string(&config_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound { path: path_str });
            }
            Err(source) => return Err(ConfigError::Read { path: path_str, source }),
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: path_str.clone(), source })?;

        tracing::debug!(
            "Loaded config from {} (model: {:?}, backend: {})",
            path_str,
            config.model_id(),
            config.backend.display_name()
        );

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<&str>) -> Result<(), ConfigError> {
        let config_path = Self::config_path(path);
        let path_str = config_path.display().to_string();

        if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|source| ConfigError::Write { path: path_str.clone(), source })?;
        }

        let mut contents = serde_json::to_string_pretty(self)
            .map_err(|source| ConfigError::Parse { path: path_str.clone(), source })?;
        contents.push('\n');

        std::fs::write(&config_path, contents)
            .map_err(|source| ConfigError::Write { path: path_str, source })
    }

    /// Path of the config file: the explicit one, or `config.json` in the working directory
    pub fn config_path(path: Option<&str>) -> PathBuf {
        path.map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Configured model id, treating an empty string as unset
    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Whether a model is configured at all
    pub fn generation_enabled(&self) -> bool {
        self.model_id().is_some()
    }

    /// Get the models directory
    pub fn models_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "mermaid", "mermaid")
            .context("Could not determine data directory")?;
        let models_dir = proj_dirs.data_dir().join("models");
        std::fs::create_dir_all(&models_dir)
            .with_context(|| format!("Failed to create models directory {:?}", models_dir))?;
        Ok(models_dir)
    }

    /// Full path to the configured model file, if any
    pub fn model_path(&self) -> Result<Option<PathBuf>> {
        self.model_id().map(resolve_model_path).transpose()
    }
}

/// Resolve a model id to a GGUF path
///
/// Absolute paths and paths that exist relative to the working directory are
/// used unchanged; anything else is looked up in the models directory.
pub fn resolve_model_path(model_id: &str) -> Result<PathBuf> {
    let candidate = Path::new(model_id);
    if candidate.is_absolute() || candidate.exists() {
        return Ok(candidate.to_path_buf());
    }
    Ok(Config::models_dir()?.join(model_id))
}

/// Model id recorded for a file downloaded from a Hugging Face repo
pub fn hub_model_id(repo: &str, filename: &str) -> String {
    format!("{}/{}", repo.trim_matches('/').replace('/', "--"), filename)
}
