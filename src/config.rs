use std::time::Duration;

use crate::errors::ConfigError;

pub const VAULT_DIRECTORY_VAR: &str = "VAULT_DIRECTORY";
pub const OLLAMA_BASE_URL_VAR: &str = "OLLAMA_BASE_URL";
pub const EMBEDDING_MODEL_VAR: &str = "EMBEDDING_MODEL";
pub const GENERATION_MODEL_VAR: &str = "GENERATION_MODEL";

/// Default embedding model served by ollama
const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
/// Default generation model used for note ratings
const DEFAULT_GENERATION_MODEL: &str = "llama3";

/// Notes must be strictly more similar than this to be linked
const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.7;
/// Maximum number of links considered per note
const DEFAULT_TOP_K: usize = 3;

const DEFAULT_EMBED_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_GENERATE_TIMEOUT: Duration = Duration::from_secs(120);

/// Pause after every embedding request, successful or not
const DEFAULT_EMBED_PAUSE: Duration = Duration::from_millis(500);
/// Pause after every note the linker rewrites
const DEFAULT_WRITE_PAUSE: Duration = Duration::from_secs(1);

/// Settings for the ollama http client
#[derive(Clone, Debug, PartialEq)]
pub struct OllamaConfig {
    /// Base url without a trailing slash (e.g. "http://localhost:11434")
    pub base_url: String,

    /// Model for `/api/embeddings`
    pub embedding_model: String,

    /// Model for `/api/generate`
    pub generation_model: String,

    pub embed_timeout: Duration,
    pub generate_timeout: Duration,
}

impl OllamaConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            embed_timeout: DEFAULT_EMBED_TIMEOUT,
            generate_timeout: DEFAULT_GENERATE_TIMEOUT,
        }
    }
}

/// Linker policy values
#[derive(Clone, Debug, PartialEq)]
pub struct LinkerConfig {
    /// Similarity must be greater than this value [-1.0, 1.0]
    pub similarity_threshold: f32,

    /// Keep at most this many matches per note
    pub top_k: usize,

    pub embed_pause: Duration,
    pub write_pause: Duration,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            top_k: DEFAULT_TOP_K,
            embed_pause: DEFAULT_EMBED_PAUSE,
            write_pause: DEFAULT_WRITE_PAUSE,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub vault_directory: String,
    pub ollama: OllamaConfig,
    pub linker: LinkerConfig,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional = |name: &str, default: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let vault_directory = required(VAULT_DIRECTORY_VAR)?;
        let base_url = required(OLLAMA_BASE_URL_VAR)?;
        validate_base_url(&base_url)?;

        let mut ollama = OllamaConfig::new(&base_url);
        ollama.embedding_model = optional(EMBEDDING_MODEL_VAR, DEFAULT_EMBEDDING_MODEL);
        ollama.generation_model = optional(GENERATION_MODEL_VAR, DEFAULT_GENERATION_MODEL);

        Ok(Self {
            vault_directory,
            ollama,
            linker: LinkerConfig::default(),
        })
    }
}

fn validate_base_url(value: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        name: OLLAMA_BASE_URL_VAR,
        value: value.to_string(),
    };

    let parsed = url::Url::parse(value).map_err(|_| invalid())?;
    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(()),
        _ => Err(invalid()),
    }
}
