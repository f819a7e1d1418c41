use crate::llm::DEFAULT_MODEL;
use crate::processing::{DEFAULT_TOP_K, chunking::DEFAULT_CHUNK_SIZE};
use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_EMBEDDING_DIMENSION: usize = 384;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Configuration was read before `init_config` ran.
    #[error("Configuration has not been initialized")]
    NotInitialized,
}

/// Runtime configuration shared by both HTTP services.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// API key for the Groq chat-completion endpoint.
    pub groq_api_key: String,
    /// Base URL of the OpenAI-compatible Groq API.
    pub groq_base_url: String,
    /// Chat model identifier sent with every completion request.
    pub groq_model: String,
    /// API key for the Pinecone data plane; only the PDF service needs it.
    pub pinecone_api_key: Option<String>,
    /// Host of the Pinecone index (e.g. `https://docs-abc123.svc.us-east-1.pinecone.io`).
    pub pinecone_index_host: Option<String>,
    /// Embedding backend used by the PDF service.
    pub embedding_provider: EmbeddingProvider,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// Dimensionality the embedding model must produce.
    pub embedding_dimension: usize,
    /// Base URL of the Ollama runtime when `EMBEDDING_PROVIDER=ollama`.
    pub ollama_url: String,
    /// Number of words per PDF chunk.
    pub chunk_size: usize,
    /// Number of chunks retrieved as context for each question.
    pub top_k: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported embedding backends for the PDF pipeline.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// In-process sentence-transformers model loaded through `fastembed`.
    FastEmbed,
    /// Local Ollama runtime.
    Ollama,
}

impl EmbeddingProvider {
    fn default_model(self) -> &'static str {
        match self {
            Self::FastEmbed => "all-MiniLM-L6-v2",
            Self::Ollama => "all-minilm",
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key/value source; empty values count as unset.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(lookup);
        let embedding_provider = match vars.optional("EMBEDDING_PROVIDER") {
            Some(value) => value
                .parse()
                .map_err(|()| ConfigError::InvalidValue("EMBEDDING_PROVIDER".to_string()))?,
            None => EmbeddingProvider::FastEmbed,
        };

        Ok(Self {
            groq_api_key: vars.required("GROQ_API_KEY")?,
            groq_base_url: vars
                .optional("GROQ_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GROQ_BASE_URL.to_string()),
            groq_model: vars
                .optional("GROQ_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            pinecone_api_key: vars.optional("PINECONE_API_KEY"),
            pinecone_index_host: vars.optional("PINECONE_INDEX_HOST"),
            embedding_provider,
            embedding_model: vars
                .optional("EMBEDDING_MODEL")
                .unwrap_or_else(|| embedding_provider.default_model().to_string()),
            embedding_dimension: positive(
                "EMBEDDING_DIMENSION",
                vars.parsed("EMBEDDING_DIMENSION")?,
            )?
            .unwrap_or(DEFAULT_EMBEDDING_DIMENSION),
            ollama_url: vars
                .optional("OLLAMA_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            chunk_size: positive("RAG_CHUNK_SIZE", vars.parsed("RAG_CHUNK_SIZE")?)?
                .unwrap_or(DEFAULT_CHUNK_SIZE),
            top_k: positive("RAG_TOP_K", vars.parsed("RAG_TOP_K")?)?.unwrap_or(DEFAULT_TOP_K),
            server_port: vars.parsed("SERVER_PORT")?,
        })
    }

    /// Return the Pinecone credentials, failing when either value is absent.
    pub fn pinecone_settings(&self) -> Result<(&str, &str), ConfigError> {
        let api_key = self
            .pinecone_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVariable("PINECONE_API_KEY".to_string()))?;
        let host = self
            .pinecone_index_host
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVariable("PINECONE_INDEX_HOST".to_string()))?;
        Ok((api_key, host))
    }
}

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        self.optional(key)
            .map(|value| {
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string()))
            })
            .transpose()
    }
}

fn positive(key: &str, value: Option<usize>) -> Result<Option<usize>, ConfigError> {
    match value {
        Some(0) => Err(ConfigError::InvalidValue(key.to_string())),
        other => Ok(other),
    }
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fastembed" | "local" => Ok(Self::FastEmbed),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the configuration installed by [`init_config`].
pub fn get_config() -> Result<&'static Config, ConfigError> {
    CONFIG.get().ok_or(ConfigError::NotInitialized)
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        groq_base_url = %config.groq_base_url,
        groq_model = %config.groq_model,
        embedding_provider = ?config.embedding_provider,
        embedding_model = %config.embedding_model,
        chunk_size = config.chunk_size,
        top_k = config.top_k,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    Ok(CONFIG.get_or_init(|| config))
}
