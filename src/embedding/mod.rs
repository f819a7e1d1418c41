//! Embedding client abstraction and adapters.
//!
//! The PDF pipeline embeds chunks and questions through [`EmbeddingClient`]. Two backends exist:
//! an in-process sentence-transformers model loaded through `fastembed` (the default) and an
//! Ollama runtime reached over HTTP. Either way the model is loaded and probed once at startup;
//! a failure there aborts the process instead of surfacing per request.

mod local;
mod ollama;

pub use local::LocalEmbeddingClient;
pub use ollama::OllamaEmbeddingClient;

use crate::config::{Config, EmbeddingProvider};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

const WARM_UP_TEXT: &str = "embedding warm-up";

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// The model could not be loaded or reached at startup.
    #[error("Failed to load embedding model '{model}': {reason}")]
    ModelLoad {
        /// Model identifier we attempted to load.
        model: String,
        /// Provider-specific failure description.
        reason: String,
    },
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
    /// Returned embedding dimension does not match configuration.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension configured for the vector index.
        expected: usize,
        /// Dimension actually produced by the model.
        actual: usize,
    },
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce one embedding vector per supplied text, in input order.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;

    /// Length of every vector this client produces.
    fn dimension(&self) -> usize;
}

/// Build the configured embedding client and confirm it yields vectors of the expected size.
pub async fn build_embedding_client(
    config: &Config,
) -> Result<Arc<dyn EmbeddingClient>, EmbeddingClientError> {
    tracing::info!(
        provider = ?config.embedding_provider,
        model = %config.embedding_model,
        "Initializing embedding client"
    );
    let client: Arc<dyn EmbeddingClient> = match config.embedding_provider {
        EmbeddingProvider::FastEmbed => {
            let model = config.embedding_model.clone();
            let loaded = tokio::task::spawn_blocking(move || LocalEmbeddingClient::load(&model))
                .await
                .map_err(|error| EmbeddingClientError::ModelLoad {
                    model: config.embedding_model.clone(),
                    reason: error.to_string(),
                })??;
            Arc::new(loaded)
        }
        EmbeddingProvider::Ollama => Arc::new(OllamaEmbeddingClient::new(
            config.ollama_url.clone(),
            config.embedding_model.clone(),
            config.embedding_dimension,
        )?),
    };

    verify_dimension(client.as_ref(), config.embedding_dimension)
        .await
        .map_err(|error| match error {
            EmbeddingClientError::GenerationFailed(reason) => EmbeddingClientError::ModelLoad {
                model: config.embedding_model.clone(),
                reason,
            },
            other => other,
        })?;
    tracing::info!(
        dimension = config.embedding_dimension,
        "Embedding client initialized"
    );
    Ok(client)
}

/// Check the client's declared dimension against `expected`, then embed a warm-up string and
/// confirm the model actually produces vectors of that length.
pub async fn verify_dimension(
    client: &dyn EmbeddingClient,
    expected: usize,
) -> Result<(), EmbeddingClientError> {
    let declared = client.dimension();
    if declared != expected {
        return Err(EmbeddingClientError::DimensionMismatch {
            expected,
            actual: declared,
        });
    }

    let vectors = client
        .generate_embeddings(vec![WARM_UP_TEXT.to_string()])
        .await?;
    let actual = vectors.first().map(Vec::len).unwrap_or(0);
    if actual != declared {
        return Err(EmbeddingClientError::DimensionMismatch {
            expected: declared,
            actual,
        });
    }
    Ok(())
}
