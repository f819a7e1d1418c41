use super::{EmbeddingClient, EmbeddingClientError, WARM_UP_TEXT};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;

/// Sentence-embedding model running in-process through ONNX Runtime.
///
/// Weights are read-only after [`LocalEmbeddingClient::load`], so a single instance is shared by
/// every request. Encoding is CPU-bound and runs on the blocking thread pool.
pub struct LocalEmbeddingClient {
    model: Arc<TextEmbedding>,
    model_name: String,
    dimension: usize,
}

impl LocalEmbeddingClient {
    /// Load (downloading on first use) the named model and record its output dimension.
    ///
    /// Blocks while the weights load and a warm-up string is encoded.
    pub fn load(model_name: &str) -> Result<Self, EmbeddingClientError> {
        let load_error = |reason: String| EmbeddingClientError::ModelLoad {
            model: model_name.to_string(),
            reason,
        };
        let model_kind = resolve_model(model_name)?;
        let model = TextEmbedding::try_new(
            InitOptions::new(model_kind).with_show_download_progress(false),
        )
        .map_err(|error| load_error(error.to_string()))?;
        let dimension = model
            .embed(vec![WARM_UP_TEXT], None)
            .map_err(|error| load_error(error.to_string()))?
            .first()
            .map(Vec::len)
            .ok_or_else(|| load_error("warm-up produced no embedding".to_string()))?;
        tracing::debug!(model = model_name, dimension, "Local embedding model loaded");

        Ok(Self {
            model: Arc::new(model),
            model_name: model_name.to_string(),
            dimension,
        })
    }
}

fn resolve_model(name: &str) -> Result<EmbeddingModel, EmbeddingClientError> {
    let normalized = name
        .trim()
        .trim_start_matches("sentence-transformers/")
        .to_lowercase();
    match normalized.as_str() {
        "all-minilm-l6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "all-minilm-l12-v2" => Ok(EmbeddingModel::AllMiniLML12V2),
        "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        _ => Err(EmbeddingClientError::ModelLoad {
            model: name.to_string(),
            reason: "unsupported local embedding model".to_string(),
        }),
    }
}

#[async_trait]
impl EmbeddingClient for LocalEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            model = %self.model_name,
            inputs = texts.len(),
            "Generating local embeddings"
        );
        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || model.embed(texts, None))
            .await
            .map_err(|error| EmbeddingClientError::GenerationFailed(error.to_string()))?
            .map_err(|error| EmbeddingClientError::GenerationFailed(error.to_string()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
