//! Retrieval-augmented question answering over an uploaded PDF.
//!
//! Each request gets a fresh vector-store namespace. The PDF's chunks are embedded and upserted
//! there, the question is matched against them, and the namespace is cleared before the response
//! is returned, on success and failure alike. The namespace-scoped stage runs in its own task so a
//! dropped client connection cannot skip the cleanup.

use crate::{
    embedding::EmbeddingClient,
    llm::{self, ChatClient, ChatMessage, ChatRequest},
    metrics::ServiceMetrics,
    pinecone::{RecordMetadata, SearchMatch, VectorRecord, VectorStore},
    processing::{
        chunking::{DEFAULT_CHUNK_SIZE, chunk_words},
        pdf::{extract_text, is_pdf_filename},
        types::{PdfAnswer, PdfQuestion, PipelineError, ServiceError, TextChunk},
    },
};
use std::sync::Arc;
use uuid::Uuid;

/// Chunks retrieved as context when `RAG_TOP_K` is not set.
pub const DEFAULT_TOP_K: usize = 3;

const GROUNDING_INSTRUCTIONS: &str = "You are a precise research assistant. Answer the user's \
question using only the document context below. If the context does not contain enough \
information to answer, say that the document does not provide the answer instead of guessing.";

/// Tunables for the retrieval pipeline.
#[derive(Debug, Clone)]
pub struct RagSettings {
    /// Chat model identifier.
    pub model: String,
    /// Words per chunk.
    pub chunk_size: usize,
    /// Chunks retrieved per question.
    pub top_k: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            model: llm::DEFAULT_MODEL.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Answers questions about uploaded PDFs using request-scoped vector namespaces.
///
/// Cloning is cheap; every collaborator sits behind an `Arc`.
#[derive(Clone)]
pub struct RagService {
    embedder: Arc<dyn EmbeddingClient>,
    store: Arc<dyn VectorStore>,
    llm: Arc<dyn ChatClient>,
    settings: RagSettings,
    metrics: Arc<ServiceMetrics>,
}

impl RagService {
    /// Assemble the pipeline from its shared clients.
    pub fn new(
        embedder: Arc<dyn EmbeddingClient>,
        store: Arc<dyn VectorStore>,
        llm: Arc<dyn ChatClient>,
        settings: RagSettings,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            embedder,
            store,
            llm,
            settings,
            metrics,
        }
    }

    /// Counters shared with the HTTP surface.
    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    /// Validate the upload, run retrieval in a fresh namespace, and return the grounded answer.
    pub async fn ask(&self, request: PdfQuestion) -> Result<PdfAnswer, ServiceError> {
        let result = self.run(request).await;
        match &result {
            Ok(answer) => self.metrics.record_answer(answer.analyzed_chunks as u64),
            Err(_) => self.metrics.record_failure(),
        }
        result
    }

    async fn run(&self, request: PdfQuestion) -> Result<PdfAnswer, ServiceError> {
        let PdfQuestion {
            filename,
            bytes,
            question,
        } = request;

        if !is_pdf_filename(&filename) {
            return Err(ServiceError::Validation(
                "Only PDF files are supported.".into(),
            ));
        }
        if question.trim().is_empty() {
            return Err(ServiceError::Validation("Question cannot be empty.".into()));
        }

        tracing::info!(filename = %filename, bytes = bytes.len(), "Extracting PDF text");
        let text = tokio::task::spawn_blocking(move || extract_text(&bytes))
            .await
            .map_err(|error| ServiceError::Internal(format!("PDF extraction task failed: {error}")))??;

        let chunks = chunk_words(&text, self.settings.chunk_size)
            .map_err(|error| pipeline_failure(error.into()))?;
        let chunk_count = chunks.len();
        let namespace = new_namespace();
        tracing::info!(
            filename = %filename,
            namespace = %namespace,
            chunks = chunk_count,
            "Answering question from PDF"
        );

        let service = self.clone();
        let scoped_question = question.clone();
        let answer = tokio::spawn(async move {
            service
                .answer_in_namespace(namespace, chunks, scoped_question)
                .await
        })
        .await
        .map_err(|error| ServiceError::Internal(format!("RAG pipeline task failed: {error}")))?
        .map_err(pipeline_failure)?;

        Ok(PdfAnswer {
            filename,
            question,
            answer,
            analyzed_chunks: chunk_count,
            model_used: llm::model_label(&self.settings.model),
        })
    }

    /// Run the namespace-scoped stages and always clear the namespace afterwards.
    async fn answer_in_namespace(
        &self,
        namespace: String,
        chunks: Vec<TextChunk>,
        question: String,
    ) -> Result<String, PipelineError> {
        let outcome = self.retrieve_and_answer(&namespace, chunks, &question).await;
        let cleanup = self.store.delete_all(&namespace).await;

        match (outcome, cleanup) {
            (Ok(answer), Ok(())) => {
                tracing::debug!(namespace = %namespace, "Namespace cleaned up");
                Ok(answer)
            }
            (Ok(_), Err(error)) => {
                tracing::error!(namespace = %namespace, error = %error, "Namespace cleanup failed");
                Err(error.into())
            }
            (Err(error), Ok(())) => Err(error),
            (Err(error), Err(cleanup_error)) => {
                tracing::warn!(
                    namespace = %namespace,
                    error = %cleanup_error,
                    "Namespace cleanup failed after pipeline error"
                );
                Err(error)
            }
        }
    }

    async fn retrieve_and_answer(
        &self,
        namespace: &str,
        chunks: Vec<TextChunk>,
        question: &str,
    ) -> Result<String, PipelineError> {
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = self.embedder.generate_embeddings(texts).await?;
        if vectors.len() != chunks.len() {
            return Err(PipelineError::EmbeddingCount {
                expected: chunks.len(),
                actual: vectors.len(),
            });
        }

        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, values)| VectorRecord {
                id: format!("chunk-{}", chunk.index),
                values,
                metadata: RecordMetadata { text: chunk.text },
            })
            .collect();
        let written = self.store.upsert(namespace, records).await?;
        tracing::debug!(namespace, records = written, "Chunks upserted");

        let query_vector = self
            .embedder
            .generate_embeddings(vec![question.to_string()])
            .await?
            .pop()
            .ok_or(PipelineError::EmbeddingCount {
                expected: 1,
                actual: 0,
            })?;
        let matches = self
            .store
            .query(namespace, query_vector, self.settings.top_k)
            .await?;
        tracing::debug!(namespace, matches = matches.len(), "Context retrieved");

        let request = ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage::system(grounding_prompt(&build_context(&matches))),
                ChatMessage::user(question),
            ],
            temperature: llm::DEFAULT_TEMPERATURE,
        };
        Ok(self.llm.complete(request).await?)
    }
}

fn new_namespace() -> String {
    format!("pdf-{}", Uuid::new_v4())
}

/// Join retrieved chunk texts, best match first, separated by blank lines.
pub(crate) fn build_context(matches: &[SearchMatch]) -> String {
    matches
        .iter()
        .map(|hit| hit.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn grounding_prompt(context: &str) -> String {
    format!("{GROUNDING_INSTRUCTIONS}\n\nContext:\n{context}")
}

fn pipeline_failure(error: PipelineError) -> ServiceError {
    tracing::error!(error = %error, "RAG pipeline failed");
    ServiceError::Upstream(format!("RAG pipeline failed: {error}"))
}
