//! Core data types and error definitions for the processing pipelines.

use crate::{
    embedding::EmbeddingClientError, llm::LlmClientError, pinecone::VectorStoreError,
};
use serde::Deserialize;
use thiserror::Error;

/// Summary length requested when the caller omits `max_summary_length`.
pub const DEFAULT_MAX_SUMMARY_LENGTH: usize = 150;

/// Errors produced while splitting text into word chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Caller configured an impossible chunk size.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Errors produced while reading text out of a PDF.
#[derive(Debug, Error)]
pub enum PdfError {
    /// Bytes did not parse as a PDF document.
    #[error("Could not read the uploaded PDF: {0}")]
    Parse(String),
    /// Document parsed but no page carried extractable text.
    #[error("No readable text found in the PDF.")]
    NoText,
}

/// Failures that can occur inside the RAG pipeline after validation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Chunking step failed.
    #[error(transparent)]
    Chunking(#[from] ChunkingError),
    /// Embedding provider failed.
    #[error(transparent)]
    Embedding(#[from] EmbeddingClientError),
    /// Vector store call failed.
    #[error(transparent)]
    VectorStore(#[from] VectorStoreError),
    /// Chat completion failed.
    #[error(transparent)]
    Llm(#[from] LlmClientError),
    /// Embedding provider returned fewer vectors than inputs.
    #[error("expected {expected} embeddings, got {actual}")]
    EmbeddingCount {
        /// Number of texts submitted.
        expected: usize,
        /// Number of vectors returned.
        actual: usize,
    },
}

/// Error taxonomy surfaced by both services and mapped onto HTTP status codes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Caller input was rejected before any external call.
    #[error("{0}")]
    Validation(String),
    /// An external dependency (LLM, embedding model, vector store) failed.
    #[error("{0}")]
    Upstream(String),
    /// Unexpected in-process failure.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable lowercase label used in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Upstream(_) => "upstream",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<PdfError> for ServiceError {
    fn from(error: PdfError) -> Self {
        Self::Validation(error.to_string())
    }
}

/// Title/content payload submitted to `POST /process-document`.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRequest {
    /// Document title, echoed in the response.
    pub title: String,
    /// Body text to analyze.
    pub content: String,
    /// Advisory word limit passed to the model.
    #[serde(default = "default_max_summary_length")]
    pub max_summary_length: usize,
}

fn default_max_summary_length() -> usize {
    DEFAULT_MAX_SUMMARY_LENGTH
}

/// Result of a document summarization.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInsights {
    /// Title copied from the request.
    pub title: String,
    /// Model-generated insights.
    pub insights: String,
    /// Human-readable model label.
    pub model_used: String,
}

/// Contiguous run of words produced by the chunker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Zero-based position of the chunk in the document.
    pub index: usize,
    /// Words joined by single spaces.
    pub text: String,
}

/// Uploaded PDF plus the question to answer from it.
#[derive(Debug, Clone)]
pub struct PdfQuestion {
    /// Client-supplied filename.
    pub filename: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
    /// Natural-language question.
    pub question: String,
}

/// Result of a PDF question-answering request.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfAnswer {
    /// Filename copied from the upload.
    pub filename: String,
    /// Question copied from the request.
    pub question: String,
    /// Model-generated answer grounded in the retrieved chunks.
    pub answer: String,
    /// Number of chunks the document was split into.
    pub analyzed_chunks: usize,
    /// Human-readable model label.
    pub model_used: String,
}
