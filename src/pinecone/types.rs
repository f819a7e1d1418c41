//! Shared types used by the Pinecone client and the vector store abstraction.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned while interacting with the vector store.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    /// Index host failed to parse or normalize.
    #[error("Invalid index host: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The store responded with an unexpected status code.
    #[error("Unexpected vector store response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the store.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// Metadata stored beside each vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Chunk text the vector was computed from.
    pub text: String,
}

/// Vector written into a namespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorRecord {
    /// Identifier, unique within the namespace.
    pub id: String,
    /// Embedding values.
    pub values: Vec<f32>,
    /// Stored payload.
    pub metadata: RecordMetadata,
}

/// Scored record returned by a similarity query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMatch {
    /// Identifier of the matching record.
    pub id: String,
    /// Similarity score computed by the store.
    pub score: f32,
    /// Chunk text recovered from metadata, empty when the record had none.
    pub text: String,
}

#[derive(Serialize)]
pub(crate) struct UpsertRequest<'a> {
    pub(crate) vectors: &'a [VectorRecord],
    pub(crate) namespace: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpsertResponse {
    #[serde(default)]
    pub(crate) upserted_count: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryRequest<'a> {
    pub(crate) namespace: &'a str,
    pub(crate) vector: &'a [f32],
    pub(crate) top_k: usize,
    pub(crate) include_metadata: bool,
    pub(crate) include_values: bool,
}

#[derive(Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub(crate) matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
pub(crate) struct QueryMatch {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) score: f32,
    #[serde(default)]
    pub(crate) metadata: Option<QueryMetadata>,
}

#[derive(Deserialize)]
pub(crate) struct QueryMetadata {
    #[serde(default)]
    pub(crate) text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeleteAllRequest<'a> {
    pub(crate) delete_all: bool,
    pub(crate) namespace: &'a str,
}
