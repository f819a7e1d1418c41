//! Pinecone vector store integration.
//!
//! The PDF pipeline only needs three data-plane calls, all scoped to a namespace: upsert, top-k
//! query, and delete-all. [`VectorStore`] is the seam the pipeline depends on; [`PineconeService`]
//! is the HTTP implementation.

pub mod client;
pub mod types;

use async_trait::async_trait;

pub use client::PineconeService;
pub use types::{RecordMetadata, SearchMatch, VectorRecord, VectorStoreError};

/// Namespaced vector storage used by the retrieval pipeline.
///
/// Implementations must never return records from a namespace other than the one queried.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace `records` (by id) in `namespace`, returning the number written.
    async fn upsert(
        &self,
        namespace: &str,
        records: Vec<VectorRecord>,
    ) -> Result<usize, VectorStoreError>;

    /// Return up to `top_k` records nearest to `vector`, best match first.
    async fn query(
        &self,
        namespace: &str,
        vector: Vec<f32>,
        top_k: usize,
    ) -> Result<Vec<SearchMatch>, VectorStoreError>;

    /// Remove every record stored under `namespace`.
    async fn delete_all(&self, namespace: &str) -> Result<(), VectorStoreError>;
}
