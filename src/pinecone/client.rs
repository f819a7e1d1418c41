//! HTTP client wrapper for the Pinecone data plane.

use crate::pinecone::VectorStore;
use crate::pinecone::types::{
    DeleteAllRequest, QueryRequest, QueryResponse, SearchMatch, UpsertRequest, UpsertResponse,
    VectorRecord, VectorStoreError,
};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};

const API_VERSION: &str = "2024-10";
const UPSERT_BATCH_SIZE: usize = 100;

/// Lightweight HTTP client for a single Pinecone index.
pub struct PineconeService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PineconeService {
    /// Construct a client for the index served at `index_host`.
    ///
    /// Hosts copied from the Pinecone console lack a scheme; `https://` is assumed for those.
    pub fn new(index_host: &str, api_key: &str) -> Result<Self, VectorStoreError> {
        let client = Client::builder()
            .user_agent("research-backend/0.1")
            .build()?;
        let base_url = normalize_base_url(index_host).map_err(VectorStoreError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            has_api_key = !api_key.is_empty(),
            "Initialized Pinecone HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        self.client
            .request(method, url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    async fn failure(response: reqwest::Response) -> VectorStoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        VectorStoreError::UnexpectedStatus { status, body }
    }
}

#[async_trait]
impl VectorStore for PineconeService {
    async fn upsert(
        &self,
        namespace: &str,
        records: Vec<VectorRecord>,
    ) -> Result<usize, VectorStoreError> {
        let mut written = 0;
        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            let response = self
                .request(Method::POST, "vectors/upsert")
                .json(&UpsertRequest {
                    vectors: batch,
                    namespace,
                })
                .send()
                .await?;

            if !response.status().is_success() {
                let error = Self::failure(response).await;
                tracing::error!(namespace, error = %error, "Pinecone upsert failed");
                return Err(error);
            }

            let body: UpsertResponse = response.json().await?;
            written += body.upserted_count.unwrap_or(batch.len());
        }

        tracing::debug!(namespace, records = written, "Vectors upserted");
        Ok(written)
    }

    async fn query(
        &self,
        namespace: &str,
        vector: Vec<f32>,
        top_k: usize,
    ) -> Result<Vec<SearchMatch>, VectorStoreError> {
        let response = self
            .request(Method::POST, "query")
            .json(&QueryRequest {
                namespace,
                vector: &vector,
                top_k,
                include_metadata: true,
                include_values: false,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let error = Self::failure(response).await;
            tracing::error!(namespace, error = %error, "Pinecone query failed");
            return Err(error);
        }

        let body: QueryResponse = response.json().await?;
        Ok(body
            .matches
            .into_iter()
            .map(|hit| SearchMatch {
                id: hit.id,
                score: hit.score,
                text: hit
                    .metadata
                    .and_then(|metadata| metadata.text)
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn delete_all(&self, namespace: &str) -> Result<(), VectorStoreError> {
        let response = self
            .request(Method::POST, "vectors/delete")
            .json(&DeleteAllRequest {
                delete_all: true,
                namespace,
            })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                tracing::debug!(namespace, "Namespace cleared");
                Ok(())
            }
            // Namespace never materialized or was already removed.
            StatusCode::NOT_FOUND => Ok(()),
            _ => {
                let error = Self::failure(response).await;
                tracing::error!(namespace, error = %error, "Pinecone delete failed");
                Err(error)
            }
        }
    }
}

fn normalize_base_url(host: &str) -> Result<String, String> {
    let trimmed = host.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let mut parsed = reqwest::Url::parse(&with_scheme).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
