#![allow(dead_code)]

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use research_backend::{
    embedding::{EmbeddingClient, EmbeddingClientError},
    llm::{ChatClient, ChatRequest, ChatRole, LlmClientError},
    metrics::ServiceMetrics,
    pinecone::{SearchMatch, VectorRecord, VectorStore, VectorStoreError},
    processing::{RagService, RagSettings},
};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Barrier, Mutex};

pub const DIMENSION: usize = 64;

/// Deterministic bag-of-bytes embedder; identical text always maps to the same unit vector.
pub struct HashingEmbedder;

impl HashingEmbedder {
    fn encode(text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; DIMENSION];
        for (idx, byte) in text.bytes().enumerate() {
            embedding[(idx + usize::from(byte)) % DIMENSION] += f32::from(byte) / 255.0;
        }
        let norm = embedding.iter().map(|value| value * value).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }
        embedding
    }
}

#[async_trait]
impl EmbeddingClient for HashingEmbedder {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        Ok(texts.iter().map(|text| Self::encode(text)).collect())
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }
}

fn unavailable(operation: &str) -> VectorStoreError {
    VectorStoreError::UnexpectedStatus {
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: format!("{operation} unavailable"),
    }
}

/// Namespaced in-memory store with cosine ranking.
#[derive(Default)]
pub struct MemoryStore {
    namespaces: Mutex<HashMap<String, Vec<VectorRecord>>>,
    seen: Mutex<Vec<String>>,
    delete_attempts: Mutex<Vec<String>>,
    upsert_barrier: Option<Barrier>,
    fail_upserts: bool,
    fail_deletes: bool,
}

impl MemoryStore {
    /// Store whose upserts wait until `parties` requests have all written their chunks.
    pub fn with_upsert_barrier(parties: usize) -> Self {
        Self {
            upsert_barrier: Some(Barrier::new(parties)),
            ..Default::default()
        }
    }

    /// Store that keeps the written records but reports every upsert as failed, like a
    /// multi-batch write that dies after its first batch.
    pub fn failing_upserts() -> Self {
        Self {
            fail_upserts: true,
            ..Default::default()
        }
    }

    /// Store whose namespace deletes always fail and leave the records in place.
    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Default::default()
        }
    }

    pub async fn delete_attempts(&self) -> Vec<String> {
        self.delete_attempts.lock().await.clone()
    }

    pub async fn live_namespaces(&self) -> Vec<String> {
        self.namespaces.lock().await.keys().cloned().collect()
    }

    pub async fn seen_namespaces(&self) -> Vec<String> {
        self.seen.lock().await.clone()
    }
}

fn cosine(left: &[f32], right: &[f32]) -> f32 {
    let dot: f32 = left.iter().zip(right).map(|(a, b)| a * b).sum();
    let norm = |values: &[f32]| values.iter().map(|v| v * v).sum::<f32>().sqrt();
    let denominator = norm(left) * norm(right);
    if denominator == 0.0 { 0.0 } else { dot / denominator }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn upsert(
        &self,
        namespace: &str,
        records: Vec<VectorRecord>,
    ) -> Result<usize, VectorStoreError> {
        let count = records.len();
        {
            let mut namespaces = self.namespaces.lock().await;
            let stored = namespaces.entry(namespace.to_string()).or_default();
            for record in records {
                stored.retain(|existing| existing.id != record.id);
                stored.push(record);
            }
        }
        self.seen.lock().await.push(namespace.to_string());
        if self.fail_upserts {
            return Err(unavailable("upsert"));
        }
        if let Some(barrier) = &self.upsert_barrier {
            barrier.wait().await;
        }
        Ok(count)
    }

    async fn query(
        &self,
        namespace: &str,
        vector: Vec<f32>,
        top_k: usize,
    ) -> Result<Vec<SearchMatch>, VectorStoreError> {
        let namespaces = self.namespaces.lock().await;
        let mut matches: Vec<SearchMatch> = namespaces
            .get(namespace)
            .map(|records| {
                records
                    .iter()
                    .map(|record| SearchMatch {
                        id: record.id.clone(),
                        score: cosine(&record.values, &vector),
                        text: record.metadata.text.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn delete_all(&self, namespace: &str) -> Result<(), VectorStoreError> {
        self.delete_attempts.lock().await.push(namespace.to_string());
        if self.fail_deletes {
            return Err(unavailable("delete"));
        }
        self.namespaces.lock().await.remove(namespace);
        Ok(())
    }
}

/// Chat client that answers with the system prompt it received, or fails on demand.
#[derive(Default)]
pub struct EchoContextChat {
    pub fail: bool,
    pub delay: Option<Duration>,
}

impl EchoContextChat {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ChatClient for EchoContextChat {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmClientError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(LlmClientError::GenerationFailed("Groq returned 500".into()));
        }
        Ok(request
            .messages
            .iter()
            .find(|message| message.role == ChatRole::System)
            .map(|message| message.content.clone())
            .unwrap_or_default())
    }
}

pub fn rag_service(store: Arc<MemoryStore>, chat: EchoContextChat, chunk_size: usize) -> RagService {
    RagService::new(
        Arc::new(HashingEmbedder),
        store,
        Arc::new(chat),
        RagSettings {
            chunk_size,
            ..RagSettings::default()
        },
        Arc::new(ServiceMetrics::new()),
    )
}

/// Build an in-memory PDF with one text page per entry.
///
/// Mirrors the unit-test builder in `processing::pdf`, which integration tests cannot reach
/// because it only exists under `cfg(test)` in the library.
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        }
        .encode()
        .expect("encode content");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save pdf");
    bytes
}
