#![deny(missing_docs)]

//! Document insight and PDF question-answering services.

/// HTTP routing and handlers for both services.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Chat-completion client for the hosted LLM.
pub mod llm;
/// Structured logging and tracing setup.
pub mod logging;
/// Request counters.
pub mod metrics;
/// Pinecone vector store integration.
pub mod pinecone;
/// Summarization and retrieval pipelines.
pub mod processing;
