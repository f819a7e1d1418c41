//! Request pipelines: document summarization and PDF question answering.

pub mod chunking;
pub mod pdf;
mod rag;
mod summarize;
pub mod types;

pub use rag::{DEFAULT_TOP_K, RagService, RagSettings};
pub use summarize::DocumentService;
pub use types::{
    ChunkingError, DocumentInsights, DocumentRequest, PdfAnswer, PdfError, PdfQuestion,
    PipelineError, ServiceError, TextChunk,
};
