use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe request counters shared by both services.
#[derive(Default)]
pub struct ServiceMetrics {
    documents_processed: AtomicU64,
    questions_answered: AtomicU64,
    chunks_embedded: AtomicU64,
    failures: AtomicU64,
}

impl ServiceMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully summarized document.
    pub fn record_document(&self) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an answered PDF question and the number of chunks embedded for it.
    pub fn record_answer(&self, chunk_count: u64) {
        self.questions_answered.fetch_add(1, Ordering::Relaxed);
        self.chunks_embedded
            .fetch_add(chunk_count, Ordering::Relaxed);
    }

    /// Record a request that ended in an error response.
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            questions_answered: self.questions_answered.load(Ordering::Relaxed),
            chunks_embedded: self.chunks_embedded.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of the request counters, served by `GET /metrics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents summarized since startup.
    pub documents_processed: u64,
    /// PDF questions answered since startup.
    pub questions_answered: u64,
    /// Total chunks embedded across all answered questions.
    pub chunks_embedded: u64,
    /// Requests that returned an error.
    pub failures: u64,
}
