//! Document summarization: one prompt, one chat completion.

use crate::{
    llm::{self, ChatClient, ChatMessage, ChatRequest},
    metrics::ServiceMetrics,
    processing::types::{DocumentInsights, DocumentRequest, ServiceError},
};
use std::sync::Arc;

/// Turns a title/content payload into model-generated insights.
pub struct DocumentService {
    llm: Arc<dyn ChatClient>,
    model: String,
    metrics: Arc<ServiceMetrics>,
}

impl DocumentService {
    /// Build the service around a shared chat client.
    pub fn new(llm: Arc<dyn ChatClient>, model: String, metrics: Arc<ServiceMetrics>) -> Self {
        Self {
            llm,
            model,
            metrics,
        }
    }

    /// Counters shared with the HTTP surface.
    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    /// Validate the request, prompt the model, and return its insights.
    ///
    /// `max_summary_length` is passed to the model as an instruction only; the reply length is
    /// not checked.
    pub async fn process_document(
        &self,
        request: DocumentRequest,
    ) -> Result<DocumentInsights, ServiceError> {
        let result = self.summarize(request).await;
        match &result {
            Ok(_) => self.metrics.record_document(),
            Err(_) => self.metrics.record_failure(),
        }
        result
    }

    async fn summarize(&self, request: DocumentRequest) -> Result<DocumentInsights, ServiceError> {
        let DocumentRequest {
            title,
            content,
            max_summary_length,
        } = request;

        if content.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Document content cannot be empty.".into(),
            ));
        }

        tracing::info!(
            title = %title,
            characters = content.len(),
            max_summary_length,
            "Processing document"
        );
        let chat = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(system_prompt(max_summary_length)),
                ChatMessage::user(format!("Title: {title}\n\nContent: {content}")),
            ],
            temperature: llm::DEFAULT_TEMPERATURE,
        };

        let insights = self.llm.complete(chat).await.map_err(|error| {
            tracing::error!(error = %error, "Document inference failed");
            ServiceError::Upstream(format!("AI Inference failed: {error}"))
        })?;

        tracing::info!(title = %title, "Document processed");
        Ok(DocumentInsights {
            title,
            insights,
            model_used: llm::model_label(&self.model),
        })
    }
}

fn system_prompt(max_words: usize) -> String {
    format!(
        "You are an elite AI research assistant. Your job is to read the provided text \
         and extract the core scientific or technical insights. \
         Keep your response concise, professional, and strictly under {max_words} words."
    )
}
