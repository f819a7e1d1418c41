//! HTTP surface for both services.
//!
//! - Summarization router: `GET /`, `POST /process-document`, `GET /metrics`.
//! - PDF router: `GET /`, `POST /ask-pdf` (multipart `file` + `question`), `GET /metrics`.
//!
//! Errors are rendered as `{"detail": ..., "kind": ...}` with 400 for validation failures and
//! 500 for upstream or internal ones.

use crate::metrics::MetricsSnapshot;
use crate::processing::{DocumentRequest, DocumentService, PdfQuestion, RagService, ServiceError};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;

/// Largest accepted `/ask-pdf` upload.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the router for the document summarization service.
pub fn summarize_router(service: Arc<DocumentService>) -> Router {
    Router::new()
        .route("/", get(summarize_health))
        .route("/process-document", post(process_document))
        .route("/metrics", get(summarize_metrics))
        .with_state(service)
}

/// Build the router for the PDF question-answering service.
pub fn pdf_router(service: Arc<RagService>) -> Router {
    Router::new()
        .route("/", get(pdf_health))
        .route("/ask-pdf", post(ask_pdf))
        .route("/metrics", get(pdf_metrics))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(service)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

async fn summarize_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "operational",
        message: "Groq AI Backend is live.",
    })
}

async fn pdf_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "operational",
        message: "PDF RAG Backend is live.",
    })
}

/// Success response for `POST /process-document`.
#[derive(Serialize)]
struct DocumentResponse {
    success: bool,
    document_title: String,
    insights: String,
    model_used: String,
}

async fn process_document(
    State(service): State<Arc<DocumentService>>,
    Json(request): Json<DocumentRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    let insights = service.process_document(request).await?;
    Ok(Json(DocumentResponse {
        success: true,
        document_title: insights.title,
        insights: insights.insights,
        model_used: insights.model_used,
    }))
}

/// Success response for `POST /ask-pdf`.
#[derive(Serialize)]
struct AskPdfResponse {
    success: bool,
    filename: String,
    question: String,
    answer: String,
    analyzed_chunks: usize,
    model_used: String,
}

/// Read the `file` and `question` parts, then hand them to the RAG pipeline.
async fn ask_pdf(
    State(service): State<Arc<RagService>>,
    mut multipart: Multipart,
) -> Result<Json<AskPdfResponse>, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut question: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(invalid_form)?;
                upload = Some((filename, bytes.to_vec()));
            }
            "question" => question = Some(field.text().await.map_err(invalid_form)?),
            other => tracing::debug!(field = other, "Ignoring unexpected form field"),
        }
    }

    let (filename, bytes) = upload.ok_or_else(|| {
        ServiceError::Validation("Missing form field: file".into())
    })?;
    let question = question.ok_or_else(|| {
        ServiceError::Validation("Missing form field: question".into())
    })?;

    let answer = service
        .ask(PdfQuestion {
            filename,
            bytes,
            question,
        })
        .await?;
    Ok(Json(AskPdfResponse {
        success: true,
        filename: answer.filename,
        question: answer.question,
        answer: answer.answer,
        analyzed_chunks: answer.analyzed_chunks,
        model_used: answer.model_used,
    }))
}

fn invalid_form(error: axum::extract::multipart::MultipartError) -> ServiceError {
    ServiceError::Validation(format!("Invalid multipart form: {error}"))
}

async fn summarize_metrics(State(service): State<Arc<DocumentService>>) -> Json<MetricsSnapshot> {
    Json(service.metrics().snapshot())
}

async fn pdf_metrics(State(service): State<Arc<RagService>>) -> Json<MetricsSnapshot> {
    Json(service.metrics().snapshot())
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
    kind: &'static str,
}

struct AppError(ServiceError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Upstream(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody {
            kind: self.0.kind(),
            detail: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(inner: ServiceError) -> Self {
        Self(inner)
    }
}
