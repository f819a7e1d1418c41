use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use research_backend::{
    api,
    config,
    embedding, llm, logging,
    metrics::ServiceMetrics,
    pinecone::PineconeService,
    processing::{DocumentService, RagService, RagSettings},
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(
    name = "research-backend",
    about = "Serve the document insight or PDF question-answering API"
)]
struct Cli {
    /// Which service to run.
    #[arg(long, value_enum, default_value_t = ServiceKind::Summarize)]
    service: ServiceKind,
    /// Port to bind; overrides `SERVER_PORT`.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ServiceKind {
    /// `POST /process-document`
    Summarize,
    /// `POST /ask-pdf`
    PdfQa,
}

impl ServiceKind {
    fn name(self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::PdfQa => "pdf-qa",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init_config().context("failed to load configuration")?;
    logging::init_tracing(cli.service.name());

    let metrics = Arc::new(ServiceMetrics::new());
    let chat = Arc::new(
        llm::GroqChatClient::new(config.groq_base_url.clone(), config.groq_api_key.clone())
            .context("failed to build Groq client")?,
    );

    let app = match cli.service {
        ServiceKind::Summarize => api::summarize_router(Arc::new(DocumentService::new(
            chat,
            config.groq_model.clone(),
            metrics,
        ))),
        ServiceKind::PdfQa => {
            api::pdf_router(Arc::new(build_rag_service(chat, metrics).await?))
        }
    };

    let (listener, port) = bind_listener(cli.port.or(config.server_port))
        .await
        .context("failed to bind listener")?;
    tracing::info!(service = cli.service.name(), "Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app)
        .await
        .context("server terminated unexpectedly")?;
    Ok(())
}

async fn build_rag_service(
    chat: Arc<llm::GroqChatClient>,
    metrics: Arc<ServiceMetrics>,
) -> Result<RagService> {
    let config = config::get_config()?;
    let (api_key, index_host) = config.pinecone_settings()?;
    let store =
        PineconeService::new(index_host, api_key).context("failed to build Pinecone client")?;
    let embedder = embedding::build_embedding_client(config)
        .await
        .context("failed to initialize embedding model")?;

    Ok(RagService::new(
        embedder,
        Arc::new(store),
        chat,
        RagSettings {
            model: config.groq_model.clone(),
            chunk_size: config.chunk_size,
            top_k: config.top_k,
        },
        metrics,
    ))
}

async fn bind_listener(port: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = port {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 8000..=8099;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 8000-8099",
    ))
}
