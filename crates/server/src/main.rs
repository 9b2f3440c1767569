use clap::{Parser, ValueEnum};
use ragserve_core::config;
use ragserve_core::{Bm25Config, CorpusHandle, DistanceMetric, FusionConfig, FusionMethod};
use ragserve_server::api::create_router;
use ragserve_server::api::handlers::AppState;
use ragserve_server::api::metrics;
use ragserve_server::embedding::{Embedder, OllamaEmbedder};
use ragserve_server::generation::{GenerationConfig, Generator, OllamaGenerator, OpenAiGenerator};
use ragserve_server::ingest;
use ragserve_server::rag::RagService;
use ragserve_server::retriever::{build_retriever, RetrievalMode};
use ragserve_server::store::SqliteStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GeneratorKind {
    Ollama,
    Openai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FusionKind {
    Minmax,
    Rrf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MetricKind {
    Euclidean,
    Cosine,
}

#[derive(Parser)]
#[command(name = "ragserve", about = "Retrieval-augmented question answering server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// SQLite database path for documents and QA history
    #[arg(long, default_value = "data/ragserve.db")]
    db_path: PathBuf,

    /// Semicolon-delimited FAQ file to (re)load the corpus from at startup
    #[arg(long)]
    faq_csv: Option<PathBuf>,

    /// Treat the first FAQ row as a header
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    csv_has_header: bool,

    /// Retrieval strategy
    #[arg(long, value_enum, default_value_t = RetrievalMode::Sparse)]
    mode: RetrievalMode,

    /// Weight of the sparse side in hybrid fusion (0.0 = dense only, 1.0 = sparse only)
    #[arg(long, default_value_t = config::FUSION_ALPHA)]
    alpha: f32,

    /// Hybrid fusion method
    #[arg(long, value_enum, default_value_t = FusionKind::Minmax)]
    fusion: FusionKind,

    /// BM25 term frequency saturation parameter
    #[arg(long, default_value_t = config::BM25_K1)]
    bm25_k1: f32,

    /// BM25 document length normalization parameter
    #[arg(long, default_value_t = config::BM25_B)]
    bm25_b: f32,

    /// Distance metric for dense retrieval
    #[arg(long, value_enum, default_value_t = MetricKind::Euclidean)]
    metric: MetricKind,

    /// Base URL of the embedding backend (required for dense and hybrid modes)
    #[arg(long, default_value = "http://localhost:11434")]
    embedding_url: String,

    /// Embedding model name
    #[arg(long, default_value = "all-minilm")]
    embedding_model: String,

    /// Expected embedding dimension
    #[arg(long, default_value_t = 384)]
    embedding_dim: usize,

    /// Embedding request timeout in seconds
    #[arg(long, default_value_t = config::EMBEDDING_TIMEOUT_SECS)]
    embedding_timeout: u64,

    /// Generation backend kind
    #[arg(long, value_enum, default_value_t = GeneratorKind::Ollama)]
    generator: GeneratorKind,

    /// Base URL of the generation backend
    #[arg(long, default_value = "http://localhost:11434")]
    generator_url: String,

    /// Generation model name
    #[arg(long, default_value = "gemma3:4b")]
    generator_model: String,

    /// Generation request timeout in seconds
    #[arg(long, default_value_t = config::GENERATION_TIMEOUT_SECS)]
    generation_timeout: u64,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.2)]
    temperature: f32,

    /// Nucleus sampling cutoff
    #[arg(long, default_value_t = 1.0)]
    top_p: f32,

    /// Maximum tokens per generated answer
    #[arg(long, default_value_t = 256)]
    max_tokens: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(
                    "ragserve_server=info"
                        .parse()
                        .expect("valid directive literal"),
                )
                .add_directive(
                    "ragserve_core=info"
                        .parse()
                        .expect("valid directive literal"),
                ),
        )
        .init();

    let args = Args::parse();

    if args.port == 0 {
        eprintln!("Error: port must be > 0");
        std::process::exit(1);
    }
    if !(0.0..=1.0).contains(&args.alpha) {
        eprintln!("Error: alpha must be in [0.0, 1.0]");
        std::process::exit(1);
    }

    let prometheus_handle =
        metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    let store = Arc::new(SqliteStore::open(&args.db_path)?);
    let handle = Arc::new(CorpusHandle::new());

    let metric = match args.metric {
        MetricKind::Euclidean => DistanceMetric::SquaredEuclidean,
        MetricKind::Cosine => DistanceMetric::Cosine,
    };
    let bm25 = Bm25Config {
        k1: args.bm25_k1,
        b: args.bm25_b,
    };
    let fusion = FusionConfig {
        alpha: args.alpha,
        method: match args.fusion {
            FusionKind::Minmax => FusionMethod::MinMax,
            FusionKind::Rrf => FusionMethod::Rrf,
        },
        ..FusionConfig::default()
    };

    // Dense and hybrid modes need an embedding backend; sparse runs without one.
    let embedder: Option<Arc<dyn Embedder>> = match args.mode {
        RetrievalMode::Sparse => None,
        RetrievalMode::Dense | RetrievalMode::Hybrid => Some(Arc::new(OllamaEmbedder::new(
            &args.embedding_url,
            &args.embedding_model,
            args.embedding_dim,
            Duration::from_secs(args.embedding_timeout),
        )?)),
    };

    let generation_config = GenerationConfig {
        model: args.generator_model.clone(),
        temperature: args.temperature,
        top_p: args.top_p,
        max_tokens: args.max_tokens,
        timeout: Duration::from_secs(args.generation_timeout),
    };
    let generator: Arc<dyn Generator> = match args.generator {
        GeneratorKind::Ollama => Arc::new(OllamaGenerator::new(
            &args.generator_url,
            generation_config,
        )?),
        GeneratorKind::Openai => {
            let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
                eprintln!("Error: OPENAI_API_KEY must be set for the openai generator");
                std::process::exit(1);
            });
            Arc::new(OpenAiGenerator::new(
                &args.generator_url,
                &api_key,
                generation_config,
            )?)
        }
    };

    match ingest::bootstrap(
        &store,
        &handle,
        embedder.as_deref(),
        args.faq_csv.as_deref(),
        args.csv_has_header,
        bm25,
        metric,
    )
    .await
    {
        Ok(count) => metrics::update_corpus_metrics(count, true),
        Err(err) => {
            // Readiness is reported through /health; the server still starts
            // so the corpus can be fixed and reindexed without a restart.
            tracing::error!(error = %err, "initial corpus build failed");
            metrics::update_corpus_metrics(0, false);
        }
    }

    let retriever = build_retriever(args.mode, Arc::clone(&handle), embedder.clone(), fusion)?;
    let rag = Arc::new(RagService::new(
        retriever,
        generator,
        Arc::clone(&store) as _,
        Arc::clone(&handle),
    ));

    let state = AppState {
        rag,
        handle,
        store,
        embedder,
        bm25,
        metric,
        prometheus_handle,
        start_time: Instant::now(),
    };
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    tracing::info!(addr = %addr, mode = ?args.mode, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_signal())
        .await?;

    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }

    tracing::info!("Shutting down gracefully, draining in-flight requests...");
}
