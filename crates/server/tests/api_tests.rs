use async_trait::async_trait;
use ragserve_core::{Bm25Config, CorpusHandle, DistanceMetric, Document};
use ragserve_server::api::create_router;
use ragserve_server::api::handlers::AppState;
use ragserve_server::generation::{GenerationError, Generator};
use ragserve_server::ingest;
use ragserve_server::rag::RagService;
use ragserve_server::retriever::SparseRetriever;
use ragserve_server::store::SqliteStore;
use reqwest::Client;
use std::sync::Arc;
use tempfile::TempDir;

/// Deterministic generator: answers with the number of context documents so
/// tests can see what retrieval fed it without a model backend.
struct CountingGenerator;

#[async_trait]
impl Generator for CountingGenerator {
    async fn generate(
        &self,
        question: &str,
        contexts: &[Arc<Document>],
    ) -> Result<String, GenerationError> {
        Ok(format!(
            "answered '{}' using {} context docs",
            question,
            contexts.len()
        ))
    }
}

async fn spawn_app(corpus: &[&str]) -> (String, Arc<SqliteStore>, TempDir) {
    let tmp_dir = TempDir::new().expect("Failed to create temp dir");
    let store =
        Arc::new(SqliteStore::open(&tmp_dir.path().join("ragserve.db")).expect("open store"));
    let handle = Arc::new(CorpusHandle::new());

    if !corpus.is_empty() {
        let texts: Vec<String> = corpus.iter().map(|s| s.to_string()).collect();
        store.replace_documents(&texts).expect("seed documents");
        ingest::rebuild_corpus(
            &store,
            &handle,
            None,
            Bm25Config::default(),
            DistanceMetric::default(),
        )
        .await
        .expect("build corpus");
    }

    let prometheus_handle =
        match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
            Ok(handle) => handle,
            Err(_) => metrics_exporter_prometheus::PrometheusBuilder::new()
                .build_recorder()
                .handle(),
        };

    let rag = Arc::new(RagService::new(
        Arc::new(SparseRetriever::new(Arc::clone(&handle))),
        Arc::new(CountingGenerator),
        Arc::clone(&store) as _,
        Arc::clone(&handle),
    ));

    let state = AppState {
        rag,
        handle,
        store: Arc::clone(&store),
        embedder: None,
        bm25: Bm25Config::default(),
        metric: DistanceMetric::default(),
        prometheus_handle,
        start_time: std::time::Instant::now(),
    };

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (base_url, store, tmp_dir)
}

fn faq_corpus() -> Vec<&'static str> {
    vec![
        "How do I get a refund? Contact support within thirty days of purchase.",
        "What are the shipping times? Orders arrive within five business days.",
        "How do I reset my password? Open account settings and choose reset password.",
    ]
}

fn client() -> Client {
    Client::new()
}

#[tokio::test]
async fn test_ask_returns_relevant_source() {
    let (base_url, _store, _tmp) = spawn_app(&faq_corpus()).await;

    let resp = client()
        .post(format!("{}/ask", base_url))
        .json(&serde_json::json!({"question": "How do I reset my password?", "k": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    let sources = body["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0]["id"], 3);
    assert!(sources[0]["score"].as_f64().unwrap() > 0.0);
    assert_eq!(
        body["answer"],
        "answered 'How do I reset my password?' using 1 context docs"
    );
}

#[tokio::test]
async fn test_ask_clamps_oversized_k() {
    let (base_url, _store, _tmp) = spawn_app(&faq_corpus()).await;

    let resp = client()
        .post(format!("{}/ask", base_url))
        .json(&serde_json::json!({"question": "refund shipping password", "k": 50}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["sources"].as_array().unwrap().len() <= 3);
}

#[tokio::test]
async fn test_ask_rejects_blank_question() {
    let (base_url, _store, _tmp) = spawn_app(&faq_corpus()).await;

    let resp = client()
        .post(format!("{}/ask", base_url))
        .json(&serde_json::json!({"question": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_ask_before_first_index_is_unavailable() {
    let (base_url, _store, _tmp) = spawn_app(&[]).await;

    let resp = client()
        .post(format!("{}/ask", base_url))
        .json(&serde_json::json!({"question": "anything"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);
}

#[tokio::test]
async fn test_health_reports_readiness() {
    let (ready_url, _store, _tmp) = spawn_app(&faq_corpus()).await;
    let resp = client()
        .get(format!("{}/health", ready_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["ready"], true);
    assert_eq!(body["documents"], 3);

    let (unready_url, _store2, _tmp2) = spawn_app(&[]).await;
    let resp = client()
        .get(format!("{}/health", unready_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["ready"], false);
}

#[tokio::test]
async fn test_history_records_answered_questions() {
    let (base_url, _store, _tmp) = spawn_app(&faq_corpus()).await;

    // The question shares terms with the password and refund entries, so
    // retrieval at k=2 yields two context documents.
    client()
        .post(format!("{}/ask", base_url))
        .json(&serde_json::json!({"question": "How do I reset my password?", "k": 2}))
        .send()
        .await
        .unwrap();

    let resp = client()
        .get(format!("{}/history?limit=10", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["question"], "How do I reset my password?");
    assert!(items[0]["answer"]
        .as_str()
        .unwrap()
        .contains("2 context docs"));
    assert_eq!(items[0]["source_ids"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_reindex_picks_up_new_documents() {
    let (base_url, store, _tmp) = spawn_app(&faq_corpus()).await;

    let mut texts: Vec<String> = faq_corpus().iter().map(|s| s.to_string()).collect();
    texts.push("Do you ship internationally? Yes, to most countries.".to_string());
    store.replace_documents(&texts).unwrap();

    let resp = client()
        .post(format!("{}/admin/reindex", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["documents"], 4);

    let resp = client()
        .get(format!("{}/health", base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["documents"], 4);
}

#[tokio::test]
async fn test_metrics_endpoint_renders() {
    let (base_url, _store, _tmp) = spawn_app(&faq_corpus()).await;

    let resp = client()
        .get(format!("{}/metrics", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}
