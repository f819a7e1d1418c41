mod common;

use common::{EchoContextChat, MemoryStore, build_pdf, rag_service};
use research_backend::{
    pinecone::VectorStore,
    processing::{PdfQuestion, ServiceError},
};
use std::sync::Arc;
use std::time::Duration;

fn question(filename: &str, bytes: Vec<u8>, question: &str) -> PdfQuestion {
    PdfQuestion {
        filename: filename.into(),
        bytes,
        question: question.into(),
    }
}

#[tokio::test]
async fn successful_answer_clears_its_namespace() {
    let store = Arc::new(MemoryStore::default());
    let service = rag_service(store.clone(), EchoContextChat::default(), 5);
    let pdf = build_pdf(&[
        "Photosynthesis converts light into chemical energy",
        "Chlorophyll absorbs mostly blue and red light",
    ]);

    let answer = service
        .ask(question("biology.pdf", pdf, "What does chlorophyll absorb?"))
        .await
        .expect("answer");

    assert_eq!(answer.filename, "biology.pdf");
    assert_eq!(answer.analyzed_chunks, 3);
    assert!(answer.answer.contains("Context:"));
    assert!(answer.answer.contains("Chlorophyll"));
    assert_eq!(answer.model_used, "openai/gpt-oss-120b (Groq)");

    let seen = store.seen_namespaces().await;
    assert_eq!(seen.len(), 1);
    assert!(store.live_namespaces().await.is_empty());
    let leftovers = store
        .query(&seen[0], vec![1.0; common::DIMENSION], 10)
        .await
        .expect("query");
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn failed_inference_still_clears_namespace() {
    let store = Arc::new(MemoryStore::default());
    let service = rag_service(store.clone(), EchoContextChat::failing(), 500);
    let pdf = build_pdf(&["Quantum tunneling lets particles cross barriers"]);

    let error = service
        .ask(question("physics.pdf", pdf, "What is tunneling?"))
        .await
        .expect_err("inference failure");

    match error {
        ServiceError::Upstream(message) => assert!(message.starts_with("RAG pipeline failed:")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.seen_namespaces().await.len(), 1);
    assert!(store.live_namespaces().await.is_empty());
    assert_eq!(service.metrics().snapshot().failures, 1);
}

#[tokio::test]
async fn cleanup_failure_after_answer_fails_the_request() {
    let store = Arc::new(MemoryStore::failing_deletes());
    let service = rag_service(store.clone(), EchoContextChat::default(), 500);
    let pdf = build_pdf(&["Mitochondria are the powerhouse of the cell"]);

    let error = service
        .ask(question("cells.pdf", pdf, "What are mitochondria?"))
        .await
        .expect_err("cleanup failure");

    match error {
        ServiceError::Upstream(message) => {
            assert!(message.starts_with("RAG pipeline failed:"));
            assert!(message.contains("delete unavailable"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.delete_attempts().await, store.seen_namespaces().await);
    let snapshot = service.metrics().snapshot();
    assert_eq!(snapshot.failures, 1);
    assert_eq!(snapshot.questions_answered, 0);
}

#[tokio::test]
async fn pipeline_error_wins_over_cleanup_error() {
    let store = Arc::new(MemoryStore::failing_deletes());
    let service = rag_service(store.clone(), EchoContextChat::failing(), 500);
    let pdf = build_pdf(&["Plate tectonics shape continents"]);

    let error = service
        .ask(question("geology.pdf", pdf, "What shapes continents?"))
        .await
        .expect_err("inference failure");

    match error {
        ServiceError::Upstream(message) => {
            assert!(message.contains("Groq returned 500"));
            assert!(!message.contains("delete unavailable"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.delete_attempts().await.len(), 1);
}

#[tokio::test]
async fn failed_upsert_still_clears_namespace() {
    let store = Arc::new(MemoryStore::failing_upserts());
    let service = rag_service(store.clone(), EchoContextChat::default(), 500);
    let pdf = build_pdf(&["Volcanoes release magma and gas"]);

    let error = service
        .ask(question("volcano.pdf", pdf, "What do volcanoes release?"))
        .await
        .expect_err("upsert failure");

    match error {
        ServiceError::Upstream(message) => assert!(message.contains("upsert unavailable")),
        other => panic!("unexpected error: {other:?}"),
    }
    let seen = store.seen_namespaces().await;
    assert_eq!(seen.len(), 1);
    assert_eq!(store.delete_attempts().await, seen);
    assert!(store.live_namespaces().await.is_empty());
}

#[tokio::test]
async fn abandoned_request_still_clears_namespace() {
    let store = Arc::new(MemoryStore::default());
    let service = rag_service(
        store.clone(),
        EchoContextChat::slow(Duration::from_millis(200)),
        500,
    );
    let pdf = build_pdf(&["Glaciers carve valleys over millennia"]);

    {
        // Drop the request once its chunks are stored, while the model is still answering.
        let ask = service.ask(question("ice.pdf", pdf, "What carves valleys?"));
        tokio::pin!(ask);
        loop {
            tokio::select! {
                _ = &mut ask => panic!("answer arrived before the caller gave up"),
                _ = tokio::time::sleep(Duration::from_millis(10)) => {
                    if !store.seen_namespaces().await.is_empty() {
                        break;
                    }
                }
            }
        }
    }

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while store.delete_attempts().await.is_empty() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "namespace was never cleared"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(store.seen_namespaces().await.len(), 1);
    assert!(store.live_namespaces().await.is_empty());
}

#[tokio::test]
async fn non_pdf_upload_never_touches_the_store() {
    let store = Arc::new(MemoryStore::default());
    let service = rag_service(store.clone(), EchoContextChat::default(), 500);

    let error = service
        .ask(question("slides.pptx", build_pdf(&["text"]), "Anything?"))
        .await
        .expect_err("validation");

    assert_eq!(
        error,
        ServiceError::Validation("Only PDF files are supported.".into())
    );
    assert!(store.seen_namespaces().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_requests_are_isolated_by_namespace() {
    // Both requests finish upserting before either queries, so their chunks coexist in the store.
    let store = Arc::new(MemoryStore::with_upsert_barrier(2));
    let service = rag_service(store.clone(), EchoContextChat::default(), 3);

    let first = service.ask(question(
        "alpha.pdf",
        build_pdf(&["alpha aardvark anteater", "alpha albatross alligator"]),
        "Which animals start with a?",
    ));
    let second = service.ask(question(
        "beta.pdf",
        build_pdf(&["beta bison buffalo", "beta badger barracuda"]),
        "Which animals start with b?",
    ));
    let (first, second) = tokio::join!(first, second);
    let first = first.expect("first answer");
    let second = second.expect("second answer");

    let seen = store.seen_namespaces().await;
    assert_eq!(seen.len(), 2);
    assert_ne!(seen[0], seen[1]);

    assert!(first.answer.contains("aardvark"));
    assert!(!first.answer.contains("beta"));
    assert!(second.answer.contains("bison"));
    assert!(!second.answer.contains("alpha"));

    assert!(store.live_namespaces().await.is_empty());
}
