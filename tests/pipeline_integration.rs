//! Integration tests for the ArtifactCreated -> ArtifactPublished pipeline.
//!
//! These tests verify the end-to-end flow:
//! 1. An ArtifactCreated payload reaches `PublishArtifactHandler`
//! 2. The artifact is searched through the real `ArtifactoryClient`
//! 3. A single match produces one ArtifactPublished payload on the bus
//!
//! Artifactory is replaced by a local axum server; the bus is in-memory.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use serde_json::{json, Value};

use eiffelactory::adapters::{ArtifactoryClient, InMemoryEventBus};
use eiffelactory::application::{PipelineOutcome, PublishArtifactHandler};
use eiffelactory::config::ArtifactoryConfig;
use eiffelactory::domain::eiffel::{contains_null_member, ArtifactPublishedEvent, EventFilter};
use eiffelactory::domain::foundation::ErrorCode;

// =============================================================================
// Test Infrastructure
// =============================================================================

#[derive(Debug, Clone)]
struct RecordedRequest {
    content_type: Option<String>,
    authorization: Option<String>,
    body: String,
}

/// Canned Artifactory search endpoint
struct FakeArtifactory {
    status: StatusCode,
    body: String,
    delay: Option<Duration>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeArtifactory {
    fn answering(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn with_results(results: Value) -> Self {
        Self::answering(StatusCode::OK, json!({ "results": results }).to_string())
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn search(
    State(fake): State<Arc<FakeArtifactory>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    fake.requests.lock().unwrap().push(RecordedRequest {
        content_type: header_value(header::CONTENT_TYPE),
        authorization: header_value(header::AUTHORIZATION),
        body,
    });

    if let Some(delay) = fake.delay {
        tokio::time::sleep(delay).await;
    }
    (fake.status, fake.body.clone())
}

/// Serves `fake` on an ephemeral port and returns the repository base URL.
async fn serve(fake: Arc<FakeArtifactory>) -> String {
    let app = Router::new()
        .route("/artifactory/api/search/aql/", post(search))
        .with_state(fake);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/artifactory", addr)
}

struct Pipeline {
    handler: PublishArtifactHandler,
    bus: Arc<InMemoryEventBus>,
    base_url: String,
}

fn pipeline(base_url: &str, timeout_secs: u64) -> Pipeline {
    let mut config = ArtifactoryConfig::default();
    config.url = base_url.to_string();
    config.username = "reader".to_string();
    config.timeout_secs = timeout_secs;
    let config = config.with_password("reader-password");

    let repository = Arc::new(ArtifactoryClient::new(&config).unwrap());
    let bus = Arc::new(InMemoryEventBus::new());
    let handler = PublishArtifactHandler::new(EventFilter::allow_all(), repository, bus.clone());

    Pipeline {
        handler,
        bus,
        base_url: base_url.to_string(),
    }
}

fn artifact_created(id: &str) -> Value {
    json!({
        "meta": {
            "id": id,
            "type": "EiffelArtifactCreatedEvent",
            "version": "3.0.0",
            "time": 1_600_000_000_000_i64,
            "source": { "name": "JENKINS_EIFFEL_BROADCASTER" }
        },
        "data": {
            "identity": "pkg:job/eiffelactory/job/build/7/artifacts/artifact.txt@7"
        },
        "links": []
    })
}

fn without_id_and_time(mut payload: Value) -> Value {
    let meta = payload["meta"].as_object_mut().unwrap();
    meta.remove("id");
    meta.remove("time");
    payload
}

// =============================================================================
// Resolution outcomes
// =============================================================================

#[tokio::test]
async fn single_match_publishes_event_linked_to_inbound() {
    let fake = Arc::new(FakeArtifactory::with_results(json!([
        { "repo": "repo", "path": "eiffelactory", "name": "artifact.txt" }
    ])));
    let base_url = serve(fake.clone()).await;
    let p = pipeline(&base_url, 5);

    let outcome = p.handler.process(artifact_created("ac-7")).await.unwrap();

    assert!(matches!(outcome, PipelineOutcome::Published(_)));
    let published = p.bus.published_events();
    assert_eq!(published.len(), 1);

    let payload = &published[0];
    assert_eq!(payload["meta"]["type"], "EiffelArtifactPublishedEvent");
    assert_eq!(payload["meta"]["version"], "3.0.0");
    assert_eq!(payload["links"], json!([{ "type": "ARTIFACT", "target": "ac-7" }]));
    assert_eq!(
        payload["data"]["locations"],
        json!([{
            "type": "ARTIFACTORY",
            "uri": format!("{}/repo/eiffelactory/artifact.txt", p.base_url)
        }])
    );
    assert!(!contains_null_member(payload));
}

#[tokio::test]
async fn query_is_sent_as_plain_text_with_basic_auth() {
    let fake = Arc::new(FakeArtifactory::with_results(json!([])));
    let base_url = serve(fake.clone()).await;
    let p = pipeline(&base_url, 5);

    p.handler.process(artifact_created("ac-7")).await.unwrap();

    let requests = fake.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.content_type.as_deref(), Some("text/plain"));
    assert!(request
        .authorization
        .as_deref()
        .is_some_and(|a| a.starts_with("Basic ")));
    assert!(request.body.contains(r#"{"artifact.name":"artifact.txt"}"#));
    assert!(request.body.contains("*job/eiffelactory/job/build/7*"));
}

#[tokio::test]
async fn zero_matches_publish_nothing() {
    let fake = Arc::new(FakeArtifactory::with_results(json!([])));
    let base_url = serve(fake).await;
    let p = pipeline(&base_url, 5);

    let outcome = p.handler.process(artifact_created("ac-7")).await.unwrap();

    assert_eq!(outcome, PipelineOutcome::NotFound);
    assert_eq!(p.bus.event_count(), 0);
}

#[tokio::test]
async fn two_matches_are_an_anomaly_and_publish_nothing() {
    let fake = Arc::new(FakeArtifactory::with_results(json!([
        { "repo": "repo-a", "path": "p", "name": "artifact.txt" },
        { "repo": "repo-b", "path": "p", "name": "artifact.txt" }
    ])));
    let base_url = serve(fake).await;
    let p = pipeline(&base_url, 5);

    let err = p.handler.process(artifact_created("ac-7")).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::AmbiguousMatch);
    assert_eq!(err.details.get("count").map(String::as_str), Some("2"));
    assert_eq!(p.bus.event_count(), 0);
}

// =============================================================================
// Repository failures
// =============================================================================

#[tokio::test]
async fn error_status_is_treated_as_not_found() {
    let fake = Arc::new(FakeArtifactory::answering(
        StatusCode::BAD_REQUEST,
        "Failed to parse query",
    ));
    let base_url = serve(fake).await;
    let p = pipeline(&base_url, 5);

    let outcome = p.handler.process(artifact_created("ac-7")).await.unwrap();

    assert_eq!(outcome, PipelineOutcome::NotFound);
    assert_eq!(p.bus.event_count(), 0);
}

#[tokio::test]
async fn unreadable_success_body_is_a_query_failure() {
    let fake = Arc::new(FakeArtifactory::answering(StatusCode::OK, "<html>login</html>"));
    let base_url = serve(fake).await;
    let p = pipeline(&base_url, 5);

    let err = p.handler.process(artifact_created("ac-7")).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::RepositoryQueryFailed);
    assert!(err.message.contains("invalid repository response"));
}

#[tokio::test]
async fn unreachable_repository_is_a_query_failure() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let p = pipeline(&format!("http://{}/artifactory", addr), 5);

    let err = p.handler.process(artifact_created("ac-7")).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::RepositoryQueryFailed);
    assert_eq!(p.bus.event_count(), 0);
}

#[tokio::test]
async fn slow_repository_times_out() {
    let fake = Arc::new(
        FakeArtifactory::with_results(json!([])).with_delay(Duration::from_secs(3)),
    );
    let base_url = serve(fake).await;
    let p = pipeline(&base_url, 1);

    let err = p.handler.process(artifact_created("ac-7")).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::RepositoryQueryFailed);
    assert!(err.message.contains("timed out after 1s"));
}

// =============================================================================
// Output properties
// =============================================================================

#[tokio::test]
async fn reprocessing_yields_the_same_event_apart_from_id_and_time() {
    let fake = Arc::new(FakeArtifactory::with_results(json!([
        { "repo": "repo", "path": "eiffelactory", "name": "artifact.txt" }
    ])));
    let base_url = serve(fake).await;
    let p = pipeline(&base_url, 5);

    p.handler.process(artifact_created("ac-7")).await.unwrap();
    p.handler.process(artifact_created("ac-7")).await.unwrap();

    let published = p.bus.published_events();
    assert_eq!(published.len(), 2);
    assert_ne!(published[0]["meta"]["id"], published[1]["meta"]["id"]);
    assert_eq!(
        without_id_and_time(published[0].clone()),
        without_id_and_time(published[1].clone())
    );
}

#[tokio::test]
async fn published_payload_decodes_back_to_the_event() {
    let fake = Arc::new(FakeArtifactory::with_results(json!([
        { "repo": "repo", "path": "eiffelactory", "name": "artifact.txt" }
    ])));
    let base_url = serve(fake).await;
    let p = pipeline(&base_url, 5);

    let outcome = p.handler.process(artifact_created("ac-7")).await.unwrap();
    let event = match outcome {
        PipelineOutcome::Published(event) => event,
        other => panic!("expected publish, got {:?}", other),
    };

    let decoded = ArtifactPublishedEvent::from_wire(p.bus.published_events()[0].clone()).unwrap();
    assert_eq!(decoded, event);
}

#[tokio::test]
async fn delivery_through_the_bus_reaches_the_handler() {
    let fake = Arc::new(FakeArtifactory::with_results(json!([
        { "repo": "repo", "path": "eiffelactory", "name": "artifact.txt" }
    ])));
    let base_url = serve(fake).await;
    let p = pipeline(&base_url, 5);
    let bus = p.bus.clone();
    bus.subscribe(Arc::new(p.handler));

    bus.deliver(artifact_created("ac-7")).await.unwrap();

    assert!(bus.has_event("EiffelArtifactPublishedEvent"));
}
