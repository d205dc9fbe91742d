//! Integration tests for the consume loop driving the bridge handler.
//!
//! Deliveries are fed from an in-process stream instead of a broker; the
//! repository and bus are in-memory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use serde_json::{json, Value};
use tokio::sync::watch;

use eiffelactory::adapters::rabbitmq::{consume, BusError, ConsumeStats, InboundDelivery};
use eiffelactory::adapters::{InMemoryArtifactRepository, InMemoryEventBus};
use eiffelactory::application::PublishArtifactHandler;
use eiffelactory::domain::artifact::{ArtifactIdentifier, RepositoryMatch};
use eiffelactory::domain::eiffel::EventFilter;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestDelivery {
    body: Vec<u8>,
    acks: Arc<AtomicUsize>,
}

#[async_trait]
impl InboundDelivery for TestDelivery {
    fn body(&self) -> &[u8] {
        &self.body
    }

    async fn ack(self) -> Result<(), BusError> {
        self.acks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Harness {
    repository: Arc<InMemoryArtifactRepository>,
    bus: Arc<InMemoryEventBus>,
    handler: Arc<PublishArtifactHandler>,
    acks: Arc<AtomicUsize>,
}

impl Harness {
    fn new(filter: EventFilter) -> Self {
        let repository = Arc::new(InMemoryArtifactRepository::new("https://af.example.com/artifactory"));
        let bus = Arc::new(InMemoryEventBus::new());
        let handler = Arc::new(PublishArtifactHandler::new(
            filter,
            repository.clone(),
            bus.clone(),
        ));
        Self {
            repository,
            bus,
            handler,
            acks: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn delivery(&self, payload: &Value) -> Result<TestDelivery, String> {
        Ok(TestDelivery {
            body: serde_json::to_vec(payload).unwrap(),
            acks: self.acks.clone(),
        })
    }

    fn raw_delivery(&self, body: &[u8]) -> Result<TestDelivery, String> {
        Ok(TestDelivery {
            body: body.to_vec(),
            acks: self.acks.clone(),
        })
    }

    /// Consumes `deliveries`, then stops on the shutdown signal.
    async fn run(&self, deliveries: Vec<Result<TestDelivery, String>>) -> ConsumeStats {
        let expected = deliveries.len();
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(consume(
            stream::iter(deliveries).chain(stream::pending()),
            self.handler.clone(),
            rx,
        ));

        while self.acks.load(Ordering::SeqCst) < expected {
            tokio::task::yield_now().await;
        }
        tx.send(true).unwrap();
        task.await.unwrap().unwrap()
    }
}

fn artifact_created(id: &str, source: &str, filename: &str) -> Value {
    json!({
        "meta": {
            "id": id,
            "type": "EiffelArtifactCreatedEvent",
            "source": { "name": source }
        },
        "data": {
            "identity": format!("pkg:job/app/12/artifacts/{}@12", filename)
        }
    })
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn mixed_traffic_is_acked_and_only_matches_are_published() {
    let h = Harness::new(EventFilter::with_allowed_sources(["CI"]));
    h.repository.store(
        ArtifactIdentifier::new("found.zip", "job/app/12"),
        RepositoryMatch::new("releases", "app/12", "found.zip"),
    );

    let mut other_type = artifact_created("x-1", "CI", "found.zip");
    other_type["meta"]["type"] = json!("EiffelActivityStartedEvent");

    let deliveries = vec![
        h.delivery(&artifact_created("ac-1", "CI", "found.zip")),
        h.delivery(&artifact_created("ac-2", "CI", "missing.zip")),
        h.delivery(&artifact_created("ac-3", "ELSEWHERE", "found.zip")),
        h.delivery(&other_type),
        h.raw_delivery(b"{ not json"),
    ];

    let stats = h.run(deliveries).await;

    assert_eq!(stats.delivered, 5);
    assert_eq!(stats.failed, 1);
    assert_eq!(h.acks.load(Ordering::SeqCst), 5);
    assert_eq!(h.repository.query_count(), 2);

    let published = h.bus.published_events();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0]["links"][0]["target"], "ac-1");
    assert_eq!(
        published[0]["data"]["locations"][0]["uri"],
        "https://af.example.com/artifactory/releases/app/12/found.zip"
    );
}

#[tokio::test]
async fn double_encoded_body_is_processed() {
    let h = Harness::new(EventFilter::allow_all());
    h.repository.store(
        ArtifactIdentifier::new("found.zip", "job/app/12"),
        RepositoryMatch::new("releases", "app/12", "found.zip"),
    );

    let inner = artifact_created("ac-1", "CI", "found.zip").to_string();
    let deliveries = vec![h.delivery(&Value::String(inner))];

    let stats = h.run(deliveries).await;

    assert_eq!(stats.failed, 0);
    assert_eq!(h.bus.event_count(), 1);
}

#[tokio::test]
async fn publish_failure_does_not_stop_the_loop() {
    let h = Harness::new(EventFilter::allow_all());
    h.repository.store(
        ArtifactIdentifier::new("found.zip", "job/app/12"),
        RepositoryMatch::new("releases", "app/12", "found.zip"),
    );
    h.bus
        .fail_next(eiffelactory::ports::PublishError::RetriesExhausted {
            attempts: 31,
            last_error: "connection reset".into(),
        });

    let deliveries = vec![
        h.delivery(&artifact_created("ac-1", "CI", "found.zip")),
        h.delivery(&artifact_created("ac-2", "CI", "found.zip")),
    ];

    let stats = h.run(deliveries).await;

    assert_eq!(stats, ConsumeStats { delivered: 2, failed: 1 });
    assert_eq!(h.bus.event_count(), 1);
    assert_eq!(h.bus.published_events()[0]["links"][0]["target"], "ac-2");
}
