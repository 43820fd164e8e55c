//! Nomad event stream client against an in-process HTTP server.

mod support;

use std::sync::Arc;
use std::time::Duration;

use overseer::adapter::outbound::nomad::{NomadSource, StreamState};
use overseer::adapter::outbound::sqlite::SqliteCursorStore;
use overseer::domain::DeploymentEvent;
use overseer::infrastructure::config::nomad::NomadConfig;
use overseer::port::outbound::cursor::CursorStore;
use overseer::port::outbound::source::EventSource;
use overseer::testkit;
use overseer::testkit::nomad::{deployment_frame, docker_task, frame, heartbeat, job_registered_json};
use serde_json::json;
use tokio::sync::{mpsc, watch};

use support::nomad::{FakeNomad, Reply};
use support::temp_db::TempDb;

fn source_for(server: &FakeNomad) -> NomadSource {
    NomadSource::new(&testkit::config::nomad(&server.address()), testkit::config::reconnection())
        .unwrap()
}

async fn next_event(events: &mut mpsc::Receiver<DeploymentEvent>) -> DeploymentEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("queue closed unexpectedly")
}

#[tokio::test]
async fn subscribes_with_token_and_topic_filter() {
    let server = FakeNomad::start(vec![Reply::stream(vec![deployment_frame(
        5,
        "prod",
        "checkout",
        "web",
        "registry.example/checkout:2.3.1",
    )])])
    .await;
    let source = source_for(&server);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut events = source.stream_events(shutdown_rx).await.unwrap();
    let event = next_event(&mut events).await;

    assert_eq!(event.deployment_name.as_str(), "prod.checkout.web.checkout");
    assert_eq!(event.version.as_str(), "2.3.1");
    assert_eq!(event.id.as_str(), "checkout");

    let requests = server.requests();
    assert_eq!(requests[0].target, "/v1/event/stream?topic=Job");
    assert_eq!(requests[0].header("X-Nomad-Token"), Some("test-token"));
}

#[tokio::test]
async fn no_token_header_without_token() {
    let server = FakeNomad::start(vec![Reply::stream(vec![heartbeat()])]).await;
    let config = NomadConfig {
        address: server.address(),
        token: Some("   ".into()),
        ..Default::default()
    };
    let source = NomadSource::new(&config, testkit::config::reconnection()).unwrap();
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let _events = source.stream_events(shutdown_rx).await.unwrap();
    let requests = server.wait_for_requests(1).await;

    assert_eq!(requests[0].header("X-Nomad-Token"), None);
}

#[tokio::test]
async fn malformed_frame_does_not_end_the_stream() {
    let server = FakeNomad::start(vec![Reply::stream(vec![
        deployment_frame(1, "prod", "checkout", "web", "svc:1.0.0"),
        "{\"Index\":2,\"Events\":[}\n".to_string(),
        deployment_frame(3, "prod", "checkout", "web", "svc:1.0.1"),
    ])])
    .await;
    let source = source_for(&server);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut events = source.stream_events(shutdown_rx).await.unwrap();

    assert_eq!(next_event(&mut events).await.version.as_str(), "1.0.0");
    assert_eq!(next_event(&mut events).await.version.as_str(), "1.0.1");
    assert_eq!(server.requests().len(), 1, "no reconnect expected");
}

#[tokio::test]
async fn frame_split_across_chunks_is_reassembled() {
    let body = deployment_frame(1, "prod", "checkout", "web", "svc:4.2");
    let (head, tail) = body.split_at(body.len() / 2);
    let server =
        FakeNomad::start(vec![Reply::stream(vec![head.to_string(), tail.to_string()])]).await;
    let source = source_for(&server);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut events = source.stream_events(shutdown_rx).await.unwrap();

    assert_eq!(next_event(&mut events).await.version.as_str(), "4.2");
}

#[tokio::test]
async fn reconnects_after_peer_closes_and_resumes_after_last_index() {
    let server = FakeNomad::start(vec![
        Reply::closing(vec![deployment_frame(10, "prod", "checkout", "web", "svc:1")]),
        Reply::stream(vec![deployment_frame(11, "prod", "checkout", "web", "svc:2")]),
    ])
    .await;
    let source = source_for(&server);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut events = source.stream_events(shutdown_rx).await.unwrap();

    assert_eq!(next_event(&mut events).await.version.as_str(), "1");
    assert_eq!(next_event(&mut events).await.version.as_str(), "2");

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].target, "/v1/event/stream?topic=Job&index=11");
}

#[tokio::test]
async fn non_success_status_is_retried() {
    let server = FakeNomad::start(vec![
        Reply::Status(503),
        Reply::Status(403),
        Reply::stream(vec![deployment_frame(1, "prod", "checkout", "web", "svc:9")]),
    ])
    .await;
    let source = source_for(&server);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut events = source.stream_events(shutdown_rx).await.unwrap();

    assert_eq!(next_event(&mut events).await.version.as_str(), "9");
    assert_eq!(server.requests().len(), 3);
}

#[tokio::test]
async fn schema_error_reconnects_past_the_poisoned_frame() {
    let poisoned = frame(
        7,
        vec![json!({
            "Topic": "Job",
            "Type": "JobRegistered",
            "Key": "checkout",
            "Index": 7,
            "Payload": {"Job": {"TaskGroups": "not a list"}}
        })],
    );
    let server = FakeNomad::start(vec![
        Reply::stream(vec![poisoned]),
        Reply::stream(vec![deployment_frame(8, "prod", "checkout", "web", "svc:8")]),
    ])
    .await;
    let source = source_for(&server);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut events = source.stream_events(shutdown_rx).await.unwrap();

    assert_eq!(next_event(&mut events).await.version.as_str(), "8");
    let requests = server.requests();
    assert_eq!(requests[1].target, "/v1/event/stream?topic=Job&index=8");
}

#[tokio::test]
async fn fan_out_is_delivered_in_task_order_through_a_small_queue() {
    let event = job_registered_json(
        "prod",
        "shop",
        1,
        &[
            ("web", vec![docker_task("api", "shop/api:1"), docker_task("proxy", "envoy:latest")]),
            ("worker", vec![docker_task("jobs", "shop/jobs:2"), docker_task("cron", "shop/cron:3")]),
        ],
    );
    let server = FakeNomad::start(vec![Reply::stream(vec![frame(1, vec![event])])]).await;
    let config = NomadConfig {
        channel_capacity: 1,
        ..testkit::config::nomad(&server.address())
    };
    let source = NomadSource::new(&config, testkit::config::reconnection()).unwrap();
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut events = source.stream_events(shutdown_rx).await.unwrap();
    // Let the producer fill the queue and block.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut names = Vec::new();
    for _ in 0..3 {
        names.push(next_event(&mut events).await.deployment_name.to_string());
    }
    assert_eq!(
        names,
        vec!["prod.shop.web.api", "prod.shop.worker.jobs", "prod.shop.worker.cron"]
    );
}

#[tokio::test]
async fn shutdown_closes_queue_and_connection() {
    let server = FakeNomad::start(vec![Reply::stream(vec![heartbeat()])]).await;
    let source = source_for(&server);
    let mut state = source.state();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut events = source.stream_events(shutdown_rx).await.unwrap();
    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == StreamState::Streaming),
    )
    .await
    .expect("stream should connect")
    .unwrap();

    shutdown_tx.send(true).unwrap();

    let closed = tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("queue should close promptly");
    assert!(closed.is_none());

    tokio::time::timeout(Duration::from_secs(1), async {
        while server.disconnects() == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("connection should be closed");
    assert_eq!(*state.borrow(), StreamState::Stopped);
}

#[tokio::test]
async fn shutdown_during_backoff_is_prompt() {
    let server = FakeNomad::start(vec![Reply::Status(500)]).await;
    let mut reconnection = testkit::config::reconnection();
    reconnection.initial_delay_ms = 60_000;
    reconnection.max_delay_ms = 60_000;
    let source =
        NomadSource::new(&testkit::config::nomad(&server.address()), reconnection).unwrap();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut events = source.stream_events(shutdown_rx).await.unwrap();
    server.wait_for_requests(1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    shutdown_tx.send(true).unwrap();
    let closed = tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("backoff should not delay shutdown");
    assert!(closed.is_none());
}

#[tokio::test]
async fn persisted_cursor_is_resumed_but_not_advanced_by_the_source() {
    let db = TempDb::create();
    let cursor = Arc::new(SqliteCursorStore::new(db.pool().clone()));
    cursor.save("nomad", 41).await.unwrap();

    let server = FakeNomad::start(vec![Reply::stream(vec![
        deployment_frame(50, "prod", "checkout", "web", "svc:3"),
        heartbeat(),
    ])])
    .await;
    let source = source_for(&server).with_cursor(cursor.clone());
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut events = source.stream_events(shutdown_rx).await.unwrap();
    let event = next_event(&mut events).await;

    assert_eq!(
        server.requests()[0].target,
        "/v1/event/stream?topic=Job&index=42"
    );
    assert_eq!(event.checkpoint, Some(50));
    // Saving is left to whoever handles the event.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(cursor.load("nomad").await.unwrap(), Some(41));
}

#[tokio::test]
async fn only_last_event_of_a_frame_carries_the_checkpoint() {
    let event = job_registered_json(
        "prod",
        "shop",
        1,
        &[("web", vec![docker_task("api", "shop/api:1"), docker_task("jobs", "shop/jobs:2")])],
    );
    let server = FakeNomad::start(vec![Reply::stream(vec![frame(12, vec![event])])]).await;
    let source = source_for(&server);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut events = source.stream_events(shutdown_rx).await.unwrap();

    assert_eq!(next_event(&mut events).await.checkpoint, None);
    assert_eq!(next_event(&mut events).await.checkpoint, Some(12));
}
