//! End-to-end: Nomad stream through correlation into the SQLite registry.

mod support;

use std::sync::Arc;
use std::time::Duration;

use overseer::adapter::outbound::nomad::NomadSource;
use overseer::adapter::outbound::sqlite::{SqliteCursorStore, SqliteTargetRegistry};
use overseer::application::{Correlator, PipelineSummary, VersionStream};
use overseer::domain::{DeploymentName, NewInstance, TargetId};
use overseer::error::Error;
use overseer::port::outbound::cursor::CursorStore;
use overseer::testkit;
use overseer::testkit::nomad::{deployment_frame, docker_task, frame, job_registered_json};
use tokio::sync::watch;

use support::nomad::{FakeNomad, Reply};
use support::temp_db::TempDb;

fn add_target(registry: &SqliteTargetRegistry, name: &str, deployment_name: &str) -> TargetId {
    let environment = registry.ensure_environment("prod").unwrap();
    let application = registry.ensure_application("checkout").unwrap();
    registry
        .create_instance(&NewInstance {
            environment_id: environment.id,
            application_id: application.id,
            name: name.to_string(),
            deployment_name: Some(DeploymentName::from(deployment_name)),
        })
        .unwrap()
}

async fn wait_for_deployments(registry: &SqliteTargetRegistry, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while registry.list_deployments().unwrap().len() < count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("deployments should be registered");
}

#[tokio::test]
async fn registers_versions_in_stream_order() {
    let db = TempDb::create();
    let registry = SqliteTargetRegistry::new(db.pool().clone());
    let api = add_target(&registry, "api-1", "prod.checkout.web.checkout");

    let second = job_registered_json(
        "prod",
        "checkout",
        1_700_000_600_000_000_000,
        &[("web", vec![docker_task("checkout", "svc:1.1.0")])],
    );
    let server = FakeNomad::start(vec![Reply::stream(vec![
        deployment_frame(1, "prod", "checkout", "web", "svc:1.0.0"),
        frame(2, vec![second]),
        deployment_frame(3, "prod", "unknown", "web", "svc:5"),
    ])])
    .await;

    let source = NomadSource::new(
        &testkit::config::nomad(&server.address()),
        testkit::config::reconnection(),
    )
    .unwrap();
    let correlator = Correlator::new(registry.clone());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let run = tokio::spawn(async move {
        VersionStream::run(&source, &correlator, shutdown_rx).await
    });

    wait_for_deployments(&registry, 2).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(true).unwrap();

    let summary = tokio::time::timeout(Duration::from_secs(2), run)
        .await
        .expect("pipeline should stop on shutdown")
        .unwrap()
        .unwrap();
    assert_eq!(
        summary,
        PipelineSummary {
            received: 3,
            registered: 2,
            unmatched: 1,
            failed: 0,
        }
    );

    let deployments = registry.list_deployments().unwrap();
    let versions: Vec<_> = deployments.iter().map(|d| d.version.as_str()).collect();
    assert_eq!(versions, vec!["1.0.0", "1.1.0"]);
    assert!(deployments.iter().all(|d| d.target_id == api));
    assert_eq!(registry.latest_deployments().unwrap()[0].version, "1.1.0");
}

#[tokio::test]
async fn ambiguous_target_halts_the_pipeline() {
    let db = TempDb::create();
    let registry = SqliteTargetRegistry::new(db.pool().clone());
    add_target(&registry, "api-1", "prod.checkout.web.checkout");
    add_target(&registry, "api-2", "prod.checkout.web.checkout");

    let server = FakeNomad::start(vec![Reply::stream(vec![deployment_frame(
        1,
        "prod",
        "checkout",
        "web",
        "svc:1.0.0",
    )])])
    .await;
    let source = NomadSource::new(
        &testkit::config::nomad(&server.address()),
        testkit::config::reconnection(),
    )
    .unwrap();
    let correlator = Correlator::new(registry.clone());
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        VersionStream::run(&source, &correlator, shutdown_rx),
    )
    .await
    .expect("pipeline should halt by itself");

    match result {
        Err(Error::AmbiguousTarget {
            deployment_name,
            matches,
        }) => {
            assert_eq!(deployment_name, "prod.checkout.web.checkout");
            assert_eq!(matches, 2);
        }
        other => panic!("expected ambiguity error, got {other:?}"),
    }
    assert!(registry.list_deployments().unwrap().is_empty());
}

#[tokio::test]
async fn restart_after_ambiguity_replays_the_unhandled_frame() {
    let db = TempDb::create();
    let registry = SqliteTargetRegistry::new(db.pool().clone());
    let cursor = Arc::new(SqliteCursorStore::new(db.pool().clone()));
    add_target(&registry, "api-1", "prod.checkout.web.checkout");
    add_target(&registry, "billing-1", "prod.billing.web.billing");
    let duplicate = add_target(&registry, "billing-2", "prod.billing.web.billing");

    let frames = vec![
        deployment_frame(5, "prod", "checkout", "web", "svc:1.0.0"),
        deployment_frame(7, "prod", "billing", "web", "billing:2.0.0"),
    ];
    let server = FakeNomad::start(vec![Reply::stream(frames.clone())]).await;
    let source = NomadSource::new(
        &testkit::config::nomad(&server.address()),
        testkit::config::reconnection(),
    )
    .unwrap()
    .with_cursor(cursor.clone());
    let correlator = Correlator::new(registry.clone());
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        VersionStream::run_with_cursor(&source, &correlator, Some(cursor.as_ref()), shutdown_rx),
    )
    .await
    .expect("pipeline should halt by itself");
    assert!(matches!(result, Err(Error::AmbiguousTarget { matches: 2, .. })));
    assert_eq!(cursor.load("nomad").await.unwrap(), Some(5));

    // The operator removes the duplicate and restarts.
    registry.set_deployment_name(duplicate, None).unwrap();
    let server = FakeNomad::start(vec![Reply::stream(vec![frames[1].clone()])]).await;
    let source = NomadSource::new(
        &testkit::config::nomad(&server.address()),
        testkit::config::reconnection(),
    )
    .unwrap()
    .with_cursor(cursor.clone());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let run = {
        let registry = registry.clone();
        let cursor = cursor.clone();
        tokio::spawn(async move {
            let correlator = Correlator::new(registry);
            VersionStream::run_with_cursor(&source, &correlator, Some(cursor.as_ref()), shutdown_rx)
                .await
        })
    };
    wait_for_deployments(&registry, 2).await;
    tokio::time::timeout(Duration::from_secs(2), async {
        while cursor.load("nomad").await.unwrap() != Some(7) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("cursor should advance past the replayed frame");
    shutdown_tx.send(true).unwrap();

    let summary = tokio::time::timeout(Duration::from_secs(2), run)
        .await
        .expect("pipeline should stop on shutdown")
        .unwrap()
        .unwrap();
    assert_eq!(summary.registered, 1);
    assert_eq!(
        server.requests()[0].target,
        "/v1/event/stream?topic=Job&index=6"
    );
    let versions: Vec<_> = registry
        .list_deployments()
        .unwrap()
        .into_iter()
        .map(|d| d.version)
        .collect();
    assert!(versions.contains(&"2.0.0".to_string()));
}
