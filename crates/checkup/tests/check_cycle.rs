//! End-to-end sweep over real HTTP targets

mod common;

use std::sync::Arc;
use std::time::Duration;

use checkup::{Engine, ProbeExecutor, Store, Target, TargetStatus};
use common::{Behaviour, create_test_store, spawn_responder};

#[tokio::test]
async fn test_cycle_with_up_down_and_timeout() -> anyhow::Result<()> {
    let (store, _dir) = create_test_store().await?;

    let respond =
        |status, millis| Behaviour::Respond { status, delay: Duration::from_millis(millis) };
    let addr_a = spawn_responder(respond(200, 50)).await;
    let addr_b = spawn_responder(respond(503, 20)).await;
    let addr_c = spawn_responder(Behaviour::Hang).await;

    let a = Target::new("A", addr_a);
    let b = Target::new("B", addr_b);
    let c = Target::new("C", addr_c);
    for target in [&a, &b, &c] {
        store.insert_target(target).await?;
    }

    let executor = Arc::new(ProbeExecutor::new(Duration::from_millis(500))?);
    let engine = Engine::new(store.clone(), executor);

    let report = engine.sweep().await?;
    assert_eq!(report.targets_checked, 3);
    assert_eq!(report.reconcile.measurements, 3);

    let ping_a = store.recent_measurements(&a.id, 10).await?;
    let ping_b = store.recent_measurements(&b.id, 10).await?;
    let ping_c = store.recent_measurements(&c.id, 10).await?;
    assert_eq!((ping_a.len(), ping_b.len(), ping_c.len()), (1, 1, 1));

    assert_eq!(ping_a[0].status_code, 200);
    assert!((50..450).contains(&ping_a[0].latency_ms), "A latency {}", ping_a[0].latency_ms);
    assert_eq!(ping_b[0].status_code, 503);
    assert!((20..420).contains(&ping_b[0].latency_ms), "B latency {}", ping_b[0].latency_ms);
    assert_eq!((ping_c[0].status_code, ping_c[0].latency_ms), (0, 0));

    let status = |target: &Target| {
        let store = store.clone();
        let id = target.id.clone();
        async move { store.get_target(&id).await.map(|t| t.map(|t| t.status)) }
    };
    assert_eq!(status(&a).await?, Some(TargetStatus::Up));
    assert_eq!(status(&b).await?, Some(TargetStatus::Down));
    assert_eq!(status(&c).await?, Some(TargetStatus::Down));
    Ok(())
}

#[tokio::test]
async fn test_repeated_cycles_append_history() -> anyhow::Result<()> {
    let (store, _dir) = create_test_store().await?;
    let addr = spawn_responder(Behaviour::Respond { status: 204, delay: Duration::ZERO }).await;
    let target = Target::new("history", addr);
    store.insert_target(&target).await?;

    let engine = Engine::new(store.clone(), Arc::new(ProbeExecutor::new(Duration::from_secs(2))?));
    for _ in 0..3 {
        engine.sweep().await?;
    }

    let pings = store.recent_measurements(&target.id, 10).await?;
    assert_eq!(pings.len(), 3);
    assert!(pings.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    assert!(pings.iter().all(|p| p.status_code == 204));
    Ok(())
}
