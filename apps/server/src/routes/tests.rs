use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test, web};
use checkup::pool::{LibsqlPool, open_local_pool};
use checkup::protocol::{CRON_PATH, PushSummary, RESULTS_PATH, TARGETS_PATH};
use checkup::{Engine, LibsqlStore, ProbeExecutor, Store, Target, TargetStatus, initialize_database};
use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};

use crate::config::{Auth, Http};
use crate::state::AppState;

const WORKER: &str = "worker-secret";
const CRON: &str = "cron-secret";

struct Fixture {
    state: web::Data<AppState>,
    store: Arc<LibsqlStore>,
    pool: LibsqlPool,
    _dir: TempDir,
}

async fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let pool = open_local_pool(&dir.path().join("server.db").to_string_lossy(), 4).await.unwrap();
    initialize_database(&pool).await.unwrap();
    let store = Arc::new(LibsqlStore::new_from_pool(pool.clone()));
    let executor = Arc::new(ProbeExecutor::new(Duration::from_millis(500)).unwrap());
    let engine = Arc::new(Engine::new(store.clone(), executor));
    let auth = Auth { cron_secret: Some(CRON.into()), worker_secret: Some(WORKER.into()) };

    Fixture { state: web::Data::new(AppState::new(engine, &auth)), store, pool, _dir: dir }
}

fn bearer(secret: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {secret}"))
}

#[actix_web::test]
async fn test_route_paths_match_protocol() {
    assert_eq!(TARGETS_PATH, "/api/worker/targets");
    assert_eq!(RESULTS_PATH, "/api/worker/results");
    assert_eq!(CRON_PATH, "/api/cron");
}

#[actix_web::test]
async fn test_health() {
    let fx = fixture().await;
    let app =
        test::init_service(App::new().app_data(fx.state.clone()).configure(super::routes)).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_pull_rejects_bad_credentials_without_body() {
    let fx = fixture().await;
    fx.store.insert_target(&Target::new("a", "http://a")).await.unwrap();
    let app =
        test::init_service(App::new().app_data(fx.state.clone()).configure(super::routes)).await;

    for req in [
        test::TestRequest::get().uri(TARGETS_PATH).to_request(),
        test::TestRequest::get().uri(TARGETS_PATH).insert_header(bearer("wrong")).to_request(),
        test::TestRequest::get().uri(TARGETS_PATH).insert_header(bearer(CRON)).to_request(),
    ] {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(test::read_body(resp).await.is_empty());
    }
}

#[actix_web::test]
async fn test_pull_returns_only_active_targets() {
    let fx = fixture().await;
    let active = Target::new("active", "http://active");
    fx.store.insert_target(&active).await.unwrap();
    fx.store.insert_target(&Target::new("paused", "http://paused").inactive()).await.unwrap();
    let app =
        test::init_service(App::new().app_data(fx.state.clone()).configure(super::routes)).await;

    let req = test::TestRequest::get().uri(TARGETS_PATH).insert_header(bearer(WORKER)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!([{ "id": active.id.as_str(), "address": "http://active" }]));
}

#[actix_web::test]
async fn test_push_empty_batch_is_noop() {
    let fx = fixture().await;
    let target = Target::new("a", "http://a");
    fx.store.insert_target(&target).await.unwrap();
    let app =
        test::init_service(App::new().app_data(fx.state.clone()).configure(super::routes)).await;

    let req = test::TestRequest::post()
        .uri(RESULTS_PATH)
        .insert_header(bearer(WORKER))
        .set_json(json!([]))
        .to_request();
    let summary: PushSummary = test::call_and_read_body_json(&app, req).await;

    assert_eq!(summary, PushSummary { success: true, processed: 0, rejected: 0 });
    assert!(fx.store.recent_measurements(&target.id, 10).await.unwrap().is_empty());
    let stored = fx.store.get_target(&target.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TargetStatus::Pending);
}

#[actix_web::test]
async fn test_push_reconciles_valid_elements() {
    let fx = fixture().await;
    let up = Target::new("up", "http://up");
    let down = Target::new("down", "http://down");
    fx.store.insert_target(&up).await.unwrap();
    fx.store.insert_target(&down).await.unwrap();
    let app =
        test::init_service(App::new().app_data(fx.state.clone()).configure(super::routes)).await;

    let req = test::TestRequest::post()
        .uri(RESULTS_PATH)
        .insert_header(bearer(WORKER))
        .set_json(json!([
            { "targetId": up.id.as_str(), "statusCode": 200, "latencyMs": 48 },
            { "monitorId": down.id.as_str(), "status": 0, "latency": 0 },
            { "targetId": "deleted", "statusCode": 200, "latencyMs": 5 },
            { "targetId": up.id.as_str(), "statusCode": "bad" }
        ]))
        .to_request();
    let summary: PushSummary = test::call_and_read_body_json(&app, req).await;

    assert_eq!(summary, PushSummary { success: true, processed: 3, rejected: 1 });

    let up_now = fx.store.get_target(&up.id).await.unwrap().unwrap();
    assert_eq!(up_now.status, TargetStatus::Up);
    assert_eq!(up_now.last_latency_ms, Some(48));
    let down_now = fx.store.get_target(&down.id).await.unwrap().unwrap();
    assert_eq!(down_now.status, TargetStatus::Down);
    assert_eq!(fx.store.recent_measurements(&down.id, 10).await.unwrap().len(), 1);
}

#[actix_web::test]
async fn test_push_accepts_large_fleet_batches() {
    let fx = fixture().await;
    let target = Target::new("a", "http://a");
    fx.store.insert_target(&target).await.unwrap();
    let app = test::init_service(
        App::new()
            .app_data(fx.state.clone())
            .app_data(super::payload_config(&Http::default()))
            .configure(super::routes),
    )
    .await;

    // Well past actix's 256 KiB default body limit
    let padding = "x".repeat(64);
    let mut results: Vec<Value> = (0..3000)
        .map(|i| {
            json!({
                "targetId": format!("retired-{i:05}-{padding}"),
                "statusCode": 200,
                "latencyMs": i
            })
        })
        .collect();
    results.push(json!({ "targetId": target.id.as_str(), "statusCode": 204, "latencyMs": 7 }));
    let body = serde_json::to_vec(&results).unwrap();
    assert!(body.len() > 256 * 1024);

    let req = test::TestRequest::post()
        .uri(RESULTS_PATH)
        .insert_header(bearer(WORKER))
        .set_payload(body)
        .to_request();
    let summary: PushSummary = test::call_and_read_body_json(&app, req).await;

    assert_eq!(summary, PushSummary { success: true, processed: 3001, rejected: 0 });
    assert_eq!(fx.store.get_target(&target.id).await.unwrap().unwrap().status, TargetStatus::Up);
}

#[actix_web::test]
async fn test_push_rejects_malformed_bodies() {
    let fx = fixture().await;
    let app =
        test::init_service(App::new().app_data(fx.state.clone()).configure(super::routes)).await;

    for payload in [r#"{"targetId":"a"}"#, "not json", ""] {
        let req = test::TestRequest::post()
            .uri(RESULTS_PATH)
            .insert_header(bearer(WORKER))
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {payload:?}");
    }
}

#[actix_web::test]
async fn test_push_requires_worker_credential() {
    let fx = fixture().await;
    let app =
        test::init_service(App::new().app_data(fx.state.clone()).configure(super::routes)).await;

    let req = test::TestRequest::post()
        .uri(RESULTS_PATH)
        .insert_header(bearer(CRON))
        .set_payload("not even json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_cron_requires_cron_credential() {
    let fx = fixture().await;
    let app =
        test::init_service(App::new().app_data(fx.state.clone()).configure(super::routes)).await;

    let req = test::TestRequest::get().uri(CRON_PATH).insert_header(bearer(WORKER)).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_cron_with_no_targets() {
    let fx = fixture().await;
    let app =
        test::init_service(App::new().app_data(fx.state.clone()).configure(super::routes)).await;

    let req = test::TestRequest::post().uri(CRON_PATH).insert_header(bearer(CRON)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["monitorsChecked"], 0);
    assert_eq!(body["message"], "No active monitors to check.");
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn test_cron_checks_active_targets() {
    let fx = fixture().await;
    // Nothing listens on port 1, so the probe lands on the sentinel
    let target = Target::new("closed", "http://127.0.0.1:1/");
    fx.store.insert_target(&target).await.unwrap();
    let app =
        test::init_service(App::new().app_data(fx.state.clone()).configure(super::routes)).await;

    let req = test::TestRequest::get().uri(CRON_PATH).insert_header(bearer(CRON)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["monitorsChecked"], 1);
    assert!(body.get("message").is_none());
    let stored = fx.store.get_target(&target.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TargetStatus::Down);
}

#[actix_web::test]
async fn test_store_unavailable_returns_generic_error() {
    let fx = fixture().await;
    let app =
        test::init_service(App::new().app_data(fx.state.clone()).configure(super::routes)).await;
    fx.pool.close();

    let req = test::TestRequest::get().uri(TARGETS_PATH).insert_header(bearer(WORKER)).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
}
