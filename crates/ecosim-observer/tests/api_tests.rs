//! Integration tests for the Observer API endpoints.
//!
//! Requests go through the router via `tower::ServiceExt` without binding
//! a socket.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use ecosim_core::config::SimulationConfig;
use ecosim_core::operator::OperatorState;
use ecosim_core::tick::SimulationState;
use ecosim_observer::handlers::{RASTER_HEIGHT_HEADER, RASTER_WIDTH_HEADER};
use ecosim_observer::router::build_router;
use ecosim_observer::state::AppState;
use ecosim_types::{Cell, Role};
use serde_json::Value;
use tower::ServiceExt;

async fn make_test_state() -> (Arc<AppState>, Arc<OperatorState>) {
    let operator = Arc::new(OperatorState::new(5));
    let state = Arc::new(AppState::with_operator(Arc::clone(&operator)));
    state.set_world_name("Test Meadow").await;

    let config = SimulationConfig::parse(
        "world: { width: 4, height: 3 }\npopulation: { starting: {}, floors: {} }\n",
    )
    .unwrap();
    let mut sim = SimulationState::from_config(&config, true).unwrap();
    sim.world.try_spawn(Role::Grazer, Cell::new(1, 1)).unwrap();
    sim.world.try_spawn(Role::Predator, Cell::new(2, 0)).unwrap();
    sim.world.sync_raster(sim.raster.as_mut());
    state.snapshot.write().await.refresh(None, &sim);

    (state, operator)
}

async fn body_to_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX).await.unwrap().to_vec()
}

async fn body_to_json(body: Body) -> Value {
    serde_json::from_slice(&body_to_bytes(body).await).unwrap()
}

fn post_json(path: &str, json: &Value) -> Request<Body> {
    Request::post(path)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_index_returns_html() {
    let (state, _) = make_test_state().await;
    let response = build_router(state)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
    let html = String::from_utf8(body_to_bytes(response.into_body()).await).unwrap();
    assert!(html.contains("Test Meadow"));
}

#[tokio::test]
async fn test_health() {
    let response = build_router(Arc::new(AppState::new()))
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_status_omits_raster_bytes() {
    let (state, _) = make_test_state().await;
    let response = build_router(state)
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["world_name"], "Test Meadow");
    assert_eq!(json["width"], 4);
    assert_eq!(json["population"]["grazers"], 1);
    assert!(json.get("raster").is_none());
}

#[tokio::test]
async fn test_population() {
    let (state, _) = make_test_state().await;
    let response = build_router(state)
        .oneshot(Request::get("/api/population").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["grazers"], 1);
    assert_eq!(json["predators"], 1);
    assert_eq!(json["hunters"], 0);
    assert_eq!(json["total"], 2);
}

#[tokio::test]
async fn test_raster_frame() {
    let (state, _) = make_test_state().await;
    let response = build_router(state)
        .oneshot(Request::get("/api/raster").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(RASTER_WIDTH_HEADER).unwrap(), "4");
    assert_eq!(response.headers().get(RASTER_HEIGHT_HEADER).unwrap(), "3");
    let bytes = body_to_bytes(response.into_body()).await;
    assert_eq!(bytes.len(), 4 * 3 * 4);
    // Grazer at (1, 1): row-major index 5.
    assert_eq!(&bytes[20..24], &[0, 255, 0, 255]);
    // Predator at (2, 0): index 2.
    assert_eq!(&bytes[8..12], &[255, 0, 0, 255]);
    // Empty cell stays opaque black.
    assert_eq!(&bytes[0..4], &[0, 0, 0, 255]);
}

#[tokio::test]
async fn test_raster_missing_is_not_found() {
    let response = build_router(Arc::new(AppState::new()))
        .oneshot(Request::get("/api/raster").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_set_speed() {
    let (state, operator) = make_test_state().await;
    let response = build_router(state)
        .oneshot(post_json(
            "/api/operator/speed",
            &serde_json::json!({ "tick_interval_ms": 50 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["previous_interval_ms"], 5);
    assert_eq!(json["new_interval_ms"], 50);
    assert_eq!(operator.tick_interval_ms(), 50);
}

#[tokio::test]
async fn test_set_speed_below_minimum_rejected() {
    let (state, operator) = make_test_state().await;
    let response = build_router(state)
        .oneshot(post_json(
            "/api/operator/speed",
            &serde_json::json!({ "tick_interval_ms": 0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(operator.tick_interval_ms(), 5);
}

#[tokio::test]
async fn test_stop_sets_flag() {
    let (state, operator) = make_test_state().await;
    let router = build_router(state);

    let response = router
        .clone()
        .oneshot(Request::post("/api/operator/stop").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(operator.is_stop_requested());

    let response = router
        .oneshot(Request::get("/api/operator/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["stop_requested"], true);
    assert_eq!(json["run_id"], operator.run_id().to_string());
}

#[tokio::test]
async fn test_operator_endpoints_without_operator() {
    let response = build_router(Arc::new(AppState::new()))
        .oneshot(Request::post("/api/operator/stop").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
