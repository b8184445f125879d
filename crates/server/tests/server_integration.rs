//! Integration tests for the HTTP routes
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use server::{app, AppState, ServerConfig};
use tower::ServiceExt;

fn test_config() -> ServerConfig {
    ServerConfig {
        seed: Some(42),
        worker_threads: Some(2),
        ..ServerConfig::default()
    }
}

fn houses() -> Value {
    json!({
        "X_array": [[50, 1], [60, 2], [70, 2], [80, 3], [90, 3], [100, 4]],
        "Y_array": [150000, 180000, 200000, 220000, 250000, 280000],
        "x0": [[85, 3]]
    })
}

fn with_model(mut body: Value, model: &str) -> Value {
    body["model"] = json!(model);
    body
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn router_with(config: &ServerConfig) -> Router {
    app(AppState::new(config).unwrap())
}

#[tokio::test]
async fn test_welcome_and_health() {
    let router = router_with(&test_config());
    let (status, body) = send(&router, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, body) = send(&router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");

    let (status, body) = send(&router, get("/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["worker_threads"], 2);
}

#[tokio::test]
async fn test_info_routes() {
    let router = router_with(&test_config());
    for uri in [
        "/regression/option",
        "/regression/best-model/info",
        "/regression/stack-model",
    ] {
        let (status, body) = send(&router, get(uri)).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(body["message"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_option_post_and_history() {
    let router = router_with(&test_config());
    let (status, body) = send(
        &router,
        post_json("/regression/option", &with_model(houses(), "random_forest")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "random_forest");
    assert_eq!(body["data_size"], 12);
    assert_eq!(body["y0"].as_array().map(Vec::len), Some(1));
    assert!(body["rmse_test"].is_number());

    let (status, _) = send(
        &router,
        post_json("/regression/option", &with_model(houses(), "linear")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, history) = send(&router, get("/regression/option/history")).await;
    assert_eq!(status, StatusCode::OK);
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["model"], "linear");
    assert_eq!(entries[1]["model"], "random_forest");
    assert!(entries[0]["time"].is_string());

    let (_, page) = send(&router, get("/regression/option/history?limit=2&skip=1")).await;
    assert_eq!(page.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_unknown_model_is_bad_request() {
    let router = router_with(&test_config());
    let (status, body) = send(
        &router,
        post_json("/regression/option", &with_model(houses(), "transformer")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Fatal (unknown selector): no model named 'transformer'"
    );

    let (_, history) = send(&router, get("/regression/option/history")).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn test_invalid_input_is_unprocessable() {
    let router = router_with(&test_config());
    let body = json!({ "X_array": [1, 2, 3], "Y_array": [1, 2], "model": "linear" });
    let (status, body) = send(&router, post_json("/regression/option", &body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid input"));

    let mut mismatched = houses();
    mismatched["x0"] = json!([[85, 3, 1]]);
    let (status, _) = send(&router, post_json("/regression/best-model", &mismatched)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_non_json_body_is_rejected() {
    let router = router_with(&test_config());
    let request = Request::builder()
        .method("POST")
        .uri("/regression/option")
        .body(Body::from(houses().to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_best_model_post() {
    let router = router_with(&test_config());
    let (status, body) = send(&router, post_json("/regression/best-model", &houses())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["best_model"].is_string());
    assert_eq!(body["policy"], "robust");
    assert_eq!(body["best_result"].as_array().map(Vec::len), Some(1));

    let (_, history) = send(&router, get("/regression/best-model/history")).await;
    assert_eq!(history.as_array().map(Vec::len), Some(1));
    assert_eq!(history[0]["best_model"], body["best_model"]);
}

#[tokio::test]
async fn test_stack_model_post() {
    let router = router_with(&test_config());
    let (status, body) = send(&router, post_json("/regression/stack-model", &houses())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "Stacking + Voting + Elastic + DecisionTree");
    assert_eq!(body["y0"].as_array().map(Vec::len), Some(1));

    let (_, history) = send(&router, get("/regression/stack-model/history")).await;
    assert_eq!(history.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_history_limit_bounds() {
    let router = router_with(&test_config());
    for uri in [
        "/regression/option/history?limit=1",
        "/regression/best-model/history?limit=100",
    ] {
        let (status, body) = send(&router, get(uri)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_history_capacity() {
    let config = ServerConfig {
        history_limit: 2,
        ..test_config()
    };
    let router = router_with(&config);
    for model in ["linear", "ridge", "knn"] {
        let (status, _) = send(
            &router,
            post_json("/regression/option", &with_model(houses(), model)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, history) = send(&router, get("/regression/option/history")).await;
    let models: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["model"].as_str().unwrap())
        .collect();
    assert_eq!(models, vec!["knn", "ridge"]);
}

#[tokio::test]
async fn test_history_redirects() {
    let router = router_with(&test_config());
    let response = router
        .clone()
        .oneshot(get("/history/best_model?limit=5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/regression/best-model/history?limit=5&skip=0"
    );

    let response = router
        .clone()
        .oneshot(get("/history/Stacking_Model"))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::LOCATION],
        "/regression/stack-model/history?limit=10&skip=0"
    );

    let (status, _) = send(&router, get("/history/everything")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_evaluation_timeout() {
    let config = ServerConfig {
        evaluation_timeout: Some(Duration::from_millis(1)),
        ..test_config()
    };
    let router = router_with(&config);
    let x: Vec<Vec<f64>> = (0..200).map(|i| vec![i as f64, (i % 13) as f64]).collect();
    let y: Vec<f64> = x.iter().map(|r| 2.0 * r[0] + r[1]).collect();
    let body = json!({ "X_array": x, "Y_array": y });
    let (status, body) = send(&router, post_json("/regression/best-model", &body)).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(body["error"].as_str().unwrap().contains("exceeded"));
}
