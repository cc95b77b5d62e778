//! Router-level tests: console requests in, booking server mocked out.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use seat_setup::config::{AppConfig, BookingConfig, CircuitBreakerConfig, Config};
use seat_setup::models::MAX_COLS;
use seat_setup::{controllers, AppState};

fn app(server: &MockServer) -> Router {
    let config = Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            rust_log: "seat_setup=debug".to_string(),
        },
        booking: BookingConfig {
            base_url: server.uri(),
            api_token: None,
            timeout_seconds: 5,
        },
        circuit_breaker: CircuitBreakerConfig {
            failure_threshold: 5,
            timeout_seconds: 60,
        },
    };
    let state: Arc<AppState> = AppState::new(&config).expect("state builds");
    Router::new().nest("/api", controllers::routes()).with_state(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_with(app, method, uri, body, None).await
}

async fn send_with(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    authorization: Option<&str>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        request = request.header("authorization", value);
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("request build should succeed");

    let response = app.clone().oneshot(request).await.expect("app should handle request");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("response body should be readable");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body must be json")
    };
    (status, value)
}

async fn mount_screen(server: &MockServer, screen_id: i64, seats: Value, showtimes: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/admin/screens/{}/seats", screen_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(seats))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/admin/seatprices/screen/{}", screen_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "seatTypes": { "available": { "price": 50.0 } }
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/showtimes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(showtimes))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/admin/screens/{}", screen_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": screen_id,
            "screenNumber": "Hall 1",
            "totalSeats": 2,
            "theater": { "id": 1, "name": "Central", "city": "Almaty" }
        })))
        .mount(server)
        .await;
}

fn two_seats() -> Value {
    json!([
        { "row": "A", "column": 1, "seatTypeId": 1 },
        { "row": "A", "column": 2, "seatTypeId": 1 }
    ])
}

#[tokio::test]
async fn lists_templates() {
    let server = MockServer::start().await;
    let app = app(&server);

    let (status, body) = send(&app, "GET", "/api/setup/templates", None).await;
    assert_eq!(status, StatusCode::OK);
    let keys: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["default", "standard", "premium", "intimate"]);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let server = MockServer::start().await;
    let app = app(&server);

    let (status, body) = send(&app, "GET", "/api/screens/9/setup", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, "PATCH", "/api/screens/9/setup/click", Some(json!({ "row": 0, "col": 0 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn load_edit_and_submit() {
    let server = MockServer::start().await;
    mount_screen(&server, 4, two_seats(), json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/admin/screens/4/setupSeats"))
        .and(header("authorization", "Bearer console-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/admin/seatprices/screen/4"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(&server);

    let (status, body) = send(&app, "POST", "/api/screens/4/setup", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["rows"], 1);
    assert_eq!(body["session"]["cols"], 2);
    assert_eq!(body["session"]["changed"], false);
    assert_eq!(body["session"]["screen"]["screenNumber"], "Hall 1");

    let (status, _) = send(&app, "PATCH", "/api/screens/4/setup/type", Some(json!({ "seatType": "vip" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "PATCH", "/api/screens/4/setup/click", Some(json!({ "row": 0, "col": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["kind"], "painted");
    assert_eq!(body["session"]["changed"], true);
    assert_eq!(body["session"]["prices"]["vip"]["enabled"], true);

    // VIP без цены не сохраняется
    let (status, body) = send(&app, "POST", "/api/screens/4/setup/submit", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("vip"));

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/screens/4/setup/prices",
        Some(json!({ "category": "vip", "price": 75.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_with(
        &app,
        "POST",
        "/api/screens/4/setup/submit",
        None,
        Some("Bearer console-token"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "saved");

    // после сохранения сессия закрыта
    let (status, _) = send(&app, "GET", "/api/screens/4/setup", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unchanged_submit_reports_no_changes() {
    let server = MockServer::start().await;
    mount_screen(&server, 4, two_seats(), json!([])).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = app(&server);

    send(&app, "POST", "/api/screens/4/setup", None).await;
    let (status, body) = send(&app, "POST", "/api/screens/4/setup/submit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "noChanges");
}

#[tokio::test]
async fn screen_with_showtimes_rejects_submit() {
    let server = MockServer::start().await;
    mount_screen(&server, 4, two_seats(), json!([{ "id": 1, "screenId": 4 }])).await;
    let app = app(&server);

    let (_, body) = send(&app, "POST", "/api/screens/4/setup", None).await;
    assert_eq!(body["session"]["locked"], true);

    send(&app, "PATCH", "/api/screens/4/setup/type", Some(json!({ "seatType": "unavailable" }))).await;
    send(&app, "PATCH", "/api/screens/4/setup/click", Some(json!({ "row": 0, "col": 0 }))).await;

    let (status, _) = send(&app, "POST", "/api/screens/4/setup/submit", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    // сессия остается открытой
    let (status, _) = send(&app, "GET", "/api/screens/4/setup", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn zone_mode_and_template_over_http() {
    let server = MockServer::start().await;
    mount_screen(&server, 4, two_seats(), json!([])).await;
    let app = app(&server);
    send(&app, "POST", "/api/screens/4/setup", None).await;

    let (status, _) = send(&app, "PATCH", "/api/screens/4/setup/resize", Some(json!({ "rows": 2, "cols": 4 }))).await;
    assert_eq!(status, StatusCode::OK);

    send(&app, "PATCH", "/api/screens/4/setup/type", Some(json!({ "seatType": "couple" }))).await;
    let (_, body) = send(&app, "PATCH", "/api/screens/4/setup/zone-mode", None).await;
    assert_eq!(body["outcome"], true);

    let (_, body) = send(&app, "PATCH", "/api/screens/4/setup/click", Some(json!({ "row": 1, "col": 0 }))).await;
    assert_eq!(body["outcome"]["kind"], "zoneStarted");
    let (_, body) = send(&app, "PATCH", "/api/screens/4/setup/click", Some(json!({ "row": 1, "col": 3 }))).await;
    assert_eq!(body["outcome"]["kind"], "zonePainted");
    assert_eq!(
        body["session"]["grid"][1],
        json!(["couple", "supcouple", "couple", "supcouple"])
    );

    let (_, body) = send(&app, "PATCH", "/api/screens/4/setup/template-dialog", Some(json!({ "open": true }))).await;
    assert_eq!(body["session"]["templateDialogOpen"], true);
    let (status, body) = send(&app, "PATCH", "/api/screens/4/setup/template", Some(json!({ "template": "default" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["templateDialogOpen"], false);
    assert_eq!(body["session"]["prices"]["couple"]["enabled"], false);
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    let server = MockServer::start().await;
    mount_screen(&server, 4, two_seats(), json!([])).await;
    let app = app(&server);
    send(&app, "POST", "/api/screens/4/setup", None).await;

    let (status, _) = send(&app, "PATCH", "/api/screens/4/setup/resize", Some(json!({ "rows": 0, "cols": 4 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for cols in [json!(MAX_COLS + 1), json!(u64::MAX)] {
        let (status, _) = send(&app, "PATCH", "/api/screens/4/setup/resize", Some(json!({ "rows": 1, "cols": cols }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    // сессия жива, сетка прежняя
    let (status, body) = send(&app, "GET", "/api/screens/4/setup", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["cols"], 2);

    let (status, _) = send(&app, "PATCH", "/api/screens/4/setup/click", Some(json!({ "row": 7, "col": 0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "PATCH", "/api/screens/4/setup/type", Some(json!({ "seatType": "supcouple" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/screens/4/setup/prices",
        Some(json!({ "category": "couple", "price": 90.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send_with(&app, "POST", "/api/screens/4/setup/submit", None, Some("Basic abc")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn discard_closes_session() {
    let server = MockServer::start().await;
    mount_screen(&server, 4, two_seats(), json!([])).await;
    let app = app(&server);
    send(&app, "POST", "/api/screens/4/setup", None).await;

    let (status, _) = send(&app, "DELETE", "/api/screens/4/setup", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", "/api/screens/4/setup", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
