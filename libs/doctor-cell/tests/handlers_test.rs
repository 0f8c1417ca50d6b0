use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::router::doctor_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{MockStoreResponses, TestConfig};

async fn create_test_app(config: AppConfig) -> Router {
    doctor_routes(Arc::new(config))
}

async fn send_json(
    app: Router,
    method_name: &str,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method_name)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    (status, json_response)
}

#[tokio::test]
async fn test_list_doctors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_response(
                &Uuid::new_v4().to_string(),
                "Dr. Sarah Smith",
                "Pediatrician",
                "09:00",
                "17:00"
            ),
            MockStoreResponses::doctor_response(
                &Uuid::new_v4().to_string(),
                "Dr. John Kumar",
                "Dentist",
                "10:00",
                "18:00"
            )
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::for_store(&mock_server.uri()).to_app_config();
    let app = create_test_app(config).await;

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let doctors: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert!(doctors.is_array());
    assert_eq!(doctors.as_array().unwrap().len(), 2);
    assert_eq!(doctors[0]["name"], "Dr. Sarah Smith");
    assert_eq!(doctors[1]["working_hours"]["start"], "10:00");
}

#[tokio::test]
async fn test_get_doctor_by_id() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_response(
                &doctor_id.to_string(),
                "Dr. Priya Patel",
                "Cardiologist",
                "08:00",
                "16:00"
            )
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::for_store(&mock_server.uri()).to_app_config();
    let app = create_test_app(config).await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/{}", doctor_id))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let doctor: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(doctor["id"], doctor_id.to_string());
    assert_eq!(doctor["specialization"], "Cardiologist");
    assert_eq!(doctor["working_hours"]["end"], "16:00");
}

#[tokio::test]
async fn test_get_doctor_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::for_store(&mock_server.uri()).to_app_config();
    let app = create_test_app(config).await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/{}", Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_doctor_applies_defaults() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/doctors"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::doctor_response(
                &doctor_id.to_string(),
                "Dr. Default",
                "General",
                "09:00",
                "17:00"
            )
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::for_store(&mock_server.uri()).to_app_config();
    let app = create_test_app(config).await;

    let (status, body) = send_json(app, "POST", "/", json!({ "name": "Dr. Default" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["doctor"]["specialization"], "General");

    // The record sent to the store carries the registry defaults.
    let requests = mock_server.received_requests().await.unwrap();
    let posted: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(posted["specialization"], "General");
    assert_eq!(posted["working_hours"]["start"], "09:00");
    assert_eq!(posted["working_hours"]["end"], "17:00");
}

#[tokio::test]
async fn test_create_doctor_with_custom_hours() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/doctors"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::doctor_response(
                &doctor_id.to_string(),
                "Dr. Michael Chen",
                "General Physician",
                "09:00",
                "17:30"
            )
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::for_store(&mock_server.uri()).to_app_config();
    let app = create_test_app(config).await;

    let (status, body) = send_json(
        app,
        "POST",
        "/",
        json!({
            "name": "Dr. Michael Chen",
            "specialization": "General Physician",
            "working_hours": { "start": "09:00", "end": "17:30" }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doctor"]["working_hours"]["end"], "17:30");
}

#[tokio::test]
async fn test_create_doctor_rejects_blank_name() {
    let mock_server = MockServer::start().await;

    let config = TestConfig::for_store(&mock_server.uri()).to_app_config();
    let app = create_test_app(config).await;

    let (status, body) = send_json(app, "POST", "/", json!({ "name": "   " })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Doctor name must not be empty");
}

#[tokio::test]
async fn test_create_doctor_rejects_inverted_hours() {
    let mock_server = MockServer::start().await;

    let config = TestConfig::for_store(&mock_server.uri()).to_app_config();
    let app = create_test_app(config).await;

    let (status, body) = send_json(
        app,
        "POST",
        "/",
        json!({
            "name": "Dr. Backwards",
            "working_hours": { "start": "18:00", "end": "09:00" }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Working hours start must be before end");
}

#[tokio::test]
async fn test_create_doctor_rejects_unparseable_hours() {
    let mock_server = MockServer::start().await;

    let config = TestConfig::for_store(&mock_server.uri()).to_app_config();
    let app = create_test_app(config).await;

    let (status, body) = send_json(
        app,
        "POST",
        "/",
        json!({
            "name": "Dr. Garbled",
            "working_hours": { "start": "nine", "end": "17:00" }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid working hours start: nine");
}

#[tokio::test]
async fn test_get_doctor_rejects_malformed_id() {
    let config = TestConfig::default().to_app_config();
    let app = create_test_app(config).await;

    let request = Request::builder()
        .method("GET")
        .uri("/not-a-uuid")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
