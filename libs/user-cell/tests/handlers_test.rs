use std::sync::Arc;
use axum::{
    body::Body,
    extract::{Extension, Path, State},
    http::{Request, StatusCode},
    Json,
};
use assert_matches::assert_matches;
use serde_json::json;
use tower::ServiceExt;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, query_param};

use shared_config::AppConfig;
use shared_models::auth::AuthContext;
use shared_models::error::AppError;
use shared_utils::store_mock::InMemoryTable;
use shared_utils::test_utils::{JwtTestUtils, MockStoreResponses, TestConfig, TestUser};
use user_cell::handlers::*;
use user_cell::models::UpdateUserRequest;
use user_cell::router::user_routes;

fn config_for(server: &MockServer) -> Arc<AppConfig> {
    TestConfig::with_store(&server.uri()).to_arc()
}

fn context_of(user: &TestUser) -> Extension<AuthContext> {
    Extension(user.to_context())
}

#[tokio::test]
async fn test_get_single_user_strips_password() {
    let mock_server = MockServer::start().await;
    let patient = TestUser::patient("ann@mail.test").with_id("u1");
    let mut record = MockStoreResponses::user_record("u1", "Ann");
    record["appointments"] = json!(["a1"]);

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "eq.u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record])))
        .mount(&mock_server)
        .await;

    let response = get_single_user(State(config_for(&mock_server)), context_of(&patient), Path("u1".to_string()))
        .await
        .unwrap()
        .0;

    assert_eq!(response.message, "User found");
    assert_eq!(response.data.name, "Ann");
    let body = serde_json::to_value(&response).unwrap();
    assert!(body["data"].get("password").is_none());
    assert_eq!(body["data"]["appointments"], json!(["a1"]));
}

#[tokio::test]
async fn test_get_all_users_is_admin_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::user_record("u1", "Ann"),
            MockStoreResponses::user_record("u2", "Bo"),
        ])))
        .mount(&mock_server)
        .await;

    let patient = TestUser::patient("ann@mail.test");
    let denied = get_all_users(State(config_for(&mock_server)), context_of(&patient)).await;
    assert_matches!(denied, Err(AppError::Forbidden(_)));

    let admin = TestUser::admin("admin@clinic.test");
    let response = get_all_users(State(config_for(&mock_server)), context_of(&admin))
        .await
        .unwrap()
        .0;
    assert_eq!(response.data.len(), 2);
    let body = serde_json::to_value(&response).unwrap();
    assert!(body["data"].as_array().unwrap().iter().all(|u| u.get("password").is_none()));
}

#[tokio::test]
async fn test_update_and_delete_user_against_table() {
    let mock_server = MockServer::start().await;
    let table = InMemoryTable::new(vec![MockStoreResponses::user_record("u1", "Ann")]);

    Mock::given(path("/rest/v1/users"))
        .respond_with(table.clone())
        .mount(&mock_server)
        .await;

    let patient = TestUser::patient("ann@mail.test").with_id("u1");
    let config = config_for(&mock_server);

    let updated = update_user(
        State(config.clone()),
        context_of(&patient),
        Path("u1".to_string()),
        Json(UpdateUserRequest {
            name: Some("Ann Lee".to_string()),
            blood_type: Some("B+".to_string()),
            ..Default::default()
        }),
    )
    .await
    .unwrap()
    .0;

    assert_eq!(updated.message, "User updated successfully");
    assert_eq!(updated.data.name, "Ann Lee");
    assert_eq!(updated.data.blood_type.as_deref(), Some("B+"));

    let deleted = delete_user(State(config.clone()), context_of(&patient), Path("u1".to_string()))
        .await
        .unwrap()
        .0;
    assert_eq!(deleted.data.id, "u1");
    assert!(table.snapshot().is_empty());

    let missing = update_user(
        State(config),
        context_of(&patient),
        Path("u1".to_string()),
        Json(UpdateUserRequest { name: Some("Again".to_string()), ..Default::default() }),
    )
    .await;
    assert_matches!(missing, Err(AppError::NotFound(_)));
}

#[tokio::test]
async fn test_patient_cannot_touch_other_accounts() {
    let mock_server = MockServer::start().await;
    let patient = TestUser::patient("ann@mail.test").with_id("u1");

    let result = delete_user(State(config_for(&mock_server)), context_of(&patient), Path("u2".to_string())).await;
    assert_matches!(result, Err(AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_user_profile_uses_caller_identity() {
    let mock_server = MockServer::start().await;
    let patient = TestUser::patient("ann@mail.test").with_id("u7");

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "eq.u7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::user_record("u7", "Gil"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = get_user_profile(State(config_for(&mock_server)), context_of(&patient))
        .await
        .unwrap()
        .0;

    assert_eq!(response.message, "Profile info found");
    assert_eq!(response.data.id, "u7");
}

#[tokio::test]
async fn test_user_profile_missing_is_not_found() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let patient = TestUser::patient("ghost@mail.test");
    let result = get_user_profile(State(config_for(&mock_server)), context_of(&patient)).await;
    assert_matches!(result, Err(AppError::NotFound(_)));
}

#[tokio::test]
async fn test_my_appointments_returns_doctors() {
    let mock_server = MockServer::start().await;
    let patient = TestUser::patient("ann@mail.test").with_id("u1");

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("user", "eq.u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_record("a1", "u1", "d1"),
            MockStoreResponses::appointment_record("a2", "u1", "d2"),
            MockStoreResponses::appointment_record("a3", "u1", "d1"),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", "in.(d1,d2)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_record("d1", "Dr. Ana Cruz", "Cardiology", "approved"),
            MockStoreResponses::doctor_record("d2", "Dr. Ben Ode", "Neurology", "approved"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = get_my_appointments(State(config_for(&mock_server)), context_of(&patient))
        .await
        .unwrap()
        .0;

    assert_eq!(response.message, "Appointments found");
    assert_eq!(response.data.len(), 2);
    let body = serde_json::to_value(&response).unwrap();
    assert!(body["data"].as_array().unwrap().iter().all(|d| d.get("password").is_none()));
}

#[tokio::test]
async fn test_my_appointments_empty_is_not_an_error() {
    let mock_server = MockServer::start().await;
    let patient = TestUser::patient("ann@mail.test").with_id("u1");

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = get_my_appointments(State(config_for(&mock_server)), context_of(&patient))
        .await
        .unwrap()
        .0;

    assert!(response.success);
    assert!(response.data.is_empty());
}

#[tokio::test]
async fn test_my_appointments_route_with_token() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_store(&mock_server.uri());
    let patient = TestUser::patient("ann@mail.test");
    let token = JwtTestUtils::create_test_token(&patient, &config.jwt_secret, Some(1));

    let app = user_routes(config.to_arc());
    let request = Request::builder()
        .uri("/appointments/my-appointments")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response, json!({"success": true, "message": "Appointments found", "data": []}));
}

#[tokio::test]
async fn test_store_fault_is_internal_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_store(&mock_server.uri());
    let admin = TestUser::admin("admin@clinic.test");
    let token = JwtTestUtils::create_test_token(&admin, &config.jwt_secret, Some(1));

    let app = user_routes(config.to_arc());
    let request = Request::builder()
        .uri("/")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
