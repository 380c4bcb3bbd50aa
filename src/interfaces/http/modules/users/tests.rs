//! Router-level tests for the user endpoints.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::parse_user_id;
use crate::application::UserService;
use crate::domain::{EnrichmentResult, GeoInfoClient, GeoLookupError, User, UserRepositoryInterface};
use crate::infrastructure::InMemoryUserStore;
use crate::interfaces::http::{create_api_router, RouterDeps};

struct RecordingGeo {
    fail: bool,
    seen: Mutex<Vec<String>>,
}

impl RecordingGeo {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            fail,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl GeoInfoClient for RecordingGeo {
    async fn get_info(&self, ip: &str) -> Result<EnrichmentResult, GeoLookupError> {
        self.seen.lock().unwrap().push(ip.to_string());
        if self.fail {
            return Err(GeoLookupError::Status {
                status: 503,
                body: "down".into(),
            });
        }
        match json!({"ip": ip, "city": "Test"}) {
            Value::Object(map) => Ok(map),
            _ => unreachable!(),
        }
    }
}

struct TestApp {
    router: Router,
    store: Arc<InMemoryUserStore>,
    geo: Arc<RecordingGeo>,
}

fn app_with(geo: Arc<RecordingGeo>) -> TestApp {
    let store = Arc::new(InMemoryUserStore::new());
    let service = UserService::new(store.clone(), geo.clone());
    let router = create_api_router(RouterDeps {
        user_service: Arc::new(service),
        db: None,
        prometheus_handle: None,
    })
    .layer(MockConnectInfo(SocketAddr::from(([192, 0, 2, 10], 51000))));

    TestApp { router, store, geo }
}

fn app() -> TestApp {
    app_with(RecordingGeo::new(false))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn seed(store: &InMemoryUserStore, name: &str, email: &str) -> i64 {
    store
        .create_user(crate::domain::CreateUserDto {
            name: name.into(),
            email: email.into(),
        })
        .await
        .unwrap()
}

#[test]
fn parse_user_id_accepts_only_digits() {
    assert_eq!(parse_user_id("42").unwrap(), 42);
    assert!(parse_user_id("").is_err());
    assert!(parse_user_id("abc").is_err());
    assert!(parse_user_id("-1").is_err());
    assert!(parse_user_id("+1").is_err());
    assert!(parse_user_id("99999999999999999999").is_err());
}

#[tokio::test]
async fn create_user_returns_enrichment_with_new_id() {
    let t = app();
    let req = Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "203.0.113.5, 10.0.0.1")
        .body(Body::from(
            json!({"name": "Aren", "email": "aren@example.com"}).to_string(),
        ))
        .unwrap();

    let resp = send(&t.router, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(resp).await,
        json!({"ip": "203.0.113.5", "city": "Test", "usedId": 1})
    );
    assert_eq!(t.geo.seen(), vec!["203.0.113.5"]);
    assert_eq!(
        t.store.get_user_by_id(1).await.unwrap(),
        User::new(1, "Aren", "aren@example.com")
    );
}

#[tokio::test]
async fn create_user_falls_back_to_peer_address() {
    let t = app();
    let resp = send(
        &t.router,
        json_request("POST", "/users", json!({"name": "Bo", "email": "bo@example.com"})),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(t.geo.seen(), vec!["192.0.2.10"]);
}

#[tokio::test]
async fn create_user_survives_geo_outage() {
    let t = app_with(RecordingGeo::new(true));
    let resp = send(
        &t.router,
        json_request("POST", "/users", json!({"name": "Aren", "email": "aren@example.com"})),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(resp).await,
        json!({"enrichment": "unavailable", "usedId": 1})
    );
    assert_eq!(t.store.len(), 1);
}

#[tokio::test]
async fn create_user_rejects_invalid_payload() {
    let t = app();
    let resp = send(
        &t.router,
        json_request("POST", "/users", json!({"name": "A", "email": "not-an-email"})),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    let msg = body["error"].as_str().unwrap();
    assert!(msg.contains("name"));
    assert!(msg.contains("email"));
    assert!(t.store.is_empty());
    assert!(t.geo.seen().is_empty());
}

#[tokio::test]
async fn create_user_rejects_malformed_json() {
    let t = app();
    let req = Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let resp = send(&t.router, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(resp).await["error"].is_string());
    assert!(t.store.is_empty());
}

#[tokio::test]
async fn list_users_returns_all_in_id_order() {
    let t = app();
    seed(&t.store, "Aren", "aren@example.com").await;
    seed(&t.store, "Bo", "bo@example.com").await;

    let resp = send(&t.router, empty_request("GET", "/users")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!([
            {"id": 1, "name": "Aren", "email": "aren@example.com"},
            {"id": 2, "name": "Bo", "email": "bo@example.com"}
        ])
    );
}

#[tokio::test]
async fn list_users_on_empty_store_is_empty_array() {
    let t = app();
    let resp = send(&t.router, empty_request("GET", "/users")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!([]));
}

#[tokio::test]
async fn get_user_by_id() {
    let t = app();
    let id = seed(&t.store, "Aren", "aren@example.com").await;

    let resp = send(&t.router, empty_request("GET", &format!("/users/{id}"))).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"id": id, "name": "Aren", "email": "aren@example.com"})
    );
}

#[tokio::test]
async fn get_unknown_user_is_404() {
    let t = app();
    let resp = send(&t.router, empty_request("GET", "/users/99")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_json(resp).await["error"].is_string());
}

#[tokio::test]
async fn non_numeric_id_is_400() {
    let t = app();
    for (method, body) in [
        ("GET", None),
        ("DELETE", None),
        ("PUT", Some(json!({"name": "Aren", "email": "aren@example.com"}))),
    ] {
        let req = match body {
            Some(b) => json_request(method, "/users/abc", b),
            None => empty_request(method, "/users/abc"),
        };
        let resp = send(&t.router, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{method}");
        assert_eq!(body_json(resp).await, json!({"error": "Invalid user ID"}));
    }
}

#[tokio::test]
async fn update_user_replaces_record_and_ignores_body_id() {
    let t = app();
    let id = seed(&t.store, "Aren", "aren@example.com").await;

    let resp = send(
        &t.router,
        json_request(
            "PUT",
            &format!("/users/{id}"),
            json!({"id": 500, "name": "Aren B", "email": "aren.b@example.com"}),
        ),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        t.store.get_user_by_id(id).await.unwrap(),
        User::new(id, "Aren B", "aren.b@example.com")
    );
    assert!(t.store.get_user_by_id(500).await.is_err());
}

#[tokio::test]
async fn update_unknown_user_is_404() {
    let t = app();
    let resp = send(
        &t.router,
        json_request("PUT", "/users/7", json!({"name": "Aren", "email": "aren@example.com"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(t.store.is_empty());
}

#[tokio::test]
async fn update_user_validates_payload() {
    let t = app();
    let id = seed(&t.store, "Aren", "aren@example.com").await;

    let resp = send(
        &t.router,
        json_request("PUT", &format!("/users/{id}"), json!({"name": "A", "email": "x"})),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(t.store.get_user_by_id(id).await.unwrap().name, "Aren");
}

#[tokio::test]
async fn delete_user_is_idempotent() {
    let t = app();
    let id = seed(&t.store, "Aren", "aren@example.com").await;
    let uri = format!("/users/{id}");

    let first = send(&t.router, empty_request("DELETE", &uri)).await;
    assert_eq!(first.status(), StatusCode::NO_CONTENT);
    assert!(t.store.is_empty());

    let second = send(&t.router, empty_request("DELETE", &uri)).await;
    assert_eq!(second.status(), StatusCode::NO_CONTENT);

    let get = send(&t.router, empty_request("GET", &uri)).await;
    assert_eq!(get.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_in_memory_store() {
    let t = app();
    let resp = send(&t.router, empty_request("GET", "/health")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"]["status"], "in-memory");
}

#[tokio::test]
async fn openapi_document_lists_user_routes() {
    let t = app();
    let resp = send(&t.router, empty_request("GET", "/api-doc/openapi.json")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let doc = body_json(resp).await;
    assert!(doc["paths"]["/users"].is_object());
    assert!(doc["paths"]["/users/{id}"].is_object());
}
