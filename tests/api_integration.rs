//! HTTP-level tests for the panel router

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use common::{FakeSystemctl, PASSWORD, USERNAME};
use svcpanel::{api, Panel, RegistryRefresher, ServiceRegistry};

struct Fixture {
    fake: FakeSystemctl,
    app: Router,
    refresher: RegistryRefresher,
    registry: Arc<ServiceRegistry>,
}

impl Fixture {
    fn new() -> Self {
        let fake = FakeSystemctl::new();
        let systemctl = Arc::new(fake.systemctl());
        let registry = Arc::new(ServiceRegistry::new());
        let refresher = RegistryRefresher::new(Arc::clone(&registry), Arc::clone(&systemctl));
        let panel = Arc::new(Panel::new(Arc::clone(&registry), systemctl, common::users()));
        Self {
            fake,
            app: api::router(panel),
            refresher,
            registry,
        }
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Vec<u8>) {
        self.post_raw(uri, body.to_string()).await
    }

    async fn post_raw(&self, uri: &str, body: String) -> (StatusCode, Vec<u8>) {
        let response = self
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn login(&self) -> String {
        let (status, body) = self
            .post("/login", json!({"login": USERNAME, "password": PASSWORD}))
            .await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        body["key"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_end_to_end_list() {
    let fx = Fixture::new();
    let key = fx.login().await;
    assert_eq!(key.len(), 64);

    // Nothing refreshed yet
    let (status, body) = fx.post("/services/list", json!({"key": key})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!([]));

    fx.fake
        .set_list("nginx.service loaded active running Nginx web server\n");
    fx.refresher.refresh().await.unwrap();

    let (status, body) = fx.post("/services/list", json!({"key": key})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_slice::<Value>(&body).unwrap(),
        json!([{
            "name": "nginx.service",
            "active": "running",
            "description": "Nginx web server",
        }])
    );
}

#[tokio::test]
async fn test_login_responses() {
    let fx = Fixture::new();

    let (status, body) = fx
        .post("/login", json!({"login": "nobody", "password": PASSWORD}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, b"login");

    let (status, body) = fx
        .post("/login", json!({"login": USERNAME, "password": "nope"}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, b"password");

    let (status, _) = fx.post("/login", json!({"login": USERNAME})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = fx.post_raw("/login", "{not json".into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_session_is_forbidden() {
    let fx = Fixture::new();
    for uri in [
        "/services/list",
        "/services/status",
        "/services/stop",
        "/services/start",
        "/services/restart",
    ] {
        let (status, _) = fx
            .post(uri, json!({"key": "FORGED", "serviceName": "nginx.service"}))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);

        let (status, _) = fx.post(uri, json!({})).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
    }
}

#[tokio::test]
async fn test_missing_service_name_is_bad_request() {
    let fx = Fixture::new();
    let key = fx.login().await;
    for uri in [
        "/services/status",
        "/services/stop",
        "/services/start",
        "/services/restart",
    ] {
        let (status, _) = fx.post(uri, json!({"key": key})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }
    assert!(fx.fake.calls().is_empty());
}

#[tokio::test]
async fn test_stop_unknown_service_is_not_found() {
    let fx = Fixture::new();
    fx.fake
        .set_list("nginx.service loaded active running Nginx web server\n");
    fx.refresher.refresh().await.unwrap();
    let key = fx.login().await;

    let (status, _) = fx
        .post("/services/stop", json!({"key": key, "serviceName": "ghost.service"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(fx.fake.calls_with("stop").is_empty());
}

#[tokio::test]
async fn test_control_success_and_failure() {
    let fx = Fixture::new();
    fx.fake
        .set_list("nginx.service loaded active running Nginx web server\n");
    fx.refresher.refresh().await.unwrap();
    let key = fx.login().await;

    let (status, body) = fx
        .post("/services/restart", json!({"key": key, "serviceName": "nginx.service"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_eq!(fx.fake.calls_with("restart"), vec!["restart nginx.service"]);

    fx.fake
        .on_control(r#"echo "Failed to $1 $2: Interactive authentication required." >&2; exit 1"#);
    let (status, body) = fx
        .post("/services/stop", json!({"key": key, "serviceName": "nginx.service"}))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        String::from_utf8(body).unwrap(),
        "Failed to stop nginx.service: Interactive authentication required."
    );
}

#[tokio::test]
async fn test_status_route() {
    let fx = Fixture::new();
    fx.fake
        .set_list("nginx.service loaded active running Nginx web server\n");
    fx.refresher.refresh().await.unwrap();
    let key = fx.login().await;

    fx.fake.on_is_active("echo failed; exit 3");
    let (status, body) = fx
        .post("/services/status", json!({"key": key, "serviceName": "nginx.service"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!("failed"));

    let (_, body) = fx.post("/services/list", json!({"key": key})).await;
    assert_eq!(
        serde_json::from_slice::<Value>(&body).unwrap()[0]["active"],
        json!("failed")
    );
}

#[tokio::test]
async fn test_status_silent_exit_is_server_error() {
    let fx = Fixture::new();
    fx.fake
        .set_list("nginx.service loaded active running Nginx web server\n");
    fx.refresher.refresh().await.unwrap();
    let key = fx.login().await;
    let before = fx.registry.snapshot().await;

    fx.fake.on_is_active("exit 3");
    let (status, body) = fx
        .post("/services/status", json!({"key": key, "serviceName": "nginx.service"}))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, b"exited with code 3");
    assert_eq!(fx.registry.snapshot().await, before);
}
