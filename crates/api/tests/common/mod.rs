use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use setlist_db::MemoryStore;
use setlist_events::EventBus;
use tower::ServiceExt;

use setlist_api::config::ServerConfig;
use setlist_api::router::build_app_router;
use setlist_api::service::SetlistService;
use setlist_api::state::AppState;
use setlist_api::ws::WsManager;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    }
}

/// Everything an [`AppState`] is built from, kept around so tests can
/// inspect the store, the bus and the WebSocket manager directly.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub event_bus: Arc<EventBus>,
    pub ws_manager: Arc<WsManager>,
    pub service: Arc<SetlistService>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        let event_bus = Arc::new(EventBus::default());
        let service = Arc::new(SetlistService::new(store.clone(), Arc::clone(&event_bus)));
        Self {
            store,
            event_bus,
            ws_manager: Arc::new(WsManager::new()),
            service,
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            service: Arc::clone(&self.service),
            ws_manager: Arc::clone(&self.ws_manager),
            event_bus: Arc::clone(&self.event_bus),
        }
    }

    /// The production router (all middleware) over this context.
    pub fn app(&self) -> Router {
        build_app_router(self.state(), &test_config())
    }
}

/// Build the full application router over the given in-memory store.
pub fn build_test_app(store: Arc<MemoryStore>) -> Router {
    TestContext::with_store(store).app()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(json)).await
}

pub async fn put_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(json)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// POST a setlist and return its JSON.
pub async fn create_setlist(app: Router, body: serde_json::Value) -> serde_json::Value {
    body_json(post_json(app, "/api/setlists", body).await).await
}

/// POST a song and return its JSON.
pub async fn add_song(app: Router, setlist_id: &str, title: &str) -> serde_json::Value {
    let uri = format!("/api/setlists/{setlist_id}/songs");
    body_json(post_json(app, &uri, serde_json::json!({ "title": title })).await).await
}

/// Song titles of a setlist in returned order.
pub async fn song_titles(app: Router, setlist_id: &str) -> Vec<String> {
    let json = body_json(get(app, &format!("/api/setlists/{setlist_id}")).await).await;
    json["songs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap().to_string())
        .collect()
}
