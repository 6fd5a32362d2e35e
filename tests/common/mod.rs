#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use septic_lookup::domain::ports::Repository;
use septic_lookup::{router, ApiClient, AppState, LookupService, MemoryStore, NewApiClient};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub app: axum::Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let lookup = LookupService::new(store.clone(), reqwest::Client::new());
        let app = router(AppState::new(lookup));
        Self { store, app }
    }

    pub async fn register(&self, credential_id: &str, host: &str) -> ApiClient {
        self.store
            .clients()
            .create(NewApiClient {
                name: format!("{} client", credential_id),
                credential_id: credential_id.to_string(),
                credential_secret: format!("{}-secret", credential_id),
                host: host.to_string(),
                path: "property/details".to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn get_as(&self, client: &ApiClient, uri: &str) -> Response<Body> {
        self.send(
            Request::get(uri)
                .header("authorization", client.auth_header())
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
