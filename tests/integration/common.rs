//! Shared helpers for driving the router in-process

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use shelf_server::{
    api::create_router,
    config::AppConfig,
    repository::{memory::MemoryStore, Repository},
    AppState,
};

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config, Repository::in_memory(store.clone()));
        Self {
            router: create_router(state),
            store,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|value| value.to_str().unwrap().to_string());

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            set_cookie,
            body,
        }
    }

    /// Sign in through `/jwt` and return the `name=value` pair to send back
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .request(Method::POST, "/jwt", None, Some(json!({ "email": email })))
            .await;
        assert_eq!(response.status, StatusCode::OK);

        let set_cookie = response.set_cookie.expect("session cookie");
        set_cookie
            .split(';')
            .next()
            .expect("cookie pair")
            .trim()
            .to_string()
    }

    /// Create a book through the API and return its id
    pub async fn create_book(&self, cookie: &str, name: &str, category: &str, quantity: i64) -> String {
        let response = self
            .request(
                Method::POST,
                "/books",
                Some(cookie),
                Some(json!({
                    "name": name,
                    "authorName": "Octavia E. Butler",
                    "category": category,
                    "rating": 4.6,
                    "image": "https://img.example/cover.jpg",
                    "quantity": quantity
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["insertedId"].as_str().unwrap().to_string()
    }
}
