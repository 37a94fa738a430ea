//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use vitals_insight::{llm::Analyzer, routes, AppError, Provider, Result};

/// What the stub returns for every call.
#[derive(Clone)]
pub enum Reply {
    Json(Value),
    Fail(String),
}

/// Analyzer that records its inputs and answers with a canned reply.
pub struct StubAnalyzer {
    reply: Reply,
    calls: Mutex<Vec<(Provider, String)>>,
}

impl StubAnalyzer {
    pub fn replying(payload: Value) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Json(payload),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Fail(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Every `(provider, summary)` pair seen so far.
    pub fn calls(&self) -> Vec<(Provider, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Analyzer for StubAnalyzer {
    async fn analyze(&self, provider: Provider, health_summary: &str) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((provider, health_summary.to_string()));
        match &self.reply {
            Reply::Json(v) => Ok(v.clone()),
            Reply::Fail(msg) => Err(AppError::upstream(msg.clone())),
        }
    }
}

pub fn app(stub: &Arc<StubAnalyzer>) -> Router {
    routes::router(stub.clone())
}

/// Send a request through the router without a socket and decode the JSON body.
pub async fn send(app: Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    // ---
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(Body::from(body.unwrap_or_default().to_string()))
        .expect("Failed to build request");

    let response = app.oneshot(request).await.expect("Failed to execute request");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Serve the router on an ephemeral local port; returns the base URL.
pub async fn spawn_app(stub: &Arc<StubAnalyzer>) -> String {
    // ---
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().expect("No local address");
    let app = app(stub);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });
    format!("http://{}", addr)
}
