//! Stub upstream APIs
//!
//! Serves Gemini `generateContent`, Unsplash `search/photos` and a plain
//! image download route from one axum server on a random port.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// What the Gemini stub answers with
#[derive(Debug, Clone)]
pub enum StubReply {
    /// One candidate carrying these bytes as inline data
    Image(Vec<u8>),
    /// A response with an empty candidate list
    NoCandidates,
    /// A candidate with text only
    TextOnly,
    /// An empty candidate list with a prompt block reason
    Blocked,
    /// Never answers within any sane client timeout
    Hang,
    /// A non-success HTTP status
    Status(u16),
}

#[derive(Default)]
struct StubState {
    reply: Mutex<Option<StubReply>>,
    gemini_calls: AtomicUsize,
    last_gemini_request: Mutex<Option<Value>>,
    last_gemini_key: Mutex<Option<String>>,
    search_status: Mutex<Option<u16>>,
    search_body: Mutex<Option<Value>>,
    last_search_query: Mutex<Vec<(String, String)>>,
    last_search_auth: Mutex<Option<String>>,
    download: Mutex<Option<Vec<u8>>>,
}

/// Stub upstream server
pub struct StubUpstream {
    pub addr: SocketAddr,
    state: Arc<StubState>,
    _handle: JoinHandle<()>,
}

impl StubUpstream {
    /// Start the stub on a random port
    pub async fn start() -> Result<Self> {
        let state = Arc::new(StubState::default());
        let router = Router::new()
            .route("/models/{call}", post(generate_content))
            .route("/search/photos", get(search_photos))
            .route("/images/{name}", get(download))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                eprintln!("Stub server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    /// Base URL of the stub
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Set the next Gemini replies
    pub fn set_reply(&self, reply: StubReply) {
        *self.state.reply.lock().unwrap() = Some(reply);
    }

    /// Number of generateContent calls seen
    pub fn gemini_calls(&self) -> usize {
        self.state.gemini_calls.load(Ordering::SeqCst)
    }

    /// JSON body of the last generateContent call
    pub fn last_gemini_request(&self) -> Option<Value> {
        self.state.last_gemini_request.lock().unwrap().clone()
    }

    /// API key header of the last generateContent call
    pub fn last_gemini_key(&self) -> Option<String> {
        self.state.last_gemini_key.lock().unwrap().clone()
    }

    /// Make the search endpoint answer with a status and optional body
    pub fn set_search(&self, status: u16, body: Option<Value>) {
        *self.state.search_status.lock().unwrap() = Some(status);
        *self.state.search_body.lock().unwrap() = body;
    }

    /// Query pairs of the last search call
    pub fn last_search_query(&self) -> Vec<(String, String)> {
        self.state.last_search_query.lock().unwrap().clone()
    }

    /// Authorization header of the last search call
    pub fn last_search_auth(&self) -> Option<String> {
        self.state.last_search_auth.lock().unwrap().clone()
    }

    /// Bytes served from `/images/{name}`
    pub fn set_download(&self, data: Vec<u8>) {
        *self.state.download.lock().unwrap() = Some(data);
    }
}

async fn generate_content(
    State(state): State<Arc<StubState>>,
    Path(_call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.gemini_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_gemini_request.lock().unwrap() = Some(body);
    *state.last_gemini_key.lock().unwrap() = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let reply = state.reply.lock().unwrap().clone();
    match reply {
        Some(StubReply::Image(data)) => Json(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here is your aluminum design."},
                        {"inlineData": {"mimeType": "image/png", "data": BASE64.encode(&data)}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }))
        .into_response(),
        Some(StubReply::TextOnly) => Json(json!({
            "candidates": [{"content": {"parts": [{"text": "I cannot draw that."}]}}]
        }))
        .into_response(),
        Some(StubReply::Blocked) => Json(json!({
            "candidates": [],
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .into_response(),
        Some(StubReply::Hang) => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            StatusCode::GATEWAY_TIMEOUT.into_response()
        }
        Some(StubReply::Status(code)) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(json!({"error": {"message": "stub failure"}})),
        )
            .into_response(),
        Some(StubReply::NoCandidates) | None => Json(json!({"candidates": []})).into_response(),
    }
}

async fn search_photos(
    State(state): State<Arc<StubState>>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Response {
    *state.last_search_query.lock().unwrap() = query;
    *state.last_search_auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let status = state.search_status.lock().unwrap().unwrap_or(200);
    let body = state.search_body.lock().unwrap().clone().unwrap_or(json!({}));
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(body),
    )
        .into_response()
}

async fn download(State(state): State<Arc<StubState>>, Path(_name): Path<String>) -> Response {
    match state.download.lock().unwrap().clone() {
        Some(data) => data.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
