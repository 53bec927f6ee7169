//! Mock OpenAI-compatible upstream for integration tests
//!
//! Serves `POST /v1/chat/completions` as a server-sent event stream built
//! from a fixed [`Script`], and records every request it receives.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use futures_util::stream;
use tokio_util::sync::CancellationToken;

/// What the mock does with each completion request
#[derive(Debug, Clone)]
pub enum Script {
    /// Stream the fragments, then `[DONE]`
    Fragments(Vec<String>),
    /// Stream the fragments, then close without `[DONE]`
    Truncated(Vec<String>),
    /// Reply with an error status and an OpenAI-style error body
    Status(StatusCode, String),
    /// Wait before replying with the fragments
    Delayed(Duration, Vec<String>),
    /// Send one fragment per interval, then `[DONE]`
    Paced(Duration, Vec<String>),
}

impl Script {
    pub fn fragments(fragments: &[&str]) -> Self {
        Self::Fragments(owned(fragments))
    }

    pub fn truncated(fragments: &[&str]) -> Self {
        Self::Truncated(owned(fragments))
    }

    pub fn delayed(delay: Duration, fragments: &[&str]) -> Self {
        Self::Delayed(delay, owned(fragments))
    }

    pub fn paced(interval: Duration, fragments: &[&str]) -> Self {
        Self::Paced(interval, owned(fragments))
    }
}

fn owned(fragments: &[&str]) -> Vec<String> {
    fragments.iter().map(|f| (*f).to_owned()).collect()
}

/// Request as seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

struct MockState {
    script: Script,
    request_count: AtomicU32,
    requests: Mutex<Vec<RecordedRequest>>,
    /// Set once a paced response body has been dropped
    stream_closed: Arc<AtomicBool>,
}

/// Mock upstream running on a random local port
pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

impl MockUpstream {
    /// Start the mock server, returning immediately
    pub async fn start(script: Script) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            script,
            request_count: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
            stream_closed: Arc::new(AtomicBool::new(false)),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL including `/v1`, as the provider appends `/chat/completions`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Number of completion requests received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// Whether a paced response body was dropped before or after finishing
    pub fn stream_closed(&self) -> bool {
        self.state.stream_closed.load(Ordering::SeqCst)
    }

    /// Most recent completion request
    pub fn last_request(&self) -> RecordedRequest {
        self.state
            .requests
            .lock()
            .expect("mock state poisoned")
            .last()
            .cloned()
            .expect("no request recorded")
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_chat_completions(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let model = body["model"].as_str().unwrap_or_default().to_owned();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    state
        .requests
        .lock()
        .expect("mock state poisoned")
        .push(RecordedRequest { authorization, body });

    match &state.script {
        Script::Fragments(fragments) => event_stream(&model, fragments, true),
        Script::Truncated(fragments) => event_stream(&model, fragments, false),
        Script::Status(status, message) => (
            *status,
            Json(serde_json::json!({
                "error": {
                    "message": message,
                    "type": "server_error"
                }
            })),
        )
            .into_response(),
        Script::Delayed(delay, fragments) => {
            tokio::time::sleep(*delay).await;
            event_stream(&model, fragments, true)
        }
        Script::Paced(interval, fragments) => {
            let guard = CloseGuard(Arc::clone(&state.stream_closed));
            paced_event_stream(model, fragments.clone(), *interval, guard)
        }
    }
}

/// Flags the mock state when the response body it lives in is dropped
struct CloseGuard(Arc<AtomicBool>);

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

struct Paced {
    model: String,
    fragments: Vec<String>,
    interval: Duration,
    next: usize,
    _guard: CloseGuard,
}

/// Stream fragments one at a time with `interval` between them
fn paced_event_stream(model: String, fragments: Vec<String>, interval: Duration, guard: CloseGuard) -> Response {
    let paced = Paced {
        model,
        fragments,
        interval,
        next: 0,
        _guard: guard,
    };

    let events = stream::unfold(paced, |mut paced| async move {
        if paced.next > paced.fragments.len() {
            return None;
        }
        if paced.next > 0 {
            tokio::time::sleep(paced.interval).await;
        }

        let mut body = String::new();
        match paced.fragments.get(paced.next) {
            Some(fragment) => push_chunk(&mut body, &paced.model, &serde_json::json!({"content": fragment}), None),
            None => body.push_str("data: [DONE]\n\n"),
        }
        paced.next += 1;

        Some((Ok::<_, Infallible>(body), paced))
    });

    ([(header::CONTENT_TYPE, "text/event-stream")], Body::from_stream(events)).into_response()
}

/// Build a complete SSE body in chat completion chunk format
fn event_stream(model: &str, fragments: &[String], finish: bool) -> Response {
    let mut body = String::new();

    // Role-only opening chunk, as real providers send
    push_chunk(&mut body, model, &serde_json::json!({"role": "assistant", "content": ""}), None);

    for fragment in fragments {
        push_chunk(&mut body, model, &serde_json::json!({"content": fragment}), None);
    }

    if finish {
        push_chunk(&mut body, model, &serde_json::json!({}), Some("stop"));
        body.push_str("data: [DONE]\n\n");
    }

    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

fn push_chunk(body: &mut String, model: &str, delta: &serde_json::Value, finish_reason: Option<&str>) {
    let chunk = serde_json::json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion.chunk",
        "created": 1_700_000_000u64,
        "model": model,
        "choices": [{
            "index": 0,
            "delta": delta,
            "finish_reason": finish_reason,
        }]
    });

    body.push_str("data: ");
    body.push_str(&chunk.to_string());
    body.push_str("\n\n");
}
