//! Axum handler for the chat endpoint

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderName, StatusCode, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use futures_util::StreamExt;
use relay_config::Framing;
use relay_core::HttpError;

use crate::error::RelayError;
use crate::framing::{self, DATA_STREAM_CONTENT_TYPE, DATA_STREAM_HEADER, DATA_STREAM_VERSION, SseFrame};
use crate::relay::{Relay, RelayStream};
use crate::types::ChatRequest;

/// Shared state for the chat route
#[derive(Clone)]
pub struct ChatState {
    relay: Arc<Relay>,
    framing: Framing,
}

impl ChatState {
    pub fn new(relay: Arc<Relay>, framing: Framing) -> Self {
        Self { relay, framing }
    }
}

/// Build the router serving `POST {path}`
pub fn chat_router(state: ChatState, path: &str) -> Router {
    Router::new().route(path, routing::post(chat)).with_state(state)
}

/// Handle `POST /api/chat`
async fn chat(State(state): State<ChatState>, body: Result<Json<ChatRequest>, JsonRejection>) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return error_response(&RelayError::invalid_request(rejection.body_text())),
    };

    match state.relay.relay(&request.messages).await {
        Ok(stream) => match state.framing {
            Framing::Sse => sse_response(stream),
            Framing::DataStream => data_stream_response(stream),
        },
        Err(e) => error_response(&e),
    }
}

fn sse_response(stream: RelayStream) -> Response {
    let events = stream.map(|item| Ok::<_, Infallible>(Event::from(SseFrame::from_item(&item))));

    Sse::new(events).keep_alive(KeepAlive::default()).into_response()
}

fn data_stream_response(stream: RelayStream) -> Response {
    let lines = stream.map(|item| Ok::<_, Infallible>(framing::data_stream_lines(&item)));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, DATA_STREAM_CONTENT_TYPE),
            (HeaderName::from_static(DATA_STREAM_HEADER), DATA_STREAM_VERSION),
        ],
        Body::from_stream(lines),
    )
        .into_response()
}

fn error_response(error: &RelayError) -> Response {
    let status = error.status_code();

    if status.is_client_error() {
        tracing::debug!(error = %error, field = ?error.field(), "rejected chat request");
    }

    (status, Json(error.to_body())).into_response()
}
