//! Relay metric names and instruments

use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::metrics::{Counter, Histogram};

pub const RELAY_REQUEST_COUNT: &str = "relay.request.count";
pub const RELAY_TIME_TO_FIRST_TOKEN: &str = "relay.time_to_first_token";
pub const RELAY_STREAMING_DURATION: &str = "relay.streaming.duration";
pub const RELAY_CHUNK_COUNT: &str = "relay.chunk.count";

/// Instruments recorded by the relay
///
/// Backed by the global meter, so recording is a no-op until an exporter
/// has been installed by [`crate::init`].
#[derive(Clone)]
pub struct RelayMetrics {
    requests: Counter<u64>,
    time_to_first_token: Histogram<f64>,
    streaming_duration: Histogram<f64>,
    chunks: Counter<u64>,
}

impl RelayMetrics {
    pub fn new() -> Self {
        let meter = global::meter("chat-relay");

        Self {
            requests: meter
                .u64_counter(RELAY_REQUEST_COUNT)
                .with_description("Relay calls by terminal outcome")
                .build(),
            time_to_first_token: meter
                .f64_histogram(RELAY_TIME_TO_FIRST_TOKEN)
                .with_description("Seconds from request start to the first upstream fragment")
                .with_unit("s")
                .build(),
            streaming_duration: meter
                .f64_histogram(RELAY_STREAMING_DURATION)
                .with_description("Seconds from request start to the end of the stream")
                .with_unit("s")
                .build(),
            chunks: meter
                .u64_counter(RELAY_CHUNK_COUNT)
                .with_description("Stream chunks delivered to callers")
                .build(),
        }
    }

    /// Count a finished call under `outcome` (e.g. "completed", "cancelled")
    pub fn record_outcome(&self, model: &str, outcome: &'static str) {
        self.requests.add(
            1,
            &[KeyValue::new("model", model.to_owned()), KeyValue::new("outcome", outcome)],
        );
    }

    pub fn record_time_to_first_token(&self, model: &str, elapsed: Duration) {
        self.time_to_first_token
            .record(elapsed.as_secs_f64(), &[KeyValue::new("model", model.to_owned())]);
    }

    pub fn record_stream_end(&self, model: &str, elapsed: Duration, chunks: u64) {
        let attrs = [KeyValue::new("model", model.to_owned())];
        self.streaming_duration.record(elapsed.as_secs_f64(), &attrs);
        self.chunks.add(chunks, &attrs);
    }
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}
