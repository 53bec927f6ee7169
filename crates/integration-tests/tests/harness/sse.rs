//! Helpers for reading relay response bodies

/// One parsed server-sent event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: serde_json::Value,
}

/// Parse an SSE body into events, skipping keep-alive comments
pub fn parse_events(text: &str) -> Vec<SseEvent> {
    text.split("\n\n")
        .filter_map(|block| {
            let mut event = String::from("message");
            let mut data = String::new();

            for line in block.lines() {
                if let Some(value) = line.strip_prefix("event:") {
                    value.trim().clone_into(&mut event);
                } else if let Some(value) = line.strip_prefix("data:") {
                    data.push_str(value.trim_start());
                }
            }

            if data.is_empty() {
                return None;
            }

            Some(SseEvent {
                event,
                data: serde_json::from_str(&data).expect("event data is JSON"),
            })
        })
        .collect()
}

/// Concatenate the deltas of all `chunk` events
pub fn assembled_text(events: &[SseEvent]) -> String {
    events
        .iter()
        .filter(|e| e.event == "chunk")
        .filter_map(|e| e.data["delta"].as_str())
        .collect()
}

/// Chat request body with a single user turn
pub fn user_message(content: &str) -> serde_json::Value {
    serde_json::json!({
        "messages": [{"role": "user", "content": content}]
    })
}
