mod harness;

use harness::config::ConfigBuilder;
use harness::mock_upstream::{MockUpstream, Script};
use harness::server::TestServer;
use harness::sse::user_message;
use relay_config::Framing;

#[tokio::test]
async fn data_stream_headers() {
    let mock = MockUpstream::start(Script::fragments(&["Hi"])).await.unwrap();
    let config = ConfigBuilder::new()
        .with_upstream(&mock.base_url())
        .with_framing(Framing::DataStream)
        .build();

    let server = TestServer::start(config).await.unwrap();

    let resp = server.chat(&user_message("Hello")).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("text/plain; charset=utf-8")
    );
    assert_eq!(
        resp.headers()
            .get("x-vercel-ai-data-stream")
            .and_then(|v| v.to_str().ok()),
        Some("v1")
    );
}

#[tokio::test]
async fn data_stream_lines_end_with_finish_part() {
    let mock = MockUpstream::start(Script::fragments(&["We ", "offer ", "AI consulting."]))
        .await
        .unwrap();
    let config = ConfigBuilder::new()
        .with_upstream(&mock.base_url())
        .with_framing(Framing::DataStream)
        .build();

    let server = TestServer::start(config).await.unwrap();

    let body = server.chat(&user_message("What services do you offer?")).await.text().await.unwrap();
    let lines: Vec<&str> = body.lines().collect();

    assert_eq!(
        lines,
        vec![
            r#"0:"We ""#,
            r#"0:"offer ""#,
            r#"0:"AI consulting.""#,
            r#"d:{"finishReason":"stop"}"#,
        ]
    );
}

#[tokio::test]
async fn data_stream_interruption_is_an_error_part() {
    let mock = MockUpstream::start(Script::truncated(&["We "])).await.unwrap();
    let config = ConfigBuilder::new()
        .with_upstream(&mock.base_url())
        .with_framing(Framing::DataStream)
        .build();

    let server = TestServer::start(config).await.unwrap();

    let body = server.chat(&user_message("Hi")).await.text().await.unwrap();
    let lines: Vec<&str> = body.lines().collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], r#"0:"We ""#);
    assert!(lines[1].starts_with("3:"), "expected error part, got {}", lines[1]);
    assert!(!lines.iter().any(|l| l.starts_with("d:")));
}
