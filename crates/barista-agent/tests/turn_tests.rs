//! Full two-phase turn protocol against a mock server:
//! stream → halt on requires_action → dispatch tools → resume streaming.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use barista_agent::{AssistantChunk, ChatRole, ChatSession};
use barista_fellow::FellowClient;
use barista_openai::OpenAiClient;
use barista_tools::ToolRegistry;

fn sse(frames: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (event, data) in frames {
        body.push_str(&format!("event: {}\ndata: {}\n\n", event, data));
    }
    body
}

fn sse_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_raw(body, "text/event-stream")
}

fn session_for(server: &MockServer) -> ChatSession {
    let openai = Arc::new(OpenAiClient::with_base_url("test-key", server.uri()));
    let fellow = Arc::new(FellowClient::with_base_url(server.uri()));
    let registry = Arc::new(ToolRegistry::new(fellow, Arc::clone(&openai)));
    ChatSession::new(openai, registry, "asst_1")
}

#[tokio::test]
async fn plain_text_turn_streams_and_mirrors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "thread_1"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "msg_1"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs"))
        .respond_with(sse_response(sse(&[
            (
                "thread.message.delta",
                r#"{"id":"msg_2","delta":{"content":[{"index":0,"type":"text","text":{"value":"Try a "}}]}}"#,
            ),
            (
                "thread.message.delta",
                r#"{"id":"msg_2","delta":{"content":[{"index":0,"type":"text","text":{"value":"1:16 ratio."}}]}}"#,
            ),
            ("thread.run.completed", r#"{"id":"run_1","thread_id":"thread_1"}"#),
            ("done", "[DONE]"),
        ])))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let mut chunks = Vec::new();
    session
        .run_turn("what ratio for a washed gesha?", &mut |c| chunks.push(c))
        .await
        .unwrap();

    assert_eq!(
        chunks,
        vec![
            AssistantChunk::Text("Try a ".to_string()),
            AssistantChunk::Text("1:16 ratio.".to_string()),
        ]
    );

    // Mirror: greeting, user turn, assembled assistant reply.
    let messages = session.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role, ChatRole::User);
    assert_eq!(messages[2].role, ChatRole::Assistant);
    assert_eq!(messages[2].content, "Try a 1:16 ratio.");
}

#[tokio::test]
async fn tool_turn_dispatches_and_resumes_streaming() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "thread_1"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "msg_1"})))
        .mount(&server)
        .await;

    // The page the scrape tool will fetch.
    Mock::given(method("GET"))
        .and(path("/roaster"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>juicy natural</html>"))
        .mount(&server)
        .await;

    // Phase one: the run immediately halts for a scrape.
    let scrape_args = json!({"url": format!("{}/roaster", server.uri())}).to_string();
    let requires_action = json!({
        "id": "run_1",
        "thread_id": "thread_1",
        "required_action": {
            "type": "submit_tool_outputs",
            "submit_tool_outputs": {
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": { "name": "scrape_website", "arguments": scrape_args }
                }]
            }
        }
    });
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs"))
        .respond_with(sse_response(sse(&[(
            "thread.run.requires_action",
            &requires_action.to_string(),
        )])))
        .mount(&server)
        .await;

    // Phase two: the submission stream carries the final answer. The body
    // must contain the scraped page keyed by the call id.
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs/run_1/submit_tool_outputs"))
        .and(body_partial_json(json!({
            "tool_outputs": [{
                "tool_call_id": "call_1",
                "output": "<html>juicy natural</html>"
            }]
        })))
        .respond_with(sse_response(sse(&[
            (
                "thread.message.delta",
                r#"{"id":"msg_2","delta":{"content":[{"index":0,"type":"text","text":{"value":"A juicy natural: ratio 15.5."}}]}}"#,
            ),
            ("thread.run.completed", r#"{"id":"run_1","thread_id":"thread_1"}"#),
            ("done", "[DONE]"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let mut chunks = Vec::new();
    session
        .run_turn("make a recipe from this roaster page", &mut |c| {
            chunks.push(c)
        })
        .await
        .unwrap();

    // First chunk is the progress note (no content before the halt), then
    // the post-dispatch answer.
    assert_eq!(
        chunks,
        vec![
            AssistantChunk::Text("Executing scrape_website...".to_string()),
            AssistantChunk::Text("A juicy natural: ratio 15.5.".to_string()),
        ]
    );

    let messages = session.messages();
    assert_eq!(
        messages.last().unwrap().content,
        "A juicy natural: ratio 15.5."
    );
}

#[tokio::test]
async fn failed_run_ends_turn_without_output() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "thread_1"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "msg_1"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs"))
        .respond_with(sse_response(sse(&[(
            "thread.run.failed",
            r#"{"id":"run_1","thread_id":"thread_1","last_error":{"code":"rate_limit_exceeded","message":"slow down"}}"#,
        )])))
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let mut chunks = Vec::new();
    session
        .run_turn("hello?", &mut |c| chunks.push(c))
        .await
        .unwrap();

    assert!(chunks.is_empty());
    // Mirror holds only the greeting and the user message.
    assert_eq!(session.messages().len(), 2);
}
