use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use httpmock::MockServer;
use serde_json::json;
use tessera::application::assistant::{
    AssistantError, AssistantPanel, ChatMessage, GenerationRequest, TextGenerator,
};
use tessera::domain::blocks::BlockKind;
use tessera::infra::assistant::HttpTextGenerator;
use url::Url;

/// Replays canned outcomes and records every request it receives.
struct ScriptedGenerator {
    replies: Mutex<Vec<Result<String, AssistantError>>>,
    seen: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    fn new(mut replies: Vec<Result<String, AssistantError>>) -> Self {
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AssistantError> {
        self.seen.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(AssistantError::transport("script exhausted")))
    }
}

struct NeverReplies;

#[async_trait]
impl TextGenerator for NeverReplies {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, AssistantError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn conversation_accumulates_history() {
    let mut panel = AssistantPanel::new(ScriptedGenerator::new(vec![
        Ok("Store raw meat on the bottom shelf.".into()),
        Ok("Label it with the date.".into()),
    ]));

    panel.send("Where does raw meat go?").await.expect("first");
    let reply = panel.send("  Anything else?  ").await.expect("second");
    assert_eq!(reply, "Label it with the date.");

    let conversation = panel.conversation();
    assert_eq!(conversation.messages().len(), 4);
    assert!(!conversation.is_pending());
    assert!(conversation.error().is_none());
}

#[tokio::test]
async fn generator_receives_prior_exchanges_only() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        Ok("one".into()),
        Ok("two".into()),
    ]));
    let mut panel = AssistantPanel::new(Arc::clone(&generator));
    panel.send("first").await.expect("first");
    panel.send("second").await.expect("second");

    let seen = generator.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].prompt, "first");
    assert!(seen[0].history.is_empty());
    assert_eq!(seen[1].prompt, "second");
    assert_eq!(
        seen[1].history,
        vec![ChatMessage::user("first"), ChatMessage::assistant("one")]
    );
}

#[tokio::test]
async fn failure_is_reported_inline_and_the_panel_recovers() {
    let mut panel = AssistantPanel::new(ScriptedGenerator::new(vec![
        Err(AssistantError::Status {
            status: 503,
            message: "overloaded".into(),
        }),
        Ok("Back online.".into()),
    ]));

    let err = panel.send("hello").await.expect_err("should fail");
    assert!(matches!(err, AssistantError::Status { status: 503, .. }));
    assert_eq!(
        panel.conversation().error(),
        Some("assistant returned status 503: overloaded")
    );
    assert!(!panel.conversation().is_pending());
    assert!(panel.conversation().can_send("retry"));

    panel.send("retry").await.expect("second attempt");
    assert!(panel.conversation().error().is_none());
}

#[tokio::test]
async fn blank_prompt_never_reaches_the_generator() {
    let mut panel = AssistantPanel::new(ScriptedGenerator::new(Vec::new()));
    let err = panel.send(" \n ").await.expect_err("blank prompt");

    assert!(matches!(err, AssistantError::EmptyPrompt));
    assert!(panel.conversation().messages().is_empty());
    assert!(panel.conversation().error().is_none());
}

#[tokio::test]
async fn dropping_an_in_flight_send_clears_pending() {
    let mut panel = AssistantPanel::new(NeverReplies);

    tokio::select! {
        biased;
        _ = panel.send("write a notice") => panic!("generator never replies"),
        _ = std::future::ready(()) => {}
    }

    assert!(!panel.conversation().is_pending());
    assert_eq!(panel.conversation().messages().len(), 1);
}

#[tokio::test]
async fn reply_can_be_inserted_as_an_ai_block() {
    let mut panel = AssistantPanel::new(ScriptedGenerator::new(vec![Ok(
        "<p>Allergens are listed on the menu.</p>".into(),
    )]));
    panel.send("Draft an allergen line").await.expect("reply");

    let block = panel
        .conversation()
        .latest_reply_block()
        .expect("reply block");
    assert_eq!(block.type_name(), "ai");
    match block.kind {
        BlockKind::Ai(raw) => assert_eq!(raw.content, "<p>Allergens are listed on the menu.</p>"),
        other => panic!("unexpected kind: {other:?}"),
    }
}

#[tokio::test]
async fn http_generator_posts_prompt_and_history() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("POST")
                .path("/generate")
                .header("authorization", "Bearer secret")
                .json_body(json!({
                    "prompt": "Summarise HACCP",
                    "history": []
                }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "text": "Hazard analysis and critical control points." }));
        })
        .await;

    let endpoint = Url::parse(&server.url("/generate")).expect("url");
    let generator = HttpTextGenerator::new(endpoint, Some("secret".into())).expect("client");
    let mut panel = AssistantPanel::new(generator);

    let reply = panel.send("Summarise HACCP").await.expect("reply");
    assert_eq!(reply, "Hazard analysis and critical control points.");
    mock.assert_async().await;
}

#[tokio::test]
async fn http_generator_surfaces_error_statuses() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("POST").path("/generate");
            then.status(500).body("upstream exploded");
        })
        .await;

    let endpoint = Url::parse(&server.url("/generate")).expect("url");
    let generator = HttpTextGenerator::new(endpoint, None).expect("client");
    let mut panel = AssistantPanel::new(generator);

    let err = panel.send("hello").await.expect_err("500");
    match err {
        AssistantError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(panel.conversation().error().is_some());
}
