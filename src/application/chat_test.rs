use anyhow::Result;
use serde_json::json;

use super::clamp_input;
use super::fetch_models;
use super::fetch_reply;
use super::MAX_INPUT_LENGTH;
use crate::domain::models::Message;
use crate::domain::models::RelayRequest;

fn request_with(content: &str) -> RelayRequest {
    return RelayRequest {
        messages: vec![Message::user(content)],
        model: None,
    };
}

#[test]
fn it_clamps_input_by_characters() {
    let long = "x".repeat(MAX_INPUT_LENGTH + 50);
    assert_eq!(clamp_input(&long).chars().count(), MAX_INPUT_LENGTH);

    let short = "hello";
    assert_eq!(clamp_input(short), "hello".to_string());

    let multibyte = "\u{e9}".repeat(MAX_INPUT_LENGTH + 10);
    assert_eq!(clamp_input(&multibyte).chars().count(), MAX_INPUT_LENGTH);
}

#[tokio::test]
async fn it_fetches_a_json_reply() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(json!({"response": "Hey!", "model": "gpt-4.1-nano"}).to_string())
        .create();

    let client = reqwest::Client::new();
    let reply = fetch_reply(&client, &server.url(), &request_with("hi")).await?;
    mock.assert();

    assert_eq!(reply, "Hey!".to_string());
    return Ok(());
}

#[tokio::test]
async fn it_reassembles_a_streamed_reply() -> Result<()> {
    let body = "data: {\"response\":\"Hel\"}\n\ndata: {\"response\":\"lo\"}\n\ndata: [DONE]\n\n";

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create();

    let client = reqwest::Client::new();
    let reply = fetch_reply(&client, &server.url(), &request_with("hi")).await?;
    mock.assert();

    assert_eq!(reply, "Hello".to_string());
    return Ok(());
}

#[tokio::test]
async fn it_surfaces_the_error_envelope() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/")
        .with_status(500)
        .with_body(
            json!({"error": "not_configured", "response": "The AI is not configured yet."})
                .to_string(),
        )
        .create();

    let client = reqwest::Client::new();
    let reply = fetch_reply(&client, &server.url(), &request_with("hi")).await;
    mock.assert();

    let err = reply.unwrap_err();
    assert!(err.to_string().contains("The AI is not configured yet"));
    return Ok(());
}

#[tokio::test]
async fn it_falls_back_to_the_status_without_an_envelope() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server.mock("POST", "/").with_status(502).create();

    let client = reqwest::Client::new();
    let reply = fetch_reply(&client, &server.url(), &request_with("hi")).await;
    mock.assert();

    let err = reply.unwrap_err();
    assert!(err.to_string().contains("502"));
    return Ok(());
}

#[tokio::test]
async fn it_errors_when_the_relay_is_unreachable() {
    let client = reqwest::Client::new();
    let reply = fetch_reply(&client, "http://127.0.0.1:1", &request_with("hi")).await;
    assert!(reply.is_err());
}

#[tokio::test]
async fn it_returns_none_when_the_model_listing_is_unreachable() {
    let client = reqwest::Client::new();
    let listing = fetch_models(&client, "http://127.0.0.1:1").await;
    assert!(listing.is_none());
}

#[tokio::test]
async fn it_fetches_the_model_listing() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/models")
        .with_status(200)
        .with_body(
            json!({
                "models": [{"id": "openai:gpt-4.1-nano", "name": "GPT-4.1 Nano", "provider": "openai"}],
                "default": "openai:gpt-4.1-nano",
            })
            .to_string(),
        )
        .create();

    let client = reqwest::Client::new();
    let listing = fetch_models(&client, &server.url()).await.unwrap();
    mock.assert();

    assert_eq!(listing.default, "openai:gpt-4.1-nano".to_string());
    assert_eq!(listing.models.len(), 1);
    return Ok(());
}

#[test]
fn it_renders_the_help_text() {
    insta::assert_snapshot!(super::help_text(), @r###"
    COMMANDS:
    - /models (/ml) - Lists all models available through the relay.
    - /model (/m) [MODEL_ID] - Selects the model used for following prompts.
    - /help (/h) - Provides this help menu.
    - /quit /exit (/q) - Exit.
    "###);
}
