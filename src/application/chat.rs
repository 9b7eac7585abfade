#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use anyhow::Result;
use futures::stream::TryStreamExt;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::Mutex;
use tokio::time;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Conversation;
use crate::domain::models::ErrorEnvelope;
use crate::domain::models::Message;
use crate::domain::models::ModelsResponse;
use crate::domain::models::Provider;
use crate::domain::models::RelayRequest;
use crate::domain::models::SlashCommand;
use crate::domain::models::DEFAULT_MODEL_ID;
use crate::domain::services::extractor;
use crate::domain::services::StreamReassembler;
use crate::domain::services::Typewriter;

/// Hard cap on a single prompt.
pub const MAX_INPUT_LENGTH: usize = 200;

/// One display refresh worth of reveal cadence.
const REVEAL_INTERVAL: Duration = Duration::from_millis(16);

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /models (/ml) - Lists all models available through the relay.
- /model (/m) [MODEL_ID] - Selects the model used for following prompts.
- /help (/h) - Provides this help menu.
- /quit /exit (/q) - Exit.
        "#;

    return text.trim().to_string();
}

pub async fn start() -> Result<()> {
    let relay_url = Config::get(ConfigKey::RelayUrl);
    let client = reqwest::Client::new();

    let listing = fetch_models(&client, &relay_url).await;
    if listing.is_none() {
        tracing::warn!(url = %relay_url, "Model listing unreachable, falling back to the default model");
    }

    let mut selector = Config::get(ConfigKey::Model);
    if selector.is_empty() {
        selector = match &listing {
            Some(listing) => listing.default.clone(),
            None => DEFAULT_MODEL_ID.to_string(),
        };
    }

    println!(
        "{} Connected to {relay_url}. Type {} for commands.",
        Paint::green("●"),
        Paint::new("/help").bold()
    );

    let username = Config::get(ConfigKey::Username);
    let mut conversation = Conversation::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", Paint::cyan(format!("{username}>")));
        flush_stdout();

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };

        let input = line.trim().to_string();
        if input.is_empty() {
            continue;
        }

        if let Some(command) = SlashCommand::parse(&input) {
            if command.is_quit() {
                break;
            }

            handle_command(&command, &listing, &mut selector);
            continue;
        }

        // The loop is strictly sequential, a new prompt cannot be sent
        // while a reply is pending or still revealing.
        let reply = send_prompt(&client, &relay_url, &mut conversation, &selector, &input).await;
        conversation.push(Message::assistant(&reply));
    }

    return Ok(());
}

fn handle_command(command: &SlashCommand, listing: &Option<ModelsResponse>, selector: &mut String) {
    if command.is_help() {
        println!("{}", help_text());
        return;
    }

    if command.is_model_list() {
        match listing {
            Some(listing) => {
                let mut last_provider: Option<Provider> = None;
                for descriptor in &listing.models {
                    if last_provider != Some(descriptor.provider) {
                        println!("{}", Paint::new(descriptor.provider.to_string()).bold());
                        last_provider = Some(descriptor.provider);
                    }

                    let marker = if descriptor.id == *selector { "*" } else { " " };
                    println!(
                        "{marker} {id} ({name})",
                        id = descriptor.id,
                        name = descriptor.name
                    );
                }
            }
            None => println!("The relay's model listing was unreachable at startup."),
        }
        return;
    }

    if command.is_model_set() {
        match command.args.first() {
            Some(id) => {
                // A stale or mistyped id is harmless, the relay falls back
                // to its default rather than failing the request.
                *selector = id.to_string();
                println!("Model set to {id}.");
            }
            None => println!("Usage: /model MODEL_ID"),
        }
    }
}

async fn send_prompt(
    client: &reqwest::Client,
    relay_url: &str,
    conversation: &mut Conversation,
    selector: &str,
    input: &str,
) -> String {
    conversation.push(Message::user(&clamp_input(input)));

    let request = RelayRequest {
        messages: conversation.payload(),
        model: Some(selector.to_string()),
    };

    print!("{} ", Paint::magenta("assistant>"));
    flush_stdout();

    match fetch_reply(client, relay_url, &request).await {
        Ok(reply) => {
            println!();
            return reply;
        }
        Err(err) => {
            let message =
                format!("Connection error: {err}. The relay may be down or misconfigured.");
            println!("{}", Paint::red(&message));
            return message;
        }
    }
}

pub(crate) fn clamp_input(input: &str) -> String {
    return input.chars().take(MAX_INPUT_LENGTH).collect();
}

async fn fetch_models(client: &reqwest::Client, relay_url: &str) -> Option<ModelsResponse> {
    let res = client
        .get(format!("{relay_url}/models"))
        .send()
        .await
        .ok()?;

    return res.json::<ModelsResponse>().await.ok();
}

/// Sends one relay request and renders the reply through the typewriter.
/// Streamed and single-document replies share the same reveal path.
async fn fetch_reply(
    client: &reqwest::Client,
    relay_url: &str,
    request: &RelayRequest,
) -> Result<String> {
    let res = client.post(relay_url).json(request).send().await?;

    let status = res.status();
    if !status.is_success() {
        // The relay wraps every failure in an envelope with a renderable
        // string. Prefer that over the bare status.
        let envelope = res.json::<ErrorEnvelope>().await.unwrap_or_default();
        if !envelope.response.is_empty() {
            return Err(anyhow!(envelope.response));
        }

        return Err(anyhow!("the relay returned status {status}"));
    }

    let content_type = res
        .headers()
        .get("content-type")
        .and_then(|value| return value.to_str().ok())
        .unwrap_or("")
        .to_string();
    if content_type.contains("text/event-stream") {
        return stream_reply(res).await;
    }

    let doc = res.json::<serde_json::Value>().await?;
    return reveal(extractor::reply_text(&doc)).await;
}

/// Reads the event stream into the shared typewriter while the render loop
/// drains it. The two sides communicate only through the typewriter's
/// buffer and closed flag.
async fn stream_reply(res: reqwest::Response) -> Result<String> {
    let typewriter = Arc::new(Mutex::new(Typewriter::default()));

    let reader_state = typewriter.clone();
    let reader = tokio::spawn(async move {
        let mut stream = res.bytes_stream();
        let mut reassembler = StreamReassembler::default();

        loop {
            let chunk = match stream.try_next().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(err) => {
                    // Force the reveal into a terminal state so the render
                    // loop cannot wait on a tick that will never complete.
                    reader_state.lock().await.abort();
                    return Err(anyhow!(err));
                }
            };

            let deltas = reassembler.push(&chunk);
            if !deltas.is_empty() {
                let mut guard = reader_state.lock().await;
                for delta in &deltas {
                    guard.push(delta);
                }
            }
        }

        if let Some(fragment) = reassembler.finish() {
            tracing::debug!(fragment = %fragment, "Stream ended mid-line, fragment dropped");
        }

        reader_state.lock().await.close();
        return Ok(());
    });

    render_loop(typewriter.clone()).await;
    reader.await??;

    let guard = typewriter.lock().await;
    return Ok(guard.content().to_string());
}

/// Animates a reply that arrived whole, reusing the streamed reveal path.
async fn reveal(text: String) -> Result<String> {
    let typewriter = Arc::new(Mutex::new(Typewriter::default()));
    {
        let mut guard = typewriter.lock().await;
        guard.push(&text);
        guard.close();
    }

    render_loop(typewriter).await;
    return Ok(text);
}

async fn render_loop(typewriter: Arc<Mutex<Typewriter>>) {
    let mut ticker = time::interval(REVEAL_INTERVAL);

    loop {
        ticker.tick().await;

        let mut guard = typewriter.lock().await;
        let newly = guard.tick();
        let done = guard.is_final();
        drop(guard);

        if !newly.is_empty() {
            print!("{newly}");
            flush_stdout();
        }

        if done {
            break;
        }
    }
}

fn flush_stdout() {
    let _ = std::io::stdout().flush();
}
