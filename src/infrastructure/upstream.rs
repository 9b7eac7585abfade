#[cfg(test)]
#[path = "upstream_test.rs"]
mod tests;

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Message;
use crate::domain::models::RelayError;
use crate::domain::models::ResolvedModel;
use crate::domain::models::Role;
use crate::domain::services::extractor;

const COMPLETIONS_PATH: &str = "/llm/v1alpha/completions:completeChat";

// Generation parameters are fixed, clients cannot configure them.
const MAX_TOKENS: u32 = 1024;
const TEMPERATURE: f32 = 0.7;

const SYSTEM_PROMPT: &str = "You are the resident assistant on this site. You're helpful, friendly, and concise.

Formatting:
- Use markdown for formatting your responses
- Use **bold** for emphasis and key terms
- Format links as [text](url) and always include full URLs
- Use `inline code` for technical terms, commands, or code snippets
- Use code blocks with a language tag for multi-line code
- Use bullet points and numbered lists when appropriate
- Keep responses brief and conversational

If asked about something you don't know, be honest and helpful anyway.";

fn role_token(role: Role) -> &'static str {
    return match role {
        Role::System => "MESSAGE_ROLE_SYSTEM",
        Role::Assistant => "MESSAGE_ROLE_ASSISTANT",
        // Roles outside the known vocabulary relay as user messages.
        Role::User | Role::Unknown => "MESSAGE_ROLE_USER",
    };
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelId {
    model: String,
    service_provider: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServingId {
    model_id: ModelId,
    user_id: String,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_tokens: u32,
    temperature: f32,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest {
    serving_id: ServingId,
    messages: Vec<WireMessage>,
    text_generation_config: GenerationConfig,
}

pub enum UpstreamReply {
    /// The upstream answered with a single document.
    Complete(String),
    /// The upstream negotiated an event stream, forwarded as-is.
    Stream(reqwest::Response),
}

pub struct Upstream {
    url: String,
    key: String,
}

impl Default for Upstream {
    fn default() -> Upstream {
        return Upstream::new(
            Config::get(ConfigKey::UpstreamUrl),
            Config::get(ConfigKey::UpstreamKey),
        );
    }
}

impl Upstream {
    pub fn new(url: String, key: String) -> Upstream {
        return Upstream { url, key };
    }

    pub fn is_configured(&self) -> bool {
        return !self.key.is_empty();
    }

    fn request_body(&self, model: &ResolvedModel, messages: &[Message]) -> CompletionRequest {
        let mut wire = vec![WireMessage {
            role: role_token(Role::System).to_string(),
            content: SYSTEM_PROMPT.to_string(),
        }];
        wire.extend(messages.iter().map(|message| {
            return WireMessage {
                role: role_token(message.role).to_string(),
                content: message.content.clone(),
            };
        }));

        return CompletionRequest {
            serving_id: ServingId {
                model_id: ModelId {
                    model: model.model.clone(),
                    service_provider: model.provider.wire_token().to_string(),
                },
                user_id: ephemeral_user_id(),
            },
            messages: wire,
            text_generation_config: GenerationConfig {
                max_tokens: MAX_TOKENS,
                temperature: TEMPERATURE,
            },
        };
    }

    pub async fn complete_chat(
        &self,
        model: &ResolvedModel,
        messages: &[Message],
    ) -> Result<UpstreamReply, RelayError> {
        let req = self.request_body(model, messages);

        let res = reqwest::Client::new()
            .post(format!("{url}{COMPLETIONS_PATH}", url = self.url))
            .header("Authorization", format!("Basic {key}", key = self.key))
            .json(&req)
            .send()
            .await
            .map_err(|err| return RelayError::Upstream(err.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_else(|_| return "".to_string());
            tracing::error!(
                status = status.as_u16(),
                detail = %detail,
                "Upstream completion request failed"
            );

            return Err(match status.as_u16() {
                401 | 403 => RelayError::UpstreamAuth,
                429 => RelayError::Throttled,
                code => RelayError::Upstream(format!("upstream returned status {code}")),
            });
        }

        let content_type = res
            .headers()
            .get("content-type")
            .and_then(|value| return value.to_str().ok())
            .unwrap_or("")
            .to_string();
        if content_type.contains("text/event-stream") {
            return Ok(UpstreamReply::Stream(res));
        }

        let doc = res
            .json::<serde_json::Value>()
            .await
            .map_err(|err| return RelayError::Upstream(err.to_string()))?;

        if let Some(text) = extractor::complete_text(&doc) {
            return Ok(UpstreamReply::Complete(text));
        }

        tracing::error!(body = %doc, "Upstream response carried no assistant text");
        return Err(RelayError::Upstream(
            "upstream response carried no assistant text".to_string(),
        ));
    }
}

/// Requests are stateless, the upstream only wants some caller identity.
fn ephemeral_user_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| return elapsed.as_nanos())
        .unwrap_or(0);

    return format!("web-user-{nanos:x}");
}
