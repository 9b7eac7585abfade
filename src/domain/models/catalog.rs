#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;

use once_cell::sync::Lazy;
use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Providers reachable through the upstream gateway. The wire token is
/// internal to the relay and never exposed to clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    OpenAi,
    Google,
    Fireworks,
    Groq,
    Mistral,
}

impl Provider {
    pub fn wire_token(&self) -> &'static str {
        return match self {
            Provider::Anthropic => "SERVICE_PROVIDER_ANTHROPIC",
            Provider::OpenAi => "SERVICE_PROVIDER_OPENAI",
            Provider::Google => "SERVICE_PROVIDER_GOOGLE",
            Provider::Fireworks => "SERVICE_PROVIDER_FIREWORKS",
            Provider::Groq => "SERVICE_PROVIDER_GROQ",
            Provider::Mistral => "SERVICE_PROVIDER_MISTRAL",
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub provider: Provider,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedModel {
    pub provider: Provider,
    pub model: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelDescriptor>,
    pub default: String,
}

pub const DEFAULT_MODEL_ID: &str = "openai:gpt-4.1-nano";

const MODEL_TABLE: &[(Provider, &str, &str)] = &[
    (Provider::Anthropic, "claude-opus-4-1", "Claude Opus 4.1"),
    (Provider::Anthropic, "claude-sonnet-4-0", "Claude Sonnet 4.0"),
    (Provider::Anthropic, "claude-3-5-haiku-latest", "Claude 3.5 Haiku"),
    (Provider::OpenAi, "gpt-4.1", "GPT-4.1"),
    (Provider::OpenAi, "gpt-4.1-mini", "GPT-4.1 Mini"),
    (Provider::OpenAi, "gpt-4.1-nano", "GPT-4.1 Nano"),
    (Provider::Google, "gemini-2.5-flash", "Gemini 2.5 Flash"),
    (Provider::Google, "gemini-2.5-flash-lite", "Gemini 2.5 Flash Lite"),
    (
        Provider::Fireworks,
        "accounts/fireworks/models/deepseek-v3-0324",
        "DeepSeek V3",
    ),
    (
        Provider::Fireworks,
        "accounts/fireworks/models/llama4-maverick-instruct-basic",
        "Llama 4 Maverick",
    ),
    (Provider::Groq, "llama-3.1-8b-instant", "Llama 3.1 8B Instant"),
    (Provider::Groq, "gemma2-9b-it", "Gemma 2 9B"),
    (Provider::Mistral, "mistral-small-latest", "Mistral Small"),
    (Provider::Mistral, "ministral-8b-latest", "Ministral 8B"),
];

static DESCRIPTORS: Lazy<Vec<ModelDescriptor>> = Lazy::new(|| {
    return MODEL_TABLE
        .iter()
        .map(|(provider, model, name)| {
            return ModelDescriptor {
                id: format!("{provider}:{model}"),
                name: name.to_string(),
                provider: *provider,
            };
        })
        .collect();
});

pub struct ModelCatalog {}

impl ModelCatalog {
    pub fn descriptors() -> &'static [ModelDescriptor] {
        return &DESCRIPTORS;
    }

    pub fn listing() -> ModelsResponse {
        return ModelsResponse {
            models: ModelCatalog::descriptors().to_vec(),
            default: DEFAULT_MODEL_ID.to_string(),
        };
    }

    fn default_model() -> ResolvedModel {
        return ResolvedModel {
            provider: Provider::OpenAi,
            model: "gpt-4.1-nano".to_string(),
        };
    }

    /// Resolves a `<provider>:<model>` selector. Unknown providers and
    /// models fall back to the default rather than erroring so a stale
    /// client-side selection never fails a request. The selector splits on
    /// the first separator only, model ids may carry further colons or
    /// slashes.
    pub fn resolve(selector: Option<&str>) -> ResolvedModel {
        let selector = match selector {
            Some(selector) if !selector.is_empty() => selector,
            _ => return ModelCatalog::default_model(),
        };

        let (provider_key, model) = match selector.split_once(':') {
            Some(parts) => parts,
            None => return ModelCatalog::default_model(),
        };

        let provider = match provider_key.parse::<Provider>() {
            Ok(provider) => provider,
            Err(_) => return ModelCatalog::default_model(),
        };

        let known = MODEL_TABLE
            .iter()
            .any(|(p, m, _)| return *p == provider && *m == model);
        if !known {
            return ModelCatalog::default_model();
        }

        return ResolvedModel {
            provider,
            model: model.to_string(),
        };
    }
}
