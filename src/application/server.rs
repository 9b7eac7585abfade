#[cfg(test)]
#[path = "server_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use anyhow::Result;
use axum::body::Body;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde_derive::Serialize;
use tower_http::cors::CorsLayer;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ChatReply;
use crate::domain::models::Message;
use crate::domain::models::ModelCatalog;
use crate::domain::models::ModelsResponse;
use crate::domain::models::RelayError;
use crate::infrastructure::upstream::Upstream;
use crate::infrastructure::upstream::UpstreamReply;

#[derive(Clone)]
struct RelayState {
    upstream: Arc<Upstream>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match &self {
            RelayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::Throttled => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        return (status, Json(self.envelope())).into_response();
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: u64,
    #[serde(rename = "hasApiKey")]
    has_api_key: bool,
}

pub fn router(upstream: Arc<Upstream>) -> Router {
    let state = RelayState { upstream };

    return Router::new()
        .route("/", get(liveness).post(chat))
        .route("/chat", get(liveness).post(chat))
        .route("/models", get(models))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .with_state(state);
}

pub async fn start() -> Result<()> {
    let upstream = Arc::new(Upstream::default());
    if !upstream.is_configured() {
        tracing::warn!("No upstream API key configured, chat requests will return a placeholder");
    }

    let addr = format!(
        "{host}:{port}",
        host = Config::get(ConfigKey::Host),
        port = Config::get(ConfigKey::Port)
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Relay listening");

    axum::serve(listener, router(upstream)).await?;

    return Ok(());
}

async fn liveness() -> &'static str {
    return "Chat relay is running. Send POST requests to interact.";
}

/// Relays one conversation to the upstream gateway. Failures are converted
/// to the error envelope by the `RelayError` response impl, a raw error
/// never reaches the transport.
async fn chat(State(state): State<RelayState>, body: Bytes) -> Result<Response, RelayError> {
    let doc: serde_json::Value = serde_json::from_slice(&body).map_err(|_| {
        return RelayError::InvalidRequest("body must be a JSON document".to_string());
    })?;

    let messages = match doc.get("messages").and_then(serde_json::Value::as_array) {
        Some(array) => array.clone(),
        None => return Err(RelayError::InvalidRequest("messages array required".to_string())),
    };

    // Entries deserialize permissively, unknown roles and missing fields
    // coerce instead of failing the request.
    let messages: Vec<Message> =
        serde_json::from_value(serde_json::Value::Array(messages)).map_err(|_| {
            return RelayError::InvalidRequest("messages entries must be objects".to_string());
        })?;

    let model = ModelCatalog::resolve(doc.get("model").and_then(serde_json::Value::as_str));

    if !state.upstream.is_configured() {
        return Err(RelayError::Unconfigured);
    }

    tracing::debug!(model = %model.model, messages = messages.len(), "Relaying chat request");

    return match state.upstream.complete_chat(&model, &messages).await? {
        UpstreamReply::Complete(text) => Ok(Json(ChatReply {
            response: text,
            model: model.model,
        })
        .into_response()),
        UpstreamReply::Stream(upstream_res) => Ok(forward_stream(upstream_res)),
    };
}

/// Provider-native SSE frames pass through unmodified.
fn forward_stream(upstream_res: reqwest::Response) -> Response {
    let mut response = Response::new(Body::from_stream(upstream_res.bytes_stream()));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));

    return response;
}

async fn models() -> Json<ModelsResponse> {
    return Json(ModelCatalog::listing());
}

async fn health(State(state): State<RelayState>) -> Json<HealthResponse> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| return elapsed.as_millis() as u64)
        .unwrap_or(0);

    return Json(HealthResponse {
        status: "ok",
        timestamp,
        has_api_key: state.upstream.is_configured(),
    });
}

async fn not_found() -> (StatusCode, &'static str) {
    return (StatusCode::NOT_FOUND, "Not Found");
}
