#[cfg(test)]
#[path = "extractor_test.rs"]
mod tests;

use serde_json::Value;

/// A single response-shape strategy. Returns the extracted text when the
/// document matches the shape this strategy understands.
type Extractor = fn(&Value) -> Option<String>;

/// Shapes a completed upstream document may take, tried in order.
const COMPLETE_EXTRACTORS: &[Extractor] = &[nested_choice_message, bare_choice_message];

/// Shapes a single stream frame may take, tried in order.
const DELTA_EXTRACTORS: &[Extractor] = &[choice_delta, flat_response];

/// Shapes a relay reply may take on the client side, tried in order.
const REPLY_EXTRACTORS: &[Extractor] = &[bare_choice_message, flat_response, flat_message];

pub fn complete_text(doc: &Value) -> Option<String> {
    return COMPLETE_EXTRACTORS
        .iter()
        .find_map(|extract| return extract(doc));
}

pub fn delta_text(doc: &Value) -> Option<String> {
    return DELTA_EXTRACTORS
        .iter()
        .find_map(|extract| return extract(doc));
}

/// Client-side extraction with a last-resort fallback, a reply that matches
/// no known shape is rendered as its raw JSON text rather than dropped.
pub fn reply_text(doc: &Value) -> String {
    return REPLY_EXTRACTORS
        .iter()
        .find_map(|extract| return extract(doc))
        .unwrap_or_else(|| return doc.to_string());
}

fn nested_choice_message(doc: &Value) -> Option<String> {
    return doc
        .pointer("/result/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string);
}

fn bare_choice_message(doc: &Value) -> Option<String> {
    return doc
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string);
}

fn choice_delta(doc: &Value) -> Option<String> {
    return doc
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .map(str::to_string);
}

fn flat_response(doc: &Value) -> Option<String> {
    return doc
        .get("response")
        .and_then(Value::as_str)
        .map(str::to_string);
}

fn flat_message(doc: &Value) -> Option<String> {
    return doc
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);
}
