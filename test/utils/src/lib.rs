/// A well-formed event stream covering the frame shapes the reassembler
/// understands: OpenAI-style deltas, flat response deltas with multi-byte
/// characters, a raw non-JSON payload, comment and event lines, and the
/// done sentinel.
pub fn sse_fixture() -> &'static str {
    return "event: message\ndata: {\"choices\":[{\"delta\":{\"content\":\"Once\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\" upon\"}}]}\n\ndata: {\"response\":\" a time the caf\u{e9} \u{2615} opened\"}\n\n: keepalive\n\ndata: raw tail text\n\ndata: [DONE]\n\n";
}

/// The deltas the fixture above reassembles to, in arrival order.
pub fn sse_fixture_deltas() -> Vec<String> {
    return vec![
        "Once".to_string(),
        " upon".to_string(),
        " a time the caf\u{e9} \u{2615} opened".to_string(),
        "raw tail text".to_string(),
    ];
}
