#[cfg(test)]
#[path = "reassembler_test.rs"]
mod tests;

use super::extractor;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Rebuilds logical `data:` frames from a byte stream whose chunk
/// boundaries fall anywhere, including inside a multi-byte character or in
/// the middle of a line. Extracted text deltas are handed back in arrival
/// order, independent of how the bytes were split.
#[derive(Default)]
pub struct StreamReassembler {
    pending: Vec<u8>,
    carry: String,
}

impl StreamReassembler {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let decoded = self.drain_decoded();
        self.carry.push_str(&decoded);

        let mut deltas: Vec<String> = vec![];
        while let Some(idx) = self.carry.find('\n') {
            let line = self.carry.drain(..=idx).collect::<String>();
            if let Some(delta) = delta_from_line(&line) {
                deltas.push(delta);
            }
        }

        return deltas;
    }

    /// Ends the stream. An unterminated final line is dropped rather than
    /// guessed at, the returned fragment exists only so callers can log it.
    pub fn finish(self) -> Option<String> {
        let fragment = self.carry.trim().to_string();
        if fragment.is_empty() {
            return None;
        }

        return Some(fragment);
    }

    fn drain_decoded(&mut self) -> String {
        let mut decoded = String::new();

        while !self.pending.is_empty() {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    decoded.push_str(text);
                    self.pending.clear();
                }
                Err(err) => {
                    let valid_up_to = err.valid_up_to();
                    decoded.push_str(&String::from_utf8_lossy(&self.pending[..valid_up_to]));

                    match err.error_len() {
                        // An incomplete trailing sequence. Hold the bytes
                        // until the next chunk completes the character.
                        None => {
                            self.pending.drain(..valid_up_to);
                            return decoded;
                        }
                        Some(invalid) => {
                            decoded.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid_up_to + invalid);
                        }
                    }
                }
            }
        }

        return decoded;
    }
}

fn delta_from_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let payload = line.strip_prefix(DATA_PREFIX)?;
    if payload == DONE_SENTINEL {
        return None;
    }

    return match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(doc) => extractor::delta_text(&doc),
        // Not JSON, the raw payload itself is the delta.
        Err(_) => Some(payload.to_string()),
    };
}
