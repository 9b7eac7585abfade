#[cfg(test)]
#[path = "typewriter_test.rs"]
mod tests;

/// Characters revealed per tick. Quota-based rather than time-based so a
/// bursty network cannot make the reveal jump ahead.
pub const REVEAL_CHARS_PER_TICK: usize = 3;

/// Decouples bytes received from characters shown. The buffer grows as
/// deltas arrive, `tick` reveals a bounded number of characters, and the
/// state turns final only once the upstream is closed and the reveal has
/// caught up.
pub struct Typewriter {
    buffer: String,
    revealed: usize,
    closed: bool,
    finalized: bool,
    quota: usize,
}

impl Default for Typewriter {
    fn default() -> Typewriter {
        return Typewriter::with_quota(REVEAL_CHARS_PER_TICK);
    }
}

impl Typewriter {
    pub fn with_quota(quota: usize) -> Typewriter {
        return Typewriter {
            buffer: "".to_string(),
            revealed: 0,
            closed: false,
            finalized: false,
            quota,
        };
    }

    /// Appends a delta to the receive buffer. Arrival is independent of
    /// rendering speed, the tick simply has more room on later frames.
    pub fn push(&mut self, delta: &str) {
        if self.finalized {
            return;
        }

        self.buffer.push_str(delta);
    }

    /// Marks the network side finished. The reveal keeps draining whatever
    /// is still unrevealed.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Forces a stopped, non-animating terminal state. Used on transport
    /// errors so no caller waits on a tick that will never complete.
    pub fn abort(&mut self) {
        self.closed = true;
        self.finalized = true;
    }

    /// Advances the reveal by up to the per-tick quota, clamped to what has
    /// actually arrived, and returns the newly revealed characters. Once
    /// final, ticks are no-ops.
    pub fn tick(&mut self) -> String {
        if self.finalized {
            return "".to_string();
        }

        let total = self.buffer.chars().count();
        let target = (self.revealed + self.quota).min(total);
        let newly = self
            .buffer
            .chars()
            .skip(self.revealed)
            .take(target - self.revealed)
            .collect::<String>();
        self.revealed = target;

        if self.closed && self.revealed == total {
            self.finalized = true;
        }

        return newly;
    }

    pub fn is_final(&self) -> bool {
        return self.finalized;
    }

    pub fn is_closed(&self) -> bool {
        return self.closed;
    }

    /// Characters revealed so far.
    pub fn revealed(&self) -> usize {
        return self.revealed;
    }

    /// The full receive buffer, regardless of how much has been revealed.
    pub fn content(&self) -> &str {
        return &self.buffer;
    }

    /// The revealed prefix of the buffer.
    pub fn visible(&self) -> String {
        return self.buffer.chars().take(self.revealed).collect();
    }
}
