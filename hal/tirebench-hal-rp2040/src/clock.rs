//! embassy-time monotonic clock

use embassy_time::Instant;

use tirebench_hal::Monotonic;

/// Milliseconds since the clock was created
#[derive(Debug, Clone, Copy)]
pub struct EmbassyClock {
    start: Instant,
}

impl Default for EmbassyClock {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbassyClock {
    /// Start a clock at the current instant
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Monotonic for EmbassyClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis()
    }
}
