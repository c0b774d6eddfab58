//! Linear percentage ramps
//!
//! A ramp is a value, not a loop: it stores where it started and is
//! evaluated against the current time whenever the caller ticks.

/// Clamp a percentage into `[0, 100]`, mapping NaN to 0
pub fn clamp_percent(percent: f32) -> f32 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}

/// Straight-line transition between two percentages
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinearRamp {
    start_ms: u64,
    from_pct: f32,
    to_pct: f32,
    duration_ms: u32,
}

impl LinearRamp {
    /// Ramp from `from_pct` to `to_pct` over `duration_ms`, beginning at `start_ms`
    pub fn new(from_pct: f32, to_pct: f32, duration_ms: u32, start_ms: u64) -> Self {
        Self {
            start_ms,
            from_pct: clamp_percent(from_pct),
            to_pct: clamp_percent(to_pct),
            duration_ms,
        }
    }

    /// Percentage commanded at `now_ms`
    pub fn percentage_at(&self, now_ms: u64) -> f32 {
        if self.is_complete(now_ms) {
            return self.to_pct;
        }

        let elapsed = now_ms.saturating_sub(self.start_ms) as f32;
        let fraction = elapsed / self.duration_ms as f32;
        clamp_percent(self.from_pct + (self.to_pct - self.from_pct) * fraction)
    }

    /// True once the ramp has reached its target
    pub fn is_complete(&self, now_ms: u64) -> bool {
        self.duration_ms == 0 || now_ms >= self.end_ms()
    }

    /// Time the ramp reaches its target
    pub fn end_ms(&self) -> u64 {
        self.start_ms.saturating_add(u64::from(self.duration_ms))
    }

    /// Starting percentage
    pub fn from(&self) -> f32 {
        self.from_pct
    }

    /// Final percentage
    pub fn target(&self) -> f32 {
        self.to_pct
    }
}
