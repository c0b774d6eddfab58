//! PIO quadrature counting
//!
//! Each rotary sensor gets a PIO state machine running the embassy-rp
//! quadrature program. A decoder task awaits direction events and folds
//! them into a [`PulseCount`]; the bench loop reads the count through a
//! [`PulseCounter`] handle without ever waiting on the sensor.
//!
//! ```text
//!  A/B pins ──► PIO SM ──► decode() task ──► PulseCount ◄── PulseCounter::read()
//! ```

use embassy_rp::pio::Instance;
use embassy_rp::pio_programs::rotary_encoder::{Direction, PioEncoder};
use portable_atomic::{AtomicI64, Ordering};

use tirebench_hal::QuadratureCounter;

/// Signed cumulative pulse count shared between tasks
pub struct PulseCount {
    count: AtomicI64,
}

impl Default for PulseCount {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseCount {
    /// Create a zeroed count, usable in a `static`
    pub const fn new() -> Self {
        Self {
            count: AtomicI64::new(0),
        }
    }

    /// Apply one decoded step
    pub fn step(&self, direction: Direction) {
        let delta = match direction {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        };
        self.count.fetch_add(delta, Ordering::Relaxed);
    }

    /// Current count
    pub fn get(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Reset to zero
    pub fn reset(&self) {
        self.count.store(0, Ordering::Relaxed);
    }

    /// Reader handle for the bench loop
    pub fn counter(&self) -> PulseCounter<'_> {
        PulseCounter { count: self }
    }
}

/// [`QuadratureCounter`] view of a [`PulseCount`]
#[derive(Clone, Copy)]
pub struct PulseCounter<'a> {
    count: &'a PulseCount,
}

impl QuadratureCounter for PulseCounter<'_> {
    fn read(&mut self) -> i64 {
        self.count.get()
    }

    fn clear(&mut self) {
        self.count.reset();
    }
}

/// Feed decoded steps from a PIO encoder into `count` forever
///
/// Intended as the body of a per-sensor embassy task.
pub async fn decode<T: Instance, const SM: usize>(
    encoder: &mut PioEncoder<'_, T, SM>,
    count: &PulseCount,
) -> ! {
    loop {
        let direction = encoder.read().await;
        count.step(direction);
    }
}
