//! Monotonic time source

/// Millisecond monotonic clock
///
/// The bench logic never reads a clock itself; the firmware loop samples
/// this once per tick and passes the value down.
pub trait Monotonic {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u64;
}
