//! Quadrature pulse counter abstraction

/// Incremental rotary sensor counter
///
/// Implementations accumulate signed pulse counts in hardware (PCNT, PIO,
/// timer encoder mode) or in an interrupt/task; `read` must never block.
pub trait QuadratureCounter {
    /// Current signed cumulative count
    fn read(&mut self) -> i64;

    /// Reset the cumulative count to zero
    fn clear(&mut self);
}

impl<T: QuadratureCounter + ?Sized> QuadratureCounter for &mut T {
    fn read(&mut self) -> i64 {
        (**self).read()
    }

    fn clear(&mut self) {
        (**self).clear()
    }
}
