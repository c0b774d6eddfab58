//! Events that trigger state transitions

/// Events produced by commands and by the orchestrator's deadlines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Command events
    /// Run requested
    Start,
    /// Run cancelled
    Abort,
    /// Finished or aborted run released
    Acknowledge,

    // Deadline events
    /// Calibration spin time elapsed
    SpinComplete,
    /// Settle time elapsed; run clock starts
    Settled,
    /// Pre-motor delay elapsed; acceleration ramp begins
    MotorStart,
    /// Acceleration duration elapsed since motor start
    RampComplete,
    /// Total run duration elapsed
    DurationElapsed,

    // Notifications
    /// Sample buffer filled; further samples are dropped
    BufferFull,
}
