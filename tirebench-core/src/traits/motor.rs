//! Drive motor trait
//!
//! The bench motor is open-loop: a percentage command is turned into a
//! PWM duty scaled by the supply voltage. Ramps are evaluated against the
//! caller's clock on every [`MotorActuator::update`].

/// Snapshot of the motor command state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorState {
    /// Percentage currently applied (0-100)
    pub current: f32,
    /// Percentage being ramped toward (equals `current` when no ramp)
    pub target: f32,
    /// Supply voltage used for duty scaling
    pub voltage: f32,
    /// Whether a non-zero percentage is applied
    pub running: bool,
}

/// Percentage-commanded motor with non-blocking ramps
pub trait MotorActuator {
    /// Apply a percentage now, cancelling any active ramp
    ///
    /// The value is clamped to `[0, 100]`.
    fn set_immediate(&mut self, percent: f32);

    /// Begin a linear ramp from the current percentage to `target`
    ///
    /// A zero duration applies the target immediately.
    fn ramp_to(&mut self, target: f32, duration_ms: u32, now_ms: u64);

    /// Apply the ramp value for `now_ms`
    ///
    /// Call once per control tick. Does nothing when no ramp is active.
    fn update(&mut self, now_ms: u64);

    /// Percentage the active ramp commands at `now_ms` (no side effects)
    fn commanded_at(&self, now_ms: u64) -> f32;

    /// Cancel any ramp and command 0%
    fn stop(&mut self) {
        self.set_immediate(0.0);
    }

    /// Change the supply voltage and re-apply the current percentage
    fn set_voltage(&mut self, volts: f32);

    /// Current command state
    fn state(&self) -> MotorState;

    /// Percentage currently applied
    fn percentage(&self) -> f32 {
        self.state().current
    }

    /// Check if the motor is being driven
    fn is_running(&self) -> bool {
        self.state().running
    }

    /// Check if a ramp is in progress
    fn is_ramping(&self) -> bool;
}
