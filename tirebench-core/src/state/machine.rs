//! State machine definition
//!
//! Motor output and sampling are a function of the current state.

use super::events::Event;

/// Sub-step of the pre-run calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationStep {
    /// Motor driven at the calibration percentage
    Spinning,
    /// Motor off, encoders zeroed, waiting for the wheel to stop
    Settling,
}

/// Bench states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// No run in progress
    #[default]
    Idle,
    /// Calibration spin and settle before data collection
    Calibrating(CalibrationStep),
    /// Run clock started, sampling, motor not yet started
    Armed,
    /// Motor ramping toward the target
    Accelerating,
    /// Motor holding the target
    SteadyState,
    /// Run completed, samples ready for output
    Finished,
    /// Run cancelled; motor stopped
    Aborted,
}

impl State {
    /// Check if a run is in progress
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            State::Calibrating(_) | State::Armed | State::Accelerating | State::SteadyState
        )
    }

    /// Check if samples are collected in this state
    pub fn is_sampling(&self) -> bool {
        matches!(self, State::Armed | State::Accelerating | State::SteadyState)
    }

    /// Check if this state allows the motor to be driven
    pub fn motor_allowed(&self) -> bool {
        matches!(
            self,
            State::Calibrating(CalibrationStep::Spinning)
                | State::Accelerating
                | State::SteadyState
        )
    }

    /// Check if bench settings may be changed
    pub fn accepts_settings(&self) -> bool {
        !self.is_active()
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use CalibrationStep::*;
        use Event::*;
        use State::*;

        match (self, event) {
            // Starting; a finished run is acknowledged implicitly
            (Idle, Start) => Calibrating(Spinning),
            (Finished, Start) => Calibrating(Spinning),

            // Calibration
            (Calibrating(Spinning), SpinComplete) => Calibrating(Settling),
            (Calibrating(Settling), Settled) => Armed,

            // Data collection
            (Armed, MotorStart) => Accelerating,
            (Accelerating, RampComplete) => SteadyState,
            (Armed | Accelerating | SteadyState, DurationElapsed) => Finished,

            // Cancellation
            (Calibrating(_) | Armed | Accelerating | SteadyState, Abort) => Aborted,

            // Back to idle
            (Finished | Aborted, Acknowledge) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}
