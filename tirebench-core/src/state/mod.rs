//! Test run state machine
//!
//! Sequences a run through calibration, the pre-motor delay, the
//! acceleration ramp and the steady phase. The machine is explicit,
//! finite and deterministic; timing decisions live in the orchestrator.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{CalibrationStep, State};
