//! Motor driver implementations
//!
//! The bench drive is a single brushed DC motor on a PWM output. The
//! commanded percentage is scaled by supply over reference voltage.

pub mod ramp;

pub use ramp::MotorRamp;
