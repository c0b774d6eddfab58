//! Motion math
//!
//! Pulse-count odometry for the rotary sensors and linear ramps for the
//! drive motor. Both are plain values driven by an explicit time argument.

pub mod odometry;
pub mod ramp;

pub use odometry::{Kinematics, Odometer};
pub use ramp::{clamp_percent, LinearRamp};
