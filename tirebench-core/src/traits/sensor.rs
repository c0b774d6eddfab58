//! Motion sensor trait

use crate::config::EncoderGeometry;
use crate::motion::Kinematics;

/// Rotary sensor reporting linear motion of the element it measures
pub trait MotionSensor {
    /// Read the counter and update distance, speed and acceleration
    fn sample(&mut self, now_ms: u64) -> Kinematics;

    /// Zero the distance and re-anchor on the current count
    fn reset_distance(&mut self);

    /// Measurement geometry
    fn geometry(&self) -> EncoderGeometry;

    /// Change the measured radius (mm)
    fn set_radius_mm(&mut self, radius_mm: f32);
}
