//! Kinematic encoder
//!
//! Pairs a [`QuadratureCounter`] with an [`Odometer`]. Each call reads the
//! counter once and advances the odometer's single cursor, so
//! [`total_distance`](KinematicEncoder::total_distance),
//! [`velocity`](KinematicEncoder::velocity) and
//! [`acceleration`](KinematicEncoder::acceleration) are views over the same
//! update and can be called in any order.
//!
//! # Usage
//!
//! ```ignore
//! let mut wheel = KinematicEncoder::new(counter, &config.wheel);
//!
//! // Once per sampling slot:
//! let k = wheel.sample(clock.now_ms());
//! ```

use tirebench_core::config::{EncoderConfig, EncoderGeometry};
use tirebench_core::motion::{Kinematics, Odometer};
use tirebench_core::traits::MotionSensor;
use tirebench_hal::QuadratureCounter;

/// Distance, speed and acceleration from a quadrature counter
pub struct KinematicEncoder<Q> {
    counter: Q,
    odometer: Odometer,
    clear_counter_on_reset: bool,
}

impl<Q: QuadratureCounter> KinematicEncoder<Q> {
    /// Create an encoder anchored on the counter's current value
    pub fn new(mut counter: Q, config: &EncoderConfig) -> Self {
        let mut odometer = Odometer::new(config.geometry);
        odometer.rebase(counter.read());

        Self {
            counter,
            odometer,
            clear_counter_on_reset: config.clear_counter_on_reset,
        }
    }

    /// Distance travelled since the last reset (m)
    pub fn total_distance(&mut self, now_ms: u64) -> f32 {
        self.sample(now_ms).distance_m
    }

    /// Speed over the interval since the previous update (m/s)
    pub fn velocity(&mut self, now_ms: u64) -> f32 {
        self.sample(now_ms).speed_m_s
    }

    /// Change of speed over the interval since the previous update (m/s²)
    pub fn acceleration(&mut self, now_ms: u64) -> f32 {
        self.sample(now_ms).accel_m_s2
    }

    /// Last computed quantities, without reading the counter
    pub fn kinematics(&self) -> Kinematics {
        self.odometer.kinematics()
    }

    /// Counter accessor
    pub fn counter(&self) -> &Q {
        &self.counter
    }
}

impl<Q: QuadratureCounter> MotionSensor for KinematicEncoder<Q> {
    fn sample(&mut self, now_ms: u64) -> Kinematics {
        let count = self.counter.read();
        self.odometer.update(count, now_ms)
    }

    fn reset_distance(&mut self) {
        if self.clear_counter_on_reset {
            self.counter.clear();
        }
        self.odometer.rebase(self.counter.read());
    }

    fn geometry(&self) -> EncoderGeometry {
        *self.odometer.geometry()
    }

    fn set_radius_mm(&mut self, radius_mm: f32) {
        self.odometer.set_radius_mm(radius_mm);
    }
}
