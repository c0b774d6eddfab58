//! Pulse-count odometry
//!
//! Converts a signed cumulative pulse count into distance, speed and
//! acceleration. Every quantity is derived from one position/time cursor
//! that advances once per [`Odometer::update`], so no call order can make
//! one quantity consume a movement another never sees.

use crate::config::EncoderGeometry;

/// Motion quantities of one sensor at one instant
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Kinematics {
    /// Distance travelled since the last reset (m, direction discarded)
    pub distance_m: f32,
    /// Speed over the last update interval (m/s, unsigned)
    pub speed_m_s: f32,
    /// Change of speed over the last update interval (m/s²)
    pub accel_m_s2: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cursor {
    /// Counter value at the last update
    count: i64,
    /// Time of the last speed evaluation, `None` until the first update
    time_ms: Option<u64>,
    /// Distance moved since `time_ms`
    span_m: f32,
}

impl Cursor {
    const fn anchored(count: i64) -> Self {
        Self {
            count,
            time_ms: None,
            span_m: 0.0,
        }
    }
}

/// Distance/speed/acceleration integrator for one sensor
#[derive(Debug, Clone)]
pub struct Odometer {
    geometry: EncoderGeometry,
    cursor: Cursor,
    kinematics: Kinematics,
}

impl Odometer {
    /// Create an odometer anchored at count zero
    pub const fn new(geometry: EncoderGeometry) -> Self {
        Self {
            geometry,
            cursor: Cursor::anchored(0),
            kinematics: Kinematics {
                distance_m: 0.0,
                speed_m_s: 0.0,
                accel_m_s2: 0.0,
            },
        }
    }

    /// Geometry used for pulse conversion
    pub fn geometry(&self) -> &EncoderGeometry {
        &self.geometry
    }

    /// Change the measured radius (mm)
    ///
    /// Applies to movement seen from the next update on.
    pub fn set_radius_mm(&mut self, radius_mm: f32) {
        self.geometry.radius_mm = radius_mm;
    }

    /// Advance the cursor to `count` at `now_ms`
    ///
    /// Distance always accumulates. Speed and acceleration are only
    /// re-evaluated when time has passed since the previous evaluation;
    /// otherwise the cached values are returned. The first update after
    /// construction or [`rebase`](Self::rebase) only establishes the time
    /// base.
    pub fn update(&mut self, count: i64, now_ms: u64) -> Kinematics {
        let step_m = magnitude(
            self.geometry
                .pulses_to_meters(count.wrapping_sub(self.cursor.count)),
        );

        self.kinematics.distance_m += step_m;
        self.cursor.count = count;
        self.cursor.span_m += step_m;

        match self.cursor.time_ms {
            None => {
                self.cursor.time_ms = Some(now_ms);
                self.cursor.span_m = 0.0;
            }
            Some(prev_ms) if now_ms > prev_ms => {
                let dt_s = (now_ms - prev_ms) as f32 / 1000.0;
                let speed = self.cursor.span_m / dt_s;

                self.kinematics.accel_m_s2 = (speed - self.kinematics.speed_m_s) / dt_s;
                self.kinematics.speed_m_s = speed;
                self.cursor.time_ms = Some(now_ms);
                self.cursor.span_m = 0.0;
            }
            // Zero (or backwards) elapsed time: keep the cached rates
            Some(_) => {}
        }

        self.kinematics
    }

    /// Zero the distance and re-anchor the cursor on `count`
    ///
    /// Drops the time base and the cached speed and acceleration.
    pub fn rebase(&mut self, count: i64) {
        self.cursor = Cursor::anchored(count);
        self.kinematics = Kinematics::default();
    }

    /// Last computed quantities
    pub fn kinematics(&self) -> Kinematics {
        self.kinematics
    }

    /// Distance since the last reset (m)
    pub fn distance_m(&self) -> f32 {
        self.kinematics.distance_m
    }
}

fn magnitude(value: f32) -> f32 {
    if value < 0.0 {
        -value
    } else {
        value
    }
}
