//! Run records
//!
//! A [`TestRun`] is created when a run starts, fills with samples while
//! the state machine is sampling, and is released once the caller has
//! written it out.

use heapless::{String, Vec};

use crate::config::{EncoderGeometry, RunDefaults, MAX_LABEL_LEN};
use crate::motion::{clamp_percent, Kinematics};

use super::summary::RunSummary;

/// Default sample capacity of one run
pub const DEFAULT_CAPACITY: usize = 1000;

/// Material label attached to a run
pub type Label = String<MAX_LABEL_LEN>;

/// One sampling instant
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TestSample {
    /// Time since the run clock was zeroed (ms)
    pub elapsed_ms: u32,
    /// Wheel-side distance (m)
    pub wheel_distance_m: f32,
    /// Swivel-side distance (m)
    pub swivel_distance_m: f32,
    /// Wheel-side speed (m/s)
    pub wheel_speed_m_s: f32,
    /// Wheel-side acceleration (m/s²)
    pub wheel_accel_m_s2: f32,
    /// Swivel-side speed (m/s)
    pub swivel_speed_m_s: f32,
    /// Swivel-side acceleration (m/s²)
    pub swivel_accel_m_s2: f32,
}

impl TestSample {
    /// Combine the readings of both sensors
    pub fn new(elapsed_ms: u32, wheel: Kinematics, swivel: Kinematics) -> Self {
        Self {
            elapsed_ms,
            wheel_distance_m: wheel.distance_m,
            swivel_distance_m: swivel.distance_m,
            wheel_speed_m_s: wheel.speed_m_s,
            wheel_accel_m_s2: wheel.accel_m_s2,
            swivel_speed_m_s: swivel.speed_m_s,
            swivel_accel_m_s2: swivel.accel_m_s2,
        }
    }
}

/// Per-run motor profile
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunParameters {
    /// Target motor percentage (0-100)
    pub target_percent: f32,
    /// Acceleration ramp duration (ms)
    pub acceleration_ms: u32,
}

impl RunParameters {
    /// Create parameters, clamping the target to `[0, 100]`
    pub fn new(target_percent: f32, acceleration_ms: u32) -> Self {
        Self {
            target_percent: clamp_percent(target_percent),
            acceleration_ms,
        }
    }
}

impl From<RunDefaults> for RunParameters {
    fn from(defaults: RunDefaults) -> Self {
        Self::new(defaults.target_percent, defaults.acceleration_ms)
    }
}

impl Default for RunParameters {
    fn default() -> Self {
        RunDefaults::default().into()
    }
}

/// Bench settings in effect when a run started
#[derive(Debug, Clone, PartialEq)]
pub struct RunSnapshot {
    /// Motor profile
    pub params: RunParameters,
    /// Material under test
    pub material: Label,
    /// Wheel-side geometry
    pub wheel: EncoderGeometry,
    /// Swivel-side geometry
    pub swivel: EncoderGeometry,
    /// Motor supply voltage (V)
    pub motor_voltage: f32,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Still collecting
    InProgress,
    /// Ran for the full duration
    Completed,
    /// Cancelled before the full duration
    Aborted,
}

impl Outcome {
    /// Lowercase name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::InProgress => "in progress",
            Outcome::Completed => "completed",
            Outcome::Aborted => "aborted",
        }
    }
}

/// Samples and settings of one run
#[derive(Debug, Clone)]
pub struct TestRun<const N: usize = DEFAULT_CAPACITY> {
    snapshot: RunSnapshot,
    samples: Vec<TestSample, N>,
    truncated: bool,
    outcome: Outcome,
}

impl<const N: usize> TestRun<N> {
    /// Open a run with no samples
    pub fn new(snapshot: RunSnapshot) -> Self {
        Self {
            snapshot,
            samples: Vec::new(),
            truncated: false,
            outcome: Outcome::InProgress,
        }
    }

    /// Append a sample
    ///
    /// Returns `false` and marks the run truncated when the buffer is full.
    pub fn push(&mut self, sample: TestSample) -> bool {
        if self.samples.push(sample).is_err() {
            self.truncated = true;
            return false;
        }
        true
    }

    /// Close the run
    pub fn finish(&mut self, outcome: Outcome) {
        self.outcome = outcome;
    }

    /// Collected samples in time order
    pub fn samples(&self) -> &[TestSample] {
        &self.samples
    }

    /// Settings in effect for this run
    pub fn snapshot(&self) -> &RunSnapshot {
        &self.snapshot
    }

    /// Check if samples were dropped for lack of space
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// How the run ended
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Number of stored samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if no samples were stored
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Slip and peak-speed analysis
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_samples(&self.samples)
    }
}
