//! Configuration type definitions
//!
//! Defaults reproduce the bench as originally built: a 74 mm wheel on a
//! 1000 ppr sensor behind a 0.25 gear ratio, a 315 mm swivel arm on a
//! 500 ppr sensor behind a 2:1 ratio, and a 6 V motor on a 12 V-rated
//! PWM stage.

use core::f32::consts::PI;

/// Maximum material label length
pub const MAX_LABEL_LEN: usize = 32;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Pulses per revolution is zero
    ZeroPulsesPerRev,
    /// Gear ratio is zero, negative or not finite
    ZeroGearRatio,
    /// Radius is zero, negative or not finite
    NonPositiveRadius,
    /// Supply or reference voltage is zero, negative or not finite
    InvalidVoltage,
    /// A timing value is zero where a positive one is required
    InvalidTiming,
}

/// Static geometry of one rotary sensor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderGeometry {
    /// Counter increments per sensor shaft revolution
    pub pulses_per_rev: u32,
    /// Sensor shaft revolutions per measured element revolution
    pub gear_ratio: f32,
    /// Radius of the measured path (mm)
    pub radius_mm: f32,
}

impl EncoderGeometry {
    /// Create a geometry description
    pub const fn new(pulses_per_rev: u32, gear_ratio: f32, radius_mm: f32) -> Self {
        Self {
            pulses_per_rev,
            gear_ratio,
            radius_mm,
        }
    }

    /// Linear travel in meters represented by a signed pulse delta
    ///
    /// `angle = Δ / ppr · 2π`, `distance = r · angle / gear_ratio`
    pub fn pulses_to_meters(&self, delta: i64) -> f32 {
        let angle = (delta as f32 / self.pulses_per_rev as f32) * 2.0 * PI;
        (self.radius_mm / 1000.0) * angle / self.gear_ratio
    }

    /// Path diameter (mm)
    pub fn diameter_mm(&self) -> f32 {
        self.radius_mm * 2.0
    }

    /// Check the geometry can be used for odometry
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pulses_per_rev == 0 {
            return Err(ConfigError::ZeroPulsesPerRev);
        }
        if !is_positive(self.gear_ratio) {
            return Err(ConfigError::ZeroGearRatio);
        }
        if !is_positive(self.radius_mm) {
            return Err(ConfigError::NonPositiveRadius);
        }
        Ok(())
    }
}

/// Rotary sensor configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderConfig {
    /// Measurement geometry
    pub geometry: EncoderGeometry,
    /// Channel A GPIO
    pub pin_a: u8,
    /// Channel B GPIO
    pub pin_b: u8,
    /// Clear the hardware counter when distance is reset
    pub clear_counter_on_reset: bool,
}

impl EncoderConfig {
    /// Wheel-side sensor as built
    pub const fn wheel() -> Self {
        Self {
            geometry: EncoderGeometry::new(1000, 0.25, 37.0),
            pin_a: 32,
            pin_b: 33,
            clear_counter_on_reset: false,
        }
    }

    /// Swivel-arm sensor as built
    pub const fn swivel() -> Self {
        Self {
            geometry: EncoderGeometry::new(500, 2.0, 315.0),
            pin_a: 27,
            pin_b: 14,
            clear_counter_on_reset: false,
        }
    }
}

/// Motor PWM stage configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorConfig {
    /// PWM output GPIO
    pub pin: u8,
    /// PWM channel number
    pub channel: u8,
    /// PWM carrier frequency (Hz)
    pub pwm_frequency_hz: u32,
    /// PWM duty resolution (bits)
    pub pwm_resolution_bits: u8,
    /// Actual motor supply voltage
    pub supply_voltage: f32,
    /// Voltage at which full duty is rated
    pub reference_voltage: f32,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            pin: 18,
            channel: 0,
            pwm_frequency_hz: 5_000,
            pwm_resolution_bits: 8,
            supply_voltage: 6.0,
            reference_voltage: 12.0,
        }
    }
}

/// Run phase timing, relative to the zero-referenced run start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TestTiming {
    /// Delay between run start and motor start (ms)
    pub pre_motor_start_delay_ms: u32,
    /// Total run duration (ms)
    pub total_duration_ms: u32,
    /// Sampling cadence (ms)
    pub sample_cadence_ms: u32,
}

impl Default for TestTiming {
    fn default() -> Self {
        Self {
            pre_motor_start_delay_ms: 1_000,
            total_duration_ms: 5_000,
            sample_cadence_ms: 100,
        }
    }
}

/// Calibration spin performed before every run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationConfig {
    /// Motor percentage during the spin
    pub spin_percent: f32,
    /// Spin duration (ms)
    pub spin_ms: u32,
    /// Settle delay after the spin (ms)
    pub settle_ms: u32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            spin_percent: 50.0,
            spin_ms: 500,
            settle_ms: 1_000,
        }
    }
}

/// Defaults for `run_test` arguments that were not given
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunDefaults {
    /// Target motor percentage
    pub target_percent: f32,
    /// Acceleration ramp duration (ms)
    pub acceleration_ms: u32,
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            target_percent: 50.0,
            acceleration_ms: 2_000,
        }
    }
}

/// Columns emitted per sample row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleColumns {
    /// Timestamp and both distances
    Positions,
    /// Distances plus speed and acceleration of both sensors
    #[default]
    Full,
}

/// What happens to buffered samples on abort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AbortPolicy {
    /// Drop the partial run
    #[default]
    Discard,
    /// Keep the partial run for output, marked as aborted
    Flush,
}

/// Report output configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReportConfig {
    /// Sample row layout
    pub columns: SampleColumns,
}

/// Complete bench configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BenchConfig {
    /// Wheel-side sensor
    pub wheel: EncoderConfig,
    /// Swivel-side sensor
    pub swivel: EncoderConfig,
    /// Drive motor
    pub motor: MotorConfig,
    /// Run phase timing
    pub timing: TestTiming,
    /// Pre-run calibration spin
    pub calibration: CalibrationConfig,
    /// `run_test` defaults
    pub run: RunDefaults,
    /// Report layout
    pub report: ReportConfig,
    /// Abort handling of buffered samples
    pub abort_policy: AbortPolicy,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            wheel: EncoderConfig::wheel(),
            swivel: EncoderConfig::swivel(),
            motor: MotorConfig::default(),
            timing: TestTiming::default(),
            calibration: CalibrationConfig::default(),
            run: RunDefaults::default(),
            report: ReportConfig::default(),
            abort_policy: AbortPolicy::default(),
        }
    }
}

impl BenchConfig {
    /// Check every section for values the bench cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.wheel.geometry.validate()?;
        self.swivel.geometry.validate()?;

        if !is_positive(self.motor.supply_voltage) || !is_positive(self.motor.reference_voltage)
        {
            return Err(ConfigError::InvalidVoltage);
        }

        if self.timing.sample_cadence_ms == 0 || self.timing.total_duration_ms == 0 {
            return Err(ConfigError::InvalidTiming);
        }

        Ok(())
    }
}

/// Finite and strictly positive
fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
