//! DC motor driver with voltage-scaled PWM and linear ramps
//!
//! This driver provides:
//! - Percentage control (0-100%) mapped onto the PWM duty range
//! - Duty scaling by supply over reference voltage
//! - Non-blocking linear ramps evaluated against the caller's clock
//!
//! # Usage
//!
//! ```ignore
//! let mut motor = MotorRamp::new(pwm, &config.motor);
//! motor.ramp_to(80.0, 2_000, clock.now_ms());
//!
//! // Every control tick:
//! motor.update(clock.now_ms());
//! ```

use tirebench_core::config::MotorConfig;
use tirebench_core::motion::{clamp_percent, LinearRamp};
use tirebench_core::traits::{MotorActuator, MotorState};
use tirebench_hal::{PwmChannel, PwmConfig};

/// Percentage-commanded PWM motor
pub struct MotorRamp<P> {
    pwm: P,
    channel: u8,
    max_duty: u32,
    reference_voltage: f32,
    voltage: f32,
    /// Percentage currently applied
    current: f32,
    /// Last duty written
    duty: u32,
    ramp: Option<LinearRamp>,
}

impl<P: PwmChannel> MotorRamp<P> {
    /// Configure the PWM channel, attach the pin and drive 0%
    pub fn new(mut pwm: P, config: &MotorConfig) -> Self {
        let pwm_config = PwmConfig {
            frequency_hz: config.pwm_frequency_hz,
            resolution_bits: config.pwm_resolution_bits,
        };

        pwm.configure(config.channel, pwm_config);
        pwm.attach(config.pin, config.channel);
        pwm.write(config.channel, 0);

        Self {
            pwm,
            channel: config.channel,
            max_duty: pwm_config.max_duty(),
            reference_voltage: config.reference_voltage,
            voltage: config.supply_voltage,
            current: 0.0,
            duty: 0,
            ramp: None,
        }
    }

    /// Duty value for a percentage at the current voltage
    ///
    /// `percent / 100 * max_duty * voltage / reference`, clamped to `max_duty`.
    pub fn duty_for(&self, percent: f32) -> u32 {
        let scale = self.voltage / self.reference_voltage;
        let duty = clamp_percent(percent) / 100.0 * self.max_duty as f32 * scale;
        // Float to int casts saturate; NaN maps to 0
        (duty as u32).min(self.max_duty)
    }

    /// Last duty value written to the PWM channel
    pub fn duty(&self) -> u32 {
        self.duty
    }

    /// PWM accessor
    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    fn apply(&mut self, percent: f32) {
        self.current = clamp_percent(percent);
        self.duty = self.duty_for(self.current);
        self.pwm.write(self.channel, self.duty);
    }
}

impl<P: PwmChannel> MotorActuator for MotorRamp<P> {
    fn set_immediate(&mut self, percent: f32) {
        self.ramp = None;
        self.apply(percent);
    }

    fn ramp_to(&mut self, target: f32, duration_ms: u32, now_ms: u64) {
        if duration_ms == 0 {
            self.set_immediate(target);
            return;
        }

        let ramp = LinearRamp::new(self.current, target, duration_ms, now_ms);
        self.ramp = Some(ramp);
        self.apply(ramp.percentage_at(now_ms));
    }

    fn update(&mut self, now_ms: u64) {
        let Some(ramp) = self.ramp else {
            return;
        };

        self.apply(ramp.percentage_at(now_ms));
        if ramp.is_complete(now_ms) {
            self.ramp = None;
        }
    }

    fn commanded_at(&self, now_ms: u64) -> f32 {
        match self.ramp {
            Some(ramp) => ramp.percentage_at(now_ms),
            None => self.current,
        }
    }

    fn set_voltage(&mut self, volts: f32) {
        self.voltage = volts;
        self.apply(self.current);
    }

    fn state(&self) -> MotorState {
        MotorState {
            current: self.current,
            target: self.ramp.map_or(self.current, |r| r.target()),
            voltage: self.voltage,
            running: self.current > 0.0,
        }
    }

    fn is_ramping(&self) -> bool {
        self.ramp.is_some()
    }
}
