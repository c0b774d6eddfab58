//! PWM output abstraction
//!
//! Mirrors the LEDC-style peripheral model: a numbered channel is configured
//! with a frequency and resolution, a pin is attached to it, and raw duty
//! values are written to the channel.

/// PWM channel timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmConfig {
    /// Carrier frequency in Hz
    pub frequency_hz: u32,
    /// Duty resolution in bits (8 → duty range 0-255)
    pub resolution_bits: u8,
}

impl PwmConfig {
    /// Largest duty value representable at this resolution
    pub const fn max_duty(&self) -> u32 {
        if self.resolution_bits >= 32 {
            u32::MAX
        } else {
            (1u32 << self.resolution_bits) - 1
        }
    }
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 5_000,
            resolution_bits: 8,
        }
    }
}

/// PWM output capability
pub trait PwmChannel {
    /// Set up `channel` with the given frequency and resolution
    fn configure(&mut self, channel: u8, config: PwmConfig);

    /// Route `channel` to the output `pin`
    fn attach(&mut self, pin: u8, channel: u8);

    /// Write a raw duty value (0..=max_duty) to `channel`
    fn write(&mut self, channel: u8, duty: u32);
}
