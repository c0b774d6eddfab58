//! PWM slice output
//!
//! The RP2040 binds a PWM slice to its pins when the slice is created, so
//! [`RpPwm`] wraps one slice driving output A and treats the channel number
//! as a label. Resolution maps onto the counter wrap value (`top`) and the
//! carrier frequency onto the 8.4 fixed-point clock divider.

use embassy_rp::pwm::{Config, Pwm};
use fixed::types::U12F4;

use tirebench_hal::{PwmChannel, PwmConfig};

/// Smallest divider in 1/16 steps (1.0)
const MIN_DIVIDER_X16: u32 = 16;

/// Largest divider in 1/16 steps (255 + 15/16)
const MAX_DIVIDER_X16: u32 = 0x0FFF;

/// Calculate the PWM clock divider for a carrier frequency
///
/// The slice counts from 0 to `top` once per period, so
/// `freq = sys_clk / (divider * (top + 1))`.
///
/// Returns the divider as raw 8.4 fixed-point bits, clamped to the range
/// the hardware accepts. A zero frequency yields the slowest divider.
pub fn clock_divider(sys_clk_hz: u32, frequency_hz: u32, top: u16) -> u16 {
    if frequency_hz == 0 {
        return MAX_DIVIDER_X16 as u16;
    }

    let period_counts = frequency_hz as u64 * (top as u64 + 1);
    let divider_x16 = (sys_clk_hz as u64 * 16) / period_counts;

    divider_x16.clamp(MIN_DIVIDER_X16 as u64, MAX_DIVIDER_X16 as u64) as u16
}

/// Counter wrap value for a duty resolution
///
/// The slice counter is 16 bits wide, so wider resolutions saturate.
pub fn top_for(config: &PwmConfig) -> u16 {
    config.max_duty().min(u16::MAX as u32) as u16
}

/// Motor PWM on a single RP2040 slice
pub struct RpPwm<'d> {
    pwm: Pwm<'d>,
    config: Config,
    channel: u8,
    pin: Option<u8>,
}

impl<'d> RpPwm<'d> {
    /// Wrap a slice created with `Pwm::new_output_a`
    ///
    /// The output is held low until [`PwmChannel::configure`] is called.
    pub fn new(mut pwm: Pwm<'d>, channel: u8) -> Self {
        let mut config = Config::default();
        config.compare_a = 0;
        pwm.set_config(&config);

        Self {
            pwm,
            config,
            channel,
            pin: None,
        }
    }

    /// Pin recorded by [`PwmChannel::attach`]
    pub fn pin(&self) -> Option<u8> {
        self.pin
    }

    /// Current compare value
    pub fn duty(&self) -> u16 {
        self.config.compare_a
    }
}

impl PwmChannel for RpPwm<'_> {
    fn configure(&mut self, channel: u8, config: PwmConfig) {
        if channel != self.channel {
            return;
        }

        let top = top_for(&config);
        let sys_clk = embassy_rp::clocks::clk_sys_freq();

        self.config.top = top;
        self.config.divider = U12F4::from_bits(clock_divider(sys_clk, config.frequency_hz, top));
        self.config.compare_a = self.config.compare_a.min(top);
        self.pwm.set_config(&self.config);
    }

    fn attach(&mut self, pin: u8, channel: u8) {
        // Routing is fixed at slice creation; only record the pin
        if channel == self.channel {
            self.pin = Some(pin);
        }
    }

    fn write(&mut self, channel: u8, duty: u32) {
        if channel != self.channel {
            return;
        }

        let compare = duty.min(self.config.top as u32) as u16;
        if compare != self.config.compare_a {
            self.config.compare_a = compare;
            self.pwm.set_config(&self.config);
        }
    }
}
