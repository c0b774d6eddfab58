//! RP2040-specific HAL for the wheel test bench
//!
//! Implements the `tirebench-hal` capabilities on top of embassy-rp:
//!
//! - PWM slice output for the motor driver ([`pwm::RpPwm`])
//! - PIO quadrature decoding into shared pulse counts ([`counter`])
//! - embassy-time backed millisecond clock ([`clock::EmbassyClock`])

#![no_std]

pub mod clock;
pub mod counter;
pub mod pwm;

pub use clock::EmbassyClock;
pub use counter::{PulseCount, PulseCounter};
pub use pwm::RpPwm;

// Re-export shared traits from tirebench-hal for convenience
pub use tirebench_hal::{Monotonic, PwmChannel, PwmConfig, QuadratureCounter};
