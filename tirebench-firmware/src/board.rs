//! Board wiring
//!
//! embassy-rp hands out pins as typed peripherals, so the wiring is fixed
//! here at compile time. The configured pin numbers are only checked
//! against it.

use defmt::*;

use tirebench_core::config::BenchConfig;

/// Wheel sensor channel A
pub const WHEEL_PIN_A: u8 = 2;
/// Wheel sensor channel B
pub const WHEEL_PIN_B: u8 = 3;
/// Swivel sensor channel A
pub const SWIVEL_PIN_A: u8 = 4;
/// Swivel sensor channel B
pub const SWIVEL_PIN_B: u8 = 5;
/// Motor driver PWM input (PWM slice 1, output A)
pub const MOTOR_PIN: u8 = 18;

/// Warn about configured pins that differ from the board wiring
///
/// Returns `true` when every pin matches.
pub fn check_wiring(config: &BenchConfig) -> bool {
    let pins = [
        ("wheel pin_a", config.wheel.pin_a, WHEEL_PIN_A),
        ("wheel pin_b", config.wheel.pin_b, WHEEL_PIN_B),
        ("swivel pin_a", config.swivel.pin_a, SWIVEL_PIN_A),
        ("swivel pin_b", config.swivel.pin_b, SWIVEL_PIN_B),
        ("motor pin", config.motor.pin, MOTOR_PIN),
    ];

    let mut matches = true;
    for (name, configured, wired) in pins {
        if configured != wired {
            warn!(
                "{} is gpio{} in bench.toml but gpio{} on this board",
                name, configured, wired
            );
            matches = false;
        }
    }
    matches
}
