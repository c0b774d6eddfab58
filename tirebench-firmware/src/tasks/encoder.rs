//! Rotary sensor decoder tasks
//!
//! One task per PIO state machine; each folds decoded steps into its
//! shared pulse count.

use defmt::*;
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio_programs::rotary_encoder::PioEncoder;

use tirebench_hal_rp2040::counter::decode;
use tirebench_hal_rp2040::PulseCount;

/// Wheel sensor decoder on PIO0 SM0
#[embassy_executor::task]
pub async fn wheel_encoder_task(mut encoder: PioEncoder<'static, PIO0, 0>, count: &'static PulseCount) {
    info!("Wheel encoder task started");
    decode(&mut encoder, count).await
}

/// Swivel sensor decoder on PIO0 SM1
#[embassy_executor::task]
pub async fn swivel_encoder_task(
    mut encoder: PioEncoder<'static, PIO0, 1>,
    count: &'static PulseCount,
) {
    info!("Swivel encoder task started");
    decode(&mut encoder, count).await
}
