//! Tirebench - Wheel Test Bench Firmware
//!
//! Main firmware binary for RP2040-based wheel test benches. A motor spins
//! the wheel through a calibrated acceleration profile while two PIO
//! quadrature decoders track the wheel and the swivel arm carrying it.
//! Runs are controlled and reported over the serial port.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{PIO0, UART0};
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_rp::pio_programs::rotary_encoder::{PioEncoder, PioEncoderProgram};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use tirebench_core::config::BenchConfig;
use tirebench_core::run::Orchestrator;
use tirebench_drivers::{KinematicEncoder, MotorRamp};
use tirebench_hal_rp2040::RpPwm;

use crate::channels::{SWIVEL_COUNT, WHEEL_COUNT};

mod board;
mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// Configuration and the orchestrator with its sample buffer
static BENCH_CONFIG: StaticCell<BenchConfig> = StaticCell::new();
static BENCH: StaticCell<tasks::Bench> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Tirebench firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static BenchConfig = BENCH_CONFIG.init(config::load());
    if !board::check_wiring(config) {
        warn!("Using board wiring, see src/board.rs");
    }
    info!(
        "Wheel: {} ppr, gear {}, radius {} mm",
        config.wheel.geometry.pulses_per_rev,
        config.wheel.geometry.gear_ratio,
        config.wheel.geometry.radius_mm
    );
    info!(
        "Swivel: {} ppr, gear {}, radius {} mm",
        config.swivel.geometry.pulses_per_rev,
        config.swivel.geometry.gear_ratio,
        config.swivel.geometry.radius_mm
    );

    // Setup UART for the host (115200 baud default)
    let uart_config = UartConfig::default();

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for host communication");

    // Setup PIO0 for the two quadrature sensors
    // Pin assignments are board-specific (see board.rs)
    let Pio {
        mut common,
        sm0,
        sm1,
        ..
    } = Pio::new(p.PIO0, Irqs);

    let program = PioEncoderProgram::new(&mut common);
    let wheel_decoder = PioEncoder::new(&mut common, sm0, p.PIN_2, p.PIN_3, &program);
    let swivel_decoder = PioEncoder::new(&mut common, sm1, p.PIN_4, p.PIN_5, &program);

    info!("PIO quadrature decoders initialized");

    // Setup motor PWM on GPIO18 (slice 1, output A)
    let pwm = Pwm::new_output_a(p.PWM_SLICE1, p.PIN_18, PwmConfig::default());
    let motor = MotorRamp::new(RpPwm::new(pwm, config.motor.channel), &config.motor);

    info!(
        "Motor PWM initialized: {} Hz, {} bits, {} V of {} V",
        config.motor.pwm_frequency_hz,
        config.motor.pwm_resolution_bits,
        config.motor.supply_voltage,
        config.motor.reference_voltage
    );

    let wheel = KinematicEncoder::new(WHEEL_COUNT.counter(), &config.wheel);
    let swivel = KinematicEncoder::new(SWIVEL_COUNT.counter(), &config.swivel);
    let bench = BENCH.init(Orchestrator::new(motor, wheel, swivel, config));

    // Spawn tasks
    spawner
        .spawn(tasks::wheel_encoder_task(wheel_decoder, &WHEEL_COUNT))
        .unwrap();
    spawner
        .spawn(tasks::swivel_encoder_task(swivel_decoder, &SWIVEL_COUNT))
        .unwrap();
    spawner.spawn(tasks::serial_rx_task(rx, config.run)).unwrap();
    spawner.spawn(tasks::serial_tx_task(tx)).unwrap();
    spawner
        .spawn(tasks::bench_task(bench, config.report.columns))
        .unwrap();

    info!("All tasks spawned, firmware running");

    // All work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
