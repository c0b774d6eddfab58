//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use tirebench_core::run::{Label, RunParameters};
use tirebench_hal::LineSink;
use tirebench_hal_rp2040::PulseCount;
use tirebench_protocol::OutputLine;

/// Channel capacity for parsed host requests
const REQUEST_CHANNEL_SIZE: usize = 4;

/// Channel capacity for outgoing lines
const OUTPUT_CHANNEL_SIZE: usize = 16;

/// Bench action requested by the host
#[derive(Debug, Clone)]
pub enum Action {
    SetMotorVoltage(f32),
    SetWheelDiameter(f32),
    SetSwivelRadius(f32),
    SetMaterial(Label),
    Start(RunParameters),
    Abort,
}

/// Host request with the acknowledgement to send once it is applied
#[derive(Debug, Clone)]
pub struct Request {
    pub action: Action,
    pub ack: &'static str,
}

/// Requests from the serial RX task to the bench task
pub static REQUESTS: Channel<CriticalSectionRawMutex, Request, REQUEST_CHANNEL_SIZE> =
    Channel::new();

/// Lines waiting for the serial TX task
pub static OUTPUT: Channel<CriticalSectionRawMutex, OutputLine, OUTPUT_CHANNEL_SIZE> =
    Channel::new();

/// Wheel sensor pulses, written by its PIO decoder task
pub static WHEEL_COUNT: PulseCount = PulseCount::new();

/// Swivel sensor pulses, written by its PIO decoder task
pub static SWIVEL_COUNT: PulseCount = PulseCount::new();

/// Non-blocking line sink over [`OUTPUT`]
///
/// Used for acknowledgements, markers and diagnostics. Report blocks are
/// sent with an awaited `OUTPUT.send` instead so they are never dropped.
pub struct SerialSink;

impl LineSink for SerialSink {
    fn write_line(&mut self, line: &str) {
        let mut out = OutputLine::new();
        if out.push_str(line).is_err() {
            warn!("Output line too long, dropping");
            return;
        }
        if OUTPUT.try_send(out).is_err() {
            warn!("Output channel full, dropping line");
        }
    }
}
