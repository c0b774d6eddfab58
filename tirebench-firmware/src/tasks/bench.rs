//! Bench control task
//!
//! Owns the orchestrator. Ticks it every 2 ms, applies host requests
//! between ticks, turns phase events into live markers and writes the
//! report for every closed run.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Ticker};

use tirebench_core::config::SampleColumns;
use tirebench_core::run::Orchestrator;
use tirebench_core::state::Event;
use tirebench_drivers::{KinematicEncoder, MotorRamp};
use tirebench_hal::{LineSink, Monotonic};
use tirebench_hal_rp2040::{EmbassyClock, PulseCounter, RpPwm};
use tirebench_protocol::report::{
    END_TEST, READY_FOR_DATA_COLLECTION, RUN_CALIBRATION, START_TEST, TEST_ABORTED,
};
use tirebench_protocol::{rejection, ReportLines};

use crate::channels::{Action, Request, SerialSink, OUTPUT, REQUESTS};

/// Tick interval in milliseconds
pub const TICK_INTERVAL_MS: u64 = 2;

/// The orchestrator as wired on the board
pub type Bench = Orchestrator<
    MotorRamp<RpPwm<'static>>,
    KinematicEncoder<PulseCounter<'static>>,
    KinematicEncoder<PulseCounter<'static>>,
>;

/// Bench task - runs the test state machine
#[embassy_executor::task]
pub async fn bench_task(bench: &'static mut Bench, columns: SampleColumns) {
    info!("Bench task started");

    let clock = EmbassyClock::new();
    let mut sink = SerialSink;
    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));

    loop {
        match select(ticker.next(), REQUESTS.receive()).await {
            Either::First(()) => {
                if let Some(event) = bench.tick(clock.now_ms()) {
                    announce(event, bench, &mut sink);
                }
            }
            Either::Second(request) => {
                apply(request, bench, clock.now_ms(), &mut sink);
            }
        }

        if bench.completed_run().is_some() {
            send_report(bench, columns).await;
            bench.acknowledge();
        }
    }
}

/// Apply one host request
fn apply(request: Request, bench: &mut Bench, now_ms: u64, sink: &mut SerialSink) {
    let result = match &request.action {
        Action::SetMotorVoltage(volts) => bench.set_motor_voltage(*volts),
        Action::SetWheelDiameter(mm) => bench.set_wheel_diameter(*mm),
        Action::SetSwivelRadius(mm) => bench.set_swivel_radius(*mm),
        Action::SetMaterial(label) => bench.set_material(label),
        Action::Start(params) => bench.start(*params, now_ms),
        Action::Abort => {
            sink.write_line(request.ack);
            if bench.abort().is_some() {
                warn!("Test aborted");
                sink.write_line(TEST_ABORTED);
            }
            return;
        }
    };

    match result {
        Ok(()) => {
            sink.write_line(request.ack);
            if let Action::Start(params) = request.action {
                info!(
                    "Run started: {}% over {} ms",
                    params.target_percent, params.acceleration_ms
                );
                sink.write_line(RUN_CALIBRATION);
            }
        }
        Err(e) => {
            warn!("Request refused: {:?}", e);
            sink.write_line(rejection(e));
        }
    }
}

/// Log a phase event and send its live markers
fn announce(event: Event, bench: &Bench, sink: &mut SerialSink) {
    match event {
        Event::SpinComplete => debug!("Calibration spin complete"),
        Event::Settled => {
            info!("Run clock zeroed, sampling");
            sink.write_line(READY_FOR_DATA_COLLECTION);
            sink.write_line(START_TEST);
        }
        Event::MotorStart => info!("Motor ramp started"),
        Event::RampComplete => info!("Target speed reached"),
        Event::DurationElapsed => {
            let samples = bench.completed_run().map_or(0, |run| run.len());
            info!("Run finished with {} samples", samples);
            sink.write_line(END_TEST);
        }
        Event::BufferFull => warn!("Sample buffer full, run truncated"),
        _ => debug!("Event: {:?}", event),
    }
}

/// Send the report for the closed run
///
/// Lines are awaited onto the output channel so none are dropped.
async fn send_report(bench: &Bench, columns: SampleColumns) {
    let Some(run) = bench.completed_run() else {
        return;
    };

    info!(
        "Sending report: {} samples, outcome {}",
        run.len(),
        run.outcome().as_str()
    );
    for line in ReportLines::new(run, columns) {
        OUTPUT.send(line).await;
    }
}
