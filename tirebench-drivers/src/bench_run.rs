//! Bench runs over simulated hardware
//!
//! Full runs through the orchestrator with the real drivers. The simulated
//! wheel turns at a rate proportional to PWM duty and the swivel sensor sees
//! the same travel less a fixed slip.

use std::cell::Cell;
use std::f32::consts::PI;
use std::rc::Rc;

use tirebench_core::config::{AbortPolicy, BenchConfig, EncoderConfig};
use tirebench_core::run::{Orchestrator, Outcome, RunParameters};
use tirebench_core::state::{CalibrationStep, Event, State};
use tirebench_core::traits::MotorActuator;
use tirebench_hal::{PwmChannel, PwmConfig, QuadratureCounter};

use crate::{KinematicEncoder, MotorRamp};

/// Fraction of wheel travel lost before the swivel arm
const SLIP: f32 = 0.05;

/// Wheel surface speed at full duty (m/s)
const FULL_SPEED_M_S: f32 = 2.0;

#[derive(Clone)]
struct SharedCounter(Rc<Cell<i64>>);

impl QuadratureCounter for SharedCounter {
    fn read(&mut self) -> i64 {
        self.0.get()
    }

    fn clear(&mut self) {
        self.0.set(0);
    }
}

#[derive(Clone)]
struct SharedPwm {
    duty: Rc<Cell<u32>>,
    max_duty: Rc<Cell<u32>>,
}

impl PwmChannel for SharedPwm {
    fn configure(&mut self, _channel: u8, config: PwmConfig) {
        self.max_duty.set(config.max_duty());
    }

    fn attach(&mut self, _pin: u8, _channel: u8) {}

    fn write(&mut self, _channel: u8, duty: u32) {
        self.duty.set(duty);
    }
}

/// Simulated mechanics behind the two sensors
struct Rig {
    pwm: SharedPwm,
    wheel_count: Rc<Cell<i64>>,
    swivel_count: Rc<Cell<i64>>,
    wheel_travel_m: f64,
    swivel_travel_m: f64,
    config: BenchConfig,
}

impl Rig {
    fn new(config: BenchConfig) -> Self {
        Self {
            pwm: SharedPwm {
                duty: Rc::new(Cell::new(0)),
                max_duty: Rc::new(Cell::new(1)),
            },
            wheel_count: Rc::new(Cell::new(0)),
            swivel_count: Rc::new(Cell::new(0)),
            wheel_travel_m: 0.0,
            swivel_travel_m: 0.0,
            config,
        }
    }

    /// Advance the mechanics by `dt_ms`
    fn step(&mut self, dt_ms: u64) {
        let fraction = self.pwm.duty.get() as f32 / self.pwm.max_duty.get() as f32;
        let travel = (FULL_SPEED_M_S * fraction) as f64 * dt_ms as f64 / 1000.0;

        self.wheel_travel_m += travel;
        self.swivel_travel_m += travel * (1.0 - SLIP as f64);

        self.wheel_count
            .set(pulses_for(&self.config.wheel, self.wheel_travel_m));
        self.swivel_count
            .set(pulses_for(&self.config.swivel, self.swivel_travel_m));
    }
}

/// Counter value for a linear travel
fn pulses_for(encoder: &EncoderConfig, travel_m: f64) -> i64 {
    let g = encoder.geometry;
    let circumference_m = 2.0 * PI as f64 * g.radius_mm as f64 / 1000.0;
    let per_meter = g.pulses_per_rev as f64 * g.gear_ratio as f64 / circumference_m;
    (travel_m * per_meter) as i64
}

type Bench<const N: usize> = Orchestrator<
    MotorRamp<SharedPwm>,
    KinematicEncoder<SharedCounter>,
    KinematicEncoder<SharedCounter>,
    N,
>;

fn bench<const N: usize>(rig: &Rig) -> Bench<N> {
    let config = &rig.config;
    let motor = MotorRamp::new(rig.pwm.clone(), &config.motor);
    let wheel = KinematicEncoder::new(SharedCounter(rig.wheel_count.clone()), &config.wheel);
    let swivel = KinematicEncoder::new(SharedCounter(rig.swivel_count.clone()), &config.swivel);
    Orchestrator::new(motor, wheel, swivel, config)
}

/// Tick every 2 ms until `until_ms`, returning the events seen
fn drive<const N: usize>(
    rig: &mut Rig,
    bench: &mut Bench<N>,
    from_ms: u64,
    until_ms: u64,
) -> Vec<(u64, Event)> {
    let mut events = Vec::new();
    let mut now = from_ms;
    while now <= until_ms {
        rig.step(2);
        if let Some(event) = bench.tick(now) {
            events.push((now, event));
        }
        now += 2;
    }
    events
}

#[test]
fn test_complete_run_collects_expected_samples() {
    let mut rig = Rig::new(BenchConfig::default());
    let mut bench: Bench<1000> = bench(&rig);

    bench.start(RunParameters::new(100.0, 2_000), 0).unwrap();
    assert_eq!(rig.pwm.duty.get(), 63);

    let events = drive(&mut rig, &mut bench, 0, 8_000);
    let phases: Vec<Event> = events.iter().map(|(_, e)| *e).collect();
    assert_eq!(
        phases,
        [
            Event::SpinComplete,
            Event::Settled,
            Event::MotorStart,
            Event::RampComplete,
            Event::DurationElapsed,
        ]
    );

    assert_eq!(bench.state(), State::Finished);
    assert_eq!(rig.pwm.duty.get(), 0);
    assert!(!bench.motor().is_running());

    let run = bench.completed_run().unwrap();
    assert_eq!(run.outcome(), Outcome::Completed);
    assert!(!run.is_truncated());
    assert!(run.len() <= 51);

    let samples = run.samples();
    assert_eq!(samples[0].elapsed_ms, 0);
    assert_eq!(samples[0].wheel_distance_m, 0.0);
    let last = samples[samples.len() - 1];
    assert!((4_900..=5_000).contains(&last.elapsed_ms));

    for pair in samples.windows(2) {
        assert!(pair[0].elapsed_ms < pair[1].elapsed_ms);
        assert!(pair[0].wheel_distance_m <= pair[1].wheel_distance_m);
        assert!(pair[0].swivel_distance_m <= pair[1].swivel_distance_m);
    }

    // No motion before the motor starts 1 s into the run
    assert!(samples
        .iter()
        .filter(|s| s.elapsed_ms < 1_000)
        .all(|s| s.wheel_distance_m == 0.0));

    // Holding 100% at 6 V of 12 V: about half of full speed
    let steady = samples.iter().find(|s| s.elapsed_ms == 4_000).unwrap();
    assert!((steady.wheel_speed_m_s - 1.0).abs() < 0.05);

    let slip = run.summary().slip_percent.unwrap();
    assert!((slip - SLIP * 100.0).abs() < 0.5, "slip {slip}");
}

#[test]
fn test_calibration_spin_is_not_recorded() {
    let mut rig = Rig::new(BenchConfig::default());
    let mut bench: Bench<1000> = bench(&rig);

    bench.start(RunParameters::default(), 0).unwrap();
    drive(&mut rig, &mut bench, 0, 1_400);
    assert!(rig.wheel_travel_m > 0.0);

    drive(&mut rig, &mut bench, 1_402, 1_600);
    let run = bench.current_run().unwrap();
    assert_eq!(run.samples()[0].wheel_distance_m, 0.0);
    assert_eq!(run.samples()[0].swivel_distance_m, 0.0);
}

#[test]
fn test_abort_while_accelerating_stops_motor() {
    let mut rig = Rig::new(BenchConfig::default());
    let mut bench: Bench<1000> = bench(&rig);

    bench.start(RunParameters::default(), 0).unwrap();
    drive(&mut rig, &mut bench, 0, 3_000);
    assert_eq!(bench.state(), State::Accelerating);
    assert!(rig.pwm.duty.get() > 0);

    assert_eq!(bench.abort(), Some(Event::Abort));
    assert_eq!(bench.state(), State::Idle);
    assert_eq!(rig.pwm.duty.get(), 0);
    assert!(bench.completed_run().is_none());

    // The ramp does not resume on later ticks
    drive(&mut rig, &mut bench, 3_002, 3_500);
    assert_eq!(rig.pwm.duty.get(), 0);
}

#[test]
fn test_abort_during_calibration_spin_stops_motor() {
    let mut rig = Rig::new(BenchConfig::default());
    let mut bench: Bench<1000> = bench(&rig);

    bench.start(RunParameters::default(), 0).unwrap();
    drive(&mut rig, &mut bench, 0, 200);
    assert_eq!(bench.state(), State::Calibrating(CalibrationStep::Spinning));
    assert!(rig.pwm.duty.get() > 0);

    assert_eq!(bench.abort(), Some(Event::Abort));
    assert_eq!(bench.state(), State::Idle);
    assert_eq!(rig.pwm.duty.get(), 0);
    assert!(!bench.motor().is_ramping());

    drive(&mut rig, &mut bench, 202, 2_000);
    assert_eq!(rig.pwm.duty.get(), 0);
}

#[test]
fn test_flushed_abort_keeps_partial_run() {
    let mut config = BenchConfig::default();
    config.abort_policy = AbortPolicy::Flush;
    let mut rig = Rig::new(config);
    let mut bench: Bench<1000> = bench(&rig);

    bench.start(RunParameters::default(), 0).unwrap();
    drive(&mut rig, &mut bench, 0, 3_000);
    bench.abort();

    let run = bench.completed_run().unwrap();
    assert_eq!(run.outcome(), Outcome::Aborted);
    assert!(!run.is_empty());
}

#[test]
fn test_small_buffer_truncates_and_finishes() {
    let mut rig = Rig::new(BenchConfig::default());
    let mut bench: Bench<10> = bench(&rig);

    bench.start(RunParameters::default(), 0).unwrap();
    let events = drive(&mut rig, &mut bench, 0, 8_000);

    let full = events.iter().filter(|(_, e)| *e == Event::BufferFull).count();
    assert_eq!(full, 1);
    assert_eq!(bench.state(), State::Finished);

    let run = bench.completed_run().unwrap();
    assert!(run.is_truncated());
    assert_eq!(run.len(), 10);
    let times: Vec<u32> = run.samples().iter().map(|s| s.elapsed_ms).collect();
    assert_eq!(times, (0..10).map(|i| i * 100).collect::<Vec<u32>>());
}

#[test]
fn test_wheel_diameter_changes_next_run() {
    let mut rig = Rig::new(BenchConfig::default());
    let mut bench: Bench<1000> = bench(&rig);

    bench.set_wheel_diameter(100.0).unwrap();
    bench.set_swivel_radius(300.0).unwrap();
    bench.set_motor_voltage(12.0).unwrap();
    bench.set_material("silicone").unwrap();

    bench.start(RunParameters::new(60.0, 1_000), 0).unwrap();
    let snapshot = bench.current_run().unwrap().snapshot().clone();
    assert_eq!(snapshot.wheel.radius_mm, 50.0);
    assert_eq!(snapshot.swivel.radius_mm, 300.0);
    assert_eq!(snapshot.motor_voltage, 12.0);
    assert_eq!(snapshot.material.as_str(), "silicone");
    assert_eq!(snapshot.params.acceleration_ms, 1_000);

    // Calibration spin at 50% of a full 12 V range
    assert_eq!(rig.pwm.duty.get(), 127);
}
