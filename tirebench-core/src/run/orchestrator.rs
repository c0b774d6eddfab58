//! Test orchestrator
//!
//! Drives the motor and samples both sensors according to the state
//! machine. Every wait is a comparison against a stored deadline, checked
//! on each [`Orchestrator::tick`], so the caller decides the tick rate.
//!
//! Each tick runs in three steps:
//! 1. at most one phase transition (with its entry actions)
//! 2. motor ramp update, or a stop in states that keep the motor off
//! 3. sampling, when the cadence deadline has passed

use crate::config::{
    AbortPolicy, BenchConfig, CalibrationConfig, TestTiming, MAX_LABEL_LEN,
};
use crate::motion::clamp_percent;
use crate::state::{CalibrationStep, Event, State};
use crate::traits::{MotionSensor, MotorActuator};

use super::record::{
    Label, Outcome, RunParameters, RunSnapshot, TestRun, TestSample, DEFAULT_CAPACITY,
};

/// Errors returned by orchestrator commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BenchError {
    /// A run is in progress
    RunActive,
    /// Value is out of range or not a number
    InvalidParameter,
}

/// Sequences test runs over a motor and two motion sensors
pub struct Orchestrator<M, W, S, const N: usize = DEFAULT_CAPACITY> {
    motor: M,
    wheel: W,
    swivel: S,
    timing: TestTiming,
    calibration: CalibrationConfig,
    abort_policy: AbortPolicy,
    material: Label,
    state: State,
    params: RunParameters,
    /// Start of the current calibration step
    phase_start_ms: u64,
    /// Zero reference of the run clock
    run_start_ms: u64,
    motor_start_ms: u64,
    next_sample_ms: u64,
    run: Option<TestRun<N>>,
    buffer_full_pending: bool,
}

impl<M, W, S, const N: usize> Orchestrator<M, W, S, N>
where
    M: MotorActuator,
    W: MotionSensor,
    S: MotionSensor,
{
    /// Create an idle orchestrator
    ///
    /// The motor and sensors are expected to be built from the same
    /// configuration; only timing, calibration and abort handling are
    /// taken from `config` here.
    pub fn new(motor: M, wheel: W, swivel: S, config: &BenchConfig) -> Self {
        Self {
            motor,
            wheel,
            swivel,
            timing: config.timing,
            calibration: config.calibration,
            abort_policy: config.abort_policy,
            material: Label::new(),
            state: State::Idle,
            params: config.run.into(),
            phase_start_ms: 0,
            run_start_ms: 0,
            motor_start_ms: 0,
            next_sample_ms: 0,
            run: None,
            buffer_full_pending: false,
        }
    }

    /// Begin a run with calibration
    ///
    /// A finished or flushed run still held is released.
    pub fn start(&mut self, params: RunParameters, now_ms: u64) -> Result<(), BenchError> {
        if self.state.is_active() {
            return Err(BenchError::RunActive);
        }
        if params.target_percent.is_nan() {
            return Err(BenchError::InvalidParameter);
        }

        let params = RunParameters::new(params.target_percent, params.acceleration_ms);
        let snapshot = RunSnapshot {
            params,
            material: self.material.clone(),
            wheel: self.wheel.geometry(),
            swivel: self.swivel.geometry(),
            motor_voltage: self.motor.state().voltage,
        };

        self.params = params;
        self.run = Some(TestRun::new(snapshot));
        self.buffer_full_pending = false;
        self.phase_start_ms = now_ms;
        self.motor.set_immediate(self.calibration.spin_percent);
        self.state = self.state.transition(Event::Start);
        Ok(())
    }

    /// Advance the run to `now_ms`
    ///
    /// Returns the phase event that occurred on this tick, if any. A full
    /// sample buffer is reported once as [`Event::BufferFull`], on the first
    /// tick without a phase event.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        let event = self.due_event(now_ms);
        if let Some(event) = event {
            self.state = self.state.transition(event);
            self.enter(event, now_ms);
        }

        if self.state.motor_allowed() {
            self.motor.update(now_ms);
        } else if self.motor.is_running() {
            self.motor.stop();
        }

        if self.state.is_sampling() && now_ms >= self.next_sample_ms {
            self.sample(now_ms);
        }

        event.or_else(|| {
            if self.buffer_full_pending {
                self.buffer_full_pending = false;
                Some(Event::BufferFull)
            } else {
                None
            }
        })
    }

    /// Cancel the current run
    ///
    /// The motor is commanded to 0% unconditionally. Returns
    /// [`Event::Abort`] when a run was actually cancelled.
    pub fn abort(&mut self) -> Option<Event> {
        self.motor.stop();

        if !self.state.is_active() {
            return None;
        }

        self.state = self.state.transition(Event::Abort);
        match self.abort_policy {
            AbortPolicy::Discard => self.run = None,
            AbortPolicy::Flush => {
                if let Some(run) = self.run.as_mut() {
                    run.finish(Outcome::Aborted);
                }
            }
        }
        self.buffer_full_pending = false;
        self.state = self.state.transition(Event::Acknowledge);
        Some(Event::Abort)
    }

    /// Release a finished or flushed run and return to idle
    pub fn acknowledge(&mut self) {
        if self.state.is_active() {
            return;
        }
        self.run = None;
        self.buffer_full_pending = false;
        self.state = self.state.transition(Event::Acknowledge);
    }

    /// The last closed run, until acknowledged or a new run starts
    pub fn completed_run(&self) -> Option<&TestRun<N>> {
        self.run
            .as_ref()
            .filter(|run| run.outcome() != Outcome::InProgress)
    }

    /// The run being collected
    pub fn current_run(&self) -> Option<&TestRun<N>> {
        self.run
            .as_ref()
            .filter(|run| run.outcome() == Outcome::InProgress)
    }

    /// Change the motor supply voltage
    pub fn set_motor_voltage(&mut self, volts: f32) -> Result<(), BenchError> {
        self.ensure_settable()?;
        if !is_positive(volts) {
            return Err(BenchError::InvalidParameter);
        }
        self.motor.set_voltage(volts);
        Ok(())
    }

    /// Change the wheel diameter (mm)
    pub fn set_wheel_diameter(&mut self, diameter_mm: f32) -> Result<(), BenchError> {
        self.ensure_settable()?;
        if !is_positive(diameter_mm) {
            return Err(BenchError::InvalidParameter);
        }
        self.wheel.set_radius_mm(diameter_mm / 2.0);
        Ok(())
    }

    /// Change the swivel pivot to wheel distance (mm)
    pub fn set_swivel_radius(&mut self, radius_mm: f32) -> Result<(), BenchError> {
        self.ensure_settable()?;
        if !is_positive(radius_mm) {
            return Err(BenchError::InvalidParameter);
        }
        self.swivel.set_radius_mm(radius_mm);
        Ok(())
    }

    /// Set the material label recorded with the next run
    pub fn set_material(&mut self, label: &str) -> Result<(), BenchError> {
        self.ensure_settable()?;
        if label.len() > MAX_LABEL_LEN {
            return Err(BenchError::InvalidParameter);
        }
        self.material.clear();
        self.material
            .push_str(label)
            .map_err(|_| BenchError::InvalidParameter)
    }

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Parameters of the current or last run
    pub fn params(&self) -> RunParameters {
        self.params
    }

    /// Material label for the next run
    pub fn material(&self) -> &str {
        &self.material
    }

    /// Run clock reading at `now_ms`, once the clock has been zeroed
    pub fn elapsed_ms(&self, now_ms: u64) -> Option<u64> {
        self.state
            .is_sampling()
            .then(|| now_ms.saturating_sub(self.run_start_ms))
    }

    /// Motor accessor
    pub fn motor(&self) -> &M {
        &self.motor
    }

    /// Wheel sensor accessor
    pub fn wheel(&self) -> &W {
        &self.wheel
    }

    /// Swivel sensor accessor
    pub fn swivel(&self) -> &S {
        &self.swivel
    }

    fn ensure_settable(&self) -> Result<(), BenchError> {
        if self.state.accepts_settings() {
            Ok(())
        } else {
            Err(BenchError::RunActive)
        }
    }

    /// Deadline that has passed in the current state
    fn due_event(&self, now_ms: u64) -> Option<Event> {
        let since = |start: u64, ms: u32| now_ms.saturating_sub(start) >= u64::from(ms);

        match self.state {
            State::Calibrating(CalibrationStep::Spinning)
                if since(self.phase_start_ms, self.calibration.spin_ms) =>
            {
                Some(Event::SpinComplete)
            }
            State::Calibrating(CalibrationStep::Settling)
                if since(self.phase_start_ms, self.calibration.settle_ms) =>
            {
                Some(Event::Settled)
            }
            State::Armed | State::Accelerating | State::SteadyState
                if since(self.run_start_ms, self.timing.total_duration_ms) =>
            {
                Some(Event::DurationElapsed)
            }
            State::Armed if since(self.run_start_ms, self.timing.pre_motor_start_delay_ms) => {
                Some(Event::MotorStart)
            }
            State::Accelerating if since(self.motor_start_ms, self.params.acceleration_ms) => {
                Some(Event::RampComplete)
            }
            _ => None,
        }
    }

    /// Entry actions of the state reached through `event`
    fn enter(&mut self, event: Event, now_ms: u64) {
        match event {
            Event::SpinComplete => {
                self.motor.set_immediate(0.0);
                self.reset_sensors();
                self.phase_start_ms = now_ms;
            }
            Event::Settled => {
                self.reset_sensors();
                self.run_start_ms = now_ms;
                self.next_sample_ms = now_ms;
            }
            Event::MotorStart => {
                self.motor_start_ms = now_ms;
                self.motor.ramp_to(
                    clamp_percent(self.params.target_percent),
                    self.params.acceleration_ms,
                    now_ms,
                );
            }
            Event::DurationElapsed => {
                self.motor.stop();
                if let Some(run) = self.run.as_mut() {
                    run.finish(Outcome::Completed);
                }
            }
            _ => {}
        }
    }

    fn reset_sensors(&mut self) {
        self.wheel.reset_distance();
        self.swivel.reset_distance();
    }

    fn sample(&mut self, now_ms: u64) {
        let elapsed = now_ms.saturating_sub(self.run_start_ms);
        let wheel = self.wheel.sample(now_ms);
        let swivel = self.swivel.sample(now_ms);

        if let Some(run) = self.run.as_mut() {
            let was_truncated = run.is_truncated();
            let elapsed_ms = u32::try_from(elapsed).unwrap_or(u32::MAX);
            if !run.push(TestSample::new(elapsed_ms, wheel, swivel)) && !was_truncated {
                self.buffer_full_pending = true;
            }
        }

        // Skip slots missed by a late tick
        let cadence = u64::from(self.timing.sample_cadence_ms.max(1));
        let missed = now_ms.saturating_sub(self.next_sample_ms) / cadence;
        self.next_sample_ms += (missed + 1) * cadence;
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncoderGeometry;
    use crate::motion::{Kinematics, LinearRamp};
    use crate::traits::MotorState;

    #[derive(Default)]
    struct FakeMotor {
        percent: f32,
        voltage: f32,
        ramp: Option<LinearRamp>,
    }

    impl MotorActuator for FakeMotor {
        fn set_immediate(&mut self, percent: f32) {
            self.ramp = None;
            self.percent = clamp_percent(percent);
        }

        fn ramp_to(&mut self, target: f32, duration_ms: u32, now_ms: u64) {
            self.ramp = Some(LinearRamp::new(self.percent, target, duration_ms, now_ms));
            self.update(now_ms);
        }

        fn update(&mut self, now_ms: u64) {
            if let Some(ramp) = self.ramp {
                self.percent = ramp.percentage_at(now_ms);
            }
        }

        fn commanded_at(&self, now_ms: u64) -> f32 {
            self.ramp
                .map(|r| r.percentage_at(now_ms))
                .unwrap_or(self.percent)
        }

        fn set_voltage(&mut self, volts: f32) {
            self.voltage = volts;
        }

        fn state(&self) -> MotorState {
            MotorState {
                current: self.percent,
                target: self.ramp.map(|r| r.target()).unwrap_or(self.percent),
                voltage: self.voltage,
                running: self.percent > 0.0,
            }
        }

        fn is_ramping(&self) -> bool {
            self.ramp.is_some()
        }
    }

    /// Sensor that reports elapsed time as distance
    struct FakeSensor {
        geometry: EncoderGeometry,
        origin_ms: Option<u64>,
        resets: u32,
    }

    impl FakeSensor {
        fn new() -> Self {
            Self {
                geometry: EncoderGeometry::new(100, 1.0, 10.0),
                origin_ms: None,
                resets: 0,
            }
        }
    }

    impl MotionSensor for FakeSensor {
        fn sample(&mut self, now_ms: u64) -> Kinematics {
            let origin = *self.origin_ms.get_or_insert(now_ms);
            Kinematics {
                distance_m: (now_ms - origin) as f32 / 1000.0,
                speed_m_s: 1.0,
                accel_m_s2: 0.0,
            }
        }

        fn reset_distance(&mut self) {
            self.origin_ms = None;
            self.resets += 1;
        }

        fn geometry(&self) -> EncoderGeometry {
            self.geometry
        }

        fn set_radius_mm(&mut self, radius_mm: f32) {
            self.geometry.radius_mm = radius_mm;
        }
    }

    type Bench<const N: usize> = Orchestrator<FakeMotor, FakeSensor, FakeSensor, N>;

    fn bench<const N: usize>() -> Bench<N> {
        let motor = FakeMotor {
            voltage: 6.0,
            ..FakeMotor::default()
        };
        Orchestrator::new(motor, FakeSensor::new(), FakeSensor::new(), &BenchConfig::default())
    }

    /// Tick every `step` ms from `from` to `to` inclusive, collecting events
    fn run_until<const N: usize>(
        bench: &mut Bench<N>,
        from: u64,
        to: u64,
        step: u64,
    ) -> heapless::Vec<(u64, Event), 16> {
        let mut events = heapless::Vec::new();
        let mut now = from;
        while now <= to {
            if let Some(event) = bench.tick(now) {
                let _ = events.push((now, event));
            }
            now += step;
        }
        events
    }

    #[test]
    fn test_calibration_sequence() {
        let mut bench = bench::<64>();
        bench.start(RunParameters::default(), 0).unwrap();
        assert_eq!(bench.state(), State::Calibrating(CalibrationStep::Spinning));
        assert_eq!(bench.motor().percentage(), 50.0);

        assert_eq!(bench.tick(499), None);
        assert_eq!(bench.tick(500), Some(Event::SpinComplete));
        assert_eq!(bench.motor().percentage(), 0.0);
        assert_eq!(bench.wheel().resets, 1);
        assert_eq!(bench.swivel().resets, 1);

        assert_eq!(bench.tick(1_499), None);
        assert_eq!(bench.tick(1_500), Some(Event::Settled));
        assert_eq!(bench.state(), State::Armed);
        assert_eq!(bench.wheel().resets, 2);
        assert_eq!(bench.elapsed_ms(1_600), Some(100));

        // First sample taken on the arming tick at t = 0
        let run = bench.current_run().unwrap();
        assert_eq!(run.len(), 1);
        assert_eq!(run.samples()[0].elapsed_ms, 0);
    }

    #[test]
    fn test_full_run() {
        let mut bench = bench::<64>();
        bench.start(RunParameters::new(100.0, 2_000), 0).unwrap();

        let events = run_until(&mut bench, 0, 8_000, 2);
        let expected = [
            (500, Event::SpinComplete),
            (1_500, Event::Settled),
            (2_500, Event::MotorStart),
            (4_500, Event::RampComplete),
            (6_500, Event::DurationElapsed),
        ];
        assert_eq!(events.as_slice(), &expected);

        assert_eq!(bench.state(), State::Finished);
        assert_eq!(bench.motor().percentage(), 0.0);

        let run = bench.completed_run().unwrap();
        assert_eq!(run.outcome(), Outcome::Completed);
        assert!(!run.is_truncated());
        assert!(run.len() <= 51);
        assert_eq!(run.samples()[0].elapsed_ms, 0);

        let last = run.samples()[run.len() - 1].elapsed_ms;
        assert!((4_900..5_000).contains(&last));

        let times: heapless::Vec<u32, 64> = run.samples().iter().map(|s| s.elapsed_ms).collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));

        bench.acknowledge();
        assert_eq!(bench.state(), State::Idle);
        assert!(bench.completed_run().is_none());
    }

    #[test]
    fn test_ramp_progress() {
        let mut bench = bench::<64>();
        bench.start(RunParameters::new(100.0, 2_000), 0).unwrap();
        run_until(&mut bench, 0, 2_500, 10);
        assert_eq!(bench.state(), State::Accelerating);

        bench.tick(3_000);
        let p = bench.motor().percentage();
        assert!(p > 24.9 && p < 25.1);

        bench.tick(3_500);
        let p = bench.motor().percentage();
        assert!(p > 49.9 && p < 50.1);

        bench.tick(4_500);
        assert_eq!(bench.state(), State::SteadyState);
        assert_eq!(bench.motor().percentage(), 100.0);
    }

    #[test]
    fn test_missed_slots_are_skipped() {
        let mut bench = bench::<64>();
        bench.start(RunParameters::default(), 0).unwrap();
        run_until(&mut bench, 0, 1_500, 500);

        // Late tick at +350 ms yields one sample, next slot at +400
        bench.tick(1_850);
        bench.tick(1_880);
        bench.tick(1_900);

        let times: heapless::Vec<u32, 8> = bench
            .current_run()
            .unwrap()
            .samples()
            .iter()
            .map(|s| s.elapsed_ms)
            .collect();
        assert_eq!(times.as_slice(), &[0, 350, 400]);
    }

    #[test]
    fn test_buffer_full_reported_once() {
        let mut bench = bench::<8>();
        bench.start(RunParameters::default(), 0).unwrap();

        let events = run_until(&mut bench, 0, 8_000, 10);
        let full: usize = events
            .iter()
            .filter(|(_, e)| *e == Event::BufferFull)
            .count();
        assert_eq!(full, 1);

        assert_eq!(bench.state(), State::Finished);
        let run = bench.completed_run().unwrap();
        assert!(run.is_truncated());
        assert_eq!(run.len(), 8);
        assert_eq!(run.samples()[7].elapsed_ms, 700);
    }

    #[test]
    fn test_abort_discards() {
        let mut bench = bench::<64>();
        bench.start(RunParameters::default(), 0).unwrap();
        run_until(&mut bench, 0, 3_000, 10);
        assert_eq!(bench.state(), State::Accelerating);
        assert!(bench.motor().is_running());

        assert_eq!(bench.abort(), Some(Event::Abort));
        assert_eq!(bench.state(), State::Idle);
        assert_eq!(bench.motor().percentage(), 0.0);
        assert!(!bench.motor().is_ramping());
        assert!(bench.completed_run().is_none());

        // Nothing left to abort
        assert_eq!(bench.abort(), None);
    }

    #[test]
    fn test_abort_stops_motor_in_every_phase() {
        let phases = [
            (100, State::Calibrating(CalibrationStep::Spinning)),
            (1_000, State::Calibrating(CalibrationStep::Settling)),
            (2_000, State::Armed),
            (3_000, State::Accelerating),
            (5_000, State::SteadyState),
        ];

        for (at, expected) in phases {
            let mut bench = bench::<64>();
            bench.start(RunParameters::new(100.0, 2_000), 0).unwrap();
            run_until(&mut bench, 0, at, 10);
            assert_eq!(bench.state(), expected);

            assert_eq!(bench.abort(), Some(Event::Abort));
            assert_eq!(bench.motor().percentage(), 0.0);
            assert!(!bench.motor().is_ramping());
            assert_eq!(bench.state(), State::Idle);

            // Stays off on later ticks
            run_until(&mut bench, at, at + 3_000, 10);
            assert_eq!(bench.motor().percentage(), 0.0);
        }
    }

    #[test]
    fn test_motor_held_off_while_armed() {
        let mut bench = bench::<64>();
        bench.start(RunParameters::default(), 0).unwrap();
        run_until(&mut bench, 0, 2_000, 10);
        assert_eq!(bench.state(), State::Armed);

        bench.motor.set_immediate(30.0);
        bench.tick(2_010);
        assert_eq!(bench.motor().percentage(), 0.0);
    }

    #[test]
    fn test_abort_flushes() {
        let mut config = BenchConfig::default();
        config.abort_policy = AbortPolicy::Flush;
        let mut bench: Bench<64> = Orchestrator::new(
            FakeMotor::default(),
            FakeSensor::new(),
            FakeSensor::new(),
            &config,
        );

        bench.start(RunParameters::default(), 0).unwrap();
        run_until(&mut bench, 0, 2_000, 10);
        bench.abort();

        assert_eq!(bench.state(), State::Idle);
        let run = bench.completed_run().unwrap();
        assert_eq!(run.outcome(), Outcome::Aborted);
        assert_eq!(run.len(), 6);

        // Next start releases the flushed run
        bench.start(RunParameters::default(), 10_000).unwrap();
        assert!(bench.completed_run().is_none());
    }

    #[test]
    fn test_settings_rejected_during_run() {
        let mut bench = bench::<64>();
        bench.start(RunParameters::default(), 0).unwrap();

        assert_eq!(
            bench.start(RunParameters::default(), 1),
            Err(BenchError::RunActive)
        );
        assert_eq!(bench.set_motor_voltage(9.0), Err(BenchError::RunActive));
        assert_eq!(bench.set_wheel_diameter(80.0), Err(BenchError::RunActive));
        assert_eq!(bench.set_swivel_radius(300.0), Err(BenchError::RunActive));
        assert_eq!(bench.set_material("rubber"), Err(BenchError::RunActive));
    }

    #[test]
    fn test_settings_when_idle() {
        let mut bench = bench::<64>();

        bench.set_motor_voltage(9.0).unwrap();
        bench.set_wheel_diameter(80.0).unwrap();
        bench.set_swivel_radius(300.0).unwrap();
        bench.set_material("rubber").unwrap();

        assert_eq!(bench.motor().state().voltage, 9.0);
        assert_eq!(bench.wheel().geometry().radius_mm, 40.0);
        assert_eq!(bench.swivel().geometry().radius_mm, 300.0);
        assert_eq!(bench.material(), "rubber");

        assert_eq!(bench.set_motor_voltage(-1.0), Err(BenchError::InvalidParameter));
        assert_eq!(bench.set_wheel_diameter(f32::NAN), Err(BenchError::InvalidParameter));
        assert_eq!(
            bench.set_material("a label that is much too long for the bench"),
            Err(BenchError::InvalidParameter)
        );

        bench.start(RunParameters::default(), 0).unwrap();
        let snapshot = bench.current_run().unwrap().snapshot();
        assert_eq!(snapshot.material.as_str(), "rubber");
        assert_eq!(snapshot.motor_voltage, 9.0);
        assert_eq!(snapshot.wheel.radius_mm, 40.0);
    }

    #[test]
    fn test_start_from_finished() {
        let mut bench = bench::<64>();
        bench.start(RunParameters::default(), 0).unwrap();
        run_until(&mut bench, 0, 7_000, 10);
        assert_eq!(bench.state(), State::Finished);

        bench.start(RunParameters::default(), 7_010).unwrap();
        assert_eq!(bench.state(), State::Calibrating(CalibrationStep::Spinning));
        assert!(bench.completed_run().is_none());
        assert_eq!(bench.current_run().unwrap().len(), 0);
    }

    #[test]
    fn test_nan_target_rejected() {
        let mut bench = bench::<64>();
        let params = RunParameters {
            target_percent: f32::NAN,
            acceleration_ms: 0,
        };
        assert_eq!(bench.start(params, 0), Err(BenchError::InvalidParameter));
        assert_eq!(bench.state(), State::Idle);
    }
}
