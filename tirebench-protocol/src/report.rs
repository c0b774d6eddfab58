//! Run report output
//!
//! A finished run is written as a delimited block: parameter lines,
//! a CSV header and one row per sample.
//!
//! ```text
//! ---------------start---------------
//! Material: soft rubber
//! Target speed (%): 50.00
//! ...
//! Timestamp (ms),Wheel Position (m),Swivel Position (m),...
//! 0,0.0000,0.0000,...
//! ---------------end---------------
//! ```
//!
//! [`ReportLines`] yields the block one line at a time so the firmware can
//! await its serial channel between lines.

use core::fmt::Write;

use tirebench_core::config::SampleColumns;
use tirebench_core::run::{RunSummary, TestRun, TestSample};
use tirebench_hal::LineSink;

use crate::line::OutputLine;

/// Sent when a run starts calibrating
pub const RUN_CALIBRATION: &str = "RUN_CALIBRATION";
/// Sent when the run clock is zeroed
pub const READY_FOR_DATA_COLLECTION: &str = "READY_FOR_DATA_COLLECTION";
/// Sent right after [`READY_FOR_DATA_COLLECTION`]
pub const START_TEST: &str = "START_TEST";
/// Sent when the run duration has elapsed
pub const END_TEST: &str = "END_TEST";
/// Sent when a run is aborted
pub const TEST_ABORTED: &str = "TEST_ABORTED";

/// First line of a report block
pub const REPORT_START: &str = "---------------start---------------";
/// Last line of a report block
pub const REPORT_END: &str = "---------------end---------------";

/// Header for [`SampleColumns::Positions`]
pub const HEADER_POSITIONS: &str = "Timestamp (ms),Wheel Position (m),Swivel Position (m)";
/// Header for [`SampleColumns::Full`]
pub const HEADER_FULL: &str = "Timestamp (ms),Wheel Position (m),Swivel Position (m),\
Wheel Speed (m/s),Wheel Acceleration (m/s^2),Swivel Speed (m/s),Swivel Acceleration (m/s^2)";

/// Number of `key: value` lines before the header
const PARAMETER_COUNT: u8 = 10;

/// CSV header for a column layout
pub fn header(columns: SampleColumns) -> &'static str {
    match columns {
        SampleColumns::Positions => HEADER_POSITIONS,
        SampleColumns::Full => HEADER_FULL,
    }
}

/// Largest magnitude written in a sample row
///
/// Seven fields at this width stay well inside [`OutputLine`].
pub const ROW_VALUE_LIMIT: f32 = 1.0e9;

/// Format one sample row
///
/// Values are saturated to [`ROW_VALUE_LIMIT`] so a row is never cut short.
pub fn sample_row(sample: &TestSample, columns: SampleColumns) -> OutputLine {
    let mut line = OutputLine::new();
    // Cannot overflow: at most 10 + 6 * 17 bytes with saturated values
    let _ = write!(
        line,
        "{},{:.4},{:.4}",
        sample.elapsed_ms,
        saturate(sample.wheel_distance_m),
        saturate(sample.swivel_distance_m)
    );

    if columns == SampleColumns::Full {
        let _ = write!(
            line,
            ",{:.4},{:.4},{:.4},{:.4}",
            saturate(sample.wheel_speed_m_s),
            saturate(sample.wheel_accel_m_s2),
            saturate(sample.swivel_speed_m_s),
            saturate(sample.swivel_accel_m_s2)
        );
    }

    line
}

fn saturate(value: f32) -> f32 {
    if value.is_nan() {
        value
    } else {
        value.clamp(-ROW_VALUE_LIMIT, ROW_VALUE_LIMIT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    Parameter(u8),
    Header,
    Row(usize),
    Done,
}

/// Iterator over the lines of a run report
pub struct ReportLines<'a, const N: usize> {
    run: &'a TestRun<N>,
    summary: RunSummary,
    columns: SampleColumns,
    stage: Stage,
}

impl<'a, const N: usize> ReportLines<'a, N> {
    /// Report for `run` in the given column layout
    pub fn new(run: &'a TestRun<N>, columns: SampleColumns) -> Self {
        Self {
            run,
            summary: run.summary(),
            columns,
            stage: Stage::Start,
        }
    }

    fn parameter(&self, index: u8) -> OutputLine {
        let snapshot = self.run.snapshot();
        let mut line = OutputLine::new();

        let _ = match index {
            0 => write!(line, "Material: {}", snapshot.material),
            1 => write!(line, "Target speed (%): {:.2}", snapshot.params.target_percent),
            2 => write!(
                line,
                "Acceleration time (s): {:.2}",
                snapshot.params.acceleration_ms as f32 / 1000.0
            ),
            3 => write!(line, "Motor voltage (V): {:.2}", snapshot.motor_voltage),
            4 => write!(line, "Wheel diameter (mm): {:.2}", snapshot.wheel.diameter_mm()),
            5 => write!(
                line,
                "Distance center to wheel (mm): {:.2}",
                snapshot.swivel.radius_mm
            ),
            6 => write!(line, "Samples: {}", self.run.len()),
            7 => write!(
                line,
                "Truncated: {}",
                if self.run.is_truncated() { "yes" } else { "no" }
            ),
            8 => write!(line, "Outcome: {}", self.run.outcome().as_str()),
            _ => match self.summary.slip_percent {
                Some(slip) => write!(line, "Final slip (%): {:.2}", slip),
                None => write!(line, "Final slip (%): n/a"),
            },
        };

        line
    }
}

impl<const N: usize> Iterator for ReportLines<'_, N> {
    type Item = OutputLine;

    fn next(&mut self) -> Option<OutputLine> {
        let (line, next) = match self.stage {
            Stage::Start => (fixed(REPORT_START), Stage::Parameter(0)),
            Stage::Parameter(i) => {
                let next = if i + 1 < PARAMETER_COUNT {
                    Stage::Parameter(i + 1)
                } else {
                    Stage::Header
                };
                (self.parameter(i), next)
            }
            Stage::Header => (fixed(header(self.columns)), Stage::Row(0)),
            Stage::Row(i) => match self.run.samples().get(i) {
                Some(sample) => (sample_row(sample, self.columns), Stage::Row(i + 1)),
                None => (fixed(REPORT_END), Stage::Done),
            },
            Stage::Done => return None,
        };

        self.stage = next;
        Some(line)
    }
}

/// Write a complete report to a line sink
pub fn write_report<S: LineSink, const N: usize>(
    sink: &mut S,
    run: &TestRun<N>,
    columns: SampleColumns,
) {
    for line in ReportLines::new(run, columns) {
        sink.write_line(&line);
    }
}

fn fixed(text: &str) -> OutputLine {
    let mut line = OutputLine::new();
    let _ = line.push_str(text);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::{String, Vec};
    use tirebench_core::config::EncoderConfig;
    use tirebench_core::run::{Label, Outcome, RunParameters, RunSnapshot};

    struct Collect(Vec<OutputLine, 32>);

    impl LineSink for Collect {
        fn write_line(&mut self, line: &str) {
            let mut owned = String::new();
            let _ = owned.push_str(line);
            let _ = self.0.push(owned);
        }
    }

    fn run() -> TestRun<4> {
        let mut material = Label::new();
        let _ = material.push_str("foam");

        let mut run = TestRun::new(RunSnapshot {
            params: RunParameters::new(75.0, 1_500),
            material,
            wheel: EncoderConfig::wheel().geometry,
            swivel: EncoderConfig::swivel().geometry,
            motor_voltage: 6.0,
        });

        run.push(TestSample::default());
        run.push(TestSample {
            elapsed_ms: 100,
            wheel_distance_m: 0.5,
            swivel_distance_m: 0.45,
            wheel_speed_m_s: 5.0,
            wheel_accel_m_s2: 50.0,
            swivel_speed_m_s: 4.5,
            swivel_accel_m_s2: 45.0,
        });
        run.finish(Outcome::Completed);
        run
    }

    #[test]
    fn test_full_report() {
        let run = run();
        let mut sink = Collect(Vec::new());
        write_report(&mut sink, &run, SampleColumns::Full);

        let lines: Vec<&str, 32> = sink.0.iter().map(|l| l.as_str()).collect();
        assert_eq!(
            lines.as_slice(),
            &[
                REPORT_START,
                "Material: foam",
                "Target speed (%): 75.00",
                "Acceleration time (s): 1.50",
                "Motor voltage (V): 6.00",
                "Wheel diameter (mm): 74.00",
                "Distance center to wheel (mm): 315.00",
                "Samples: 2",
                "Truncated: no",
                "Outcome: completed",
                "Final slip (%): 10.00",
                HEADER_FULL,
                "0,0.0000,0.0000,0.0000,0.0000,0.0000,0.0000",
                "100,0.5000,0.4500,5.0000,50.0000,4.5000,45.0000",
                REPORT_END,
            ]
        );
    }

    #[test]
    fn test_positions_report() {
        let run = run();
        let lines: Vec<OutputLine, 32> = ReportLines::new(&run, SampleColumns::Positions).collect();

        assert_eq!(lines[11].as_str(), HEADER_POSITIONS);
        assert_eq!(lines[13].as_str(), "100,0.5000,0.4500");
        assert_eq!(lines.len(), 15);
    }

    #[test]
    fn test_empty_and_truncated() {
        let mut run: TestRun<1> = TestRun::new(run().snapshot().clone());
        let mut lines: Vec<OutputLine, 32> = ReportLines::new(&run, SampleColumns::Full).collect();
        assert_eq!(lines[10].as_str(), "Final slip (%): n/a");
        assert_eq!(lines[12].as_str(), REPORT_END);

        run.push(TestSample::default());
        run.push(TestSample::default());
        run.finish(Outcome::Aborted);
        lines = ReportLines::new(&run, SampleColumns::Full).collect();
        assert_eq!(lines[8].as_str(), "Truncated: yes");
        assert_eq!(lines[9].as_str(), "Outcome: aborted");
    }

    #[test]
    fn test_extreme_values_keep_every_column() {
        let sample = TestSample {
            elapsed_ms: u32::MAX,
            wheel_distance_m: f32::MAX,
            swivel_distance_m: -f32::MAX,
            wheel_speed_m_s: f32::INFINITY,
            wheel_accel_m_s2: f32::NEG_INFINITY,
            swivel_speed_m_s: f32::NAN,
            swivel_accel_m_s2: f32::MIN_POSITIVE,
        };
        let row = sample_row(&sample, SampleColumns::Full);
        assert_eq!(
            row.as_str(),
            "4294967295,1000000000.0000,-1000000000.0000,\
1000000000.0000,-1000000000.0000,NaN,0.0000"
        );

        let mut reader = crate::ReportReader::new();
        reader.feed(REPORT_START).unwrap();
        reader.feed(HEADER_FULL).unwrap();
        match reader.feed(row.as_str()) {
            Ok(Some(crate::ReportItem::Sample(read))) => {
                assert_eq!(read.elapsed_ms, u32::MAX);
                assert_eq!(read.wheel_distance_m, ROW_VALUE_LIMIT);
                assert_eq!(read.wheel_accel_m_s2, -ROW_VALUE_LIMIT);
                assert!(read.swivel_speed_m_s.is_nan());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_header_fits_output_line() {
        assert!(HEADER_FULL.len() < crate::line::MAX_OUTPUT_LEN);
        assert!(HEADER_FULL.starts_with(HEADER_POSITIONS));
    }
}
