//! Host commands
//!
//! Commands are single lines: a case-sensitive keyword followed by
//! whitespace-separated arguments.
//!
//! | line | command |
//! |---|---|
//! | `set_motor_voltage <V>` | [`Command::SetMotorVoltage`] |
//! | `set_wheel_diameter <mm>` | [`Command::SetWheelDiameter`] |
//! | `set_distance_center_to_wheel <mm>` | [`Command::SetDistanceCenterToWheel`] |
//! | `set_material <label>` | [`Command::SetMaterial`] |
//! | `run_test [percent] [seconds]`, `run test [percent] [seconds]` | [`Command::RunTest`] |
//! | `t` | [`Command::Trigger`] |
//! | `abort` | [`Command::Abort`] |

use core::fmt::Write;

use tirebench_core::config::{RunDefaults, MAX_LABEL_LEN};
use tirebench_core::run::{BenchError, RunParameters};

use crate::line::OutputLine;

/// Errors that can occur while parsing a command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Keyword not recognised
    Unknown,
    /// Required argument absent
    MissingArgument,
    /// Argument is not a finite number, or there are too many
    InvalidNumber,
    /// Material label longer than the bench stores
    LabelTooLong,
}

/// A parsed host command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command<'a> {
    /// Motor supply voltage (V)
    SetMotorVoltage(f32),
    /// Wheel diameter (mm)
    SetWheelDiameter(f32),
    /// Swivel pivot to wheel distance (mm)
    SetDistanceCenterToWheel(f32),
    /// Material label for the next run
    SetMaterial(&'a str),
    /// Start a run; absent values fall back to the configured defaults
    RunTest {
        /// Target motor percentage
        target_percent: Option<f32>,
        /// Acceleration ramp duration (s)
        acceleration_s: Option<f32>,
    },
    /// Start a run with the configured defaults
    Trigger,
    /// Cancel the current run
    Abort,
}

impl<'a> Command<'a> {
    /// Parse one line
    pub fn parse(line: &'a str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (keyword, args) = match line.split_once(char::is_whitespace) {
            Some((keyword, args)) => (keyword, args.trim()),
            None => (line, ""),
        };

        match keyword {
            "set_motor_voltage" => Ok(Command::SetMotorVoltage(single_number(args)?)),
            "set_wheel_diameter" => Ok(Command::SetWheelDiameter(single_number(args)?)),
            "set_distance_center_to_wheel" => {
                Ok(Command::SetDistanceCenterToWheel(single_number(args)?))
            }
            "set_material" => {
                if args.is_empty() {
                    return Err(CommandError::MissingArgument);
                }
                if args.len() > MAX_LABEL_LEN {
                    return Err(CommandError::LabelTooLong);
                }
                Ok(Command::SetMaterial(args))
            }
            "run_test" => run_arguments(args),
            "run" => match args.split_once(char::is_whitespace) {
                Some(("test", rest)) => run_arguments(rest),
                None if args == "test" => run_arguments(""),
                _ => Err(CommandError::Unknown),
            },
            "t" if args.is_empty() => Ok(Command::Trigger),
            "abort" if args.is_empty() => Ok(Command::Abort),
            _ => Err(CommandError::Unknown),
        }
    }

    /// Run parameters for a run-starting command
    ///
    /// Returns `None` for commands that do not start a run.
    pub fn run_parameters(&self, defaults: &RunDefaults) -> Option<RunParameters> {
        match *self {
            Command::RunTest {
                target_percent,
                acceleration_s,
            } => {
                let target = target_percent.unwrap_or(defaults.target_percent);
                let accel_ms = acceleration_s
                    .map(seconds_to_ms)
                    .unwrap_or(defaults.acceleration_ms);
                Some(RunParameters::new(target, accel_ms))
            }
            Command::Trigger => Some((*defaults).into()),
            _ => None,
        }
    }

    /// Acknowledgement sent when the command is accepted
    pub fn acknowledgement(&self) -> &'static str {
        match self {
            Command::SetMotorVoltage(_) => "Motor voltage set.",
            Command::SetWheelDiameter(_) => "Wheel diameter set.",
            Command::SetDistanceCenterToWheel(_) => "Distance from center to wheel set.",
            Command::SetMaterial(_) => "Material set.",
            Command::RunTest {
                target_percent: None,
                acceleration_s: None,
            }
            | Command::Trigger => "Running test with default parameters...",
            Command::RunTest { .. } => "Running test with custom parameters...",
            Command::Abort => "Aborting test...",
        }
    }
}

/// Diagnostic line for a rejected command
pub fn diagnostic(line: &str, error: CommandError) -> OutputLine {
    let prefix = match error {
        CommandError::Unknown => "Unknown command received: ",
        _ => "Invalid command: ",
    };

    let mut out = OutputLine::new();
    // Overlong echoes are cut short
    let _ = write!(out, "{}{}", prefix, line.trim());
    out
}

/// Diagnostic for a command the bench refused to apply
pub fn rejection(error: BenchError) -> &'static str {
    match error {
        BenchError::RunActive => "Test in progress, command ignored.",
        BenchError::InvalidParameter => "Invalid value, command ignored.",
    }
}

fn number(token: &str) -> Result<f32, CommandError> {
    match token.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CommandError::InvalidNumber),
    }
}

fn single_number(args: &str) -> Result<f32, CommandError> {
    let mut tokens = args.split_whitespace();
    let value = number(tokens.next().ok_or(CommandError::MissingArgument)?)?;
    if tokens.next().is_some() {
        return Err(CommandError::InvalidNumber);
    }
    Ok(value)
}

fn run_arguments(args: &str) -> Result<Command<'static>, CommandError> {
    let mut tokens = args.split_whitespace();
    let target_percent = tokens.next().map(number).transpose()?;
    let acceleration_s = tokens.next().map(number).transpose()?;

    if tokens.next().is_some() {
        return Err(CommandError::InvalidNumber);
    }
    if acceleration_s.is_some_and(|s| s < 0.0) {
        return Err(CommandError::InvalidNumber);
    }

    Ok(Command::RunTest {
        target_percent,
        acceleration_s,
    })
}

fn seconds_to_ms(seconds: f32) -> u32 {
    // Saturating cast; negative values are rejected at parse time
    (seconds * 1000.0 + 0.5) as u32
}
