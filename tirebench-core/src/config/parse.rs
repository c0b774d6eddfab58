//! Minimal TOML parser for `bench.toml`
//!
//! Handles only the subset the bench configuration needs and allocates
//! nothing, so it runs on the target as well as on the host.
//!
//! Supported:
//! - `[section]` headers
//! - `key = value` pairs (integer, float, boolean, quoted string)
//! - Comments (`# ...`), full-line and trailing
//!
//! Not supported: arrays, inline tables, multi-line strings, dotted keys.
//!
//! Keys left out keep their [`BenchConfig::default`] value. The parsed
//! configuration is validated before it is returned.

use super::types::{AbortPolicy, BenchConfig, ConfigError, EncoderConfig, SampleColumns};

/// Parse error with the 1-based line it occurred on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    /// Line number (0 for whole-file validation failures)
    pub line: usize,
    /// What went wrong
    pub kind: ParseErrorKind,
}

/// Parse error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Malformed or unknown section header
    InvalidSection,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Key is not known in its section
    UnknownKey,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
    /// The parsed configuration failed validation
    Invalid(ConfigError),
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Wheel,
    Swivel,
    Motor,
    Timing,
    Calibration,
    Run,
    Report,
}

/// Parse TOML text into a validated [`BenchConfig`]
pub fn parse_config(input: &str) -> Result<BenchConfig, ParseError> {
    let mut config = BenchConfig::default();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        let at = |kind| ParseError {
            line: line_no,
            kind,
        };

        if line.starts_with('[') {
            if !line.ends_with(']') {
                return Err(at(ParseErrorKind::InvalidSection));
            }
            section = parse_section_header(&line[1..line.len() - 1])
                .ok_or(at(ParseErrorKind::InvalidSection))?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(at(ParseErrorKind::InvalidLine))?;
        apply_value(&mut config, section, key, value).map_err(at)?;
    }

    config.validate().map_err(|e| ParseError {
        line: 0,
        kind: ParseErrorKind::Invalid(e),
    })?;

    Ok(config)
}

fn parse_section_header(header: &str) -> Option<Section> {
    match header.trim() {
        "wheel" => Some(Section::Wheel),
        "swivel" => Some(Section::Swivel),
        "motor" => Some(Section::Motor),
        "timing" => Some(Section::Timing),
        "calibration" => Some(Section::Calibration),
        "run" => Some(Section::Run),
        "report" => Some(Section::Report),
        _ => None,
    }
}

/// Drop a trailing comment, ignoring `#` inside quotes
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Split "key = value"
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn apply_value(
    config: &mut BenchConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseErrorKind> {
    match section {
        Section::Root => Err(ParseErrorKind::UnknownKey),
        Section::Wheel => apply_encoder(&mut config.wheel, key, value),
        Section::Swivel => apply_encoder(&mut config.swivel, key, value),
        Section::Motor => {
            let motor = &mut config.motor;
            match key {
                "pin" => motor.pin = parse_pin(value)?,
                "channel" => motor.channel = parse_num(value)?,
                "frequency_hz" => motor.pwm_frequency_hz = parse_num(value)?,
                "resolution_bits" => {
                    let bits: u8 = parse_num(value)?;
                    if bits == 0 || bits > 16 {
                        return Err(ParseErrorKind::InvalidValue);
                    }
                    motor.pwm_resolution_bits = bits;
                }
                "voltage" => motor.supply_voltage = parse_float(value)?,
                "reference_voltage" => motor.reference_voltage = parse_float(value)?,
                _ => return Err(ParseErrorKind::UnknownKey),
            }
            Ok(())
        }
        Section::Timing => {
            let timing = &mut config.timing;
            match key {
                "pre_motor_start_delay_ms" => timing.pre_motor_start_delay_ms = parse_num(value)?,
                "total_duration_ms" => timing.total_duration_ms = parse_num(value)?,
                "sample_cadence_ms" => timing.sample_cadence_ms = parse_num(value)?,
                _ => return Err(ParseErrorKind::UnknownKey),
            }
            Ok(())
        }
        Section::Calibration => {
            let calibration = &mut config.calibration;
            match key {
                "spin_percent" => calibration.spin_percent = parse_percent(value)?,
                "spin_ms" => calibration.spin_ms = parse_num(value)?,
                "settle_ms" => calibration.settle_ms = parse_num(value)?,
                _ => return Err(ParseErrorKind::UnknownKey),
            }
            Ok(())
        }
        Section::Run => {
            match key {
                "target_percent" => config.run.target_percent = parse_percent(value)?,
                "acceleration_ms" => config.run.acceleration_ms = parse_num(value)?,
                "acceleration_s" => config.run.acceleration_ms = seconds_to_ms(parse_float(value)?)?,
                "abort_policy" => {
                    config.abort_policy = match parse_string(value)? {
                        "discard" => AbortPolicy::Discard,
                        "flush" => AbortPolicy::Flush,
                        _ => return Err(ParseErrorKind::InvalidValue),
                    }
                }
                _ => return Err(ParseErrorKind::UnknownKey),
            }
            Ok(())
        }
        Section::Report => match key {
            "columns" => {
                config.report.columns = match parse_string(value)? {
                    "full" => SampleColumns::Full,
                    "positions" => SampleColumns::Positions,
                    _ => return Err(ParseErrorKind::InvalidValue),
                };
                Ok(())
            }
            _ => Err(ParseErrorKind::UnknownKey),
        },
    }
}

fn apply_encoder(encoder: &mut EncoderConfig, key: &str, value: &str) -> Result<(), ParseErrorKind> {
    match key {
        "ppr" => encoder.geometry.pulses_per_rev = parse_num(value)?,
        "gear_ratio" => encoder.geometry.gear_ratio = parse_float(value)?,
        "radius_mm" => encoder.geometry.radius_mm = parse_float(value)?,
        "diameter_mm" => encoder.geometry.radius_mm = parse_float(value)? / 2.0,
        "pin_a" => encoder.pin_a = parse_pin(value)?,
        "pin_b" => encoder.pin_b = parse_pin(value)?,
        "clear_on_reset" => encoder.clear_counter_on_reset = parse_bool(value)?,
        _ => return Err(ParseErrorKind::UnknownKey),
    }
    Ok(())
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseErrorKind> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Ok(&value[1..value.len() - 1])
    } else {
        Err(ParseErrorKind::InvalidValue)
    }
}

fn parse_num<T: core::str::FromStr>(value: &str) -> Result<T, ParseErrorKind> {
    value.parse().map_err(|_| ParseErrorKind::InvalidValue)
}

fn parse_float(value: &str) -> Result<f32, ParseErrorKind> {
    let v: f32 = parse_num(value)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ParseErrorKind::InvalidValue)
    }
}

fn parse_percent(value: &str) -> Result<f32, ParseErrorKind> {
    let v = parse_float(value)?;
    if (0.0..=100.0).contains(&v) {
        Ok(v)
    } else {
        Err(ParseErrorKind::InvalidValue)
    }
}

fn parse_bool(value: &str) -> Result<bool, ParseErrorKind> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseErrorKind::InvalidValue),
    }
}

fn seconds_to_ms(seconds: f32) -> Result<u32, ParseErrorKind> {
    if seconds < 0.0 || seconds > (u32::MAX / 1000) as f32 {
        return Err(ParseErrorKind::InvalidValue);
    }
    Ok((seconds * 1000.0 + 0.5) as u32)
}

/// Parse a pin given as `18` or `"gpio18"`
fn parse_pin(value: &str) -> Result<u8, ParseErrorKind> {
    if let Ok(pin) = value.parse::<u8>() {
        return Ok(pin);
    }

    let s = parse_string(value).map_err(|_| ParseErrorKind::InvalidPin)?;
    s.strip_prefix("gpio")
        .and_then(|n| n.parse().ok())
        .ok_or(ParseErrorKind::InvalidPin)
}
