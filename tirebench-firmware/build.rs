//! Build script for tirebench-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates bench.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// RP2040 GPIO count
const GPIO_COUNT: i64 = 30;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths and scripts
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate bench.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=bench.toml");

    let config_path = Path::new("bench.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: bench.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds bench.toml as its configuration.            ║\n\
            ║  Please create one in the tirebench-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read bench.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in bench.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();

    validate_sections(&config, &mut errors);
    validate_encoder(&config, "wheel", &mut errors);
    validate_encoder(&config, "swivel", &mut errors);
    validate_motor(&config, &mut errors);
    validate_timing(&config, &mut errors);
    validate_run(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid bench configuration                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=bench.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only sections the firmware parser knows may appear
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    const KNOWN: [&str; 7] = [
        "wheel",
        "swivel",
        "motor",
        "timing",
        "calibration",
        "run",
        "report",
    ];

    let Some(table) = config.as_table() else {
        return;
    };

    for (name, value) in table {
        if !KNOWN.contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

/// Numeric value as f64, accepting integers and floats
fn number(section: &toml::Value, key: &str) -> Option<f64> {
    match section.get(key)? {
        toml::Value::Integer(i) => Some(*i as f64),
        toml::Value::Float(f) => Some(*f),
        _ => None,
    }
}

/// Pin given as an integer or "gpioN"
fn pin(section: &toml::Value, key: &str) -> Option<Result<i64, ()>> {
    Some(match section.get(key)? {
        toml::Value::Integer(i) => Ok(*i),
        toml::Value::String(s) => s
            .strip_prefix("gpio")
            .and_then(|n| n.parse().ok())
            .ok_or(()),
        _ => Err(()),
    })
}

fn check_pin(section: &toml::Value, name: &str, key: &str, errors: &mut Vec<String>) {
    match pin(section, key) {
        Some(Ok(p)) if (0..GPIO_COUNT).contains(&p) => {}
        Some(Ok(p)) => errors.push(format!("[{}] {} gpio{} does not exist", name, key, p)),
        Some(Err(())) => errors.push(format!("[{}] {} must be N or \"gpioN\"", name, key)),
        None => {}
    }
}

fn validate_encoder(config: &toml::Value, name: &str, errors: &mut Vec<String>) {
    let Some(section) = config.get(name) else {
        return;
    };

    if let Some(ppr) = number(section, "ppr") {
        if ppr < 1.0 {
            errors.push(format!("[{}] ppr must be at least 1", name));
        }
    }
    if let Some(ratio) = number(section, "gear_ratio") {
        if ratio <= 0.0 {
            errors.push(format!("[{}] gear_ratio must be positive", name));
        }
    }
    for key in ["radius_mm", "diameter_mm"] {
        if let Some(size) = number(section, key) {
            if size <= 0.0 {
                errors.push(format!("[{}] {} must be positive", name, key));
            }
        }
    }

    check_pin(section, name, "pin_a", errors);
    check_pin(section, name, "pin_b", errors);
}

fn validate_motor(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(section) = config.get("motor") else {
        return;
    };

    check_pin(section, "motor", "pin", errors);

    if let Some(bits) = number(section, "resolution_bits") {
        if !(1.0..=16.0).contains(&bits) {
            errors.push("[motor] resolution_bits must be 1-16".to_string());
        }
    }
    for key in ["voltage", "reference_voltage"] {
        if let Some(volts) = number(section, key) {
            if volts <= 0.0 {
                errors.push(format!("[motor] {} must be positive", key));
            }
        }
    }
}

fn validate_timing(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(section) = config.get("timing") else {
        return;
    };

    for key in ["total_duration_ms", "sample_cadence_ms"] {
        if let Some(ms) = number(section, key) {
            if ms < 1.0 {
                errors.push(format!("[timing] {} must be at least 1", key));
            }
        }
    }
}

fn validate_run(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(section) = config.get("run") else {
        return;
    };

    if let Some(percent) = number(section, "target_percent") {
        if !(0.0..=100.0).contains(&percent) {
            errors.push("[run] target_percent must be 0-100".to_string());
        }
    }
    if let Some(toml::Value::String(policy)) = section.get("abort_policy") {
        if !["discard", "flush"].contains(&policy.as_str()) {
            errors.push("[run] abort_policy must be 'discard' or 'flush'".to_string());
        }
    }
}
