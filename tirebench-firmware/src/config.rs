//! Configuration loading
//!
//! The bench configuration is `bench.toml`, embedded at compile time and
//! already validated by build.rs. Parsing at boot uses the core's no_std
//! parser, so a mismatch between the two only costs the defaults.

use defmt::*;

use tirebench_core::config::{parse_config, BenchConfig};

/// Embedded configuration (compiled into firmware)
/// Edit bench.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../bench.toml");

/// Parse the embedded configuration, falling back to defaults
pub fn load() -> BenchConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            // build.rs should have rejected this file
            error!(
                "Failed to parse embedded config at line {}: {:?}",
                e.line, e.kind
            );
            error!("Using default configuration");
            BenchConfig::default()
        }
    }
}
