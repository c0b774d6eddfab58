//! Board-agnostic core logic for the wheel test bench
//!
//! This crate contains all bench logic that does not depend on specific
//! hardware:
//!
//! - Configuration types and the `bench.toml` parser
//! - Motion math (pulse odometry, linear ramps)
//! - Component traits the orchestrator drives
//! - The test state machine
//! - Test orchestration, sample records and slip analysis

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod motion;
pub mod run;
pub mod state;
pub mod traits;
