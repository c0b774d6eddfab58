//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in tirebench-core on top of the capabilities in tirebench-hal:
//!
//! - Rotary sensors: quadrature counter to distance/speed/acceleration
//! - Drive motor: voltage-scaled PWM with linear ramps

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod encoder;
pub mod motor;

pub use encoder::KinematicEncoder;
pub use motor::MotorRamp;

#[cfg(test)]
mod bench_run;
