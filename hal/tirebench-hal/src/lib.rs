//! Tirebench Hardware Abstraction Layer
//!
//! This crate defines the peripheral capabilities the bench logic consumes.
//! Chip-specific crates implement them; the core and driver crates only ever
//! see these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  tirebench-drivers / tirebench-firmware │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tirebench-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!           ┌───────────────────┐
//!           │ tirebench-hal-    │
//!           │      rp2040       │
//!           └───────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`pwm::PwmChannel`] - Motor drive output
//! - [`counter::QuadratureCounter`] - Incremental rotary sensors
//! - [`clock::Monotonic`] - Millisecond wall clock
//! - [`line::LineSink`] - Line-oriented text output
//!
//! Hardware faults are outside the bench's scope, so every capability is
//! infallible.

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod counter;
pub mod line;
pub mod pwm;

pub use clock::Monotonic;
pub use counter::QuadratureCounter;
pub use line::LineSink;
pub use pwm::{PwmChannel, PwmConfig};
