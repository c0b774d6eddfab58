//! Component traits
//!
//! The orchestrator drives the bench through these traits. Drivers
//! implement them on top of the capability traits in `tirebench-hal`.

pub mod motor;
pub mod sensor;

pub use motor::{MotorActuator, MotorState};
pub use sensor::MotionSensor;
