//! Rotary sensor drivers

pub mod kinematic;

pub use kinematic::KinematicEncoder;
