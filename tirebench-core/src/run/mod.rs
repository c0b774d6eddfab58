//! Test run orchestration
//!
//! The orchestrator owns the motor and both sensors for the duration of
//! the bench session, sequences each run through the state machine and
//! collects samples into a bounded [`TestRun`].

pub mod orchestrator;
pub mod record;
pub mod summary;

pub use orchestrator::{BenchError, Orchestrator};
pub use record::{
    Label, Outcome, RunParameters, RunSnapshot, TestRun, TestSample, DEFAULT_CAPACITY,
};
pub use summary::RunSummary;
