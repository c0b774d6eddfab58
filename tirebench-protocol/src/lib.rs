//! Bench Serial Protocol
//!
//! This crate defines the line-oriented text protocol spoken over the
//! bench's serial port. The host sends commands; the bench answers with
//! acknowledgements, live run markers and a delimited report per run.
//!
//! # Protocol Overview
//!
//! ```text
//! host  → bench   set_wheel_diameter 74
//! bench → host    Wheel diameter set.
//! host  → bench   run_test 80 1.5
//! bench → host    Running test with custom parameters...
//!                 RUN_CALIBRATION
//!                 READY_FOR_DATA_COLLECTION
//!                 START_TEST
//!                 END_TEST
//!                 ---------------start---------------
//!                 Material: ...
//!                 Timestamp (ms),Wheel Position (m),...
//!                 0,0.0000,0.0000,...
//!                 ---------------end---------------
//! ```
//!
//! The report reader parses the report back on the host side.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod line;
pub mod reader;
pub mod report;

pub use command::{diagnostic, rejection, Command, CommandError};
pub use line::{LineBuffer, LineError, OutputLine, MAX_LINE_LEN, MAX_OUTPUT_LEN};
pub use reader::{ReportError, ReportItem, ReportReader};
pub use report::{write_report, ReportLines};
