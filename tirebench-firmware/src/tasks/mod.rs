//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod bench;
pub mod encoder;
pub mod serial_rx;
pub mod serial_tx;

pub use bench::{bench_task, Bench};
pub use encoder::{swivel_encoder_task, wheel_encoder_task};
pub use serial_rx::serial_rx_task;
pub use serial_tx::serial_tx_task;
