//! Serial receive task
//!
//! Assembles host bytes into lines, parses commands and forwards them to
//! the bench task. Rejected lines are answered here without involving
//! the bench. A line left unterminated for a second is taken as complete,
//! so a bare `t` from the host still starts a run.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embassy_time::{with_timeout, Duration};
use embedded_io_async::Read;

use tirebench_core::config::RunDefaults;
use tirebench_core::run::Label;
use tirebench_hal::LineSink;
use tirebench_protocol::{diagnostic, Command, LineBuffer};

use crate::channels::{Action, Request, SerialSink, REQUESTS};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Idle time after which a partial line is taken as complete
const IDLE_FLUSH_MS: u64 = 1000;

/// Serial RX task - receives and parses host commands
#[embassy_executor::task]
pub async fn serial_rx_task(mut rx: BufferedUartRx, defaults: RunDefaults) {
    info!("Serial RX task started");

    let mut lines: LineBuffer = LineBuffer::new();
    let mut sink = SerialSink;
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let n = match with_timeout(Duration::from_millis(IDLE_FLUSH_MS), rx.read(&mut buf)).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                warn!("UART read error: {:?}", e);
                continue;
            }
            Err(_) => {
                // Port idle: complete an unterminated command
                if lines.has_pending() {
                    match lines.take_pending() {
                        Ok(Some(line)) => handle_line(&line, &defaults, &mut sink).await,
                        Ok(None) => {}
                        Err(e) => {
                            warn!("Line rejected: {:?}", e);
                            sink.write_line(e.diagnostic());
                        }
                    }
                }
                continue;
            }
        };
        trace!("RX: {} bytes", n);

        for &byte in &buf[..n] {
            match lines.feed(byte) {
                Ok(Some(line)) => handle_line(&line, &defaults, &mut sink).await,
                Ok(None) => {
                    // Need more bytes
                }
                Err(e) => {
                    warn!("Line rejected: {:?}", e);
                    sink.write_line(e.diagnostic());
                }
            }
        }
    }
}

/// Parse one line and queue the resulting request
async fn handle_line(line: &str, defaults: &RunDefaults, sink: &mut SerialSink) {
    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(e) => {
            warn!("Command rejected: {:?}", e);
            sink.write_line(&diagnostic(line, e));
            return;
        }
    };

    debug!("Command: {}", line);
    let request = Request {
        action: action(&command, defaults),
        ack: command.acknowledgement(),
    };

    // Wait for the bench rather than drop a command
    REQUESTS.send(request).await;
}

fn action(command: &Command<'_>, defaults: &RunDefaults) -> Action {
    match *command {
        Command::SetMotorVoltage(volts) => Action::SetMotorVoltage(volts),
        Command::SetWheelDiameter(mm) => Action::SetWheelDiameter(mm),
        Command::SetDistanceCenterToWheel(mm) => Action::SetSwivelRadius(mm),
        Command::SetMaterial(text) => {
            let mut label = Label::new();
            // Length already checked by the parser
            let _ = label.push_str(text);
            Action::SetMaterial(label)
        }
        Command::Abort => Action::Abort,
        Command::RunTest { .. } | Command::Trigger => {
            let params = command
                .run_parameters(defaults)
                .unwrap_or_else(|| (*defaults).into());
            Action::Start(params)
        }
    }
}
