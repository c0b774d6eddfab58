//! Serial transmit task
//!
//! Writes queued lines to the host, CRLF-terminated.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::OUTPUT;

/// Serial TX task - drains the output channel
#[embassy_executor::task]
pub async fn serial_tx_task(mut tx: BufferedUartTx) {
    info!("Serial TX task started");

    loop {
        let line = OUTPUT.receive().await;

        if let Err(e) = tx.write_all(line.as_bytes()).await {
            warn!("UART write error: {:?}", e);
            continue;
        }
        if let Err(e) = tx.write_all(b"\r\n").await {
            warn!("UART write error: {:?}", e);
        }
    }
}
