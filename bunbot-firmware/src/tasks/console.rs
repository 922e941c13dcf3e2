//! Serial console tasks
//!
//! Output goes through the bounded print queue so no task ever waits on
//! the UART; a full queue drops the line. Input is assembled into trimmed
//! lines and handed to the board logic through [`COMMANDS`].

use core::fmt;

use defmt::*;
use esp_hal::uart::{UartRx, UartTx};
use esp_hal::Async;

use bunbot_core::console::{format_line, format_line_crlf, PrintLine, LINE_CAPACITY};
use bunbot_protocol::{GateOutcome, LineBuffer, StartGate};

use crate::channels::{COMMANDS, PRINT_QUEUE};

/// Queue a formatted line for the UART
#[macro_export]
macro_rules! console_print {
    ($($arg:tt)*) => {
        $crate::tasks::console::print_fmt(format_args!($($arg)*))
    };
}

/// Queue a formatted line followed by CRLF
#[macro_export]
macro_rules! console_println {
    ($($arg:tt)*) => {
        $crate::tasks::console::println_fmt(format_args!($($arg)*))
    };
}

/// Format and queue, dropping the line when the queue is full
pub fn print_fmt(args: fmt::Arguments<'_>) {
    queue(format_line(args));
}

/// Like [`print_fmt`], but a long line is cut before its CRLF, not after
pub fn println_fmt(args: fmt::Arguments<'_>) {
    queue(format_line_crlf(args));
}

fn queue(line: PrintLine) {
    if PRINT_QUEUE.try_send(line).is_err() {
        trace!("Print queue full, line dropped");
    }
}

/// Console TX task - drains the print queue to the UART
#[embassy_executor::task]
pub async fn console_tx_task(mut tx: UartTx<'static, Async>) {
    info!("Console TX task started");

    loop {
        let line = PRINT_QUEUE.receive().await;
        let mut bytes = line.as_bytes();
        while !bytes.is_empty() {
            match tx.write_async(bytes).await {
                Ok(n) => bytes = &bytes[n..],
                Err(e) => {
                    warn!("UART write error: {:?}", e);
                    break;
                }
            }
        }
    }
}

/// Console RX task - assembles lines and queues them as commands
#[embassy_executor::task]
pub async fn console_rx_task(mut rx: UartRx<'static, Async>) {
    info!("Console RX task started");

    let mut lines: LineBuffer<LINE_CAPACITY> = LineBuffer::new();
    let mut buf = [0u8; 32];

    loop {
        match rx.read_async(&mut buf).await {
            Ok(n) => {
                for &byte in &buf[..n] {
                    if let Some(line) = lines.feed(byte) {
                        debug!("Console line: {}", line.as_str());
                        if COMMANDS.try_send(line).is_err() {
                            warn!("Command queue full, dropping line");
                        }
                    }
                }
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
                lines.clear();
            }
        }
    }
}

/// Block until the operator types the gate keyword
pub async fn wait_for_start(mut gate: StartGate) {
    console_println!("Type '{}' then press Enter to start:", gate.keyword());

    loop {
        let line: PrintLine = COMMANDS.receive().await;
        match gate.check(&line) {
            GateOutcome::Open => return,
            GateOutcome::Waiting => console_println!("Waiting for '{}'...", gate.keyword()),
        }
    }
}
