//! Bus receive task
//!
//! Polls the UART, feeds the packet receiver and dispatches commands
//! addressed to this worker.

use defmt::*;
use embassy_time::{Instant, Timer};

use marionette_core::playback::DisplayRequest;
use marionette_hal::{read_available, OutputPin};
use marionette_hal_rp2040::{StatusLed, UartBusRx};
use marionette_protocol::{Address, Packet, PacketError, PacketReceiver, WorkerCommand};

use crate::channels::PLAYBACK_CMD;

/// Bytes drained from the UART per poll
const RX_BUF_SIZE: usize = 32;

/// Idle time between polls
const POLL_INTERVAL_MS: u64 = 1;

/// Bus RX task - receives packets and handles commands for `me`
#[embassy_executor::task]
pub async fn bus_rx_task(
    mut rx: UartBusRx,
    mut led: StatusLed,
    me: Address,
    rx_timeout_ms: Option<u32>,
) {
    info!("Bus RX task started for {}", me.name());

    let mut receiver = PacketReceiver::with_timeout(rx_timeout_ms);
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let now_ms = Instant::now().as_millis() as u32;

        match read_available(&mut rx, &mut buf) {
            Ok(n) => {
                for &byte in &buf[..n] {
                    match receiver.feed(byte, now_ms) {
                        Ok(Some(packet)) => handle_packet(&packet, me, &mut led),
                        Ok(None) => {}
                        Err(e) => report_error(e),
                    }
                }
            }
            Err(e) => {
                // Bytes were lost, so any partial packet is garbage
                warn!("UART read error: {:?}", e);
                receiver.reset();
            }
        }

        if receiver.poll_timeout(now_ms) {
            debug!("Dropped stale partial packet");
        }

        Timer::after_millis(POLL_INTERVAL_MS).await;
    }
}

fn report_error(e: PacketError) {
    match e {
        PacketError::InvalidChecksum { expected, received } => {
            warn!("Checksum mismatch: expected {=u8:#x}, got {=u8:#x}", expected, received)
        }
        other => warn!("Packet error: {:?}", other),
    }
}

/// Handle a validated packet
fn handle_packet(packet: &Packet, me: Address, led: &mut impl OutputPin) {
    match WorkerCommand::for_address(packet, me) {
        Ok(Some(cmd)) => handle_command(cmd, led),
        // Addressed to another node
        Ok(None) => {}
        Err(e) => warn!("Failed to parse command: {:?}", e),
    }
}

fn handle_command(cmd: WorkerCommand, led: &mut impl OutputPin) {
    match cmd {
        WorkerCommand::NoOp => trace!("NOOP received"),
        WorkerCommand::LedOn => led.set_high(),
        WorkerCommand::LedOff => led.set_low(),
        WorkerCommand::DisplayAnim { eye, mouth } => {
            debug!("Display request: eye={} mouth={}", eye, mouth);
            // A newer request supersedes anything still queued
            if PLAYBACK_CMD.try_send(DisplayRequest { eye, mouth }).is_err() {
                warn!("Playback queue full, dropping request");
            }
        }
    }
}
