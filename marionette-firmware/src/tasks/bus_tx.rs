//! Bus transmit task
//!
//! The only writer on the bus. Packets from every choreographer go through
//! this task, so the bytes of two packets never interleave.

use defmt::*;
use embassy_time::Timer;

use marionette_hal::BusTx;
use marionette_hal_rp2040::UartBusTx;

use crate::channels::BUS_TX;

/// Bus TX task - encodes queued packets and writes them to the UART
#[embassy_executor::task]
pub async fn bus_tx_task(mut tx: UartBusTx, packet_gap_ms: u32) {
    info!("Bus TX task started");

    loop {
        let packet = BUS_TX.receive().await;
        let raw = packet.encode();

        match tx.write_all(&raw).and_then(|()| tx.flush()) {
            Ok(()) => trace!("TX {:?}", packet),
            Err(e) => warn!("Bus write failed: {:?}", e),
        }

        Timer::after_millis(u64::from(packet_gap_ms)).await;
    }
}
