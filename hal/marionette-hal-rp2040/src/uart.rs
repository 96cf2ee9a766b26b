//! Serial bus over the RP2040 buffered UART
//!
//! The bus runs on UART0 (GP0 TX, GP1 RX). Both halves use the blocking
//! `embedded-io` API of the interrupt-driven ring buffers, so a write only
//! blocks while the TX ring is full.

use embassy_rp::uart::{BufferedUartRx, BufferedUartTx, Error};
use embedded_io::{Read, ReadReady, Write};
use marionette_hal::{BusRx, BusTx};

/// Receive half of the bus
pub struct UartBusRx {
    rx: BufferedUartRx,
}

impl UartBusRx {
    pub fn new(rx: BufferedUartRx) -> Self {
        Self { rx }
    }
}

impl BusRx for UartBusRx {
    type Error = Error;

    fn bytes_available(&mut self) -> Result<bool, Error> {
        self.rx.read_ready()
    }

    fn read_byte(&mut self) -> Result<u8, Error> {
        let mut byte = [0u8; 1];
        loop {
            if self.rx.read(&mut byte)? == 1 {
                return Ok(byte[0]);
            }
        }
    }
}

/// Transmit half of the bus
pub struct UartBusTx {
    tx: BufferedUartTx,
}

impl UartBusTx {
    pub fn new(tx: BufferedUartTx) -> Self {
        Self { tx }
    }
}

impl BusTx for UartBusTx {
    type Error = Error;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Error> {
        self.tx.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Error> {
        Write::flush(&mut self.tx)
    }
}
