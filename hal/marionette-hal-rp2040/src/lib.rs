//! RP2040-specific HAL for the marionette prop firmware
//!
//! Implements the `marionette-hal` traits and the core `PixelOutput` trait
//! on top of embassy-rp:
//!
//! - Buffered UART halves for the serial bus
//! - Status LED output
//! - PIO-driven WS2812 pixel strings for the eye and mouth matrices

#![no_std]

pub mod gpio;
pub mod uart;
pub mod ws2812;

pub use gpio::StatusLed;
pub use uart::{UartBusRx, UartBusTx};
pub use ws2812::PixelString;
