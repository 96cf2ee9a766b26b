//! Marionette Hardware Abstraction Layer
//!
//! Traits for the board collaborators the firmware drives: the two halves of
//! the serial bus and the status LED. Pixel strings are described by
//! `marionette_core::traits::PixelOutput`, since the playback scheduler
//! renders into them directly.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  Application (marionette-firmware)       │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │  marionette-hal (this crate - traits)    │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌────────────────┐
//!             │ marionette-hal-│
//!             │     rp2040     │
//!             └────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output
//! - [`uart::BusTx`], [`uart::BusRx`] - Serial bus halves

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

pub use gpio::OutputPin;
pub use uart::{read_available, BusRx, BusTx};
