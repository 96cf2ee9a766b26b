//! Marionette Bus Protocol
//!
//! This crate defines the half-duplex serial protocol between the dispatcher
//! (choreography controller) and up to four workers (LED eye/mouth drivers).
//! One writer, many passive listeners.
//!
//! # Packet Format
//!
//! Every message is a fixed six byte packet:
//! ```text
//! ┌────────┬─────────┬─────────┬────────┬──────────┬──────────┐
//! │ HEADER │ ADDRESS │ COMMAND │ EYE ID │ MOUTH ID │ CHECKSUM │
//! │ 0xAA   │ 1B      │ 1B      │ 1B     │ 1B       │ 1B       │
//! └────────┴─────────┴─────────┴────────┴──────────┴──────────┘
//! ```
//!
//! The checksum is the wrapping 8-bit sum of the four payload bytes. Receivers
//! resynchronise on the header byte after any corruption.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod messages;
pub mod packet;
pub mod receiver;

pub use messages::WorkerCommand;
pub use packet::{
    checksum, decode, encode, Address, Command, Packet, PacketError, RawPacket, HEADER,
    PACKET_LEN,
};
pub use receiver::{PacketReceiver, RxStats, DEFAULT_RX_TIMEOUT_MS};
