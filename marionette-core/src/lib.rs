//! Board-agnostic core logic for the marionette prop firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Animation frame store and asset blob decoding
//! - Dual-channel (eye, mouth) playback scheduler with blink overlay
//! - Dispatcher choreography and randomized pacing
//! - Configuration type definitions
//! - Pixel output trait the scheduler renders into

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod animation;
pub mod choreography;
pub mod config;
pub mod playback;
pub mod traits;
