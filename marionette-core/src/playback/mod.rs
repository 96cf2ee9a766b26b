//! Animation playback
//!
//! Turns display requests and blink triggers into one RGB frame per channel
//! per tick.

pub mod channel;
pub mod scheduler;

pub use channel::{ChannelPlayback, RequestOutcome, Transition};
pub use scheduler::{Applied, DisplayRequest, PlaybackStats, Scheduler, TickReport};
