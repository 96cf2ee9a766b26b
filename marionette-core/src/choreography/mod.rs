//! Dispatcher choreography
//!
//! Each worker gets its own blink cycle with independently seeded pacing,
//! so the prop's faces never blink in lockstep.

pub mod cadence;
pub mod choreographer;

pub use cadence::Cadence;
pub use choreographer::{hold_ms, BlinkScript, Choreographer, Step};
