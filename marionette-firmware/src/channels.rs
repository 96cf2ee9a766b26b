//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! The frame store is the only other shared state and it is read-only once
//! tasks are running.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicU32, Ordering};

use marionette_core::playback::DisplayRequest;
use marionette_protocol::Packet;

/// Channel capacity for outbound packets
const BUS_TX_CHANNEL_SIZE: usize = 10;

/// Channel capacity for display requests; a newer request supersedes an
/// unconsumed older one, so a short queue is enough
const PLAYBACK_CHANNEL_SIZE: usize = 2;

/// Packets waiting for the bus writer (producers block when full)
pub static BUS_TX: Channel<CriticalSectionRawMutex, Packet, BUS_TX_CHANNEL_SIZE> = Channel::new();

/// Display requests for the playback task (producers drop when full)
pub static PLAYBACK_CMD: Channel<CriticalSectionRawMutex, DisplayRequest, PLAYBACK_CHANNEL_SIZE> =
    Channel::new();

/// Blink overlay trigger from the autonomous blink timer
pub static BLINK_TRIGGER: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Liveness from the main loops, consumed by the watchdog task
pub static LIVENESS: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Completed choreography cycles across all workers
pub static HEARTBEAT: AtomicU32 = AtomicU32::new(0);

/// Count one completed cycle, returning the new total
pub fn heartbeat() -> u32 {
    HEARTBEAT.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
}
