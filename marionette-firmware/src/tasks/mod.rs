//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod blink_timer;
pub mod bus_rx;
pub mod bus_tx;
pub mod choreographer;
pub mod playback;
pub mod watchdog;

pub use blink_timer::blink_timer_task;
pub use bus_rx::bus_rx_task;
pub use bus_tx::bus_tx_task;
pub use choreographer::choreographer_task;
pub use playback::{playback_task, EyeString, MouthString};
pub use watchdog::watchdog_task;
