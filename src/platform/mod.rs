//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (raw key names to commands)
//! - Time (frame deltas to fixed-interval game ticks)

pub mod clock;
pub mod input;

pub use clock::{Clock, TickCounts};
pub use input::map_key;
