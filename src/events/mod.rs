//! Engine event system
//!
//! Systems emit `GameEvent`s to the `EventBus` after every state change;
//! the run logger drains them to disk and the presentation/audio layers
//! read the same stream for cues. Nothing feeds input back through it.

mod bus;
mod logger;
mod types;

pub use bus::{BusEvent, EventBus, update_event_bus_time};
pub use logger::{RunLogConfig, RunLogger, flush_event_bus};
pub use types::{AudioCue, DamageSource, GameEvent};
