//! Fire-and-forget notification queue
//!
//! Engine systems push a `GameEvent` after every state change; the run
//! logger drains the queue once per frame. An external audio/presentation
//! layer would tap the same queue. Nothing ever feeds input back through it.

use bevy::prelude::*;

use super::types::GameEvent;

/// An event plus the run-relative time it was raised at.
#[derive(Debug, Clone)]
pub struct BusEvent {
    pub time_ms: u32,
    pub event: GameEvent,
}

/// Frame-scoped event queue shared by all engine systems.
#[derive(Resource, Default)]
pub struct EventBus {
    queue: Vec<BusEvent>,
    clock_ms: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the bus clock; called once per frame before any emitter runs.
    pub fn update_time(&mut self, elapsed_secs: f32) {
        self.clock_ms = (elapsed_secs * 1000.0) as u32;
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.queue.push(BusEvent {
            time_ms: self.clock_ms,
            event,
        });
    }

    /// Look at queued events without consuming them.
    pub fn peek(&self) -> &[BusEvent] {
        &self.queue
    }

    /// Take every queued event, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<BusEvent> {
        std::mem::take(&mut self.queue)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.clock_ms
    }
}

/// Keeps the bus clock in step with app time.
pub fn update_event_bus_time(mut bus: ResMut<EventBus>, time: Res<Time>) {
    bus.update_time(time.elapsed_secs());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DamageSource;

    #[test]
    fn events_carry_the_clock_at_emit_time() {
        let mut bus = EventBus::new();
        bus.update_time(1.5);
        bus.emit(GameEvent::DamageTaken {
            source: DamageSource::Contact,
            remaining: 4,
        });
        bus.update_time(2.0);
        bus.emit(GameEvent::DamageTaken {
            source: DamageSource::Quiz,
            remaining: 3,
        });

        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].time_ms, 1500);
        assert_eq!(events[1].time_ms, 2000);
        assert!(bus.is_empty());
    }
}
