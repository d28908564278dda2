//! Progression gate - the exit-unlock predicate over the cleared set
//!
//! The gate is a pure function of the room's requirements and the cleared
//! set, re-evaluated every frame and sticky once open. Nothing else in the
//! engine may flip it.

use bevy::prelude::*;

use crate::events::{EventBus, GameEvent};
use crate::rooms::{ActiveRoom, RoomKind};
use crate::run_state::RunState;

/// Exit gate for the current room. Reset on room entry, never re-locked
/// within a room.
#[derive(Resource, Default, Debug)]
pub struct ExitGate {
    pub unlocked: bool,
}

/// Run condition: the current room's exit is open.
pub fn exit_unlocked(gate: Res<ExitGate>) -> bool {
    gate.unlocked
}

/// The unlock predicate itself. Corridors need every required NPC cleared;
/// boss rooms need the boss. Extra cleared NPCs never hurt.
pub fn gate_satisfied(kind: &RoomKind, run_state: &RunState) -> bool {
    match kind {
        RoomKind::Corridor { required } => required.iter().all(|id| run_state.is_cleared(id)),
        RoomKind::MiniBoss { boss } | RoomKind::FinalBoss { boss } => run_state.is_cleared(boss),
    }
}

/// Re-evaluate the gate against the cleared set.
pub fn evaluate_exit_gate(
    run_state: Res<RunState>,
    room: Res<ActiveRoom>,
    mut gate: ResMut<ExitGate>,
    mut bus: ResMut<EventBus>,
) {
    if gate.unlocked {
        return;
    }
    if gate_satisfied(&room.0.kind, &run_state) {
        gate.unlocked = true;
        info!("Exit gate unlocked: {}", room.0.id);
        bus.emit(GameEvent::GateUnlocked {
            room: room.0.id.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> RoomKind {
        RoomKind::Corridor {
            required: vec!["a".into(), "b".into(), "c".into()],
        }
    }

    #[test]
    fn corridor_gate_needs_every_required_npc() {
        let kind = corridor();
        let mut rs = RunState::new(5);
        assert!(!gate_satisfied(&kind, &rs));

        rs.mark_cleared("a");
        assert!(!gate_satisfied(&kind, &rs));

        rs.mark_cleared("b");
        rs.mark_cleared("c");
        assert!(gate_satisfied(&kind, &rs));
    }

    #[test]
    fn unrelated_clears_do_not_open_the_gate() {
        let kind = corridor();
        let mut rs = RunState::new(5);
        rs.mark_cleared("x");
        rs.mark_cleared("y");
        rs.mark_cleared("z");
        assert!(!gate_satisfied(&kind, &rs));
    }

    #[test]
    fn boss_gate_needs_only_the_boss() {
        let kind = RoomKind::MiniBoss {
            boss: "overseer".into(),
        };
        let mut rs = RunState::new(5);
        assert!(!gate_satisfied(&kind, &rs));
        rs.mark_cleared("overseer");
        assert!(gate_satisfied(&kind, &rs));
    }
}
