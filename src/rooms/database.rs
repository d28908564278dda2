//! Room database - definitions and loading
//!
//! Each room is a tagged variant carrying exactly the parameters its
//! predicate and spawner need, so a boss room without a boss id is
//! unrepresentable.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::encounter::EncounterMode;

/// Room kind with its unlock predicate parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomKind {
    /// Exit unlocks when every named NPC has been cleared
    Corridor { required: Vec<String> },
    /// Single-NPC predicate with an entrance sequence
    MiniBoss { boss: String },
    /// Terminal room; clearing the boss ends the run as a win
    FinalBoss { boss: String },
}

impl RoomKind {
    /// NPC ids stationed in this room.
    pub fn npc_ids(&self) -> Vec<&str> {
        match self {
            RoomKind::Corridor { required } => required.iter().map(String::as_str).collect(),
            RoomKind::MiniBoss { boss } | RoomKind::FinalBoss { boss } => vec![boss.as_str()],
        }
    }

    pub fn is_boss(&self) -> bool {
        matches!(self, RoomKind::MiniBoss { .. } | RoomKind::FinalBoss { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RoomKind::FinalBoss { .. })
    }
}

/// Single room definition: unlock predicate plus spawner/combat parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomDef {
    pub id: String,
    pub label: String,
    pub kind: RoomKind,
    pub encounter_mode: EncounterMode,
    /// Bonus score awarded when this room's boss falls (0 for corridors)
    #[serde(default)]
    pub clear_bonus: u32,
    /// Non-interactive entrance hold in seconds (boss rooms)
    #[serde(default)]
    pub entrance_secs: f32,
    pub enemy_count: usize,
    /// Respawn trickle cap; respawning stops at this many live obstacles
    pub enemy_cap: usize,
    /// Seconds between respawn waves (0 = no trickle)
    #[serde(default)]
    pub respawn_secs: f32,
    #[serde(default)]
    pub respawn_batch: usize,
    pub enemy_hp: i32,
    /// Score per projectile hit on an obstacle
    pub hit_score: u32,
    pub patrol_speed: f32,
    pub chase_speed: f32,
    pub chase_radius: f32,
    /// Obstacle stun after damaging the player; shorter in harder rooms
    pub contact_stun_secs: f32,
    /// Obstacle stun after taking a projectile hit
    pub hit_stun_secs: f32,
    pub projectile_speed: f32,
    /// Independent heal-drop chance per defeated obstacle
    #[serde(default)]
    pub drop_chance: f32,
}

/// Ordered sequence of rooms for one run.
#[derive(Resource, Clone, Debug)]
pub struct RoomDatabase {
    pub rooms: Vec<RoomDef>,
}

impl Default for RoomDatabase {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Deserialize)]
struct RoomsDocument {
    rooms: Vec<RoomDef>,
}

impl RoomDatabase {
    /// Load rooms from file, falling back to the standard sequence on error.
    pub fn load_from_file(path: &str) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(db) => {
                    info!("Loaded {} rooms from {}", db.rooms.len(), path);
                    db
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}, using standard rooms", path, e);
                    Self::standard()
                }
            },
            Err(e) => {
                warn!("Failed to load {}: {}, using standard rooms", path, e);
                Self::standard()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let doc: RoomsDocument = serde_json::from_str(content)?;
        Ok(Self { rooms: doc.rooms })
    }

    /// Built-in run: tutorial corridor, mini-boss, final boss.
    pub fn standard() -> Self {
        Self {
            rooms: vec![
                RoomDef {
                    id: "corridor".into(),
                    label: "The Reading Hall".into(),
                    kind: RoomKind::Corridor {
                        required: vec![
                            "archivist".into(),
                            "quartermaster".into(),
                            "warden".into(),
                        ],
                    },
                    encounter_mode: EncounterMode::Normal,
                    clear_bonus: 0,
                    entrance_secs: 0.0,
                    enemy_count: 6,
                    enemy_cap: 10,
                    respawn_secs: 12.0,
                    respawn_batch: 2,
                    enemy_hp: 3,
                    hit_score: 10,
                    patrol_speed: 80.0,
                    chase_speed: 65.0,
                    chase_radius: 280.0,
                    contact_stun_secs: 2.5,
                    hit_stun_secs: 1.5,
                    projectile_speed: 600.0,
                    drop_chance: 0.0,
                },
                RoomDef {
                    id: "miniboss".into(),
                    label: "The Overseer's Chamber".into(),
                    kind: RoomKind::MiniBoss {
                        boss: "overseer".into(),
                    },
                    encounter_mode: EncounterMode::Elevated,
                    clear_bonus: 500,
                    entrance_secs: 3.5,
                    enemy_count: 5,
                    enemy_cap: 5,
                    respawn_secs: 0.0,
                    respawn_batch: 0,
                    enemy_hp: 4,
                    hit_score: 15,
                    patrol_speed: 100.0,
                    chase_speed: 80.0,
                    chase_radius: 320.0,
                    contact_stun_secs: 2.0,
                    hit_stun_secs: 1.2,
                    projectile_speed: 650.0,
                    drop_chance: 0.30,
                },
                RoomDef {
                    id: "finalboss".into(),
                    label: "The Chancellor's Throne".into(),
                    kind: RoomKind::FinalBoss {
                        boss: "chancellor".into(),
                    },
                    encounter_mode: EncounterMode::Climactic,
                    clear_bonus: 1000,
                    entrance_secs: 4.0,
                    enemy_count: 6,
                    enemy_cap: 6,
                    respawn_secs: 0.0,
                    respawn_batch: 0,
                    enemy_hp: 5,
                    hit_score: 20,
                    patrol_speed: 110.0,
                    chase_speed: 95.0,
                    chase_radius: 340.0,
                    contact_stun_secs: 1.5,
                    hit_stun_secs: 1.0,
                    projectile_speed: 650.0,
                    drop_chance: 0.0,
                },
            ],
        }
    }

    pub fn get(&self, index: usize) -> Option<&RoomDef> {
        self.rooms.get(index)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_sequence_is_ordered_and_consistent() {
        let db = RoomDatabase::standard();
        assert_eq!(db.len(), 3);
        assert!(matches!(db.rooms[0].kind, RoomKind::Corridor { .. }));
        assert!(matches!(db.rooms[1].kind, RoomKind::MiniBoss { .. }));
        assert!(db.rooms[2].kind.is_terminal());
        // Contact stun windows shrink as rooms get harder
        assert!(db.rooms[0].contact_stun_secs > db.rooms[1].contact_stun_secs);
        assert!(db.rooms[1].contact_stun_secs > db.rooms[2].contact_stun_secs);
    }

    #[test]
    fn parses_tagged_room_kinds() {
        let json = r#"{
            "rooms": [{
                "id": "x", "label": "X",
                "kind": { "type": "mini_boss", "boss": "npc" },
                "encounter_mode": "elevated",
                "enemy_count": 2, "enemy_cap": 2, "enemy_hp": 3,
                "hit_score": 10, "patrol_speed": 80.0, "chase_speed": 60.0,
                "chase_radius": 300.0, "contact_stun_secs": 2.0,
                "hit_stun_secs": 1.0, "projectile_speed": 600.0
            }]
        }"#;
        let db = RoomDatabase::parse(json).unwrap();
        assert_eq!(db.rooms[0].kind.npc_ids(), vec!["npc"]);
        assert!(db.rooms[0].kind.is_boss());
        assert_eq!(db.rooms[0].drop_chance, 0.0);
    }

    #[test]
    fn garbage_rooms_file_is_an_error() {
        assert!(RoomDatabase::parse("nope").is_err());
    }
}
