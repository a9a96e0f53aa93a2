use serde::{Deserialize, Serialize};

use super::changes::EquipmentChange;

/// Character state as printed by KoLmafia's player snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub day: u32,
    pub turn: u32,
    pub muscle: i32,
    pub myst: i32,
    pub moxie: i32,
    pub meat: i64,
    pub adventures: i32,
    pub fullness: i32,
    pub drunkenness: i32,
    pub spleen: i32,
    pub familiar: Option<String>,
    pub equipment: Option<EquipmentChange>,
}

impl PlayerSnapshot {
    pub fn new(day: u32, turn: u32) -> Self {
        assert!(day >= 1, "day numbers start at 1");
        Self {
            day,
            turn,
            muscle: 0,
            myst: 0,
            moxie: 0,
            meat: 0,
            adventures: 0,
            fullness: 0,
            drunkenness: 0,
            spleen: 0,
            familiar: None,
            equipment: None,
        }
    }
}
