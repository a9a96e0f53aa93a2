//! Familiar, equipment and day changes, plus the small per-turn records
//! (pulls, hunted/lost combats, learned skills) that hang off a session.

use serde::{Deserialize, Serialize};

pub const NO_FAMILIAR: &str = "none";
pub const NO_EQUIPMENT: &str = "none";

/// The familiar in use from `turn` on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FamiliarChange {
    pub name: String,
    pub turn: u32,
}

impl FamiliarChange {
    pub fn new(name: impl Into<String>, turn: u32) -> Self {
        Self {
            name: name.into(),
            turn,
        }
    }

    /// The "no familiar" sentinel every session starts with.
    pub fn none() -> Self {
        Self::new(NO_FAMILIAR, 0)
    }

    pub fn is_none(&self) -> bool {
        self.name == NO_FAMILIAR
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquipmentSlot {
    Hat,
    Weapon,
    Offhand,
    Shirt,
    Pants,
    Acc1,
    Acc2,
    Acc3,
    FamiliarEquipment,
}

impl EquipmentSlot {
    pub const ALL: [EquipmentSlot; 9] = [
        Self::Hat,
        Self::Weapon,
        Self::Offhand,
        Self::Shirt,
        Self::Pants,
        Self::Acc1,
        Self::Acc2,
        Self::Acc3,
        Self::FamiliarEquipment,
    ];

    /// Slot names as KoLmafia's `equip` command and snapshots spell them.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "hat" => Some(Self::Hat),
            "weapon" => Some(Self::Weapon),
            "off-hand" | "offhand" => Some(Self::Offhand),
            "shirt" => Some(Self::Shirt),
            "pants" => Some(Self::Pants),
            "acc1" => Some(Self::Acc1),
            "acc2" => Some(Self::Acc2),
            "acc3" => Some(Self::Acc3),
            "familiar" | "famequip" => Some(Self::FamiliarEquipment),
            _ => None,
        }
    }

    /// Element/key name used by the XML log format.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Hat => "hat",
            Self::Weapon => "weapon",
            Self::Offhand => "offhand",
            Self::Shirt => "shirt",
            Self::Pants => "pants",
            Self::Acc1 => "acc1",
            Self::Acc2 => "acc2",
            Self::Acc3 => "acc3",
            Self::FamiliarEquipment => "famequip",
        }
    }
}

/// Full equipment loadout in use from `turn` on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EquipmentChange {
    pub turn: u32,
    pub hat: String,
    pub weapon: String,
    pub offhand: String,
    pub shirt: String,
    pub pants: String,
    pub acc1: String,
    pub acc2: String,
    pub acc3: String,
    pub famequip: String,
}

impl EquipmentChange {
    /// Everything empty at `turn`.
    pub fn none(turn: u32) -> Self {
        Self {
            turn,
            hat: NO_EQUIPMENT.to_string(),
            weapon: NO_EQUIPMENT.to_string(),
            offhand: NO_EQUIPMENT.to_string(),
            shirt: NO_EQUIPMENT.to_string(),
            pants: NO_EQUIPMENT.to_string(),
            acc1: NO_EQUIPMENT.to_string(),
            acc2: NO_EQUIPMENT.to_string(),
            acc3: NO_EQUIPMENT.to_string(),
            famequip: NO_EQUIPMENT.to_string(),
        }
    }

    pub fn slot(&self, slot: EquipmentSlot) -> &str {
        match slot {
            EquipmentSlot::Hat => &self.hat,
            EquipmentSlot::Weapon => &self.weapon,
            EquipmentSlot::Offhand => &self.offhand,
            EquipmentSlot::Shirt => &self.shirt,
            EquipmentSlot::Pants => &self.pants,
            EquipmentSlot::Acc1 => &self.acc1,
            EquipmentSlot::Acc2 => &self.acc2,
            EquipmentSlot::Acc3 => &self.acc3,
            EquipmentSlot::FamiliarEquipment => &self.famequip,
        }
    }

    pub fn set_slot(&mut self, slot: EquipmentSlot, item: impl Into<String>) {
        let item = item.into();
        let item = if item.is_empty() {
            NO_EQUIPMENT.to_string()
        } else {
            item
        };
        match slot {
            EquipmentSlot::Hat => self.hat = item,
            EquipmentSlot::Weapon => self.weapon = item,
            EquipmentSlot::Offhand => self.offhand = item,
            EquipmentSlot::Shirt => self.shirt = item,
            EquipmentSlot::Pants => self.pants = item,
            EquipmentSlot::Acc1 => self.acc1 = item,
            EquipmentSlot::Acc2 => self.acc2 = item,
            EquipmentSlot::Acc3 => self.acc3 = item,
            EquipmentSlot::FamiliarEquipment => self.famequip = item,
        }
    }

    /// Copy of this loadout with one slot changed, effective at `turn`.
    pub fn with_slot(&self, slot: EquipmentSlot, item: impl Into<String>, turn: u32) -> Self {
        let mut changed = self.clone();
        changed.set_slot(slot, item);
        changed.turn = turn;
        changed
    }

    /// Equipped item names, skipping empty slots.
    pub fn equipped(&self) -> impl Iterator<Item = &str> {
        EquipmentSlot::ALL
            .into_iter()
            .map(|slot| self.slot(slot))
            .filter(|item| *item != NO_EQUIPMENT)
    }

    pub fn is_equipped(&self, item: &str) -> bool {
        self.equipped().any(|equipped| equipped.eq_ignore_ascii_case(item))
    }

    /// Same loadout, regardless of when it was put on.
    pub fn equals_ignoring_turn(&self, other: &EquipmentChange) -> bool {
        EquipmentSlot::ALL
            .into_iter()
            .all(|slot| self.slot(slot) == other.slot(slot))
    }
}

/// Start of in-game day `day`, logged after turn `turn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayChange {
    pub day: u32,
    pub turn: u32,
}

impl DayChange {
    /// # Panics
    /// If `day` is zero.
    pub fn new(day: u32, turn: u32) -> Self {
        assert!(day >= 1, "day numbers start at 1");
        Self { day, turn }
    }
}

/// Free-text comments shown above and below a day in reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayComments {
    pub header: String,
    pub footer: String,
}

impl DayComments {
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.footer.is_empty()
    }
}

/// An item pulled out of Hagnk's storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pull {
    pub name: String,
    pub amount: u32,
    pub turn: u32,
    pub day: u32,
}

impl Pull {
    pub fn new(name: impl Into<String>, amount: u32, turn: u32, day: u32) -> Self {
        assert!(amount >= 1, "pull amount must be at least 1");
        assert!(day >= 1, "day numbers start at 1");
        Self {
            name: name.into(),
            amount,
            turn,
            day,
        }
    }
}

/// A monster name tied to a turn, used for hunted and lost combats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatRecord {
    pub name: String,
    pub turn: u32,
}

impl CombatRecord {
    pub fn new(name: impl Into<String>, turn: u32) -> Self {
        Self {
            name: name.into(),
            turn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedSkill {
    pub name: String,
    pub turn: u32,
    pub day: u32,
}

/// A banisher used against the turn's monster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banish {
    pub banisher: String,
    pub monster: String,
    pub turn: u32,
}

/// A DNA hybridization of the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hybridization {
    pub phylum: String,
    pub effect: Option<String>,
    pub turn: u32,
    pub day: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equals_ignoring_turn() {
        let base = EquipmentChange::none(0).with_slot(EquipmentSlot::Hat, "helmet turtle", 3);
        let later = base.with_slot(EquipmentSlot::Hat, "helmet turtle", 40);

        assert!(base.equals_ignoring_turn(&later));
        assert_ne!(base, later);

        let different = base.with_slot(EquipmentSlot::Acc1, "stainless steel solitaire", 40);
        assert!(!base.equals_ignoring_turn(&different));
    }

    #[test]
    fn test_slot_names() {
        assert_eq!(EquipmentSlot::from_name("off-hand"), Some(EquipmentSlot::Offhand));
        assert_eq!(EquipmentSlot::from_name("ACC2"), Some(EquipmentSlot::Acc2));
        assert_eq!(
            EquipmentSlot::from_name("familiar"),
            Some(EquipmentSlot::FamiliarEquipment)
        );
        assert_eq!(EquipmentSlot::from_name("back"), None);
    }

    #[test]
    fn test_equipped_skips_empty_slots() {
        let gear = EquipmentChange::none(0)
            .with_slot(EquipmentSlot::Weapon, "seal-clubbing club", 1)
            .with_slot(EquipmentSlot::Pants, "", 1);

        let equipped: Vec<&str> = gear.equipped().collect();
        assert_eq!(equipped, vec!["seal-clubbing club"]);
        assert!(gear.is_equipped("Seal-Clubbing Club"));
    }

    #[test]
    #[should_panic]
    fn test_day_zero_is_rejected() {
        DayChange::new(0, 5);
    }
}
