//! Static game tables: substat names, equipment MP regeneration, skill costs
//! and the item/skill/area names the parser treats specially.
//!
//! All tables are immutable statics and safe to share across parallel parses.

use phf::{phf_map, phf_set};

use crate::model::EquipmentChange;

include!(concat!(env!("OUT_DIR"), "/mp_regen_equipment.rs"));
include!(concat!(env!("OUT_DIR"), "/skill_mp_costs.rs"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Muscle,
    Myst,
    Moxie,
}

/// Substat names as printed after "You gain N".
pub static SUBSTATS: phf::Map<&'static str, Attribute> = phf_map! {
    "Beefiness" => Attribute::Muscle,
    "Fortitude" => Attribute::Muscle,
    "Muscleboundness" => Attribute::Muscle,
    "Strengthliness" => Attribute::Muscle,
    "Strongness" => Attribute::Muscle,
    "Enchantedness" => Attribute::Myst,
    "Magicalness" => Attribute::Myst,
    "Mysteriousness" => Attribute::Myst,
    "Wizardliness" => Attribute::Myst,
    "Cheek" => Attribute::Moxie,
    "Chutzpah" => Attribute::Moxie,
    "Roguishness" => Attribute::Moxie,
    "Sarcasm" => Attribute::Moxie,
    "Smarm" => Attribute::Moxie,
};

/// Familiars that grant free runaways.
pub static RUNAWAY_FAMILIARS: phf::Set<&'static str> = phf_set! {
    "Pair of Stomping Boots",
    "Frumious Bandersnatch",
};

/// Equipment that grants free runaways.
pub static RUNAWAY_EQUIPMENT: phf::Set<&'static str> = phf_set! {
    "navel ring of navel gazing",
    "Greatest American Pants",
    "peppermint parasol",
};

/// Combat skills and items that banish the current monster.
pub static BANISHERS: phf::Set<&'static str> = phf_set! {
    "BATTER UP",
    "SNOKEBOMB",
    "THROW LATTE ON OPPONENT",
    "REFLEX HAMMER",
    "KGB TRANQUILIZER DART",
    "BREATHE OUT",
    "FEEL HATRED",
    "Louder Than Bomb",
    "tennis ball",
    "crystal skull",
    "divine champagne popper",
    "harold's bell",
    "Spooky Music Box Mechanism",
    "smoke grenade",
};

/// Yellow-ray style skills and items that disintegrate the monster.
pub static DISINTEGRATORS: phf::Set<&'static str> = phf_set! {
    "DISINTEGRATE",
    "OPEN A BIG YELLOW PRESENT",
    "yellow rocket",
    "pumpkin bomb",
};

/// Combat skills and items that start hunting the current monster.
pub static HUNTERS: phf::Set<&'static str> = phf_set! {
    "TRANSCENDENT OLFACTION",
    "GALLAPAGOSIAN MATING CALL",
    "OFFER LATTE TO OPPONENT",
    "GET A GOOD WHIFF OF THIS GUY",
    "odor extractor",
};

/// Effects that raise the maximum MP pool.
pub static MP_POOL_BUFFS: phf::Set<&'static str> = phf_set! {
    "Mystically Oiled",
    "Rosewater Mark",
    "Carol of the Hells",
    "Sauce Monocle",
    "Wizard Squint",
};

/// Areas whose adventures are logged without a `[N]` marker, keyed by the
/// name on the `Encounter:` line, with the turns one visit costs.
pub static NONSTANDARD_ENCOUNTER_AREAS: phf::Map<&'static str, u32> = phf_map! {
    "The Shore, Inc. Travel Agency" => 3,
    "Vacation at the Shore" => 3,
    "Summoning Chamber" => 1,
    "The Naughty Sorceress' Chamber" => 1,
};

/// Skills whose cast is logged like an adventure and starts an encounter.
pub static ENCOUNTER_PROXY_SKILLS: phf::Set<&'static str> = phf_set! {
    "Rain Man",
    "Evoke Eldritch Horror",
};

/// MP cost of one cast of `skill`, or 0 when unknown.
pub fn skill_mp_cost(skill: &str) -> u32 {
    SKILL_MP_COSTS
        .get(skill.to_lowercase().as_str())
        .copied()
        .unwrap_or(0)
}

/// MP regenerated per turn by one piece of equipment.
pub fn item_mp_regen(item: &str) -> i32 {
    MP_REGEN_EQUIPMENT
        .get(item.to_lowercase().as_str())
        .copied()
        .unwrap_or(0)
}

/// MP regenerated per turn by everything worn in `equipment`.
pub fn equipment_mp_regen(equipment: &EquipmentChange) -> i32 {
    equipment.equipped().map(item_mp_regen).sum()
}

pub fn is_runaway_source(familiar: &str, equipment: &EquipmentChange) -> bool {
    RUNAWAY_FAMILIARS.contains(familiar)
        || RUNAWAY_EQUIPMENT
            .iter()
            .any(|item| equipment.is_equipped(item))
}

/// Area lists for quest turn counts.
pub mod quests {
    pub const MOSQUITO: &[&str] = &["The Spooky Forest"];
    pub const MOSQUITO_ITEM: &str = "mosquito larva";
    pub const TAVERN: &[&str] = &["The Typical Tavern Cellar", "The Tavern Cellar"];
    pub const BAT: &[&str] = &[
        "The Bat Hole Entryway",
        "Guano Junction",
        "Batrat and Ratbat Burrow",
        "Beanbat Chamber",
        "The Boss Bat's Lair",
    ];
    pub const KNOB: &[&str] = &[
        "Cobb's Knob Harem",
        "Cobb's Knob Kitchens",
        "Cobb's Knob Barracks",
        "Cobb's Knob Treasury",
        "Throne Room",
    ];
    pub const FRIARS: &[&str] = &[
        "The Dark Neck of the Woods",
        "The Dark Heart of the Woods",
        "The Dark Elbow of the Woods",
    ];
    pub const CYRPT: &[&str] = &[
        "The Defiled Nook",
        "The Defiled Cranny",
        "The Defiled Alcove",
        "The Defiled Niche",
        "Haert of the Cyrpt",
    ];
    pub const TRAPZOR: &[&str] = &[
        "Itznotyerzitz Mine",
        "The Goatlet",
        "Lair of the Ninja Snowmen",
        "The eXtreme Slope",
        "Mist-Shrouded Peak",
    ];
    pub const CHASM: &[&str] = &[
        "The Smut Orc Logging Camp",
        "A-Boo Peak",
        "Twin Peak",
        "Oil Peak",
    ];
    pub const AIRSHIP: &[&str] = &["The Penultimate Fantasy Airship"];
    pub const AIRSHIP_ITEM: &str = "S.O.C.K.";
    pub const CASTLE: &[&str] = &[
        "The Castle in the Clouds in the Sky (Basement)",
        "The Castle in the Clouds in the Sky (Ground Floor)",
        "The Castle in the Clouds in the Sky (Top Floor)",
        "The Hole in the Sky",
    ];
    pub const PIRATE: &[&str] = &[
        "The Obligatory Pirate's Cove",
        "Barrrney's Barrr",
        "The F'c'le",
        "The Poop Deck",
        "Belowdecks",
    ];
    pub const BLACK_FOREST: &[&str] = &["The Black Forest"];
    pub const DESERT: &[&str] = &["The Arid, Extra-Dry Desert", "The Oasis"];
    pub const SPOOKYRAVEN: &[&str] = &[
        "The Haunted Kitchen",
        "The Haunted Billiards Room",
        "The Haunted Library",
        "The Haunted Bedroom",
        "The Haunted Ballroom",
        "The Haunted Bathroom",
        "The Haunted Gallery",
        "The Haunted Wine Cellar",
        "The Haunted Laundry Room",
        "The Haunted Boiler Room",
        "Summoning Chamber",
    ];
    pub const PALINDOME: &[&str] = &["Inside the Palindome"];
    pub const PYRAMID: &[&str] = &[
        "The Upper Chamber",
        "The Middle Chamber",
        "The Lower Chambers",
        "The Control Room",
    ];
    pub const HIDDEN_CITY: &[&str] = &[
        "The Hidden Park",
        "The Hidden Apartment Building",
        "The Hidden Office Building",
        "The Hidden Hospital",
        "The Hidden Bowling Alley",
        "A Massive Ziggurat",
    ];
    pub const WAR: &[&str] = &[
        "The Battlefield (Frat Uniform)",
        "The Battlefield (Hippy Uniform)",
    ];
    pub const DAILY_DUNGEON: &[&str] = &["The Daily Dungeon"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EquipmentSlot;

    #[test]
    fn test_generated_tables_are_case_insensitive() {
        assert_eq!(skill_mp_cost("SAUCESTORM"), 12);
        assert_eq!(skill_mp_cost("Saucestorm"), 12);
        assert_eq!(skill_mp_cost("made up skill"), 0);
        assert_eq!(item_mp_regen("Plexiglass Pendant"), 4);
    }

    #[test]
    fn test_equipment_regen_sums_slots() {
        let equipment = EquipmentChange::none(0)
            .with_slot(EquipmentSlot::Hat, "Jewel-eyed wizard hat", 1)
            .with_slot(EquipmentSlot::Acc1, "plexiglass pendant", 1);
        assert_eq!(equipment_mp_regen(&equipment), 11);
    }

    #[test]
    fn test_runaway_sources() {
        let none = EquipmentChange::none(0);
        assert!(is_runaway_source("Frumious Bandersnatch", &none));
        assert!(!is_runaway_source("Mosquito", &none));

        let pants = none.with_slot(EquipmentSlot::Pants, "Greatest American Pants", 3);
        assert!(is_runaway_source("Mosquito", &pants));
    }
}
