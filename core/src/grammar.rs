//! Line shapes of the KoLmafia session log.
//!
//! Shared by the block reader (to classify and terminate blocks) and the
//! parsers (to pull fields out of lines they accepted).

use crate::game_data::{ENCOUNTER_PROXY_SKILLS, NONSTANDARD_ENCOUNTER_AREAS};

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        pub static $name: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
            regex::Regex::new($re).expect(concat!("invalid pattern ", stringify!($name)))
        });
    };
}
pub(crate) use pattern;

pattern!(ADVENTURE, r"^\[(\d+)\] (.+)$");
pattern!(ENCOUNTER, r"^Encounter: (.+)$");
pattern!(COMBAT_ROUND, r"^Round \d+: ");
pattern!(COMBAT_WON, r"^Round \d+: (.+?) wins the fight!$");
pattern!(COMBAT_SKILL, r"^Round \d+: .+? casts (.+?)!$");
pattern!(COMBAT_ITEM, r"^Round \d+: .+? uses the (.+?)(?: and (?:uses the )?(.+?))?!$");
pattern!(COMBAT_RUNAWAY, r"^Round \d+: .+? runs away");
pattern!(ITEM_NAMED, r"^You acquire an item: (.+)$");
pattern!(ITEM_COUNTED, r"^You acquire (.+?) \((\d+)\)$");
pattern!(EFFECT, r"^You acquire an effect: (.+?) \((?:duration: )?(\d+)(?: Adventures?)?\)$");
pattern!(MEAT_GAINED, r"^You gain ([\d,]+) Meat");
pattern!(MEAT_LOST, r"^You lose ([\d,]+) Meat");
pattern!(MEAT_SPENT, r"^You spent ([\d,]+) Meat");
pattern!(SUBSTAT, r"^You (gain|lose) ([\d,]+) (\w+)$");
pattern!(MP_GAINED, r"^You gain (\S+) (?:Mana|Mojo|Muscularity) Points?$");
pattern!(ADVENTURES_GAINED, r"^You gain ([\d,]+) Adventures?$");
pattern!(SKILL_CAST, r"^cast (\d+) (.+)$");
pattern!(FAMILIAR, r"^familiar (.+?)(?: \(\d+ lbs?\.?\))?$");
pattern!(EQUIP, r"^equip (\S+) (.+)$");
pattern!(UNEQUIP, r"^unequip (\S+)$");
pattern!(PULL, r"^pull: (\d+) (.+)$");
pattern!(LEARNED_SKILL, r"^You learned a new skill: (.+)$");
pattern!(NOTE, r"^Note: (.*)$");
pattern!(DAY_CHANGE, r"^===Day (\d+)===$");
pattern!(CONSUMABLE, r"^(use|eat|eatsilent|drink|overdrink|chew|buy) (\d+) (.+)$");
pattern!(ASCENSION, r"^Ascension #(\d+):?$");
pattern!(HYBRID, r"^Hybridizing yourself with (.+?) DNA");
pattern!(SERVICE, r"^Took choice 1089/(\d+): (.+)$");
pattern!(SERVICE_NAME, r"^Community Service: (.+)$");
pattern!(TURNS_USED, r"^Turns used: (\d+)$");
pattern!(TOOK_CHOICE, r"^Took choice (\d+)/(\d+)");
pattern!(SNAPSHOT_ENTRY, r"^\s*([A-Za-z][A-Za-z0-9 -]*?):\s*(.*)$");

pub const LEVEL_GAINED: &str = "You gain a Level!";
pub const COMBAT_LOST: &str = "You lose. You slink away, dejected and defeated.";
pub const DETOUR_START: &str = "Encounter: Like a Bat Into Hell";
pub const DETOUR_END: &str = "Encounter: Like a Bat out of Hell";
pub const POUND_GAINED: &str = "gains a pound!";
pub const SNAPSHOT_TITLE: &str = "Player Snapshot";
pub const COMBING_MARKER: &str = "Combing square";
pub const COMBING_LOCATION: &str = "down the beach";
pub const KING_FREED: &str = "Freeing King Ralph";

/// Prefixes of lines that never belong to a block.
pub const BLACKLISTED_PREFIXES: &[&str] = &[
    "http://",
    "https://",
    "api.php",
    "desc_item.php",
    "inv_use.php",
    "> ",
];

/// Number with optional thousands separators.
pub fn parse_count(text: &str) -> Option<i32> {
    text.replace(',', "").parse().ok()
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// A line made only of `=`, as around player snapshots.
pub fn is_delimiter(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 3 && line.bytes().all(|b| b == b'=')
}

pub fn is_blacklisted(line: &str) -> bool {
    BLACKLISTED_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

pub fn is_service_marker(line: &str) -> bool {
    SERVICE.is_match(line)
}

pub fn is_combing(line: &str) -> bool {
    line.contains(COMBING_MARKER) && line.contains(COMBING_LOCATION)
}

/// `cast N <skill>` for a skill that is logged like an adventure.
pub fn proxy_skill(line: &str) -> Option<&str> {
    let caps = SKILL_CAST.captures(line)?;
    let skill = caps.get(2)?.as_str();
    ENCOUNTER_PROXY_SKILLS.get_key(skill).copied()
}

/// `Encounter: <area>` naming an area logged without a turn marker.
pub fn nonstandard_area(line: &str) -> Option<(&'static str, u32)> {
    let caps = ENCOUNTER.captures(line)?;
    let name = caps.get(1)?.as_str();
    NONSTANDARD_ENCOUNTER_AREAS
        .get_entry(name)
        .map(|(area, turns)| (*area, *turns))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_shapes() {
        let caps = ITEM_COUNTED.captures("You acquire ten-leaf clover (3)").unwrap();
        assert_eq!(&caps[1], "ten-leaf clover");
        assert_eq!(&caps[2], "3");
        assert!(!ITEM_NAMED.is_match("You acquire an effect: Ode to Booze (10)"));
        assert!(EFFECT.is_match("You acquire an effect: Ode to Booze (10)"));
        assert!(EFFECT.is_match("You acquire an effect: Ode to Booze (duration: 10 Adventures)"));
    }

    #[test]
    fn test_combat_item_pair() {
        let caps = COMBAT_ITEM
            .captures("Round 3: Xenia uses the seal tooth and uses the spices!")
            .unwrap();
        assert_eq!(&caps[1], "seal tooth");
        assert_eq!(&caps[2], "spices");

        let caps = COMBAT_ITEM.captures("Round 1: Xenia uses the yellow rocket!").unwrap();
        assert_eq!(&caps[1], "yellow rocket");
        assert!(caps.get(2).is_none());
    }

    #[test]
    fn test_familiar_weights() {
        let caps = FAMILIAR.captures("familiar Mosquito (12 lbs)").unwrap();
        assert_eq!(&caps[1], "Mosquito");
        let caps = FAMILIAR.captures("familiar none").unwrap();
        assert_eq!(&caps[1], "none");
    }

    #[test]
    fn test_count_separators() {
        assert_eq!(parse_count("1,250"), Some(1250));
        assert_eq!(parse_count("12x"), None);
    }

    #[test]
    fn test_special_lines() {
        assert!(is_delimiter("====================="));
        assert!(!is_delimiter("===Day 2==="));
        assert_eq!(proxy_skill("cast 1 Rain Man"), Some("Rain Man"));
        assert_eq!(proxy_skill("cast 1 Saucestorm"), None);
        assert_eq!(
            nonstandard_area("Encounter: Summoning Chamber"),
            Some(("Summoning Chamber", 1))
        );
        assert!(is_combing("Combing square 4,7 (3 squares down the beach)"));
    }
}
