//! Signals that end an ascension.
//!
//! Each storyline has its own way of finishing. The signals are a fixed
//! table; nothing tries to derive them from a common rule.

use crate::grammar;
use crate::model::AscensionLog;
use crate::reader::{BlockType, LogBlock};

pub const FINAL_BOSS_AREA: &str = "The Naughty Sorceress' Chamber";
pub const FINAL_BOSS: &str = "Naughty Sorceress";

/// Choice adventures whose selection ends the run: (choice, option).
const ENDING_CHOICES: &[(u32, u32, &str)] = &[
    (1089, 30, "final Community Service donation"),
    (1054, 1, "returned the Holy MacGuffin"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    KingFreed,
    Choice(u32, u32),
    FinalBossDefeated,
    MirrorBossDefeated,
}

/// Check one block for an ending signal. Only encounter, service and other
/// blocks can carry one.
pub fn detect(block: &LogBlock, log: &AscensionLog) -> Option<Ending> {
    if !matches!(
        block.kind,
        BlockType::Encounter | BlockType::Service | BlockType::Other
    ) {
        return None;
    }

    if block.lines.iter().any(|l| l.contains(grammar::KING_FREED)) {
        return Some(Ending::KingFreed);
    }

    for line in &block.lines {
        let Some(caps) = grammar::TOOK_CHOICE.captures(line) else {
            continue;
        };
        let (Ok(choice), Ok(option)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) else {
            continue;
        };
        if let Some((_, _, what)) = ENDING_CHOICES
            .iter()
            .find(|(c, o, _)| *c == choice && *o == option)
        {
            tracing::debug!(choice, option, what, "ending choice taken");
            return Some(Ending::Choice(choice, option));
        }
    }

    if block.kind == BlockType::Encounter {
        return detect_final_fight(block, log);
    }
    None
}

fn detect_final_fight(block: &LogBlock, log: &AscensionLog) -> Option<Ending> {
    let area = grammar::ADVENTURE
        .captures(block.first_line())
        .map(|caps| caps[2].to_string())
        .or_else(|| {
            block
                .lines
                .get(1)
                .and_then(|l| grammar::nonstandard_area(l))
                .map(|(area, _)| area.to_string())
        })?;
    if area != FINAL_BOSS_AREA {
        return None;
    }

    let opponent = block
        .lines
        .iter()
        .filter_map(|l| grammar::ENCOUNTER.captures(l))
        .map(|caps| caps[1].to_string())
        .last()?;

    let won = block.lines.iter().any(|l| {
        grammar::COMBAT_WON
            .captures(l)
            .is_some_and(|caps| !caps[1].eq_ignore_ascii_case(&opponent))
    });
    if !won {
        return None;
    }

    if opponent.contains(FINAL_BOSS) {
        return Some(Ending::FinalBossDefeated);
    }
    if is_reversed_name(&log.character.name, &opponent) {
        return Some(Ending::MirrorBossDefeated);
    }
    None
}

/// The player's name spelled backwards, compared case-insensitively.
fn is_reversed_name(player: &str, opponent: &str) -> bool {
    if player.is_empty() {
        return false;
    }
    let reversed: String = player.chars().rev().collect();
    reversed.to_lowercase() == opponent.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(kind: BlockType, lines: &[&str]) -> LogBlock {
        LogBlock {
            kind,
            lines: lines.iter().map(|l| l.to_string()).collect(),
            start_line: 1,
        }
    }

    #[test]
    fn test_reversed_name() {
        assert!(is_reversed_name("Xenia", "ainex"));
        assert!(is_reversed_name("Xenia", "AINEX"));
        assert!(!is_reversed_name("", ""));
        assert!(!is_reversed_name("Xenia", "Xenia"));
    }

    #[test]
    fn test_final_boss_win() {
        let log = AscensionLog::with_ascension_start();
        let won = block(
            BlockType::Encounter,
            &[
                "[612] The Naughty Sorceress' Chamber",
                "Encounter: Naughty Sorceress (3)",
                "Round 4: Xenia wins the fight!",
            ],
        );
        assert_eq!(detect(&won, &log), Some(Ending::FinalBossDefeated));

        let lost = block(
            BlockType::Encounter,
            &[
                "[612] The Naughty Sorceress' Chamber",
                "Encounter: Naughty Sorceress (3)",
                grammar::COMBAT_LOST,
            ],
        );
        assert_eq!(detect(&lost, &log), None);
    }

    #[test]
    fn test_mirror_boss_win() {
        let mut log = AscensionLog::with_ascension_start();
        log.character.name = "Xenia".to_string();
        let won = block(
            BlockType::Encounter,
            &[
                "[700] The Naughty Sorceress' Chamber",
                "Encounter: aineX",
                "Round 9: Xenia wins the fight!",
            ],
        );
        assert_eq!(detect(&won, &log), Some(Ending::MirrorBossDefeated));
    }

    #[test]
    fn test_choice_endings() {
        let log = AscensionLog::with_ascension_start();
        let service = block(
            BlockType::Service,
            &[
                "Took choice 1089/30: Perform Service",
                "choice.php?whichchoice=1089&option=30&pwd",
                "Community Service: Donate your body to Science",
                "Turns used: 0",
            ],
        );
        assert_eq!(detect(&service, &log), Some(Ending::Choice(1089, 30)));

        let other = block(BlockType::Other, &["Took choice 1089/1: Donate Blood"]);
        assert_eq!(detect(&other, &log), None);

        let king = block(BlockType::Other, &["Freeing King Ralph"]);
        assert_eq!(detect(&king, &log), Some(Ending::KingFreed));

        let consumable = block(BlockType::Consumable, &["use 1 Freeing King Ralph"]);
        assert_eq!(detect(&consumable, &log), None);
    }
}
