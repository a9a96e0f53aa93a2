//! Aggregates derived from a finished session.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::changes::{Banish, FamiliarChange};
use super::consumable::{Consumable, ConsumableVersion, merge_by_day};
use super::gains::{MeatGain, MpGain, Statgain};
use super::item::{Item, Skill, merge_items, merge_skills};
use super::session::AscensionLog;
use super::turn::{Turn, TurnCounts, TurnInterval};
use crate::game_data::quests;

/// Turns spent on each quest line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestTurns {
    pub mosquito: u32,
    pub tavern: u32,
    pub bat: u32,
    pub knob: u32,
    pub friars: u32,
    pub cyrpt: u32,
    pub trapzor: u32,
    pub chasm: u32,
    pub airship: u32,
    pub castle: u32,
    pub pirate: u32,
    pub black_forest: u32,
    pub desert: u32,
    pub spookyraven: u32,
    pub palindome: u32,
    pub pyramid: u32,
    pub hidden_city: u32,
    pub war: u32,
    pub daily_dungeon: u32,
}

impl QuestTurns {
    pub fn compute(rundown: &[TurnInterval]) -> Self {
        Self {
            mosquito: turns_until_found(rundown, quests::MOSQUITO, quests::MOSQUITO_ITEM),
            tavern: turns_in_areas(rundown, quests::TAVERN),
            bat: turns_in_areas(rundown, quests::BAT),
            knob: turns_in_areas(rundown, quests::KNOB),
            friars: turns_in_areas(rundown, quests::FRIARS),
            cyrpt: turns_in_areas(rundown, quests::CYRPT),
            trapzor: turns_in_areas(rundown, quests::TRAPZOR),
            chasm: turns_in_areas(rundown, quests::CHASM),
            airship: turns_until_found(rundown, quests::AIRSHIP, quests::AIRSHIP_ITEM),
            castle: turns_in_areas(rundown, quests::CASTLE),
            pirate: turns_in_areas(rundown, quests::PIRATE),
            black_forest: turns_in_areas(rundown, quests::BLACK_FOREST),
            desert: turns_in_areas(rundown, quests::DESERT),
            spookyraven: turns_in_areas(rundown, quests::SPOOKYRAVEN),
            palindome: turns_in_areas(rundown, quests::PALINDOME),
            pyramid: turns_in_areas(rundown, quests::PYRAMID),
            hidden_city: turns_in_areas(rundown, quests::HIDDEN_CITY),
            war: turns_in_areas(rundown, quests::WAR),
            daily_dungeon: turns_in_areas(rundown, quests::DAILY_DUNGEON),
        }
    }
}

fn turns_in_areas(rundown: &[TurnInterval], areas: &[&str]) -> u32 {
    rundown
        .iter()
        .filter(|i| areas.contains(&i.area_name()))
        .map(|i| i.total_turns())
        .sum()
}

/// Turns spent in `areas` up to the turn `item` first dropped there.
///
/// The interval containing the drop only counts up to that turn. Without a
/// drop every turn in the areas counts.
fn turns_until_found(rundown: &[TurnInterval], areas: &[&str], item: &str) -> u32 {
    let found = rundown
        .iter()
        .filter(|i| areas.contains(&i.area_name()))
        .flat_map(|i| i.dropped_items())
        .filter(|i| i.name == item)
        .map(|i| i.turn)
        .min();

    let Some(found) = found else {
        return turns_in_areas(rundown, areas);
    };

    rundown
        .iter()
        .filter(|i| areas.contains(&i.area_name()))
        .map(|i| {
            if i.end_turn() <= found {
                i.total_turns()
            } else if i.start_turn() < found {
                found - i.start_turn()
            } else {
                0
            }
        })
        .sum()
}

/// Adventures gained from one kind of consumable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionTotals {
    pub food: u32,
    pub booze: u32,
    pub spleen: u32,
    pub other: u32,
}

impl ConsumptionTotals {
    pub fn total(&self) -> u32 {
        self.food + self.booze + self.spleen + self.other
    }

    fn add(&mut self, consumable: &Consumable) {
        let slot = match consumable.version {
            ConsumableVersion::Food => &mut self.food,
            ConsumableVersion::Booze => &mut self.booze,
            ConsumableVersion::Spleen => &mut self.spleen,
            ConsumableVersion::Other => &mut self.other,
        };
        *slot += consumable.adventure_gain;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogSummary {
    pub total_turns: u32,
    pub turn_counts: TurnCounts,
    pub stat_gain: Statgain,
    pub meat_gain: MeatGain,
    pub mp_gain: MpGain,
    /// Consumables merged by (name, day).
    pub consumables: Vec<Consumable>,
    pub consumption: ConsumptionTotals,
    pub consumption_per_day: BTreeMap<u32, ConsumptionTotals>,
    pub meat_per_day: BTreeMap<u32, MeatGain>,
    pub mp_per_day: BTreeMap<u32, MpGain>,
    /// Turns spent per area, most visited first.
    pub turns_per_area: Vec<(String, u32)>,
    pub skills: Vec<Skill>,
    pub items: Vec<Item>,
    /// Turns spent with each familiar, most used first.
    pub familiar_usage: Vec<(String, u32)>,
    pub free_runaways: u32,
    pub disintegrations: u32,
    pub banishes: Vec<Banish>,
    pub quest_turns: QuestTurns,
}

impl LogSummary {
    pub fn compute(log: &AscensionLog) -> Self {
        let rundown = log.turn_rundown();
        let mut summary = LogSummary::default();

        let mut per_area: HashMap<&str, u32> = HashMap::new();
        let mut area_order: Vec<&str> = Vec::new();

        for interval in rundown {
            summary.total_turns += interval.total_turns();
            summary.turn_counts += interval.turn_counts();
            summary.stat_gain += interval.stat_gain();
            summary.meat_gain += interval.meat_gain();
            summary.mp_gain += interval.mp_gain();
            summary.free_runaways += interval.free_runaways();
            summary.disintegrations += interval.disintegrations();

            let area = interval.area_name();
            let entry = per_area.entry(area).or_insert_with(|| {
                area_order.push(area);
                0
            });
            *entry += interval.total_turns();
        }

        let mut turns_per_area: Vec<(String, u32)> = area_order
            .into_iter()
            .map(|area| (area.to_string(), per_area[area]))
            .filter(|(_, turns)| *turns > 0)
            .collect();
        turns_per_area.sort_by(|a, b| b.1.cmp(&a.1));
        summary.turns_per_area = turns_per_area;

        if log.is_detailed() {
            for turn in log.turns() {
                *summary.meat_per_day.entry(turn.day).or_default() += turn.meat_gain;
                *summary.mp_per_day.entry(turn.day).or_default() += turn.mp_gain;
                if let Some(banish) = &turn.banish {
                    summary.banishes.push(banish.clone());
                }
            }
        } else {
            for interval in rundown {
                let day = log.day_of_turn(interval.start_turn() + 1);
                *summary.meat_per_day.entry(day).or_default() += interval.meat_gain();
                *summary.mp_per_day.entry(day).or_default() += interval.mp_gain();
            }
        }

        summary.consumables = merge_by_day(rundown.iter().flat_map(|i| i.consumables()));
        for consumable in &summary.consumables {
            summary.consumption.add(consumable);
            summary
                .consumption_per_day
                .entry(consumable.day)
                .or_default()
                .add(consumable);
        }

        summary.skills = merge_skills(rundown.iter().flat_map(|i| i.skills_cast()));
        summary.items = merge_items(rundown.iter().flat_map(|i| i.dropped_items()));
        summary.familiar_usage = familiar_usage(log.familiar_changes(), log.last_turn_number());
        summary.quest_turns = QuestTurns::compute(rundown);

        summary
    }
}

/// Turns each familiar was out for, from the change list.
fn familiar_usage(changes: &[FamiliarChange], last_turn: u32) -> Vec<(String, u32)> {
    let mut usage: Vec<(String, u32)> = Vec::new();
    for (i, change) in changes.iter().enumerate() {
        if change.is_none() {
            continue;
        }
        let until = changes.get(i + 1).map(|c| c.turn).unwrap_or(last_turn);
        let turns = until.saturating_sub(change.turn);
        match usage.iter_mut().find(|(name, _)| *name == change.name) {
            Some((_, total)) => *total += turns,
            None => usage.push((change.name.clone(), turns)),
        }
    }
    usage.sort_by(|a, b| b.1.cmp(&a.1));
    usage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::turn::SimpleTurnInterval;

    fn interval(area: &str, start: u32, end: u32) -> TurnInterval {
        TurnInterval::simple(SimpleTurnInterval::new(area, start, end))
    }

    #[test]
    fn test_bat_quest_sums_intervals() {
        let rundown = vec![
            interval("The Bat Hole Entryway", 10, 13),
            interval("The Haunted Pantry", 13, 20),
            interval("The Bat Hole Entryway", 20, 22),
        ];
        let quests = QuestTurns::compute(&rundown);
        assert_eq!(quests.bat, 5);
        assert_eq!(quests.mosquito, 0);
    }

    #[test]
    fn test_mosquito_clips_at_larva() {
        let mut found = SimpleTurnInterval::new("The Spooky Forest", 20, 30);
        found.items.push(Item::new("mosquito larva", 1, 24));
        let rundown = vec![
            interval("The Spooky Forest", 5, 8),
            TurnInterval::simple(found),
            interval("The Spooky Forest", 40, 45),
        ];

        assert_eq!(QuestTurns::compute(&rundown).mosquito, 3 + 4);
    }

    #[test]
    fn test_mosquito_without_larva_counts_everything() {
        let rundown = vec![interval("The Spooky Forest", 5, 8), interval("The Spooky Forest", 9, 11)];
        assert_eq!(QuestTurns::compute(&rundown).mosquito, 5);
    }

    #[test]
    fn test_familiar_usage() {
        let changes = vec![
            FamiliarChange::none(),
            FamiliarChange::new("Mosquito", 0),
            FamiliarChange::new("Frumious Bandersnatch", 10),
            FamiliarChange::new("Mosquito", 25),
        ];
        let usage = familiar_usage(&changes, 30);
        assert_eq!(
            usage,
            vec![
                ("Mosquito".to_string(), 15),
                ("Frumious Bandersnatch".to_string(), 15)
            ]
        );
    }
}
