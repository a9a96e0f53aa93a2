//! Post-processing run once a session has been read completely.

use std::collections::BTreeMap;

use crate::game_data::equipment_mp_regen;
use crate::model::{
    AscensionLog, DayChange, EquipmentChange, FamiliarChange, LogSummary, MpGain, Statgain, Turn,
    TurnCounts,
};

/// Which derivation steps a session still needs.
///
/// Text logs need all of them. XML logs already carry MP regeneration and
/// day changes. Preparsed logs carry their own change lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finalizer {
    pub mp_regen: bool,
    pub rebuild_days: bool,
    pub rebuild_changes: bool,
}

impl Finalizer {
    pub fn for_text_log() -> Self {
        Self {
            mp_regen: true,
            rebuild_days: true,
            rebuild_changes: true,
        }
    }

    pub fn for_xml_log() -> Self {
        Self {
            mp_regen: false,
            rebuild_days: false,
            rebuild_changes: true,
        }
    }

    pub fn for_preparsed() -> Self {
        Self {
            mp_regen: false,
            rebuild_days: false,
            rebuild_changes: false,
        }
    }

    pub fn finalize(&self, log: &mut AscensionLog) {
        if log.is_empty() {
            tracing::debug!("empty session, nothing to finalize");
            log.set_summary(LogSummary::default());
            return;
        }

        if log.is_detailed() {
            if self.mp_regen {
                apply_mp_regen(log);
            }
            if self.rebuild_days {
                rebuild_day_changes(log);
            }
            if self.rebuild_changes {
                rebuild_change_lists(log);
            }
            let rundown = log.build_rundown();
            *log.rundown_mut() = rundown;
        }

        compute_levels(log);
        let summary = LogSummary::compute(log);
        tracing::debug!(
            turns = summary.total_turns,
            days = log.day_changes().len(),
            "session finalized"
        );
        log.set_summary(summary);
    }
}

fn apply_mp_regen(log: &mut AscensionLog) {
    for turn in log.turns_mut() {
        let regen = equipment_mp_regen(&turn.equipment) * turn.turns_spent as i32;
        if regen != 0 {
            turn.mp_gain += MpGain::new(0, 0, 0, regen, 0);
        }
    }
}

/// Day changes from the day numbers turns were actually played on.
///
/// A day with no turns of its own starts right before the first turn of the
/// next day that has some.
fn rebuild_day_changes(log: &mut AscensionLog) {
    let mut first_turn: BTreeMap<u32, u32> = BTreeMap::new();
    for turn in log.turns() {
        first_turn.entry(turn.day).or_insert(turn.turn_number);
    }
    let Some(&last_played_day) = first_turn.keys().next_back() else {
        return;
    };

    let mut days = vec![DayChange::new(1, 0)];
    for day in 2..=last_played_day {
        let starts_at = first_turn
            .range(day..)
            .next()
            .map(|(_, turn)| turn.saturating_sub(1))
            .unwrap_or(0);
        days.push(DayChange::new(day, starts_at));
    }
    // Days logged after the last turn have nothing to correct them with
    days.extend(
        log.day_changes()
            .iter()
            .filter(|d| d.day > last_played_day)
            .copied(),
    );

    let comments = log
        .day_comments()
        .iter()
        .filter(|(day, _)| days.iter().any(|d| d.day == **day))
        .map(|(day, c)| (*day, c.clone()))
        .collect();

    log.replace_day_changes(days);
    log.replace_day_comments(comments);
}

fn rebuild_change_lists(log: &mut AscensionLog) {
    let mut familiars: Vec<FamiliarChange> = Vec::new();
    let mut equipment: Vec<EquipmentChange> = Vec::new();
    for turn in log.turns() {
        if familiars.last() != Some(&turn.familiar) {
            familiars.push(turn.familiar.clone());
        }
        if equipment.last() != Some(&turn.equipment) {
            equipment.push(turn.equipment.clone());
        }
    }
    log.replace_changes(familiars, equipment);
}

/// Per-level turn counts and stat rates.
fn compute_levels(log: &mut AscensionLog) {
    let units: Vec<(u32, TurnCounts, Statgain)> = if log.is_detailed() {
        log.turns()
            .iter()
            .map(|t| (t.turn_number, t.turn_counts(), t.stat_gain))
            .collect()
    } else {
        log.intervals()
            .iter()
            .map(|i| (i.end_turn(), i.turn_counts(), i.stat_gain()))
            .collect()
    };

    let levels = log.levels_mut();
    levels.sort_by_key(|l| l.level);
    let reached: Vec<u32> = levels.iter().map(|l| l.turn_reached).collect();

    for (index, level) in levels.iter_mut().enumerate() {
        let until = reached.get(index + 1).copied();
        let mut counts = TurnCounts::default();
        let mut before = Statgain::NONE;
        let mut during = Statgain::NONE;

        for (turn, unit_counts, stats) in &units {
            if *turn <= level.turn_reached {
                before += *stats;
            } else if until.is_none_or(|u| *turn <= u) {
                counts += *unit_counts;
                during += *stats;
            }
        }

        level.combat_turns = counts.combat;
        level.noncombat_turns = counts.noncombat;
        level.other_turns = counts.other;
        level.stats_at_level_reached = before;
        level.stat_gain_per_turn = match counts.total() {
            0 => 0.0,
            total => f64::from(during.total()) / f64::from(total),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EquipmentSlot, LevelData, SingleTurn, TurnVersion};

    fn turn(number: u32, day: u32) -> SingleTurn {
        let mut t = SingleTurn::new("The Haunted Pantry", "tomb rat", number, day);
        t.version = TurnVersion::Combat;
        t.stat_gain = Statgain::new(2, 0, 0);
        t
    }

    #[test]
    fn test_skipped_day_is_synthesized() {
        let mut log = AscensionLog::with_ascension_start();
        log.add_turn(turn(1, 1));
        log.add_turn(turn(2, 1));
        log.add_turn(turn(3, 3));
        log.add_turn(turn(4, 3));
        log.add_day_change(DayChange::new(3, 2));
        log.day_comments_mut(2).header = "rollover".to_string();

        Finalizer::for_text_log().finalize(&mut log);

        assert_eq!(
            log.day_changes(),
            &[DayChange::new(1, 0), DayChange::new(2, 2), DayChange::new(3, 2)]
        );
        assert_eq!(log.day_comments()[&2].header, "rollover");
    }

    #[test]
    fn test_day_boundary_follows_turns() {
        let mut log = AscensionLog::with_ascension_start();
        log.add_turn(turn(1, 1));
        // Marker was logged after a free runaway that did not spend the turn
        log.add_day_change(DayChange::new(2, 5));
        log.add_turn(turn(3, 2));

        Finalizer::for_text_log().finalize(&mut log);
        assert_eq!(log.day_changes()[1], DayChange::new(2, 2));
    }

    #[test]
    fn test_empty_session_is_a_no_op() {
        let mut log = AscensionLog::with_ascension_start();
        Finalizer::for_text_log().finalize(&mut log);
        let summary = log.summary().unwrap();
        assert_eq!(summary.total_turns, 0);
        assert!(log.turn_rundown().is_empty());
    }

    #[test]
    fn test_mp_regen_from_equipment() {
        let mut log = AscensionLog::with_ascension_start();
        let mut t = turn(2, 1);
        t.equipment = EquipmentChange::none(0).with_slot(EquipmentSlot::Acc1, "plexiglass pendant", 0);
        log.add_turn(t);

        Finalizer::for_text_log().finalize(&mut log);
        assert_eq!(log.turns()[1].mp_gain.out_of_encounter, 8);

        let mut xml = AscensionLog::with_ascension_start();
        let mut t = turn(2, 1);
        t.equipment = EquipmentChange::none(0).with_slot(EquipmentSlot::Acc1, "plexiglass pendant", 0);
        xml.add_turn(t);
        Finalizer::for_xml_log().finalize(&mut xml);
        assert_eq!(xml.turns()[1].mp_gain.out_of_encounter, 0);
    }

    #[test]
    fn test_change_lists_collapse_repeats() {
        let mut log = AscensionLog::with_ascension_start();
        let mosquito = FamiliarChange::new("Mosquito", 0);
        for n in 1..=3 {
            let mut t = turn(n, 1);
            t.familiar = mosquito.clone();
            log.add_turn(t);
        }
        Finalizer::for_text_log().finalize(&mut log);
        assert_eq!(log.familiar_changes(), &[FamiliarChange::none(), mosquito]);
    }

    #[test]
    fn test_levels() {
        let mut log = AscensionLog::with_ascension_start();
        for n in 1..=6 {
            log.add_turn(turn(n, 1));
        }
        log.add_level(LevelData::new(2, 4));
        Finalizer::for_text_log().finalize(&mut log);

        let levels = log.levels();
        assert_eq!(levels[0].combat_turns, 4);
        assert_eq!(levels[1].combat_turns, 2);
        assert_eq!(levels[1].stats_at_level_reached, Statgain::new(8, 0, 0));
        assert_eq!(levels[1].stat_gain_per_turn, 2.0);
    }
}
