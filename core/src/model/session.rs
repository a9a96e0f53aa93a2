//! The session aggregate.
//!
//! [`AscensionLog`] owns everything read from one log. Parsers append to it
//! while reading; the finalizer derives the remaining collections once, after
//! which the log is only read.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::changes::{
    CombatRecord, DayChange, DayComments, EquipmentChange, FamiliarChange, Hybridization,
    LearnedSkill, Pull,
};
use super::level::LevelData;
use super::snapshot::PlayerSnapshot;
use super::summary::LogSummary;
use super::turn::{DetailedTurnInterval, SingleTurn, TurnInterval};

/// Whether a session holds single turns or preparsed intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogMode {
    Detailed,
    Preparsed,
}

pub const ASCENSION_START: &str = "Ascension Start";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterInfo {
    pub name: String,
    pub class: String,
    pub game_mode: String,
    pub path: String,
    pub ascension_number: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AscensionLog {
    mode: LogMode,
    pub character: CharacterInfo,
    pub start_date: Option<NaiveDate>,
    turns: Vec<SingleTurn>,
    intervals: Vec<TurnInterval>,
    day_changes: Vec<DayChange>,
    day_comments: BTreeMap<u32, DayComments>,
    levels: Vec<LevelData>,
    snapshots: Vec<PlayerSnapshot>,
    pulls: Vec<Pull>,
    hunted_combats: Vec<CombatRecord>,
    lost_combats: Vec<CombatRecord>,
    learned_skills: Vec<LearnedSkill>,
    hybridizations: Vec<Hybridization>,
    familiar_changes: Vec<FamiliarChange>,
    equipment_changes: Vec<EquipmentChange>,
    rundown: Vec<TurnInterval>,
    summary: Option<LogSummary>,
    /// Turn number the next turn starts counting from.
    turn_clock: u32,
}

impl AscensionLog {
    /// Empty session. Day 1 and level 1 are seeded at turn 0.
    pub fn new(mode: LogMode) -> Self {
        Self {
            mode,
            character: CharacterInfo::default(),
            start_date: None,
            turns: Vec::new(),
            intervals: Vec::new(),
            day_changes: vec![DayChange::new(1, 0)],
            day_comments: BTreeMap::new(),
            levels: vec![LevelData::new(1, 0)],
            snapshots: Vec::new(),
            pulls: Vec::new(),
            hunted_combats: Vec::new(),
            lost_combats: Vec::new(),
            learned_skills: Vec::new(),
            hybridizations: Vec::new(),
            familiar_changes: Vec::new(),
            equipment_changes: Vec::new(),
            rundown: Vec::new(),
            summary: None,
            turn_clock: 0,
        }
    }

    /// Detailed session whose first turn is the zero-length "Ascension Start".
    pub fn with_ascension_start() -> Self {
        let mut log = Self::new(LogMode::Detailed);
        log.turns.push(SingleTurn::new(ASCENSION_START, ASCENSION_START, 0, 1));
        log
    }

    pub fn mode(&self) -> LogMode {
        self.mode
    }

    pub fn is_detailed(&self) -> bool {
        self.mode == LogMode::Detailed
    }

    /// Append a single turn. `turns_spent` is derived from the turn clock.
    ///
    /// A turn number lower than the previous one is clamped; KoLmafia
    /// occasionally logs a stale counter after a free fight.
    ///
    /// # Panics
    /// If the session holds preparsed intervals.
    pub fn add_turn(&mut self, mut turn: SingleTurn) {
        assert!(self.is_detailed(), "cannot add single turns to a preparsed log");
        let last = self.last_turn_number();
        if turn.turn_number < last {
            tracing::warn!(
                turn = turn.turn_number,
                last,
                "turn number went backwards, clamping"
            );
            turn.turn_number = last;
        }
        turn.turns_spent = turn.turn_number.saturating_sub(self.turn_clock);
        self.turn_clock = turn.turn_number;
        self.turns.push(turn);
    }

    /// Append a turn whose `turns_spent` is already known, as read back from
    /// a serialized log.
    pub(crate) fn add_turn_as_is(&mut self, turn: SingleTurn) {
        assert!(self.is_detailed(), "cannot add single turns to a preparsed log");
        self.turn_clock = self.turn_clock.max(turn.turn_number);
        self.turns.push(turn);
    }

    /// Append a preparsed interval.
    ///
    /// # Panics
    /// If the session holds single turns.
    pub fn add_interval(&mut self, interval: TurnInterval) {
        assert!(!self.is_detailed(), "cannot add intervals to a detailed log");
        self.turn_clock = self.turn_clock.max(interval.end_turn());
        self.intervals.push(interval);
    }

    /// The last turn ran away for free, so it did not use up an adventure.
    pub fn mark_free_runaway(&mut self) {
        if let Some(turn) = self.turns.last_mut() {
            turn.free_runaways += 1;
            if turn.turns_spent > 0 {
                turn.turns_spent -= 1;
                self.turn_clock = self.turn_clock.saturating_sub(1);
            }
        }
    }

    pub fn last_turn_number(&self) -> u32 {
        match self.mode {
            LogMode::Detailed => self.turns.last().map(|t| t.turn_number).unwrap_or(0),
            LogMode::Preparsed => self.intervals.last().map(|i| i.end_turn()).unwrap_or(0),
        }
    }

    pub fn last_turn_mut(&mut self) -> Option<&mut SingleTurn> {
        self.turns.last_mut()
    }

    pub fn last_turn(&self) -> Option<&SingleTurn> {
        self.turns.last()
    }

    pub fn last_interval_mut(&mut self) -> Option<&mut TurnInterval> {
        self.intervals.last_mut()
    }

    pub fn current_day(&self) -> u32 {
        self.day_changes.last().map(|d| d.day).unwrap_or(1)
    }

    /// Day on which `turn` was played, from the day-change list.
    pub fn day_of_turn(&self, turn: u32) -> u32 {
        self.day_changes
            .iter()
            .take_while(|d| d.turn <= turn)
            .last()
            .map(|d| d.day)
            .unwrap_or(1)
    }

    /// Record a day change. Repeats of a known day are ignored.
    pub fn add_day_change(&mut self, change: DayChange) {
        if self.day_changes.iter().any(|d| d.day == change.day) {
            return;
        }
        self.day_changes.push(change);
        self.day_changes.sort_by_key(|d| (d.day, d.turn));
    }

    pub fn add_level(&mut self, level: LevelData) {
        if self.levels.iter().any(|l| l.level == level.level) {
            return;
        }
        self.levels.push(level);
    }

    /// Next level after the highest reached so far.
    pub fn next_level(&self) -> u32 {
        self.levels.iter().map(|l| l.level).max().unwrap_or(0) + 1
    }

    pub fn add_snapshot(&mut self, snapshot: PlayerSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn add_pull(&mut self, pull: Pull) {
        self.pulls.push(pull);
    }

    pub fn add_hunted_combat(&mut self, combat: CombatRecord) {
        self.hunted_combats.push(combat);
    }

    pub fn add_lost_combat(&mut self, combat: CombatRecord) {
        self.lost_combats.push(combat);
    }

    pub fn add_learned_skill(&mut self, skill: LearnedSkill) {
        self.learned_skills.push(skill);
    }

    pub fn add_hybridization(&mut self, hybrid: Hybridization) {
        self.hybridizations.push(hybrid);
    }

    pub fn day_comments_mut(&mut self, day: u32) -> &mut DayComments {
        self.day_comments.entry(day).or_default()
    }

    pub fn turns(&self) -> &[SingleTurn] {
        &self.turns
    }

    pub(crate) fn turns_mut(&mut self) -> &mut [SingleTurn] {
        &mut self.turns
    }

    pub fn intervals(&self) -> &[TurnInterval] {
        &self.intervals
    }

    pub fn day_changes(&self) -> &[DayChange] {
        &self.day_changes
    }

    pub(crate) fn replace_day_changes(&mut self, days: Vec<DayChange>) {
        self.day_changes = days;
    }

    pub fn day_comments(&self) -> &BTreeMap<u32, DayComments> {
        &self.day_comments
    }

    pub(crate) fn replace_day_comments(&mut self, comments: BTreeMap<u32, DayComments>) {
        self.day_comments = comments;
    }

    pub fn levels(&self) -> &[LevelData] {
        &self.levels
    }

    pub(crate) fn levels_mut(&mut self) -> &mut Vec<LevelData> {
        &mut self.levels
    }

    pub fn snapshots(&self) -> &[PlayerSnapshot] {
        &self.snapshots
    }

    pub fn pulls(&self) -> &[Pull] {
        &self.pulls
    }

    pub fn hunted_combats(&self) -> &[CombatRecord] {
        &self.hunted_combats
    }

    pub fn lost_combats(&self) -> &[CombatRecord] {
        &self.lost_combats
    }

    pub fn learned_skills(&self) -> &[LearnedSkill] {
        &self.learned_skills
    }

    pub fn hybridizations(&self) -> &[Hybridization] {
        &self.hybridizations
    }

    pub fn familiar_changes(&self) -> &[FamiliarChange] {
        &self.familiar_changes
    }

    pub fn equipment_changes(&self) -> &[EquipmentChange] {
        &self.equipment_changes
    }

    pub(crate) fn replace_changes(
        &mut self,
        familiars: Vec<FamiliarChange>,
        equipment: Vec<EquipmentChange>,
    ) {
        self.familiar_changes = familiars;
        self.equipment_changes = equipment;
    }

    /// Turns grouped into intervals by area. Filled in by the finalizer.
    pub fn turn_rundown(&self) -> &[TurnInterval] {
        match self.mode {
            LogMode::Detailed => &self.rundown,
            LogMode::Preparsed => &self.intervals,
        }
    }

    pub(crate) fn rundown_mut(&mut self) -> &mut Vec<TurnInterval> {
        &mut self.rundown
    }

    /// Group consecutive single turns in the same area.
    pub(crate) fn build_rundown(&self) -> Vec<TurnInterval> {
        let mut groups: Vec<DetailedTurnInterval> = Vec::new();
        for turn in &self.turns {
            match groups.last_mut() {
                Some(group) if group.accepts(turn) => group.push(turn.clone()),
                Some(group) => {
                    let start = group.end_turn();
                    groups.push(DetailedTurnInterval::starting_at(start, turn.clone()));
                }
                None => groups.push(DetailedTurnInterval::new(turn.clone())),
            }
        }
        groups.into_iter().map(TurnInterval::detailed).collect()
    }

    pub fn summary(&self) -> Option<&LogSummary> {
        self.summary.as_ref()
    }

    pub(crate) fn set_summary(&mut self, summary: LogSummary) {
        self.summary = Some(summary);
    }

    pub fn is_empty(&self) -> bool {
        match self.mode {
            LogMode::Detailed => self.turns.iter().all(|t| t.area == ASCENSION_START),
            LogMode::Preparsed => self.intervals.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turns_spent_follows_clock() {
        let mut log = AscensionLog::with_ascension_start();
        log.add_turn(SingleTurn::new("Noob Cave", "crate", 1, 1));
        log.add_turn(SingleTurn::new("Noob Cave", "crate", 3, 1));

        let spent: Vec<u32> = log.turns().iter().map(|t| t.turns_spent).collect();
        assert_eq!(spent, vec![0, 1, 2]);
    }

    #[test]
    fn test_backwards_turn_is_clamped() {
        let mut log = AscensionLog::with_ascension_start();
        log.add_turn(SingleTurn::new("Noob Cave", "crate", 5, 1));
        log.add_turn(SingleTurn::new("The Haunted Pantry", "drunken half-orc hobo", 4, 1));

        assert_eq!(log.last_turn_number(), 5);
        assert_eq!(log.turns()[2].turns_spent, 0);
    }

    #[test]
    fn test_free_runaway_gives_turn_back() {
        let mut log = AscensionLog::with_ascension_start();
        log.add_turn(SingleTurn::new("The Spooky Forest", "spooky mummy", 1, 1));
        log.mark_free_runaway();
        log.add_turn(SingleTurn::new("The Spooky Forest", "spooky vampire", 1, 1));

        let turns = log.turns();
        assert_eq!(turns[1].turns_spent, 0);
        assert_eq!(turns[1].free_runaways, 1);
        assert_eq!(turns[2].turns_spent, 1);

        let rundown = log.build_rundown();
        let shape: Vec<(u32, u32)> = rundown.iter().map(|i| (i.start_turn(), i.end_turn())).collect();
        assert_eq!(shape, vec![(0, 0), (0, 1)]);
    }

    #[test]
    fn test_day_of_turn() {
        let mut log = AscensionLog::new(LogMode::Detailed);
        log.add_day_change(DayChange::new(2, 40));
        log.add_day_change(DayChange::new(3, 80));

        assert_eq!(log.day_of_turn(0), 1);
        assert_eq!(log.day_of_turn(40), 2);
        assert_eq!(log.day_of_turn(79), 2);
        assert_eq!(log.day_of_turn(200), 3);
        assert_eq!(log.current_day(), 3);
    }

    #[test]
    fn test_rundown_groups_by_area() {
        let mut log = AscensionLog::with_ascension_start();
        log.add_turn(SingleTurn::new("Noob Cave", "crate", 1, 1));
        log.add_turn(SingleTurn::new("Noob Cave", "crate", 2, 1));
        log.add_turn(SingleTurn::new("The Haunted Pantry", "tomb rat", 3, 1));
        log.add_turn(SingleTurn::new("Noob Cave", "crate", 4, 1));

        let rundown = log.build_rundown();
        let shape: Vec<(u32, u32)> = rundown.iter().map(|i| (i.start_turn(), i.end_turn())).collect();
        assert_eq!(shape, vec![(0, 0), (0, 2), (2, 3), (3, 4)]);
    }
}
