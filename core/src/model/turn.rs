//! Turns and turn intervals.
//!
//! A [`SingleTurn`] is one adventure as read from a detailed log. A
//! [`TurnInterval`] is a run of turns in one area: either read directly from
//! a preparsed rundown ([`SimpleTurnInterval`]) or grouped from single turns
//! ([`DetailedTurnInterval`]). Both implement [`Turn`] so summaries can be
//! computed without caring which one a session holds.

use serde::{Deserialize, Serialize};

use super::changes::{Banish, EquipmentChange, FamiliarChange};
use super::consumable::Consumable;
use super::gains::{MeatGain, MpGain, Statgain};
use super::item::{Item, Skill};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnVersion {
    Combat,
    Noncombat,
    Other,
    #[default]
    NotDefined,
}

impl TurnVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Combat => "combat",
            Self::Noncombat => "noncombat",
            Self::Other => "other",
            Self::NotDefined => "notdefined",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "combat" => Some(Self::Combat),
            "noncombat" => Some(Self::Noncombat),
            "other" => Some(Self::Other),
            "notdefined" => Some(Self::NotDefined),
            _ => None,
        }
    }
}

/// Turns spent split by turn version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnCounts {
    pub combat: u32,
    pub noncombat: u32,
    pub other: u32,
}

impl TurnCounts {
    pub fn total(&self) -> u32 {
        self.combat + self.noncombat + self.other
    }

    pub fn add_turns(&mut self, version: TurnVersion, turns: u32) {
        match version {
            TurnVersion::Combat => self.combat += turns,
            TurnVersion::Noncombat => self.noncombat += turns,
            TurnVersion::Other | TurnVersion::NotDefined => self.other += turns,
        }
    }
}

impl std::ops::AddAssign for TurnCounts {
    fn add_assign(&mut self, rhs: TurnCounts) {
        self.combat += rhs.combat;
        self.noncombat += rhs.noncombat;
        self.other += rhs.other;
    }
}

/// Read access shared by single turns and intervals.
pub trait Turn {
    /// Turn number this turn (or the last turn of this interval) ends on.
    fn turn_number(&self) -> u32;
    fn area_name(&self) -> &str;
    fn total_turns(&self) -> u32;
    fn stat_gain(&self) -> Statgain;
    fn meat_gain(&self) -> MeatGain;
    fn mp_gain(&self) -> MpGain;
    fn consumables(&self) -> Vec<&Consumable>;
    fn dropped_items(&self) -> Vec<&Item>;
    fn skills_cast(&self) -> Vec<&Skill>;
    fn turn_counts(&self) -> TurnCounts;
    fn free_runaways(&self) -> u32;
    fn disintegrations(&self) -> u32;
}

/// One adventure from a detailed log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleTurn {
    pub turn_number: u32,
    pub day: u32,
    pub area: String,
    pub encounter: String,
    pub version: TurnVersion,
    pub turns_spent: u32,
    pub stat_gain: Statgain,
    pub meat_gain: MeatGain,
    pub mp_gain: MpGain,
    pub items: Vec<Item>,
    pub skills: Vec<Skill>,
    pub consumables: Vec<Consumable>,
    pub familiar: FamiliarChange,
    pub equipment: EquipmentChange,
    pub disintegrated: bool,
    pub free_runaways: u32,
    pub notes: Option<String>,
    pub banish: Option<Banish>,
    /// MP-pool buffs picked up on this turn.
    pub buffs: Vec<String>,
}

impl SingleTurn {
    pub fn new(area: impl Into<String>, encounter: impl Into<String>, turn_number: u32, day: u32) -> Self {
        assert!(day >= 1, "day numbers start at 1");
        Self {
            turn_number,
            day,
            area: area.into(),
            encounter: encounter.into(),
            version: TurnVersion::NotDefined,
            turns_spent: 0,
            stat_gain: Statgain::NONE,
            meat_gain: MeatGain::NONE,
            mp_gain: MpGain::NONE,
            items: Vec::new(),
            skills: Vec::new(),
            consumables: Vec::new(),
            familiar: FamiliarChange::none(),
            equipment: EquipmentChange::none(0),
            disintegrated: false,
            free_runaways: 0,
            notes: None,
            banish: None,
            buffs: Vec::new(),
        }
    }

    pub fn add_item(&mut self, item: Item) {
        match self.items.iter_mut().find(|i| i.name == item.name) {
            Some(existing) => existing.amount += item.amount,
            None => self.items.push(item),
        }
    }

    pub fn add_skill(&mut self, skill: Skill) {
        match self.skills.iter_mut().find(|s| s.name == skill.name) {
            Some(existing) => existing.amount += skill.amount,
            None => self.skills.push(skill),
        }
    }

    pub fn add_consumable(&mut self, consumable: Consumable) {
        self.consumables.push(consumable);
    }

    /// Append a line of notes, newline separated.
    pub fn add_note(&mut self, note: &str) {
        match &mut self.notes {
            Some(notes) => {
                notes.push('\n');
                notes.push_str(note);
            }
            None => self.notes = Some(note.to_string()),
        }
    }
}

impl Turn for SingleTurn {
    fn turn_number(&self) -> u32 {
        self.turn_number
    }

    fn area_name(&self) -> &str {
        &self.area
    }

    fn total_turns(&self) -> u32 {
        self.turns_spent
    }

    fn stat_gain(&self) -> Statgain {
        self.stat_gain
    }

    fn meat_gain(&self) -> MeatGain {
        self.meat_gain
    }

    fn mp_gain(&self) -> MpGain {
        self.mp_gain
    }

    fn consumables(&self) -> Vec<&Consumable> {
        self.consumables.iter().collect()
    }

    fn dropped_items(&self) -> Vec<&Item> {
        self.items.iter().collect()
    }

    fn skills_cast(&self) -> Vec<&Skill> {
        self.skills.iter().collect()
    }

    fn turn_counts(&self) -> TurnCounts {
        let mut counts = TurnCounts::default();
        counts.add_turns(self.version, self.turns_spent);
        counts
    }

    fn free_runaways(&self) -> u32 {
        self.free_runaways
    }

    fn disintegrations(&self) -> u32 {
        u32::from(self.disintegrated)
    }
}

/// Interval read from a preparsed rundown. Gains are stored directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleTurnInterval {
    pub area: String,
    pub start_turn: u32,
    pub end_turn: u32,
    pub stat_gain: Statgain,
    pub meat_gain: MeatGain,
    pub mp_gain: MpGain,
    pub counts: Option<TurnCounts>,
    pub items: Vec<Item>,
    pub skills: Vec<Skill>,
    pub consumables: Vec<Consumable>,
    pub free_runaways: u32,
    pub disintegrations: u32,
    pub notes: Vec<String>,
}

impl SimpleTurnInterval {
    /// # Panics
    /// If `end_turn < start_turn`.
    pub fn new(area: impl Into<String>, start_turn: u32, end_turn: u32) -> Self {
        assert!(
            end_turn >= start_turn,
            "interval ends ({end_turn}) before it starts ({start_turn})"
        );
        Self {
            area: area.into(),
            start_turn,
            end_turn,
            stat_gain: Statgain::NONE,
            meat_gain: MeatGain::NONE,
            mp_gain: MpGain::NONE,
            counts: None,
            items: Vec::new(),
            skills: Vec::new(),
            consumables: Vec::new(),
            free_runaways: 0,
            disintegrations: 0,
            notes: Vec::new(),
        }
    }
}

/// Interval grouped from consecutive single turns in one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedTurnInterval {
    pub start_turn: u32,
    pub turns: Vec<SingleTurn>,
}

impl DetailedTurnInterval {
    pub fn new(first: SingleTurn) -> Self {
        let start_turn = first.turn_number.saturating_sub(first.turns_spent);
        Self::starting_at(start_turn, first)
    }

    /// Interval that picks up where the previous one ended.
    pub fn starting_at(start_turn: u32, first: SingleTurn) -> Self {
        Self {
            start_turn,
            turns: vec![first],
        }
    }

    /// Whether `turn` continues this interval.
    pub fn accepts(&self, turn: &SingleTurn) -> bool {
        self.turns
            .last()
            .is_some_and(|last| last.area == turn.area)
    }

    pub fn push(&mut self, turn: SingleTurn) {
        self.turns.push(turn);
    }

    /// Start plus the adventures actually spent. A free runaway spends none,
    /// so its logged turn number is not used here.
    pub fn end_turn(&self) -> u32 {
        self.start_turn + self.turns.iter().map(|t| t.turns_spent).sum::<u32>()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IntervalKind {
    Simple(SimpleTurnInterval),
    Detailed(DetailedTurnInterval),
}

/// A run of turns in one area, with report comments attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnInterval {
    pub kind: IntervalKind,
    pub pre_comment: String,
    pub post_comment: String,
}

impl TurnInterval {
    pub fn simple(interval: SimpleTurnInterval) -> Self {
        Self {
            kind: IntervalKind::Simple(interval),
            pre_comment: String::new(),
            post_comment: String::new(),
        }
    }

    pub fn detailed(interval: DetailedTurnInterval) -> Self {
        Self {
            kind: IntervalKind::Detailed(interval),
            pre_comment: String::new(),
            post_comment: String::new(),
        }
    }

    pub fn start_turn(&self) -> u32 {
        match &self.kind {
            IntervalKind::Simple(i) => i.start_turn,
            IntervalKind::Detailed(i) => i.start_turn,
        }
    }

    pub fn end_turn(&self) -> u32 {
        match &self.kind {
            IntervalKind::Simple(i) => i.end_turn,
            IntervalKind::Detailed(i) => i.end_turn(),
        }
    }

    /// Single turns backing this interval, empty for preparsed intervals.
    pub fn single_turns(&self) -> &[SingleTurn] {
        match &self.kind {
            IntervalKind::Simple(_) => &[],
            IntervalKind::Detailed(i) => &i.turns,
        }
    }
}

impl Turn for TurnInterval {
    fn turn_number(&self) -> u32 {
        self.end_turn()
    }

    fn area_name(&self) -> &str {
        match &self.kind {
            IntervalKind::Simple(i) => &i.area,
            IntervalKind::Detailed(i) => i.turns.first().map(|t| t.area.as_str()).unwrap_or(""),
        }
    }

    fn total_turns(&self) -> u32 {
        self.end_turn().saturating_sub(self.start_turn())
    }

    fn stat_gain(&self) -> Statgain {
        match &self.kind {
            IntervalKind::Simple(i) => i.stat_gain,
            IntervalKind::Detailed(i) => i.turns.iter().fold(Statgain::NONE, |acc, t| acc + t.stat_gain),
        }
    }

    fn meat_gain(&self) -> MeatGain {
        match &self.kind {
            IntervalKind::Simple(i) => i.meat_gain,
            IntervalKind::Detailed(i) => i.turns.iter().fold(MeatGain::NONE, |acc, t| acc + t.meat_gain),
        }
    }

    fn mp_gain(&self) -> MpGain {
        match &self.kind {
            IntervalKind::Simple(i) => i.mp_gain,
            IntervalKind::Detailed(i) => i.turns.iter().fold(MpGain::NONE, |acc, t| acc + t.mp_gain),
        }
    }

    fn consumables(&self) -> Vec<&Consumable> {
        match &self.kind {
            IntervalKind::Simple(i) => i.consumables.iter().collect(),
            IntervalKind::Detailed(i) => i.turns.iter().flat_map(|t| t.consumables.iter()).collect(),
        }
    }

    fn dropped_items(&self) -> Vec<&Item> {
        match &self.kind {
            IntervalKind::Simple(i) => i.items.iter().collect(),
            IntervalKind::Detailed(i) => i.turns.iter().flat_map(|t| t.items.iter()).collect(),
        }
    }

    fn skills_cast(&self) -> Vec<&Skill> {
        match &self.kind {
            IntervalKind::Simple(i) => i.skills.iter().collect(),
            IntervalKind::Detailed(i) => i.turns.iter().flat_map(|t| t.skills.iter()).collect(),
        }
    }

    fn turn_counts(&self) -> TurnCounts {
        match &self.kind {
            IntervalKind::Simple(i) => i.counts.unwrap_or(TurnCounts {
                combat: 0,
                noncombat: 0,
                other: i.end_turn - i.start_turn,
            }),
            IntervalKind::Detailed(i) => {
                let mut counts = TurnCounts::default();
                for turn in &i.turns {
                    counts += turn.turn_counts();
                }
                counts
            }
        }
    }

    fn free_runaways(&self) -> u32 {
        match &self.kind {
            IntervalKind::Simple(i) => i.free_runaways,
            IntervalKind::Detailed(i) => i.turns.iter().map(|t| t.free_runaways).sum(),
        }
    }

    fn disintegrations(&self) -> u32 {
        match &self.kind {
            IntervalKind::Simple(i) => i.disintegrations,
            IntervalKind::Detailed(i) => i.turns.iter().map(|t| t.disintegrations()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(area: &str, number: u32, spent: u32) -> SingleTurn {
        let mut t = SingleTurn::new(area, "monster", number, 1);
        t.turns_spent = spent;
        t.version = TurnVersion::Combat;
        t.meat_gain = MeatGain::new(10, 0, 0);
        t
    }

    #[test]
    fn test_detailed_interval_derives_from_turns() {
        let mut interval = DetailedTurnInterval::new(turn("The Spooky Forest", 4, 1));
        interval.push(turn("The Spooky Forest", 5, 1));
        interval.push(turn("The Spooky Forest", 6, 1));
        let interval = TurnInterval::detailed(interval);

        assert_eq!(interval.start_turn(), 3);
        assert_eq!(interval.end_turn(), 6);
        assert_eq!(interval.total_turns(), 3);
        assert_eq!(interval.meat_gain(), MeatGain::new(30, 0, 0));
        assert_eq!(interval.turn_counts().combat, 3);
        assert_eq!(interval.area_name(), "The Spooky Forest");
    }

    #[test]
    fn test_ascension_start_interval_is_empty() {
        let interval = TurnInterval::simple(SimpleTurnInterval::new("Ascension Start", 0, 0));
        assert_eq!(interval.total_turns(), 0);
    }

    #[test]
    #[should_panic]
    fn test_backwards_interval_is_rejected() {
        SimpleTurnInterval::new("The Hidden Temple", 10, 9);
    }

    #[test]
    fn test_add_item_merges_by_name() {
        let mut t = turn("Noob Cave", 1, 1);
        t.add_item(Item::new("tiny stillsuit", 1, 1));
        t.add_item(Item::new("tiny stillsuit", 2, 1));
        assert_eq!(t.items.len(), 1);
        assert_eq!(t.items[0].amount, 3);
    }
}
