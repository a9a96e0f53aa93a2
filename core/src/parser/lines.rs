//! Single-line parsers offered every line of an OTHER block, and the chain
//! that orders them.

use super::ParseContext;
use crate::game_data::{Attribute, MP_POOL_BUFFS, SUBSTATS, skill_mp_cost};
use crate::grammar::{self, parse_count};
use crate::model::{
    DayChange, EquipmentSlot, FamiliarChange, Item, LearnedSkill, LevelData, MeatGain, MpGain,
    Pull, Skill, Statgain,
};

/// One line shape and what it does to the session.
///
/// `parse` is only called after `is_compatible` accepted the line, so a
/// grammar mismatch inside `parse` is a bug in the parser.
pub trait LineParser: Send + Sync {
    fn is_compatible(&self, line: &str) -> bool;
    fn parse(&self, line: &str, ctx: &mut ParseContext<'_>);
}

/// Ordered line parsers. At most one parser consumes a line.
pub struct LineChain {
    parsers: Vec<Box<dyn LineParser>>,
}

impl LineChain {
    pub fn new(include_notes: bool) -> Self {
        let mut parsers: Vec<Box<dyn LineParser>> = vec![
            Box::new(ItemAcquisitionParser),
            Box::new(SkillCastParser),
            Box::new(FamiliarChangeParser),
            Box::new(MeatGainedParser),
            Box::new(MeatSpentParser),
            Box::new(StatGainParser),
            Box::new(LevelUpParser),
            Box::new(MpGainParser),
            Box::new(EquipmentChangeParser),
            Box::new(PullParser),
            Box::new(MpPoolBuffParser),
            Box::new(DayChangeParser),
            Box::new(LearnedSkillParser),
        ];
        if include_notes {
            parsers.push(Box::new(NotesParser));
        }
        Self { parsers }
    }

    /// Offer `line` to each parser in order. Returns whether one consumed it.
    pub fn dispatch(&self, line: &str, ctx: &mut ParseContext<'_>) -> bool {
        match self.parsers.iter().find(|p| p.is_compatible(line)) {
            Some(parser) => {
                parser.parse(line, ctx);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

struct ItemAcquisitionParser;

impl LineParser for ItemAcquisitionParser {
    fn is_compatible(&self, line: &str) -> bool {
        !line.starts_with("You acquire an effect:")
            && !line.starts_with("You acquire an intrinsic:")
            && (grammar::ITEM_NAMED.is_match(line) || grammar::ITEM_COUNTED.is_match(line))
    }

    fn parse(&self, line: &str, ctx: &mut ParseContext<'_>) {
        let (name, amount) = match grammar::ITEM_NAMED.captures(line) {
            Some(caps) => (caps[1].to_string(), 1),
            None => {
                let caps = grammar::ITEM_COUNTED
                    .captures(line)
                    .expect("item line matches the counted item grammar");
                (caps[1].to_string(), caps[2].parse::<u32>().unwrap_or(1).max(1))
            }
        };
        let turn = ctx.last_turn();
        ctx.with_current_turn(|t| t.add_item(Item::new(name, amount, turn)));
    }
}

struct SkillCastParser;

impl LineParser for SkillCastParser {
    fn is_compatible(&self, line: &str) -> bool {
        grammar::SKILL_CAST.is_match(line)
    }

    fn parse(&self, line: &str, ctx: &mut ParseContext<'_>) {
        let caps = grammar::SKILL_CAST
            .captures(line)
            .expect("skill line matches the cast grammar");
        let amount = caps[1].parse::<u32>().unwrap_or(1).max(1);
        let name = &caps[2];
        let turn = ctx.last_turn();
        ctx.with_current_turn(|t| t.add_skill(Skill::new(name, amount, skill_mp_cost(name), turn)));
    }
}

struct FamiliarChangeParser;

impl LineParser for FamiliarChangeParser {
    fn is_compatible(&self, line: &str) -> bool {
        grammar::FAMILIAR.is_match(line)
    }

    fn parse(&self, line: &str, ctx: &mut ParseContext<'_>) {
        let caps = grammar::FAMILIAR
            .captures(line)
            .expect("familiar line matches the familiar grammar");
        let turn = ctx.last_turn();
        ctx.tracker.change_familiar(FamiliarChange::new(&caps[1], turn));
    }
}

struct MeatGainedParser;

impl LineParser for MeatGainedParser {
    fn is_compatible(&self, line: &str) -> bool {
        grammar::MEAT_GAINED.is_match(line)
    }

    fn parse(&self, line: &str, ctx: &mut ParseContext<'_>) {
        let caps = grammar::MEAT_GAINED
            .captures(line)
            .expect("meat line matches the meat gain grammar");
        let Some(amount) = parse_count(&caps[1]) else {
            tracing::warn!(line, "meat amount out of range");
            return;
        };
        let gain = if ctx.in_encounter {
            MeatGain::new(amount, 0, 0)
        } else {
            MeatGain::new(0, amount, 0)
        };
        ctx.with_current_turn(|t| t.meat_gain += gain);
    }
}

struct MeatSpentParser;

impl LineParser for MeatSpentParser {
    fn is_compatible(&self, line: &str) -> bool {
        grammar::MEAT_SPENT.is_match(line) || grammar::MEAT_LOST.is_match(line)
    }

    fn parse(&self, line: &str, ctx: &mut ParseContext<'_>) {
        let caps = grammar::MEAT_SPENT
            .captures(line)
            .or_else(|| grammar::MEAT_LOST.captures(line))
            .expect("meat line matches the meat spent grammar");
        let Some(amount) = parse_count(&caps[1]) else {
            tracing::warn!(line, "meat amount out of range");
            return;
        };
        ctx.with_current_turn(|t| t.meat_gain += MeatGain::new(0, 0, amount));
    }
}

/// Substat change on a "You gain/lose N <substat>" line, if it is one.
pub(super) fn substat_gain(line: &str) -> Option<Statgain> {
    let caps = grammar::SUBSTAT.captures(line)?;
    let attribute = SUBSTATS.get(&caps[3])?;
    let amount = parse_count(&caps[2])?;
    let amount = if &caps[1] == "lose" { -amount } else { amount };
    Some(match attribute {
        Attribute::Muscle => Statgain::new(amount, 0, 0),
        Attribute::Myst => Statgain::new(0, amount, 0),
        Attribute::Moxie => Statgain::new(0, 0, amount),
    })
}

struct StatGainParser;

impl LineParser for StatGainParser {
    fn is_compatible(&self, line: &str) -> bool {
        substat_gain(line).is_some()
    }

    fn parse(&self, line: &str, ctx: &mut ParseContext<'_>) {
        let gain = substat_gain(line).expect("stat line matches the substat grammar");
        ctx.with_current_turn(|t| t.stat_gain += gain);
    }
}

struct LevelUpParser;

impl LineParser for LevelUpParser {
    fn is_compatible(&self, line: &str) -> bool {
        line.starts_with(grammar::LEVEL_GAINED)
    }

    fn parse(&self, _line: &str, ctx: &mut ParseContext<'_>) {
        let level = LevelData::new(ctx.log.next_level(), ctx.last_turn());
        tracing::debug!(level = level.level, turn = level.turn_reached, "level reached");
        ctx.log.add_level(level);
    }
}

struct MpGainParser;

impl LineParser for MpGainParser {
    fn is_compatible(&self, line: &str) -> bool {
        grammar::MP_GAINED.is_match(line)
    }

    fn parse(&self, line: &str, ctx: &mut ParseContext<'_>) {
        let caps = grammar::MP_GAINED
            .captures(line)
            .expect("MP line matches the MP gain grammar");
        let Some(amount) = parse_count(&caps[1]) else {
            tracing::warn!(line, "malformed MP amount, no gain recorded");
            return;
        };
        let gain = MpGain::from_source(ctx.mp_source, amount);
        ctx.with_current_turn(|t| t.mp_gain += gain);
    }
}

struct EquipmentChangeParser;

impl LineParser for EquipmentChangeParser {
    fn is_compatible(&self, line: &str) -> bool {
        grammar::EQUIP.is_match(line) || grammar::UNEQUIP.is_match(line)
    }

    fn parse(&self, line: &str, ctx: &mut ParseContext<'_>) {
        let (slot_name, item) = match grammar::UNEQUIP.captures(line) {
            Some(caps) => (caps[1].to_string(), String::new()),
            None => {
                let caps = grammar::EQUIP
                    .captures(line)
                    .expect("equipment line matches the equip grammar");
                (caps[1].to_string(), caps[2].to_string())
            }
        };
        let Some(slot) = EquipmentSlot::from_name(&slot_name) else {
            tracing::warn!(line, "unknown equipment slot");
            return;
        };
        let turn = ctx.last_turn();
        let change = ctx.tracker.current_equipment().with_slot(slot, item, turn);
        ctx.tracker.change_equipment(change);
    }
}

struct PullParser;

impl LineParser for PullParser {
    fn is_compatible(&self, line: &str) -> bool {
        grammar::PULL.is_match(line)
    }

    fn parse(&self, line: &str, ctx: &mut ParseContext<'_>) {
        let caps = grammar::PULL.captures(line).expect("pull line matches the pull grammar");
        let amount = caps[1].parse::<u32>().unwrap_or(1).max(1);
        let pull = Pull::new(&caps[2], amount, ctx.last_turn(), ctx.log.current_day());
        ctx.log.add_pull(pull);
    }
}

struct MpPoolBuffParser;

impl LineParser for MpPoolBuffParser {
    fn is_compatible(&self, line: &str) -> bool {
        grammar::EFFECT
            .captures(line)
            .is_some_and(|caps| MP_POOL_BUFFS.contains(&caps[1]))
    }

    fn parse(&self, line: &str, ctx: &mut ParseContext<'_>) {
        let caps = grammar::EFFECT.captures(line).expect("buff line matches the effect grammar");
        let buff = caps[1].to_string();
        ctx.with_current_turn(|t| {
            if !t.buffs.contains(&buff) {
                t.buffs.push(buff);
            }
        });
    }
}

struct DayChangeParser;

impl LineParser for DayChangeParser {
    fn is_compatible(&self, line: &str) -> bool {
        grammar::DAY_CHANGE.is_match(line)
    }

    fn parse(&self, line: &str, ctx: &mut ParseContext<'_>) {
        let caps = grammar::DAY_CHANGE
            .captures(line)
            .expect("day line matches the day change grammar");
        let day = match caps[1].parse::<u32>() {
            Ok(day) if day >= 1 => day,
            _ => {
                tracing::warn!(line, "invalid day number");
                return;
            }
        };
        let turn = ctx.last_turn();
        tracing::debug!(day, turn, "day change");
        ctx.log.add_day_change(DayChange::new(day, turn));
    }
}

struct LearnedSkillParser;

impl LineParser for LearnedSkillParser {
    fn is_compatible(&self, line: &str) -> bool {
        grammar::LEARNED_SKILL.is_match(line)
    }

    fn parse(&self, line: &str, ctx: &mut ParseContext<'_>) {
        let caps = grammar::LEARNED_SKILL
            .captures(line)
            .expect("skill line matches the learned skill grammar");
        let skill = LearnedSkill {
            name: caps[1].to_string(),
            turn: ctx.last_turn(),
            day: ctx.log.current_day(),
        };
        ctx.log.add_learned_skill(skill);
    }
}

struct NotesParser;

impl LineParser for NotesParser {
    fn is_compatible(&self, line: &str) -> bool {
        grammar::NOTE.is_match(line)
    }

    fn parse(&self, line: &str, ctx: &mut ParseContext<'_>) {
        let caps = grammar::NOTE.captures(line).expect("note line matches the note grammar");
        let note = caps[1].trim();
        if !note.is_empty() {
            ctx.with_current_turn(|t| t.add_note(note));
        }
    }
}
