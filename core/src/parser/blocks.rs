//! Parsers for the structured block kinds.

use super::ParseContext;
use super::lines::{LineChain, substat_gain};
use crate::error::ParseError;
use crate::game_data::{BANISHERS, DISINTEGRATORS, HUNTERS, is_runaway_source, skill_mp_cost};
use crate::grammar::{self, parse_count};
use crate::model::{
    Banish, CombatRecord, Consumable, ConsumableVersion, EquipmentChange, EquipmentSlot,
    FamiliarChange, Hybridization, MpSource, PlayerSnapshot, SingleTurn, Skill, Statgain,
    TurnVersion,
};
use crate::reader::LogBlock;

pub const COMMUNITY_SERVICE_AREA: &str = "Community Service";
pub const COMBING_AREA: &str = "The Beach (Combing)";

fn structure_error(ctx: &ParseContext<'_>, block: &LogBlock, message: impl Into<String>) -> ParseError {
    ParseError::Structure {
        last_turn: ctx.last_turn(),
        message: format!("{} (block at line {})", message.into(), block.start_line),
    }
}

/// Start a new turn wearing the tracked familiar and equipment.
fn begin_turn(ctx: &mut ParseContext<'_>, area: &str, encounter: &str, turn_number: u32) {
    let mut turn = SingleTurn::new(area, encounter, turn_number, ctx.log.current_day());
    turn.familiar = ctx.tracker.current_familiar().clone();
    turn.equipment = ctx.tracker.current_equipment().clone();
    ctx.log.add_turn(turn);
}

pub(super) fn parse_encounter(
    block: &LogBlock,
    ctx: &mut ParseContext<'_>,
    chain: &LineChain,
) -> Result<(), ParseError> {
    let first = block.first_line();
    let mut rest = 1;

    if let Some(caps) = grammar::ADVENTURE.captures(first) {
        let turn_number: u32 = caps[1]
            .parse()
            .map_err(|_| structure_error(ctx, block, format!("bad turn number in {first:?}")))?;
        let area = caps[2].trim();
        begin_turn(ctx, area, area, turn_number);
    } else if let Some(skill) = grammar::proxy_skill(first) {
        let turn_number = ctx.last_turn() + 1;
        begin_turn(ctx, skill, skill, turn_number);
        let turn = ctx.last_turn();
        ctx.with_current_turn(|t| t.add_skill(Skill::new(skill, 1, skill_mp_cost(skill), turn)));
    } else if let Some((area, cost)) = block.lines.get(1).and_then(|l| grammar::nonstandard_area(l)) {
        let turn_number = ctx.last_turn() + cost;
        begin_turn(ctx, area, area, turn_number);
        rest = 2;
    } else {
        return Err(structure_error(ctx, block, format!("not an encounter: {first:?}")));
    }

    ctx.in_encounter = true;
    let mut saw_encounter = rest == 2;
    let mut saw_round = false;
    let mut previous = first;

    for line in &block.lines[rest..] {
        let line = line.as_str();
        if grammar::is_blank(line) {
            continue;
        }
        ctx.mp_source = if previous.to_lowercase().contains("starfish") {
            MpSource::Starfish
        } else {
            MpSource::Encounter
        };
        previous = line;

        if let Some(caps) = grammar::ENCOUNTER.captures(line) {
            let name = caps[1].to_string();
            ctx.with_current_turn(|t| t.encounter = name);
            saw_encounter = true;
            continue;
        }
        if grammar::COMBAT_ROUND.is_match(line) {
            saw_round = true;
            parse_combat_line(line, ctx);
            continue;
        }
        if line == grammar::COMBAT_LOST {
            let turn = ctx.last_turn();
            let monster = ctx.current_encounter();
            ctx.log.add_lost_combat(CombatRecord::new(monster, turn));
            continue;
        }
        chain.dispatch(line, ctx);
    }

    let version = if saw_round {
        TurnVersion::Combat
    } else if saw_encounter {
        TurnVersion::Noncombat
    } else {
        TurnVersion::Other
    };
    ctx.with_current_turn(|t| {
        if t.version == TurnVersion::NotDefined {
            t.version = version;
        }
    });
    Ok(())
}

/// Round lines: skills, items and runaways.
fn parse_combat_line(line: &str, ctx: &mut ParseContext<'_>) {
    if let Some(caps) = grammar::COMBAT_SKILL.captures(line) {
        let skill = caps[1].to_string();
        let turn = ctx.last_turn();
        let cost = skill_mp_cost(&skill);
        ctx.with_current_turn(|t| t.add_skill(Skill::new(skill.as_str(), 1, cost, turn)));
        apply_combat_action(&skill, ctx);
    } else if let Some(caps) = grammar::COMBAT_ITEM.captures(line) {
        let items: Vec<String> = [caps.get(1), caps.get(2)]
            .into_iter()
            .flatten()
            .map(|m| m.as_str().to_string())
            .collect();
        for item in items {
            apply_combat_action(&item, ctx);
        }
    } else if grammar::COMBAT_RUNAWAY.is_match(line) {
        let familiar = ctx.tracker.current_familiar().name.clone();
        if is_runaway_source(&familiar, ctx.tracker.current_equipment()) {
            tracing::debug!(turn = ctx.last_turn(), "free runaway");
            ctx.log.mark_free_runaway();
        }
    }
}

/// Hunting, disintegration and banishing by skill or item name.
fn apply_combat_action(action: &str, ctx: &mut ParseContext<'_>) {
    let turn = ctx.last_turn();
    let monster = ctx.current_encounter();
    if HUNTERS.contains(action) {
        ctx.log.add_hunted_combat(CombatRecord::new(monster.as_str(), turn));
    }
    if DISINTEGRATORS.contains(action) {
        ctx.with_current_turn(|t| t.disintegrated = true);
    }
    if BANISHERS.contains(action) {
        let banish = Banish {
            banisher: action.to_string(),
            monster,
            turn,
        };
        ctx.with_current_turn(|t| t.banish = Some(banish));
    }
}

pub(super) fn parse_consumable(
    block: &LogBlock,
    ctx: &mut ParseContext<'_>,
    chain: &LineChain,
) -> Result<(), ParseError> {
    let first = block.first_line();
    let caps = grammar::CONSUMABLE
        .captures(first)
        .ok_or_else(|| structure_error(ctx, block, format!("not a consumable: {first:?}")))?;
    let verb = caps[1].to_string();
    let amount = caps[2].parse::<u32>().unwrap_or(1).max(1);
    let name = caps[3].trim().to_string();

    let version = match verb.as_str() {
        "eat" | "eatsilent" => Some(ConsumableVersion::Food),
        "drink" | "overdrink" => Some(ConsumableVersion::Booze),
        "chew" => Some(ConsumableVersion::Spleen),
        "use" => Some(ConsumableVersion::Other),
        _ => None,
    };

    ctx.in_encounter = false;
    ctx.mp_source = MpSource::Consumable;
    let mut adventures = 0u32;
    let mut stats = Statgain::NONE;

    for line in &block.lines[1..] {
        if let Some(caps) = grammar::ADVENTURES_GAINED.captures(line) {
            adventures += parse_count(&caps[1]).unwrap_or(0).max(0) as u32;
            continue;
        }
        if let Some(gain) = substat_gain(line) {
            stats += gain;
        }
        // Purchases are not drops
        if version.is_none() && line.starts_with("You acquire") {
            continue;
        }
        chain.dispatch(line, ctx);
    }

    let Some(version) = version else {
        return Ok(());
    };
    if version == ConsumableVersion::Other && adventures == 0 && stats.is_none() {
        return Ok(());
    }

    let consumable = Consumable::new(name, adventures, amount, ctx.last_turn(), version)
        .with_day(ctx.log.current_day())
        .with_stat_gain(stats);
    ctx.with_current_turn(|t| t.add_consumable(consumable));
    Ok(())
}

pub(super) fn parse_snapshot(block: &LogBlock, ctx: &mut ParseContext<'_>) -> Result<(), ParseError> {
    let mut snapshot = PlayerSnapshot::new(ctx.log.current_day(), ctx.last_turn());
    let mut equipment: Option<EquipmentChange> = None;

    // Delimiter, title and delimiter come first
    for line in block.lines.iter().skip(3) {
        if grammar::is_delimiter(line) {
            break;
        }
        let Some(caps) = grammar::SNAPSHOT_ENTRY.captures(line) else {
            continue;
        };
        let key = caps[1].trim().to_lowercase();
        let value = caps[2].trim();
        let number = || parse_count(value);

        match key.as_str() {
            "name" => {
                if ctx.log.character.name.is_empty() {
                    ctx.log.character.name = value.to_string();
                }
            }
            "class" => {
                if ctx.log.character.class.is_empty() {
                    ctx.log.character.class = value.to_string();
                }
            }
            "day" => match number() {
                Some(day) if day >= 1 => snapshot.day = day as u32,
                _ => tracing::warn!(line = %line, "snapshot day is not a number"),
            },
            "turn" | "turns played" => match number() {
                Some(turn) if turn >= 0 => snapshot.turn = turn as u32,
                _ => tracing::warn!(line = %line, "snapshot turn is not a number"),
            },
            "muscle" => snapshot.muscle = number().unwrap_or_default(),
            "mysticality" => snapshot.myst = number().unwrap_or_default(),
            "moxie" => snapshot.moxie = number().unwrap_or_default(),
            "meat" => snapshot.meat = value.replace(',', "").parse().unwrap_or_default(),
            "adventures" => snapshot.adventures = number().unwrap_or_default(),
            "fullness" => snapshot.fullness = number().unwrap_or_default(),
            "drunkenness" => snapshot.drunkenness = number().unwrap_or_default(),
            "spleen" => snapshot.spleen = number().unwrap_or_default(),
            "familiar" => {
                let name = value.split(" (").next().unwrap_or(value).trim();
                if !name.is_empty() {
                    snapshot.familiar = Some(name.to_string());
                }
            }
            other => {
                let Some(slot) = EquipmentSlot::from_name(&other.replace(' ', "")) else {
                    continue;
                };
                equipment
                    .get_or_insert_with(|| EquipmentChange::none(snapshot.turn))
                    .set_slot(slot, value);
            }
        }
    }

    if let Some(familiar) = &snapshot.familiar {
        ctx.tracker
            .change_familiar(FamiliarChange::new(familiar.as_str(), snapshot.turn));
    }
    if let Some(equipment) = &mut equipment {
        equipment.turn = snapshot.turn;
        ctx.tracker.change_equipment(equipment.clone());
    }
    snapshot.equipment = equipment;
    ctx.log.add_snapshot(snapshot);
    Ok(())
}

pub(super) fn parse_ascension_data(
    block: &LogBlock,
    ctx: &mut ParseContext<'_>,
) -> Result<(), ParseError> {
    let first = block.first_line();
    let caps = grammar::ASCENSION
        .captures(first)
        .ok_or_else(|| structure_error(ctx, block, format!("not ascension data: {first:?}")))?;
    ctx.log.character.ascension_number = caps[1].parse().ok();

    if let Some(line) = block.lines.get(1) {
        let (mode, class) = line.trim().split_once(' ').unwrap_or((line.trim(), ""));
        ctx.log.character.game_mode = mode.to_string();
        if !class.is_empty() {
            ctx.log.character.class = class.to_string();
        }
    }
    if let Some(path) = block.lines.get(2) {
        ctx.log.character.path = path.trim().to_string();
    }
    tracing::debug!(character = ?ctx.log.character, "ascension data");
    Ok(())
}

pub(super) fn parse_hybrid_data(
    block: &LogBlock,
    ctx: &mut ParseContext<'_>,
) -> Result<(), ParseError> {
    let first = block.first_line();
    let caps = grammar::HYBRID
        .captures(first)
        .ok_or_else(|| structure_error(ctx, block, format!("not a hybridization: {first:?}")))?;
    let phylum = caps[1].to_string();
    let effect = block.lines[1..].iter().find_map(|line| {
        line.strip_prefix("You acquire an intrinsic: ")
            .or_else(|| line.strip_prefix("You acquire an effect: "))
            .map(|e| e.split(" (").next().unwrap_or(e).trim().to_string())
    });
    let hybrid = Hybridization {
        phylum,
        effect,
        turn: ctx.last_turn(),
        day: ctx.log.current_day(),
    };
    ctx.log.add_hybridization(hybrid);
    Ok(())
}

pub(super) fn parse_service(block: &LogBlock, ctx: &mut ParseContext<'_>) -> Result<(), ParseError> {
    let first = block.first_line();
    let caps = grammar::SERVICE
        .captures(first)
        .ok_or_else(|| structure_error(ctx, block, format!("not a service: {first:?}")))?;
    let mut service = caps[2].trim().to_string();
    if let Some(caps) = block.lines.get(2).and_then(|l| grammar::SERVICE_NAME.captures(l)) {
        service = caps[1].trim().to_string();
    }
    let turns_used: u32 = block
        .lines
        .get(3)
        .and_then(|l| grammar::TURNS_USED.captures(l))
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| structure_error(ctx, block, "service block without turns used"))?;

    let turn_number = ctx.last_turn() + turns_used;
    begin_turn(ctx, COMMUNITY_SERVICE_AREA, &service, turn_number);
    ctx.with_current_turn(|t| t.version = TurnVersion::Noncombat);
    Ok(())
}

pub(super) fn parse_combing(
    block: &LogBlock,
    ctx: &mut ParseContext<'_>,
    chain: &LineChain,
) -> Result<(), ParseError> {
    let turn_number = ctx.last_turn();
    begin_turn(ctx, COMBING_AREA, block.first_line().trim(), turn_number);
    ctx.with_current_turn(|t| t.version = TurnVersion::Other);
    ctx.in_encounter = false;
    ctx.mp_source = MpSource::OutOfEncounter;
    for line in &block.lines[1..] {
        chain.dispatch(line, ctx);
    }
    Ok(())
}

pub(super) fn parse_other(block: &LogBlock, ctx: &mut ParseContext<'_>, chain: &LineChain) {
    ctx.in_encounter = false;
    ctx.mp_source = if block.first_line().to_lowercase().starts_with("rest") {
        MpSource::Resting
    } else {
        MpSource::OutOfEncounter
    };
    for line in &block.lines {
        chain.dispatch(line, ctx);
    }
}
