//! Reader for turn rundowns exported as text.
//!
//! A preparsed log has already been through the rundown once, so it carries
//! intervals instead of single turns. Interval headers open an interval;
//! indented marker lines below a header belong to it.
//!
//! ```text
//! ===Day 1===
//! [0] Ascension Start
//! [1-3] The Spooky Forest
//!     Stat gain: 12/3/-1
//!     Meat: gained 140, spent 0
//!     +> Got spooky sapling
//!     -> Turn [2] Mosquito
//! Level 2 reached on turn 3
//! ```

use std::io::{BufRead, Cursor};
use std::path::Path;

use crate::error::{ParseError, ReadError};
use crate::finalizer::Finalizer;
use crate::grammar::{self, parse_count, pattern};
use crate::model::{
    AscensionLog, CombatRecord, Consumable, ConsumableVersion, DayChange, FamiliarChange, Item,
    LevelData, LogMode, MeatGain, Pull, SimpleTurnInterval, Statgain, TurnInterval,
};
use crate::source;

pattern!(INTERVAL_HEADER, r"^\[(\d+)(?:-(\d+))?\] (.+)$");
pattern!(ITEM_MARKER, r"^\+> Got (.+?)(?: \((\d+)\))?$");
pattern!(CONSUMED_MARKER, r"^o> (Ate|Drank|Chewed|Used) (\d+) (.+?)(?: \((\d+) adventures?\))?$");
pattern!(FAMILIAR_MARKER, r"^-> Turn \[(\d+)\] (.+)$");
pattern!(PULL_MARKER, r"^#> Turn \[(\d+)\] pulled (\d+) (.+)$");
pattern!(BAD_MOON_MARKER, r"^%> Turn \[(\d+)\] (.+)$");
pattern!(HUNT_MARKER, r"^\*> Turn \[(\d+)\] Started hunting (.+)$");
pattern!(DISINTEGRATE_MARKER, r"^\}> Turn \[(\d+)\] Disintegrated (.+)$");
pattern!(RUNAWAY_MARKER, r"^&> Turn \[(\d+)\] Free runaway");
pattern!(STAT_LINE, r"^Stat gain: (-?[\d,]+)/(-?[\d,]+)/(-?[\d,]+)$");
pattern!(MEAT_LINE, r"^Meat: gained (-?[\d,]+), spent (-?[\d,]+)$");
pattern!(LEVEL_LINE, r"^Level (\d+) reached on turn (\d+)$");

/// Whether a file looks like a preparsed rundown rather than a raw log.
pub fn is_preparsed(bytes: &[u8]) -> bool {
    source::contains_marker(bytes, "[0] Ascension Start")
}

/// The interval being filled, with its report comments.
struct Pending {
    interval: SimpleTurnInterval,
    pre_comment: String,
    post_comment: String,
}

impl Pending {
    fn flush(self, log: &mut AscensionLog) {
        let mut interval = TurnInterval::simple(self.interval);
        interval.pre_comment = self.pre_comment;
        interval.post_comment = self.post_comment;
        log.add_interval(interval);
    }
}

struct PreparsedState {
    log: AscensionLog,
    pending: Option<Pending>,
    familiars: Vec<FamiliarChange>,
    line: usize,
}

impl PreparsedState {
    fn last_turn(&self) -> u32 {
        self.pending
            .as_ref()
            .map(|p| p.interval.end_turn)
            .unwrap_or_else(|| self.log.last_turn_number())
    }

    fn structure_error(&self, message: impl Into<String>) -> ParseError {
        ParseError::Structure {
            last_turn: self.last_turn(),
            message: format!("{} (line {})", message.into(), self.line),
        }
    }

    fn interval(&mut self, line: &str) -> Result<&mut Pending, ParseError> {
        let error = ParseError::Structure {
            last_turn: self.last_turn(),
            message: format!("{line:?} outside of any interval (line {})", self.line),
        };
        self.pending.as_mut().ok_or(error)
    }

    fn start_interval(&mut self, first: u32, last: u32, area: &str) -> Result<(), ParseError> {
        if last < first {
            return Err(self.structure_error(format!("interval [{first}-{last}] runs backwards")));
        }
        if let Some(done) = self.pending.take() {
            done.flush(&mut self.log);
        }
        let start = first.saturating_sub(1);
        let end = if first == 0 { 0 } else { last };
        self.pending = Some(Pending {
            interval: SimpleTurnInterval::new(area, start, end),
            pre_comment: String::new(),
            post_comment: String::new(),
        });
        Ok(())
    }

    fn read_line(&mut self, raw: &str) -> Result<(), ParseError> {
        let line = raw.trim();
        if line.is_empty() {
            return Ok(());
        }

        if let Some(caps) = grammar::DAY_CHANGE.captures(line) {
            match caps[1].parse::<u32>() {
                Ok(day) if day >= 1 => {
                    let turn = self.last_turn();
                    self.log.add_day_change(DayChange::new(day, turn));
                }
                _ => tracing::warn!(line, "invalid day number"),
            }
            return Ok(());
        }
        if let Some(caps) = INTERVAL_HEADER.captures(line) {
            let first = caps[1]
                .parse::<u32>()
                .map_err(|_| self.structure_error(format!("bad turn in {line:?}")))?;
            let last = match caps.get(2) {
                Some(m) => m
                    .as_str()
                    .parse::<u32>()
                    .map_err(|_| self.structure_error(format!("bad turn in {line:?}")))?,
                None => first,
            };
            return self.start_interval(first, last, caps[3].trim());
        }
        if let Some(caps) = LEVEL_LINE.captures(line) {
            let level = caps[1].parse::<u32>().unwrap_or(0);
            let turn = caps[2].parse::<u32>().unwrap_or(0);
            if level == 0 {
                tracing::warn!(line, "level 0 in rundown");
            } else {
                self.log.add_level(LevelData::new(level, turn));
            }
            return Ok(());
        }

        if let Some(comment) = line.strip_prefix("Pre:") {
            self.interval(line)?.pre_comment = comment.trim().to_string();
        } else if let Some(comment) = line.strip_prefix("Post:") {
            self.interval(line)?.post_comment = comment.trim().to_string();
        } else if let Some(caps) = STAT_LINE.captures(line) {
            let gain = Statgain::new(
                parse_count(&caps[1]).unwrap_or_default(),
                parse_count(&caps[2]).unwrap_or_default(),
                parse_count(&caps[3]).unwrap_or_default(),
            );
            self.interval(line)?.interval.stat_gain = gain;
        } else if let Some(caps) = MEAT_LINE.captures(line) {
            let gained = parse_count(&caps[1]).unwrap_or_default();
            let spent = parse_count(&caps[2]).unwrap_or_default();
            self.interval(line)?.interval.meat_gain = MeatGain::new(gained, 0, spent);
        } else if let Some(caps) = ITEM_MARKER.captures(line) {
            let amount = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .unwrap_or(1)
                .max(1);
            let pending = self.interval(line)?;
            let item = Item::new(&caps[1], amount, pending.interval.end_turn);
            match pending.interval.items.iter_mut().find(|i| i.name == item.name) {
                Some(existing) => existing.amount += item.amount,
                None => pending.interval.items.push(item),
            }
        } else if let Some(caps) = CONSUMED_MARKER.captures(line) {
            let version = match &caps[1] {
                "Ate" => ConsumableVersion::Food,
                "Drank" => ConsumableVersion::Booze,
                "Chewed" => ConsumableVersion::Spleen,
                _ => ConsumableVersion::Other,
            };
            let amount = caps[2].parse::<u32>().unwrap_or(1).max(1);
            let adventures = caps
                .get(4)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .unwrap_or(0);
            let day = self.log.current_day();
            let pending = self.interval(line)?;
            let consumable = Consumable::new(
                caps[3].trim(),
                adventures,
                amount,
                pending.interval.end_turn,
                version,
            )
            .with_day(day);
            pending.interval.consumables.push(consumable);
        } else if let Some(caps) = PULL_MARKER.captures(line) {
            let turn = caps[1].parse::<u32>().unwrap_or_default();
            let amount = caps[2].parse::<u32>().unwrap_or(1).max(1);
            let day = self.log.current_day();
            self.log.add_pull(Pull::new(caps[3].trim(), amount, turn, day));
        } else if let Some(caps) = HUNT_MARKER.captures(line) {
            let turn = caps[1].parse::<u32>().unwrap_or_default();
            self.log
                .add_hunted_combat(CombatRecord::new(caps[2].trim(), turn));
        } else if DISINTEGRATE_MARKER.is_match(line) {
            self.interval(line)?.interval.disintegrations += 1;
        } else if RUNAWAY_MARKER.is_match(line) {
            self.interval(line)?.interval.free_runaways += 1;
        } else if let Some(caps) = FAMILIAR_MARKER.captures(line) {
            let turn = caps[1].parse::<u32>().unwrap_or_default();
            let name = caps[2].trim();
            if self.familiars.last().is_none_or(|f| f.name != name) {
                self.familiars.push(FamiliarChange::new(name, turn));
            }
        } else if let Some(caps) = BAD_MOON_MARKER.captures(line) {
            let note = format!("Turn {}: {}", &caps[1], caps[2].trim());
            self.interval(line)?.interval.notes.push(note);
        } else {
            tracing::debug!(line = self.line, text = line, "unrecognized rundown line");
        }
        Ok(())
    }
}

pub fn parse_preparsed_str(text: &str) -> Result<AscensionLog, ParseError> {
    parse_preparsed(Cursor::new(text.as_bytes()))
}

pub fn parse_preparsed_file(path: &Path) -> Result<AscensionLog, ParseError> {
    let text = source::read_log_text(path).map_err(|e| ParseError::Read {
        source: ReadError::Io(e),
        last_turn: 0,
    })?;
    parse_preparsed_named(&text, path)
}

/// Parse rundown text already loaded from `path`.
pub fn parse_preparsed_named(text: &str, path: &Path) -> Result<AscensionLog, ParseError> {
    let mut log = parse_preparsed_str(text)?;
    if let Some((name, date)) = source::file_metadata(path) {
        log.character.name = name;
        log.start_date = Some(date);
    }
    Ok(log)
}

/// Read a preparsed rundown into a finalized interval-mode session.
pub fn parse_preparsed<R: BufRead>(reader: R) -> Result<AscensionLog, ParseError> {
    let mut state = PreparsedState {
        log: AscensionLog::new(LogMode::Preparsed),
        pending: None,
        familiars: Vec::new(),
        line: 0,
    };

    for line in reader.lines() {
        state.line += 1;
        let line = line.map_err(|e| ParseError::Read {
            source: ReadError::Io(e),
            last_turn: state.last_turn(),
        })?;
        state.read_line(&line)?;
    }

    let PreparsedState {
        mut log,
        pending,
        familiars,
        ..
    } = state;
    if let Some(done) = pending {
        done.flush(&mut log);
    }
    log.replace_changes(familiars, Vec::new());

    Finalizer::for_preparsed().finalize(&mut log);
    tracing::debug!(intervals = log.intervals().len(), "preparsed log read");
    Ok(log)
}
