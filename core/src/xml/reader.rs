//! Streaming state machine over quick-xml events.
//!
//! Elements directly under the root or under a container element are
//! records. A record's subtree is collected into a [`Node`] on a frame stack
//! and handed to the handler the element table names for it as soon as it
//! closes; containers themselves carry nothing.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use phf::phf_map;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::node::Node;
use crate::error::XmlReadError;
use crate::finalizer::Finalizer;
use crate::model::{
    AscensionLog, Banish, CombatRecord, Consumable, ConsumableVersion, DayChange,
    EquipmentChange, EquipmentSlot, FamiliarChange, Hybridization, Item, LearnedSkill, LevelData,
    LogMode, MeatGain, MpGain, PlayerSnapshot, Pull, SingleTurn, Skill, Statgain, TurnVersion,
};
use crate::tracker::ChangeTracker;

pub const SUPPORTED_VERSION: &str = "1";
const ROOT: &str = "ascension";

type RecordHandler = fn(&Node, &mut XmlState) -> Result<(), XmlReadError>;

#[derive(Clone, Copy)]
enum Element {
    Container,
    Record(RecordHandler),
}

static ELEMENTS: phf::Map<&'static str, Element> = phf_map! {
    "turnrundown" => Element::Container,
    "daychanges" => Element::Container,
    "levels" => Element::Container,
    "snapshots" => Element::Container,
    "pulls" => Element::Container,
    "huntedcombats" => Element::Container,
    "lostcombats" => Element::Container,
    "learnedskills" => Element::Container,
    "hybridizations" => Element::Container,
    "character" => Element::Record(read_character),
    "startdate" => Element::Record(read_start_date),
    "turninterval" => Element::Record(read_interval),
    "daychange" => Element::Record(read_day_change),
    "level" => Element::Record(read_level),
    "snapshot" => Element::Record(read_snapshot),
    "pull" => Element::Record(read_pull),
    "huntedcombat" => Element::Record(read_hunted_combat),
    "lostcombat" => Element::Record(read_lost_combat),
    "learnedskill" => Element::Record(read_learned_skill),
    "hybridization" => Element::Record(read_hybridization),
};

enum Frame {
    Root,
    Container,
    Open(Node),
}

struct XmlState {
    log: AscensionLog,
    tracker: ChangeTracker,
    /// Items listed on an interval rather than on one of its turns.
    interval_items: Vec<Item>,
    /// (end turn, pre comment, post comment) per commented interval.
    interval_comments: Vec<(u32, String, String)>,
}

pub fn read_xml_file(path: &Path) -> Result<AscensionLog, XmlReadError> {
    let file = File::open(path)?;
    read_xml_log(BufReader::new(file))
}

pub fn read_xml_str(xml: &str) -> Result<AscensionLog, XmlReadError> {
    read_xml_log(xml.as_bytes())
}

/// Rebuild a finalized session from its XML form.
pub fn read_xml_log<R: BufRead>(source: R) -> Result<AscensionLog, XmlReadError> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(true);

    let mut state = XmlState {
        log: AscensionLog::new(LogMode::Detailed),
        tracker: ChangeTracker::new(),
        interval_items: Vec::new(),
        interval_comments: Vec::new(),
    };
    let mut frames: Vec<Frame> = Vec::new();
    let mut seen_root = false;
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| stream_error(source, reader.error_position()))?;

        match event {
            Event::Start(e) => {
                let node = start_node(&e).map_err(|source| XmlReadError::Xml {
                    source,
                    position: reader.buffer_position(),
                })?;
                open_element(node, &mut frames, &mut seen_root)?;
            }
            Event::Empty(e) => {
                let node = start_node(&e).map_err(|source| XmlReadError::Xml {
                    source,
                    position: reader.buffer_position(),
                })?;
                open_element(node, &mut frames, &mut seen_root)?;
                close_element(&mut frames, &mut state)?;
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(|source| XmlReadError::Xml {
                    source,
                    position: reader.buffer_position(),
                })?;
                if let Some(Frame::Open(node)) = frames.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(Frame::Open(node)) = frames.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => close_element(&mut frames, &mut state)?,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(frame) = frames.last() {
        let element = match frame {
            Frame::Open(node) => node.name.clone(),
            Frame::Root | Frame::Container => ROOT.to_string(),
        };
        return Err(XmlReadError::Truncated { element });
    }
    if !seen_root {
        return Err(XmlReadError::Truncated {
            element: ROOT.to_string(),
        });
    }

    Ok(finish(state))
}

fn start_node(e: &BytesStart<'_>) -> Result<Node, quick_xml::Error> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(Node::new(name, attributes))
}

fn open_element(node: Node, frames: &mut Vec<Frame>, seen_root: &mut bool) -> Result<(), XmlReadError> {
    let frame = match frames.last() {
        None => {
            if node.name != ROOT || *seen_root {
                return Err(XmlReadError::Content {
                    element: node.name,
                    value: format!("expected a single <{ROOT}> root"),
                });
            }
            let version = node.attribute("version").unwrap_or_default();
            if version != SUPPORTED_VERSION {
                return Err(XmlReadError::UnsupportedVersion(version.to_string()));
            }
            *seen_root = true;
            Frame::Root
        }
        Some(Frame::Root | Frame::Container) => match ELEMENTS.get(node.name.as_str()) {
            Some(Element::Container) => Frame::Container,
            _ => Frame::Open(node),
        },
        Some(Frame::Open(_)) => Frame::Open(node),
    };
    frames.push(frame);
    Ok(())
}

fn close_element(frames: &mut Vec<Frame>, state: &mut XmlState) -> Result<(), XmlReadError> {
    let Some(Frame::Open(node)) = frames.pop() else {
        return Ok(());
    };
    if let Some(Frame::Open(parent)) = frames.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    match ELEMENTS.get(node.name.as_str()) {
        Some(Element::Record(handler)) => handler(&node, state),
        _ => {
            tracing::warn!(element = %node.name, "skipping unknown XML record");
            Ok(())
        }
    }
}

fn finish(mut state: XmlState) -> AscensionLog {
    let mut log = state.log;

    for item in state.interval_items.drain(..) {
        let target = log
            .turns_mut()
            .iter_mut()
            .rev()
            .find(|t| t.turn_number <= item.turn);
        match target {
            Some(turn) => turn.add_item(item),
            None => tracing::warn!(item = %item.name, turn = item.turn, "item dropped before the first turn"),
        }
    }

    Finalizer::for_xml_log().finalize(&mut log);

    for (end_turn, pre, post) in state.interval_comments {
        match log.rundown_mut().iter_mut().find(|i| i.end_turn() == end_turn) {
            Some(interval) => {
                interval.pre_comment = pre;
                interval.post_comment = post;
            }
            None => tracing::debug!(end_turn, "no interval to attach comments to"),
        }
    }

    log
}

/// A read failure under the parser is still an I/O failure, not bad XML.
fn stream_error(source: quick_xml::Error, position: u64) -> XmlReadError {
    match source {
        quick_xml::Error::Io(e) => XmlReadError::Io(
            Arc::try_unwrap(e).unwrap_or_else(|shared| io::Error::new(shared.kind(), shared.to_string())),
        ),
        source => XmlReadError::Xml { source, position },
    }
}

fn content(element: &str, value: impl Into<String>) -> XmlReadError {
    XmlReadError::Content {
        element: element.to_string(),
        value: value.into(),
    }
}

/// Number that must be at least 1 (amounts, days, levels).
fn positive(node: &Node, name: &str) -> Result<u32, XmlReadError> {
    let value: u32 = node.number(name)?;
    if value == 0 {
        return Err(content(name, "0"));
    }
    Ok(value)
}

fn read_character(node: &Node, state: &mut XmlState) -> Result<(), XmlReadError> {
    let character = &mut state.log.character;
    character.name = node.text_of("name").to_string();
    character.class = node.text_of("class").to_string();
    character.game_mode = node.text_of("gamemode").to_string();
    character.path = node.text_of("path").to_string();
    character.ascension_number = match node.text_of("ascensionnumber") {
        "" => None,
        _ => Some(node.number("ascensionnumber")?),
    };
    Ok(())
}

fn read_start_date(node: &Node, state: &mut XmlState) -> Result<(), XmlReadError> {
    let text = node.text.trim();
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| content("startdate", text))?;
    state.log.start_date = Some(date);
    Ok(())
}

fn read_interval(node: &Node, state: &mut XmlState) -> Result<(), XmlReadError> {
    for turn in node.children_named("turn") {
        read_turn(turn, state)?;
    }
    for item in node.children_named("itemdrop") {
        state.interval_items.push(read_item(item)?);
    }
    let pre = node.text_of("precomment");
    let post = node.text_of("postcomment");
    if !pre.is_empty() || !post.is_empty() {
        let end_turn = node.number("endturn")?;
        state
            .interval_comments
            .push((end_turn, pre.to_string(), post.to_string()));
    }
    Ok(())
}

fn read_turn(node: &Node, state: &mut XmlState) -> Result<(), XmlReadError> {
    let number: u32 = node.number("turnnumber")?;
    if state.log.last_turn().is_some_and(|last| number < last.turn_number) {
        return Err(content("turnnumber", number.to_string()));
    }
    let day = positive(node, "daynumber")?;
    let mut turn = SingleTurn::new(
        node.text_of("areaname"),
        node.text_of("encountername"),
        number,
        day,
    );

    turn.version = match node.text_of("turnversion") {
        "" => TurnVersion::NotDefined,
        v => TurnVersion::from_name(v).ok_or_else(|| content("turnversion", v))?,
    };
    turn.turns_spent = node.number("turnsspent")?;
    turn.disintegrated = node.boolean("disintegrated")?;
    turn.free_runaways = node.number("freerunaways")?;
    turn.notes = node.optional_text("notes");

    // A change recorded on a turn took effect right before it
    let changed_at = number.saturating_sub(1);
    if let Some(familiar) = node.child("familiar") {
        let name = familiar.text_of("name");
        if !name.is_empty() {
            state
                .tracker
                .change_familiar(FamiliarChange::new(name, changed_at));
        }
    }
    turn.familiar = state.tracker.current_familiar().clone();

    if let Some(equipment) = node.child("equipment") {
        let mut change = EquipmentChange::none(changed_at);
        for slot in EquipmentSlot::ALL {
            change.set_slot(slot, equipment.text_of(slot.key()));
        }
        state.tracker.change_equipment(change);
    }
    turn.equipment = state.tracker.current_equipment().clone();

    if let Some(stats) = node.child("statgain") {
        turn.stat_gain = read_statgain(stats)?;
    }
    if let Some(meat) = node.child("meatgain") {
        turn.meat_gain = MeatGain::new(
            meat.number("encounter")?,
            meat.number("other")?,
            meat.number("spent")?,
        );
    }
    if let Some(mp) = node.child("mpgain") {
        turn.mp_gain = MpGain::new(
            mp.number("encounter")?,
            mp.number("starfish")?,
            mp.number("resting")?,
            mp.number("outofencounter")?,
            mp.number("consumable")?,
        );
    }

    for item in node.children_named("itemdrop") {
        turn.items.push(read_item(item)?);
    }
    for skill in node.children_named("skillcast") {
        turn.skills.push(Skill::new(
            skill.text_of("name"),
            positive(skill, "amount")?,
            skill.number("mpcost")?,
            skill.number("turn")?,
        ));
    }
    for consumable in node.children_named("consumable") {
        turn.consumables.push(read_consumable(consumable)?);
    }
    if let Some(banish) = node.child("banish") {
        turn.banish = Some(Banish {
            banisher: banish.text_of("banisher").to_string(),
            monster: banish.text_of("monster").to_string(),
            turn: banish.number("turn")?,
        });
    }
    turn.buffs = node
        .children_named("buff")
        .map(|b| b.text.trim().to_string())
        .collect();

    state.log.add_turn_as_is(turn);
    Ok(())
}

fn read_statgain(node: &Node) -> Result<Statgain, XmlReadError> {
    Ok(Statgain::new(
        node.number("muscle")?,
        node.number("myst")?,
        node.number("moxie")?,
    ))
}

fn read_item(node: &Node) -> Result<Item, XmlReadError> {
    Ok(Item::new(
        node.text_of("name"),
        positive(node, "amount")?,
        node.number("turn")?,
    ))
}

fn read_consumable(node: &Node) -> Result<Consumable, XmlReadError> {
    let version_name = node.text_of("version");
    let version =
        ConsumableVersion::from_name(version_name).ok_or_else(|| content("version", version_name))?;
    let mut consumable = Consumable::new(
        node.text_of("name"),
        node.number("adventuregain")?,
        positive(node, "amount")?,
        node.number("turn")?,
        version,
    )
    .with_day(positive(node, "day")?);
    if let Some(stats) = node.child("statgain") {
        consumable = consumable.with_stat_gain(read_statgain(stats)?);
    }
    Ok(consumable)
}

fn read_day_change(node: &Node, state: &mut XmlState) -> Result<(), XmlReadError> {
    let day = positive(node, "day")?;
    state
        .log
        .add_day_change(DayChange::new(day, node.number("turn")?));
    let header = node.text_of("header");
    let footer = node.text_of("footer");
    if !header.is_empty() || !footer.is_empty() {
        let comments = state.log.day_comments_mut(day);
        comments.header = header.to_string();
        comments.footer = footer.to_string();
    }
    Ok(())
}

fn read_level(node: &Node, state: &mut XmlState) -> Result<(), XmlReadError> {
    let level = LevelData::new(positive(node, "number")?, node.number("turn")?);
    state.log.add_level(level);
    Ok(())
}

fn read_snapshot(node: &Node, state: &mut XmlState) -> Result<(), XmlReadError> {
    let mut snapshot = PlayerSnapshot::new(positive(node, "day")?, node.number("turn")?);
    snapshot.muscle = node.number("muscle")?;
    snapshot.myst = node.number("myst")?;
    snapshot.moxie = node.number("moxie")?;
    snapshot.meat = node.number("meat")?;
    snapshot.adventures = node.number("adventures")?;
    snapshot.fullness = node.number("fullness")?;
    snapshot.drunkenness = node.number("drunkenness")?;
    snapshot.spleen = node.number("spleen")?;
    snapshot.familiar = node.optional_text("familiar");
    if let Some(equipment) = node.child("equipment") {
        let mut change = EquipmentChange::none(snapshot.turn);
        for slot in EquipmentSlot::ALL {
            change.set_slot(slot, equipment.text_of(slot.key()));
        }
        snapshot.equipment = Some(change);
    }
    state.log.add_snapshot(snapshot);
    Ok(())
}

fn read_pull(node: &Node, state: &mut XmlState) -> Result<(), XmlReadError> {
    let pull = Pull::new(
        node.text_of("name"),
        positive(node, "amount")?,
        node.number("turn")?,
        positive(node, "day")?,
    );
    state.log.add_pull(pull);
    Ok(())
}

fn read_combat(node: &Node) -> Result<CombatRecord, XmlReadError> {
    Ok(CombatRecord::new(node.text_of("name"), node.number("turn")?))
}

fn read_hunted_combat(node: &Node, state: &mut XmlState) -> Result<(), XmlReadError> {
    state.log.add_hunted_combat(read_combat(node)?);
    Ok(())
}

fn read_lost_combat(node: &Node, state: &mut XmlState) -> Result<(), XmlReadError> {
    state.log.add_lost_combat(read_combat(node)?);
    Ok(())
}

fn read_learned_skill(node: &Node, state: &mut XmlState) -> Result<(), XmlReadError> {
    state.log.add_learned_skill(LearnedSkill {
        name: node.text_of("name").to_string(),
        turn: node.number("turn")?,
        day: positive(node, "day")?,
    });
    Ok(())
}

fn read_hybridization(node: &Node, state: &mut XmlState) -> Result<(), XmlReadError> {
    state.log.add_hybridization(Hybridization {
        phylum: node.text_of("phylum").to_string(),
        effect: node.optional_text("effect"),
        turn: node.number("turn")?,
        day: positive(node, "day")?,
    });
    Ok(())
}
