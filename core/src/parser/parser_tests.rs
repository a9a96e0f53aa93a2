use rundown_types::ParserSettings;

use super::*;
use crate::model::{ConsumableVersion, Turn, TurnVersion};

fn parse(text: &str) -> AscensionLog {
    MafiaLogParser::default().parse_str(text).unwrap()
}

fn turn<'a>(log: &'a AscensionLog, number: u32) -> &'a SingleTurn {
    log.turns()
        .iter()
        .find(|t| t.turn_number == number)
        .unwrap_or_else(|| panic!("no turn {number}"))
}

#[test]
fn test_combat_encounter() {
    let log = parse(
        "\
[1] The Spooky Forest
Encounter: spooky vampire
Round 1: Xenia casts SAUCESTORM!
Round 2: Xenia wins the fight!
You acquire an item: spooky sapling
You acquire ten-leaf clover (2)
You gain 20 Meat
You gain 5 Strongness
You lose 2 Cheek
You gain 8 Mana Points
",
    );
    let t = turn(&log, 1);
    assert_eq!(t.area, "The Spooky Forest");
    assert_eq!(t.encounter, "spooky vampire");
    assert_eq!(t.version, TurnVersion::Combat);
    assert_eq!(t.turns_spent, 1);
    assert_eq!(t.items.len(), 2);
    assert_eq!(t.items[1].amount, 2);
    assert_eq!(t.meat_gain.encounter, 20);
    assert_eq!(t.stat_gain.muscle, 5);
    assert_eq!(t.stat_gain.moxie, -2);
    assert_eq!(t.mp_gain.encounter, 8);
    assert_eq!(t.skills[0].name, "SAUCESTORM");
    assert_eq!(t.skills[0].mp_cost, 12);

    let summary = log.summary().unwrap();
    assert_eq!(summary.total_turns, 1);
    assert_eq!(summary.turn_counts.combat, 1);
}

#[test]
fn test_noncombat_and_other_versions() {
    let log = parse(
        "\
[1] The Haunted Pantry
Encounter: Oh No, Hobo

[2] The Haunted Pantry
You acquire an item: tomb ratchet
",
    );
    assert_eq!(turn(&log, 1).version, TurnVersion::Noncombat);
    assert_eq!(turn(&log, 2).version, TurnVersion::Other);
}

#[test]
fn test_meat_outside_encounter() {
    let log = parse(
        "\
[1] Noob Cave
Encounter: crate
Round 1: Xenia wins the fight!
You gain 10 Meat

You gain 1,250 Meat
You spent 300 Meat
",
    );
    let t = turn(&log, 1);
    assert_eq!(t.meat_gain.encounter, 10);
    assert_eq!(t.meat_gain.other, 1250);
    assert_eq!(t.meat_gain.spent, 300);
}

#[test]
fn test_familiar_changes_are_deduplicated() {
    let log = parse(
        "\
familiar Mosquito (1 lbs)

[1] Noob Cave
Encounter: crate

familiar Mosquito (2 lbs)

[2] Noob Cave
Encounter: crate

familiar Pair of Stomping Boots

[3] Noob Cave
Encounter: crate
",
    );
    let names: Vec<&str> = log
        .familiar_changes()
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(names, ["none", "Mosquito", "Pair of Stomping Boots"]);
    assert_eq!(turn(&log, 2).familiar.name, "Mosquito");
    assert_eq!(turn(&log, 3).familiar.name, "Pair of Stomping Boots");
    assert_eq!(log.summary().unwrap().familiar_usage[0], ("Mosquito".to_string(), 2));
}

#[test]
fn test_equipment_carries_into_turns() {
    let log = parse(
        "\
equip hat Crown of Thrones
equip acc1 plexiglass pendant

[1] Noob Cave
Encounter: crate

unequip hat

[2] Noob Cave
Encounter: crate
",
    );
    let first = &turn(&log, 1).equipment;
    assert_eq!(first.hat, "Crown of Thrones");
    assert_eq!(first.acc1, "plexiglass pendant");
    let second = &turn(&log, 2).equipment;
    assert_eq!(second.hat, "none");
    assert_eq!(second.acc1, "plexiglass pendant");
    // The pendant regenerates MP on every turn it is worn
    assert_eq!(turn(&log, 1).mp_gain.out_of_encounter, 4);
}

#[test]
fn test_free_runaway() {
    let log = parse(
        "\
familiar Pair of Stomping Boots

[1] Noob Cave
Encounter: crate
Round 1: Xenia runs away!

[2] Noob Cave
Encounter: crate
Round 1: Xenia wins the fight!
",
    );
    assert_eq!(turn(&log, 1).free_runaways, 1);
    let summary = log.summary().unwrap();
    assert_eq!(summary.free_runaways, 1);
    assert_eq!(summary.total_turns, 2);
    assert_eq!(summary.turn_counts.total(), 2);

    let rundown = log.turn_rundown();
    assert_eq!(rundown.len(), 2);
    assert_eq!((rundown[1].start_turn(), rundown[1].end_turn()), (0, 2));
    assert_eq!(rundown[1].total_turns(), rundown[1].turn_counts().total());
}

#[test]
fn test_free_runaway_keeps_rundown_contiguous() {
    let log = parse(
        "\
familiar Pair of Stomping Boots

[1] Noob Cave
Encounter: crate
Round 1: Xenia runs away!

[1] The Haunted Pantry
Encounter: tomb rat
Round 1: Xenia wins the fight!
",
    );
    let shape: Vec<(&str, u32, u32)> = log
        .turn_rundown()
        .iter()
        .map(|i| (i.area_name(), i.start_turn(), i.end_turn()))
        .collect();
    assert_eq!(
        shape,
        vec![
            ("Ascension Start", 0, 0),
            ("Noob Cave", 0, 0),
            ("The Haunted Pantry", 0, 1),
        ]
    );
    for pair in log.turn_rundown().windows(2) {
        assert_eq!(pair[0].end_turn(), pair[1].start_turn());
    }
    for interval in log.turn_rundown() {
        assert_eq!(interval.total_turns(), interval.turn_counts().total());
    }
    assert_eq!(log.summary().unwrap().total_turns, 1);
}

#[test]
fn test_runaway_without_source_is_not_free() {
    let log = parse(
        "\
[1] Noob Cave
Encounter: crate
Round 1: Xenia runs away!
",
    );
    assert_eq!(turn(&log, 1).free_runaways, 0);
}

#[test]
fn test_combat_actions() {
    let log = parse(
        "\
[1] The Goatlet
Encounter: dairy goat
Round 1: Xenia casts TRANSCENDENT OLFACTION!
Round 2: Xenia wins the fight!

[2] The Goatlet
Encounter: drunk goat
Round 1: Xenia casts SNOKEBOMB!

[3] The Goatlet
Encounter: sabre-toothed goat
Round 1: Xenia uses the yellow rocket!
Round 2: Xenia wins the fight!
",
    );
    assert_eq!(log.hunted_combats().len(), 1);
    assert_eq!(log.hunted_combats()[0].name, "dairy goat");

    let banish = turn(&log, 2).banish.as_ref().unwrap();
    assert_eq!(banish.banisher, "SNOKEBOMB");
    assert_eq!(banish.monster, "drunk goat");

    assert!(turn(&log, 3).disintegrated);
    assert_eq!(log.summary().unwrap().disintegrations, 1);
}

#[test]
fn test_lost_combat() {
    let log = parse(
        "\
[4] The Haunted Kitchen
Encounter: possessed pot
Round 1: possessed pot wins initiative!
You lose. You slink away, dejected and defeated.
",
    );
    assert_eq!(log.lost_combats().len(), 1);
    assert_eq!(log.lost_combats()[0].turn, 4);
}

#[test]
fn test_consumables() {
    let log = parse(
        "\
[1] Noob Cave
Encounter: crate

eat 1 fortune cookie
You gain 6 Adventures
You gain 3 Strongness

use 1 chewing gum on a string
You acquire an item: dead mimic

buy 3 chewing gum on a string
You acquire chewing gum on a string (3)
You spent 150 Meat

chew 1 agua de vida
You gain 4 Adventures
",
    );
    let t = turn(&log, 1);
    assert_eq!(t.consumables.len(), 2);
    assert_eq!(t.consumables[0].version, ConsumableVersion::Food);
    assert_eq!(t.consumables[0].adventure_gain, 6);
    assert_eq!(t.consumables[0].stat_gain.muscle, 3);
    assert_eq!(t.consumables[1].version, ConsumableVersion::Spleen);

    // Items from using something still drop, purchases do not
    let items: Vec<&str> = t.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(items, ["dead mimic"]);
    assert_eq!(t.meat_gain.spent, 150);
    assert_eq!(log.summary().unwrap().consumption.total(), 10);
}

#[test]
fn test_consumption_is_grouped_by_day() {
    let log = parse(
        "\
[1] Noob Cave
Encounter: crate

eat 1 fortune cookie
You gain 6 Adventures

===Day 2===

[2] Noob Cave
Encounter: crate

drink 1 shot of rotgut
You gain 2 Adventures

eat 1 fortune cookie
You gain 5 Adventures
",
    );
    let summary = log.summary().unwrap();
    let per_day = &summary.consumption_per_day;
    assert_eq!(per_day.len(), 2);
    assert_eq!(per_day[&1].food, 6);
    assert_eq!(per_day[&1].booze, 0);
    assert_eq!(per_day[&2].food, 5);
    assert_eq!(per_day[&2].booze, 2);
    assert_eq!(
        per_day.values().map(|d| d.total()).sum::<u32>(),
        summary.consumption.total()
    );
}

#[test]
fn test_service_adds_turns() {
    let log = parse(
        "\
[3] Noob Cave
Encounter: crate

Took choice 1089/1: Donate Blood
choice.php?whichchoice=1089&option=1&pwd
Community Service: Donate Blood
Turns used: 60
",
    );
    let t = turn(&log, 63);
    assert_eq!(t.area, COMMUNITY_SERVICE_AREA);
    assert_eq!(t.encounter, "Donate Blood");
    assert_eq!(t.turns_spent, 60);
    assert_eq!(log.summary().unwrap().total_turns, 63);
}

#[test]
fn test_final_service_ends_the_run() {
    let log = parse(
        "\
Took choice 1089/30: Donate Body
choice.php?whichchoice=1089&option=30&pwd
Community Service: Donate Body
Turns used: 0

[1] Noob Cave
Encounter: crate
",
    );
    assert!(log.turns().iter().all(|t| t.area != "Noob Cave"));
}

#[test]
fn test_snapshot_feeds_tracker() {
    let log = parse(
        "\
=======================
     Player Snapshot
=======================

Name: Xenia
Class: Sauceror
Meat: 1,000
Familiar: Mosquito (5 lbs)
Hat: jewel-eyed wizard hat
=======================

[1] Noob Cave
Encounter: crate
",
    );
    assert_eq!(log.character.name, "Xenia");
    assert_eq!(log.snapshots().len(), 1);
    assert_eq!(log.snapshots()[0].meat, 1000);
    let t = turn(&log, 1);
    assert_eq!(t.familiar.name, "Mosquito");
    assert_eq!(t.equipment.hat, "jewel-eyed wizard hat");
}

#[test]
fn test_ascension_and_hybrid_data() {
    let log = parse(
        "\
Ascension #120:
Hardcore Sauceror
Community Service

[1] Noob Cave
Encounter: crate

Hybridizing yourself with fish DNA
You acquire an effect: Human-Fish Hybrid (2147483647)
",
    );
    assert_eq!(log.character.ascension_number, Some(120));
    assert_eq!(log.character.game_mode, "Hardcore");
    assert_eq!(log.character.class, "Sauceror");
    assert_eq!(log.character.path, "Community Service");
    assert_eq!(log.hybridizations()[0].phylum, "fish");
    assert_eq!(
        log.hybridizations()[0].effect.as_deref(),
        Some("Human-Fish Hybrid")
    );
}

#[test]
fn test_day_changes_and_pulls() {
    let log = parse(
        "\
[1] Noob Cave
Encounter: crate

pull: 2 Knob Goblin firecracker

===Day 2===

[2] Noob Cave
Encounter: crate

pull: 1 ten-leaf clover
You learned a new skill: Sauceshell
",
    );
    assert_eq!(turn(&log, 1).day, 1);
    assert_eq!(turn(&log, 2).day, 2);
    assert_eq!(log.day_changes().len(), 2);
    assert_eq!(log.day_changes()[1].turn, 1);
    assert_eq!(log.pulls()[0].amount, 2);
    assert_eq!(log.pulls()[1].day, 2);
    assert_eq!(log.learned_skills()[0].name, "Sauceshell");
}

#[test]
fn test_level_ups() {
    let log = parse(
        "\
[1] Noob Cave
Encounter: crate
Round 1: Xenia wins the fight!
You gain 40 Strongness
You gain a Level!

[2] Noob Cave
Encounter: crate
",
    );
    let levels = log.levels();
    assert_eq!(levels.len(), 2);
    assert_eq!(levels[1].level, 2);
    assert_eq!(levels[1].turn_reached, 1);
    assert_eq!(levels[1].total_turns(), 1);
}

const FINAL_FIGHT: &str = "\
[500] The Naughty Sorceress' Chamber
Encounter: Naughty Sorceress
Round 1: Xenia wins the fight!

[501] Noob Cave
Encounter: crate
";

#[test]
fn test_final_fight_stops_parsing() {
    let log = parse(FINAL_FIGHT);
    assert_eq!(log.last_turn_number(), 500);
}

#[test]
fn test_old_counting_reads_past_the_end() {
    let settings = ParserSettings::default().with_old_ascension_counting(true);
    let log = MafiaLogParser::new(settings).parse_str(FINAL_FIGHT).unwrap();
    assert_eq!(log.last_turn_number(), 501);
}

#[test]
fn test_notes_follow_setting() {
    let text = "\
[1] Noob Cave
Encounter: crate

Note: first crate
";
    assert_eq!(parse(text).turns()[1].notes.as_deref(), Some("first crate"));

    let settings = ParserSettings::default().with_log_notes(false);
    let log = MafiaLogParser::new(settings).parse_str(text).unwrap();
    assert_eq!(log.turns()[1].notes, None);
}

#[test]
fn test_malformed_mp_line_is_skipped() {
    let log = parse(
        "\
[1] Noob Cave
Encounter: crate
Round 1: Xenia wins the fight!
You gain 1x2 Mana Points
You gain 4 Mana Points
You gain 7 Meat
",
    );
    let t = turn(&log, 1);
    assert_eq!(t.mp_gain.encounter, 4);
    assert_eq!(t.meat_gain.encounter, 7);
}

#[test]
fn test_empty_log() {
    let log = parse("");
    assert!(log.is_empty());
    assert_eq!(log.summary().unwrap().total_turns, 0);
}

#[test]
fn test_truncated_stream_reports_last_turn() {
    let err = MafiaLogParser::default()
        .parse_str(
            "\
[7] Noob Cave
Encounter: crate

Took choice 1089/2: Feed The Children
choice.php?whichchoice=1089&option=2&pwd
",
        )
        .unwrap_err();
    assert_eq!(err.last_turn(), 7);
    assert!(matches!(err, ParseError::Read { .. }));
}
