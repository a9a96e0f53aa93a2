use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use rundown_core::batch::{LogFormat, ParsedLog, parse_logs};
use rundown_core::model::{LogSummary, Turn};
use rundown_types::ParserSettings;
use rundown_types::formatting::{format_pct_ratio, format_rate, format_signed, format_thousands};

pub fn parse_files(files: &[PathBuf], settings: &ParserSettings, json: bool) -> Result<ExitCode, String> {
    let outcome = parse_logs(files, settings);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        let reports: Vec<serde_json::Value> = outcome.parsed.iter().map(json_report).collect();
        let text = serde_json::to_string_pretty(&reports).map_err(|e| e.to_string())?;
        writeln!(out, "{text}").map_err(|e| e.to_string())?;
    } else {
        for parsed in &outcome.parsed {
            print_summary(&mut out, parsed).map_err(|e| e.to_string())?;
        }
    }

    let mut err = io::stderr().lock();
    for failure in &outcome.failures {
        writeln!(
            err,
            "FAILED {} (last parsed turn {}): {}",
            failure.path.display(),
            failure.last_turn,
            failure.cause
        )
        .map_err(|e| e.to_string())?;
    }

    Ok(if outcome.failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn format_name(format: LogFormat) -> &'static str {
    match format {
        LogFormat::Mafia => "session log",
        LogFormat::Preparsed => "preparsed rundown",
        LogFormat::Xml => "xml session",
    }
}

fn json_report(parsed: &ParsedLog) -> serde_json::Value {
    let log = &parsed.log;
    serde_json::json!({
        "path": parsed.path.display().to_string(),
        "format": format_name(parsed.format),
        "character": log.character,
        "start_date": log.start_date,
        "day_changes": log.day_changes(),
        "levels": log.levels(),
        "pulls": log.pulls(),
        "summary": log.summary(),
    })
}

fn print_summary(out: &mut impl Write, parsed: &ParsedLog) -> io::Result<()> {
    let log = &parsed.log;
    writeln!(out, "{} ({})", parsed.path.display(), format_name(parsed.format))?;
    if !log.character.name.is_empty() {
        write!(out, "  {}", log.character.name)?;
        if let Some(date) = log.start_date {
            write!(out, ", started {date}")?;
        }
        writeln!(out)?;
    }

    let default = LogSummary::default();
    let summary = log.summary().unwrap_or(&default);
    let counts = summary.turn_counts;
    writeln!(
        out,
        "  turns: {} ({} combat, {} noncombat, {} other) over {} days",
        format_thousands(i64::from(summary.total_turns)),
        format_pct_ratio(counts.combat, counts.total()),
        format_pct_ratio(counts.noncombat, counts.total()),
        format_pct_ratio(counts.other, counts.total()),
        log.day_changes().len()
    )?;
    writeln!(
        out,
        "  stats: {}/{}/{}  meat: {} gained, {} spent  mp: {}",
        format_signed(i64::from(summary.stat_gain.muscle)),
        format_signed(i64::from(summary.stat_gain.myst)),
        format_signed(i64::from(summary.stat_gain.moxie)),
        format_signed(i64::from(summary.meat_gain.gained())),
        format_thousands(i64::from(summary.meat_gain.spent)),
        format_signed(i64::from(summary.mp_gain.total()))
    )?;
    writeln!(
        out,
        "  adventures from consumables: {} (food {}, booze {}, spleen {}, other {})",
        summary.consumption.total(),
        summary.consumption.food,
        summary.consumption.booze,
        summary.consumption.spleen,
        summary.consumption.other
    )?;
    for (day, totals) in &summary.consumption_per_day {
        writeln!(
            out,
            "    day {day}: {} (food {}, booze {}, spleen {})",
            totals.total(),
            totals.food,
            totals.booze,
            totals.spleen
        )?;
    }
    for level in log.levels() {
        writeln!(
            out,
            "  level {:>2} on turn {:>4}, {} substats per turn",
            level.level,
            level.turn_reached,
            format_rate(level.stat_gain_per_turn)
        )?;
    }
    writeln!(
        out,
        "  free runaways: {}  disintegrations: {}  banishes: {}",
        summary.free_runaways,
        summary.disintegrations,
        summary.banishes.len()
    )?;

    for (area, turns) in summary.turns_per_area.iter().take(5) {
        writeln!(out, "    {turns:>4}  {area}")?;
    }
    for interval in log.turn_rundown() {
        if !interval.pre_comment.is_empty() || !interval.post_comment.is_empty() {
            writeln!(
                out,
                "  [{}-{}] {}: {} {}",
                interval.start_turn(),
                interval.end_turn(),
                interval.area_name(),
                interval.pre_comment,
                interval.post_comment
            )?;
        }
    }
    writeln!(out)
}

pub fn show_settings(settings: &ParserSettings) -> Result<ExitCode, String> {
    let path = confy::get_configuration_file_path("rundown", None).map_err(|e| e.to_string())?;
    println!("settings file: {}", path.display());
    println!("  log directory: {}", settings.log_directory);
    println!("  old ascension counting: {}", settings.use_old_ascension_counting);
    println!("  include log notes: {}", settings.include_log_notes);
    Ok(ExitCode::SUCCESS)
}
