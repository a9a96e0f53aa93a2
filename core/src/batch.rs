//! Parse many logs at once.
//!
//! Every file is loaded on its own rayon task. A failing file is recorded
//! with the last turn that parsed and never stops the others.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rundown_types::ParserSettings;

use crate::error::LogLoadError;
use crate::model::AscensionLog;
use crate::parser::MafiaLogParser;
use crate::{preparsed, source, xml};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Raw KoLmafia session log.
    Mafia,
    /// Turn rundown exported as text.
    Preparsed,
    Xml,
}

impl LogFormat {
    /// `.xml` files are XML sessions; text containing the ascension start
    /// interval is a preparsed rundown; anything else is a session log.
    pub fn detect(path: &Path, text: &str) -> Self {
        if is_xml_path(path) {
            Self::Xml
        } else if preparsed::is_preparsed(text.as_bytes()) {
            Self::Preparsed
        } else {
            Self::Mafia
        }
    }
}

fn is_xml_path(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("xml"))
}

#[derive(Debug)]
pub struct ParsedLog {
    pub path: PathBuf,
    pub format: LogFormat,
    pub log: AscensionLog,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub parsed: Vec<ParsedLog>,
    pub failures: Vec<LogLoadError>,
}

fn load_error(path: &Path, last_turn: u32, cause: impl ToString) -> LogLoadError {
    LogLoadError {
        path: path.to_path_buf(),
        last_turn,
        cause: cause.to_string(),
    }
}

/// Load one log in whatever format it is in.
pub fn load_log(path: &Path, parser: &MafiaLogParser) -> Result<ParsedLog, LogLoadError> {
    let (format, log) = if is_xml_path(path) {
        let log = xml::read_xml_file(path).map_err(|e| load_error(path, 0, e))?;
        (LogFormat::Xml, log)
    } else {
        let text = source::read_log_text(path).map_err(|e| load_error(path, 0, e))?;
        let format = LogFormat::detect(path, &text);
        let parsed = match format {
            LogFormat::Preparsed => preparsed::parse_preparsed_named(&text, path),
            _ => parser.parse_named(&text, path),
        };
        let log = parsed.map_err(|e| load_error(path, e.last_turn(), &e))?;
        (format, log)
    };

    tracing::debug!(
        path = %path.display(),
        ?format,
        turns = log.last_turn_number(),
        "log loaded"
    );
    Ok(ParsedLog {
        path: path.to_path_buf(),
        format,
        log,
    })
}

/// Parse `paths` in parallel. Relative paths are resolved against the
/// configured log directory.
pub fn parse_logs(paths: &[PathBuf], settings: &ParserSettings) -> BatchOutcome {
    let parser = MafiaLogParser::new(settings.clone());
    let base = Path::new(&settings.log_directory);

    let results: Vec<Result<ParsedLog, LogLoadError>> = paths
        .par_iter()
        .map(|path| {
            let path = if path.is_relative() {
                base.join(path)
            } else {
                path.clone()
            };
            load_log(&path, &parser)
        })
        .collect();

    let mut outcome = BatchOutcome::default();
    for result in results {
        match result {
            Ok(parsed) => outcome.parsed.push(parsed),
            Err(failure) => {
                tracing::warn!(
                    path = %failure.path.display(),
                    last_turn = failure.last_turn,
                    cause = %failure.cause,
                    "log failed to parse"
                );
                outcome.failures.push(failure);
            }
        }
    }
    tracing::info!(
        parsed = outcome.parsed.len(),
        failed = outcome.failures.len(),
        "batch finished"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rundown-batch-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(LogFormat::detect(Path::new("a.xml"), ""), LogFormat::Xml);
        assert_eq!(LogFormat::detect(Path::new("a.XML"), ""), LogFormat::Xml);
        assert_eq!(
            LogFormat::detect(Path::new("a.txt"), "===Day 1===\n[0] Ascension Start\n"),
            LogFormat::Preparsed
        );
        assert_eq!(
            LogFormat::detect(Path::new("a.txt"), "[1] Noob Cave\n"),
            LogFormat::Mafia
        );
    }

    #[test]
    fn test_failures_do_not_stop_the_batch() {
        let dir = scratch_dir("mixed");
        fs::write(
            dir.join("Xenia_20240312.txt"),
            "[1] Noob Cave\nEncounter: crate\n\n[2] Noob Cave\nEncounter: crate\n",
        )
        .unwrap();
        fs::write(
            dir.join("rundown.txt"),
            "===Day 1===\n[0] Ascension Start\n[1-5] Noob Cave\n",
        )
        .unwrap();
        fs::write(
            dir.join("broken.txt"),
            "[9] Noob Cave\nEncounter: crate\n\nTook choice 1089/2: Feed The Children\n",
        )
        .unwrap();

        let settings = ParserSettings {
            log_directory: dir.to_string_lossy().into_owned(),
            ..ParserSettings::default()
        };
        let paths: Vec<PathBuf> = ["Xenia_20240312.txt", "rundown.txt", "broken.txt", "missing.xml"]
            .into_iter()
            .map(PathBuf::from)
            .collect();
        let outcome = parse_logs(&paths, &settings);

        assert_eq!(outcome.parsed.len(), 2);
        let mafia = outcome
            .parsed
            .iter()
            .find(|p| p.format == LogFormat::Mafia)
            .unwrap();
        assert_eq!(mafia.log.character.name, "Xenia");
        assert_eq!(mafia.log.last_turn_number(), 2);
        let rundown = outcome
            .parsed
            .iter()
            .find(|p| p.format == LogFormat::Preparsed)
            .unwrap();
        assert_eq!(rundown.log.summary().unwrap().total_turns, 5);

        assert_eq!(outcome.failures.len(), 2);
        let broken = outcome
            .failures
            .iter()
            .find(|f| f.path.ends_with("broken.txt"))
            .unwrap();
        assert_eq!(broken.last_turn, 9);
        assert!(
            outcome
                .failures
                .iter()
                .any(|f| f.path.ends_with("missing.xml"))
        );

        let _ = fs::remove_dir_all(&dir);
    }
}
