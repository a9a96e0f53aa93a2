//! Dispatch parser for KoLmafia session logs.
//!
//! Blocks from the [`BlockReader`] are routed by type: structured blocks go
//! to their own parser, OTHER blocks are split into lines for the
//! [`LineChain`]. Everything lands in one [`AscensionLog`], which is
//! finalized once the stream is exhausted or an ending signal fires.

mod blocks;
pub mod ending;
mod lines;

#[cfg(test)]
mod parser_tests;

use std::io::{BufRead, Cursor};
use std::path::Path;

use rundown_types::ParserSettings;

pub use blocks::{COMBING_AREA, COMMUNITY_SERVICE_AREA};
pub use lines::{LineChain, LineParser};

use crate::error::{ParseError, ReadError};
use crate::finalizer::Finalizer;
use crate::model::{AscensionLog, MpSource, SingleTurn};
use crate::reader::{BlockReader, BlockType, LogBlock};
use crate::source;
use crate::tracker::ChangeTracker;

/// Mutable state threaded through block and line parsers for one parse.
pub struct ParseContext<'a> {
    pub log: &'a mut AscensionLog,
    pub tracker: &'a mut ChangeTracker,
    /// Where MP gains on the current line come from.
    pub mp_source: MpSource,
    /// Meat gained inside an encounter counts as encounter meat.
    pub in_encounter: bool,
}

impl<'a> ParseContext<'a> {
    pub fn new(log: &'a mut AscensionLog, tracker: &'a mut ChangeTracker) -> Self {
        Self {
            log,
            tracker,
            mp_source: MpSource::OutOfEncounter,
            in_encounter: false,
        }
    }

    pub fn last_turn(&self) -> u32 {
        self.log.last_turn_number()
    }

    /// Apply `f` to the newest turn, if there is one.
    pub fn with_current_turn(&mut self, f: impl FnOnce(&mut SingleTurn)) {
        if let Some(turn) = self.log.last_turn_mut() {
            f(turn);
        }
    }

    pub fn current_encounter(&self) -> String {
        self.log
            .last_turn()
            .map(|t| t.encounter.clone())
            .unwrap_or_default()
    }
}

pub struct MafiaLogParser {
    settings: ParserSettings,
    chain: LineChain,
}

impl MafiaLogParser {
    pub fn new(settings: ParserSettings) -> Self {
        let chain = LineChain::new(settings.include_log_notes);
        Self { settings, chain }
    }

    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    pub fn parse_str(&self, text: &str) -> Result<AscensionLog, ParseError> {
        self.parse(Cursor::new(text.as_bytes()))
    }

    /// Parse a log file. A `Name_YYYYMMDD.txt` file name supplies the
    /// character name and start date.
    pub fn parse_file(&self, path: &Path) -> Result<AscensionLog, ParseError> {
        let text = source::read_log_text(path).map_err(|e| ParseError::Read {
            source: ReadError::Io(e),
            last_turn: 0,
        })?;
        self.parse_named(&text, path)
    }

    /// Parse log text already loaded from `path`.
    pub fn parse_named(&self, text: &str, path: &Path) -> Result<AscensionLog, ParseError> {
        let mut log = AscensionLog::with_ascension_start();
        if let Some((name, date)) = source::file_metadata(path) {
            log.character.name = name;
            log.start_date = Some(date);
        }
        self.parse_into(Cursor::new(text.as_bytes()), log)
    }

    pub fn parse<R: BufRead>(&self, reader: R) -> Result<AscensionLog, ParseError> {
        self.parse_into(reader, AscensionLog::with_ascension_start())
    }

    fn parse_into<R: BufRead>(
        &self,
        reader: R,
        mut log: AscensionLog,
    ) -> Result<AscensionLog, ParseError> {
        let mut tracker = ChangeTracker::new();
        let mut reader = BlockReader::new(reader);

        loop {
            let has_next = reader.has_next().map_err(|e| read_error(e, &log))?;
            if !has_next {
                break;
            }
            let block = reader.next_block().map_err(|e| read_error(e, &log))?;

            let mut ctx = ParseContext::new(&mut log, &mut tracker);
            self.parse_block(&block, &mut ctx)?;

            if self.settings.use_old_ascension_counting {
                continue;
            }
            if let Some(end) = ending::detect(&block, &log) {
                tracing::info!(
                    ending = ?end,
                    turn = log.last_turn_number(),
                    line = block.start_line,
                    "ascension ended"
                );
                break;
            }
        }

        Finalizer::for_text_log().finalize(&mut log);
        Ok(log)
    }

    fn parse_block(&self, block: &LogBlock, ctx: &mut ParseContext<'_>) -> Result<(), ParseError> {
        match block.kind {
            BlockType::Encounter => blocks::parse_encounter(block, ctx, &self.chain),
            BlockType::Consumable => blocks::parse_consumable(block, ctx, &self.chain),
            BlockType::PlayerSnapshot => blocks::parse_snapshot(block, ctx),
            BlockType::AscensionData => blocks::parse_ascension_data(block, ctx),
            BlockType::HybridData => blocks::parse_hybrid_data(block, ctx),
            BlockType::Service => blocks::parse_service(block, ctx),
            BlockType::Combing => blocks::parse_combing(block, ctx, &self.chain),
            BlockType::Other => {
                blocks::parse_other(block, ctx, &self.chain);
                Ok(())
            }
        }
    }
}

impl Default for MafiaLogParser {
    fn default() -> Self {
        Self::new(ParserSettings::default())
    }
}

fn read_error(source: ReadError, log: &AscensionLog) -> ParseError {
    ParseError::Read {
        source,
        last_turn: log.last_turn_number(),
    }
}
