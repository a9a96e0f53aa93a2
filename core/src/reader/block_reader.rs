use std::collections::VecDeque;
use std::io::{BufRead, Lines};

use super::block::{BlockType, LogBlock};
use crate::error::ReadError;
use crate::grammar;

/// Lines this long are dropped between blocks.
pub const MAX_SKIPPABLE_LINE: usize = 450;
/// Lines this long inside a block mean the stream is corrupt.
pub const MAX_BLOCK_LINE: usize = 500;
/// Bytes the reader may look ahead before it must decide.
pub const LOOKAHEAD_BUDGET: usize = 600;
/// Lines after a blank searched for a combat round continuation.
const ROUND_LOOKAHEAD: usize = 3;

/// Pull-based block reader over a line stream.
///
/// Unread lookahead lives in `pending` and is always handed out again, so no
/// line is lost when a lookahead decides a block is over.
pub struct BlockReader<R> {
    lines: Lines<R>,
    pending: VecDeque<String>,
    /// Lines handed out so far.
    line_number: usize,
    failed: bool,
}

impl<R: BufRead> BlockReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            pending: VecDeque::new(),
            line_number: 0,
            failed: false,
        }
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Whether another block remains. Skips blank, over-long and blacklisted
    /// lines on the way.
    pub fn has_next(&mut self) -> Result<bool, ReadError> {
        loop {
            let Some(line) = self.peek(0)? else {
                return Ok(false);
            };
            let skip = grammar::is_blank(line)
                || line.chars().count() >= MAX_SKIPPABLE_LINE
                || grammar::is_blacklisted(line);
            if !skip {
                return Ok(true);
            }
            self.pending.pop_front();
            self.line_number += 1;
        }
    }

    /// Read the next block.
    ///
    /// # Errors
    /// [`ReadError::UnexpectedEndOfStream`] when no block is left or the
    /// stream ends inside a fixed-size block.
    pub fn next_block(&mut self) -> Result<LogBlock, ReadError> {
        if !self.has_next()? {
            return Err(ReadError::UnexpectedEndOfStream {
                line: self.line_number,
            });
        }

        let start_line = self.line_number + 1;
        let kind = {
            let first = self.peek(0)?.unwrap_or_default().to_string();
            let second = self.peek(1)?;
            BlockType::detect(&first, second)
        };

        let lines = match kind {
            BlockType::Combing => self.take_exact(2)?,
            BlockType::Service => self.take_exact(4)?,
            BlockType::Encounter => self.read_encounter()?,
            BlockType::PlayerSnapshot => self.read_snapshot()?,
            BlockType::Consumable
            | BlockType::AscensionData
            | BlockType::HybridData
            | BlockType::Other => self.read_until_blank()?,
        };

        Ok(LogBlock {
            kind,
            lines,
            start_line,
        })
    }

    fn peek(&mut self, index: usize) -> Result<Option<&str>, ReadError> {
        while self.pending.len() <= index {
            match self.lines.next() {
                Some(line) => self.pending.push_back(line?),
                None => return Ok(None),
            }
        }
        Ok(self.pending.get(index).map(String::as_str))
    }

    fn take(&mut self) -> Result<Option<String>, ReadError> {
        if self.peek(0)?.is_none() {
            return Ok(None);
        }
        let Some(line) = self.pending.pop_front() else {
            return Ok(None);
        };
        self.line_number += 1;
        let length = line.chars().count();
        if length >= MAX_BLOCK_LINE {
            return Err(ReadError::LineTooLong {
                line: self.line_number,
                length,
            });
        }
        Ok(Some(line))
    }

    fn take_required(&mut self) -> Result<String, ReadError> {
        self.take()?.ok_or(ReadError::UnexpectedEndOfStream {
            line: self.line_number,
        })
    }

    fn take_exact(&mut self, count: usize) -> Result<Vec<String>, ReadError> {
        (0..count).map(|_| self.take_required()).collect()
    }

    /// Consumable, data and other blocks: up to a blank line or a service
    /// marker, neither of which is consumed.
    fn read_until_blank(&mut self) -> Result<Vec<String>, ReadError> {
        let mut lines = vec![self.take_required()?];
        while let Some(line) = self.peek(0)? {
            if grammar::is_blank(line) || grammar::is_service_marker(line) {
                break;
            }
            lines.push(self.take_required()?);
        }
        Ok(lines)
    }

    fn read_snapshot(&mut self) -> Result<Vec<String>, ReadError> {
        let mut lines = self.take_exact(3)?;
        loop {
            let line = self.take_required()?;
            let done = grammar::is_delimiter(&line);
            lines.push(line);
            if done {
                return Ok(lines);
            }
        }
    }

    fn read_encounter(&mut self) -> Result<Vec<String>, ReadError> {
        let mut lines = vec![self.take_required()?];
        let mut in_detour = false;

        while let Some(line) = self.peek(0)? {
            if in_detour {
                let line = self.take_required()?;
                in_detour = line != grammar::DETOUR_END;
                lines.push(line);
                continue;
            }

            if grammar::is_blank(line) {
                let after_pound = lines
                    .last()
                    .is_some_and(|l| l.ends_with(grammar::POUND_GAINED));
                if after_pound && self.skip_blanks_after_pound()? {
                    continue;
                }
                if self.round_follows()? {
                    lines.push(self.take_required()?);
                    continue;
                }
                break;
            }

            let line = self.take_required()?;
            in_detour = line == grammar::DETOUR_START;
            lines.push(line);
        }

        Ok(lines)
    }

    /// Drop the blank lines logged after a familiar weight gain, unless what
    /// follows them starts a new block.
    fn skip_blanks_after_pound(&mut self) -> Result<bool, ReadError> {
        let mut blanks = 0;
        let mut budget = 0;
        loop {
            let Some(line) = self.peek(blanks)? else {
                return Ok(false);
            };
            if !grammar::is_blank(line) {
                break;
            }
            budget += line.len() + 1;
            if budget > LOOKAHEAD_BUDGET {
                return Ok(false);
            }
            blanks += 1;
        }

        let next = self.peek(blanks)?.unwrap_or_default().to_string();
        let after = self.peek(blanks + 1)?;
        if BlockType::detect(&next, after) != BlockType::Other || grammar::is_blacklisted(&next) {
            return Ok(false);
        }

        for _ in 0..blanks {
            self.pending.pop_front();
            self.line_number += 1;
        }
        Ok(true)
    }

    /// Whether a combat round continues the encounter within the next few
    /// lines after the blank at the head of the lookahead.
    fn round_follows(&mut self) -> Result<bool, ReadError> {
        let mut budget = 0;
        for index in 1..=ROUND_LOOKAHEAD {
            let Some(line) = self.peek(index)? else {
                return Ok(false);
            };
            budget += line.len() + 1;
            if budget > LOOKAHEAD_BUDGET || grammar::ADVENTURE.is_match(line) {
                return Ok(false);
            }
            if grammar::COMBAT_ROUND.is_match(line) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl<R: BufRead> Iterator for BlockReader<R> {
    type Item = Result<LogBlock, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = match self.has_next() {
            Ok(true) => self.next_block(),
            Ok(false) => return None,
            Err(e) => Err(e),
        };
        self.failed = result.is_err();
        Some(result)
    }
}
