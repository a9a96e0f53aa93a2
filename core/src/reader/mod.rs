//! Splits a KoLmafia session log into typed blocks.

mod block;
mod block_reader;


pub use block::{BlockType, LogBlock};
pub use block_reader::{BlockReader, LOOKAHEAD_BUDGET, MAX_BLOCK_LINE, MAX_SKIPPABLE_LINE};
