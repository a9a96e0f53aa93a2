//! Types shared between the rundown core library and its front ends.

pub mod formatting;
pub mod settings;

pub use settings::ParserSettings;
