pub mod batch;
pub mod error;
pub mod finalizer;
pub mod game_data;
pub mod grammar;
pub mod model;
pub mod parser;
pub mod preparsed;
pub mod reader;
pub mod source;
pub mod tracker;
pub mod xml;

// Re-exports for convenience
pub use batch::{BatchOutcome, LogFormat, ParsedLog, load_log, parse_logs};
pub use error::{LogLoadError, ParseError, ReadError, XmlReadError};
pub use finalizer::Finalizer;
pub use model::{AscensionLog, LogMode, LogSummary};
pub use parser::MafiaLogParser;
pub use preparsed::{parse_preparsed, parse_preparsed_file, parse_preparsed_str};
pub use rundown_types::ParserSettings;
pub use xml::{read_xml_file, read_xml_log, read_xml_str};
