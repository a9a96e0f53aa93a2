//! Reader for sessions serialized as XML.

mod node;
mod reader;


pub use reader::{SUPPORTED_VERSION, read_xml_file, read_xml_log, read_xml_str};
