use crate::grammar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Encounter,
    Consumable,
    PlayerSnapshot,
    AscensionData,
    HybridData,
    Service,
    Combing,
    Other,
}

impl BlockType {
    /// Classify a block from its first one or two lines. First match wins.
    pub fn detect(first: &str, second: Option<&str>) -> Self {
        if grammar::is_combing(first) {
            Self::Combing
        } else if grammar::ADVENTURE.is_match(first)
            || grammar::proxy_skill(first).is_some()
            || second.is_some_and(|s| grammar::nonstandard_area(s).is_some())
        {
            Self::Encounter
        } else if grammar::CONSUMABLE.is_match(first) {
            Self::Consumable
        } else if grammar::is_delimiter(first)
            && second.is_some_and(|s| s.contains(grammar::SNAPSHOT_TITLE))
        {
            Self::PlayerSnapshot
        } else if grammar::ASCENSION.is_match(first) {
            Self::AscensionData
        } else if grammar::HYBRID.is_match(first) {
            Self::HybridData
        } else if grammar::is_service_marker(first) {
            Self::Service
        } else {
            Self::Other
        }
    }
}

/// A run of raw lines making up one logical log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogBlock {
    pub kind: BlockType,
    pub lines: Vec<String>,
    /// 1-based line number of the first line in the source.
    pub start_line: usize,
}

impl LogBlock {
    pub fn first_line(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or("")
    }
}
