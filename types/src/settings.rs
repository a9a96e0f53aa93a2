//! Parser settings
//!
//! The handful of switches the log parsers consult. Front ends load these
//! once at startup and hand a copy to every parse; nothing reads them from
//! ambient global state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSettings {
    /// Count the whole log as the ascension instead of stopping at the
    /// first recognized end-of-run event.
    pub use_old_ascension_counting: bool,

    /// Register the `Note:` line parser for free-form log notes.
    pub include_log_notes: bool,

    /// Directory that relative log paths are resolved against.
    pub log_directory: String,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            use_old_ascension_counting: false,
            include_log_notes: true,
            log_directory: ".".to_string(),
        }
    }
}

impl ParserSettings {
    pub fn with_old_ascension_counting(mut self, enabled: bool) -> Self {
        self.use_old_ascension_counting = enabled;
        self
    }

    pub fn with_log_notes(mut self, enabled: bool) -> Self {
        self.include_log_notes = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ParserSettings::default();
        assert!(!settings.use_old_ascension_counting);
        assert!(settings.include_log_notes);
        assert_eq!(settings.log_directory, ".");
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml = r#"
use_old_ascension_counting = true
"#;

        let settings: ParserSettings = toml::from_str(toml).unwrap();
        assert!(settings.use_old_ascension_counting);
        // Missing keys fall back to defaults
        assert!(settings.include_log_notes);
        assert_eq!(settings.log_directory, ".");
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = ParserSettings::default()
            .with_old_ascension_counting(true)
            .with_log_notes(false);

        let text = toml::to_string(&settings).unwrap();
        let back: ParserSettings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }
}
