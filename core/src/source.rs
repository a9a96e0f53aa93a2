//! Reading log files from disk.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use encoding_rs::WINDOWS_1252;
use memchr::memmem;
use memmap2::Mmap;

/// Load a log as text. UTF-8 is tried first; older KoLmafia builds wrote
/// Windows-1252.
pub fn read_log_text(path: &Path) -> std::io::Result<String> {
    let file = fs::File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(String::new());
    }
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(decode_log_bytes(&mmap).into_owned())
}

pub fn decode_log_bytes(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text
        }
    }
}

/// Whether `bytes` contain `needle` anywhere.
pub fn contains_marker(bytes: &[u8], needle: &str) -> bool {
    memmem::find(bytes, needle.as_bytes()).is_some()
}

/// Split a `Name_YYYYMMDD.txt` session log name into character name and date.
pub fn parse_log_filename(file_name: &str) -> Option<(String, NaiveDate)> {
    let stem = file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem);
    let (name, date) = stem.rsplit_once('_')?;
    if name.is_empty() || date.len() != 8 {
        return None;
    }
    let date = NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;
    Some((name.replace('_', " "), date))
}

/// Character name and start date carried by a log's file name, if any.
pub fn file_metadata(path: &Path) -> Option<(String, NaiveDate)> {
    path.file_name()
        .and_then(|f| f.to_str())
        .and_then(parse_log_filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_filename() {
        let (name, date) = parse_log_filename("Xenia_20240312.txt").unwrap();
        assert_eq!(name, "Xenia");
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());

        let (name, _) = parse_log_filename("Some_Player_20231101.txt").unwrap();
        assert_eq!(name, "Some Player");

        assert!(parse_log_filename("notes.txt").is_none());
        assert!(parse_log_filename("Xenia_20241340.txt").is_none());
    }

    #[test]
    fn test_decode_falls_back_to_windows_1252() {
        assert_eq!(decode_log_bytes(b"caf\xc3\xa9"), "café");
        assert_eq!(decode_log_bytes(b"caf\xe9"), "café");
    }

    #[test]
    fn test_contains_marker() {
        assert!(contains_marker(b"===Day 1===\n[0] Ascension Start\n", "[0] Ascension Start"));
        assert!(!contains_marker(b"[1] Noob Cave\n", "[0] Ascension Start"));
    }
}
