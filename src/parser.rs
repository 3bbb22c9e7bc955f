//! Folder-name parsing.
//!
//! Every function here is pure and infallible (except [`parse_chapter_request`], which
//! validates user input). Folder names are curated by hand and are often inconsistent,
//! so anything that does not match a pattern falls back to its position in the listing.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

lazy_static! {
    /// Matches "Volume 1", "vol 01", "VOLUME   2", "Vol.3".
    pub static ref VOLUME_REGEX: Regex = Regex::new(r"(?i)\s*(?:volume|vol)\.?\s*(\d+)").unwrap();
    /// Leading chapter number, e.g. "12" or "12.5".
    pub static ref CHAPTER_NUMBER_REGEX: Regex = Regex::new(r"^(\d+(?:\.\d+)?)").unwrap();
    /// Title after a leading "<number> - " separator.
    pub static ref CHAPTER_TITLE_REGEX: Regex = Regex::new(r"^\d+(?:\.\d+)?\s*-\s*(.+)$").unwrap();
    static ref NON_ALPHANUMERIC_REGEX: Regex = Regex::new(r"[^a-z0-9]").unwrap();
}

/// Derives the stable manga id from its folder name: lowercased, with every
/// character outside `a-z0-9` removed.
pub fn manga_id(folder_name: &str) -> String {
    NON_ALPHANUMERIC_REGEX
        .replace_all(&folder_name.to_lowercase(), "")
        .into_owned()
}

/// Derives the display title from a manga folder name: hyphen-separated words,
/// each with its first letter upper-cased.
pub fn manga_title(folder_name: &str) -> String {
    folder_name
        .split('-')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// True when a folder name looks like a volume (or a `volumes` container).
pub fn is_volume_folder(folder_name: &str) -> bool {
    folder_name.to_lowercase().contains("vol")
}

/// Extracts the volume number from a folder name, if it carries one.
pub fn volume_number(folder_name: &str) -> Option<u32> {
    VOLUME_REGEX
        .captures(folder_name)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

/// Parses a volume folder into `(volume_number, volume_title)`.
///
/// The title is always the verbatim folder name.
pub fn parse_volume(folder_name: &str, positional_index: usize) -> (u32, String) {
    let number = volume_number(folder_name).unwrap_or(positional_index as u32 + 1);
    (number, folder_name.to_string())
}

/// Extracts the leading chapter number from a folder name, if it carries one.
pub fn chapter_number(folder_name: &str) -> Option<f64> {
    CHAPTER_NUMBER_REGEX
        .captures(folder_name)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Parses a chapter folder into `(chapter_number, title)`.
pub fn parse_chapter(folder_name: &str, positional_index: usize) -> (f64, String) {
    let number = chapter_number(folder_name).unwrap_or(positional_index as f64 + 1.0);
    let title = CHAPTER_TITLE_REGEX
        .captures(folder_name)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| folder_name.to_string());
    (number, title)
}

/// Renders a chapter number the way it appears in ids: `1` rather than `1.0`.
pub fn format_chapter_number(number: f64) -> String {
    format!("{}", number)
}

/// Builds a chapter id, scoped by volume when the chapter belongs to one.
pub fn chapter_id(manga_folder: &str, volume_number: Option<u32>, chapter_number: f64) -> String {
    match volume_number {
        Some(volume) => format!(
            "{}-vol{}-chapter-{}",
            manga_folder,
            volume,
            format_chapter_number(chapter_number)
        ),
        None => format!(
            "{}-chapter-{}",
            manga_folder,
            format_chapter_number(chapter_number)
        ),
    }
}

/// Parses a requested chapter number so that "1" and "1.0" compare equal.
pub fn parse_chapter_request(requested: &str) -> Result<f64> {
    let trimmed = requested.trim();
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(Error::InvalidChapterNumber(requested.to_string())),
    }
}
