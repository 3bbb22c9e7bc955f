//! Path utilities for safe and robust file path handling.
//!
//! Folder names are read lossily (non UTF-8 bytes become replacement characters) since
//! they are only ever parsed and displayed. Page URLs are built from the path of a file
//! relative to the catalog root, one encoded segment per component.

use std::cmp::Ordering;
use std::path::{Component, Path};

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Matches "001", "1", "1.5" etc.
    pub static ref DEFAULT_NUMBER_REGEX: Regex = Regex::new(r"\d+\.?\d*").unwrap();
}

/// Gets the file name from a path with fallback to lossy conversion.
///
/// # Arguments
///
/// * `path` - The path to extract the file name from
///
/// # Returns
///
/// * `String` - The file name, using lossy conversion if necessary
pub fn get_file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Checks if a filename starts with a dot (hidden file) using safe conversion.
pub fn is_hidden_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Returns the lowercased extension of a path, if any.
pub fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

/// Extracts numbers from a filename using safe string conversion.
///
/// # Arguments
///
/// * `path` - The path to extract numbers from
/// * `regex` - The regex pattern to use for extraction
///
/// # Returns
///
/// * `Option<f64>` - The extracted number, or None if not found or conversion failed
pub fn extract_number_from_filename_safe(path: &Path, regex: &Regex) -> Option<f64> {
    let file_name = get_file_name_lossy(path);

    regex
        .captures_iter(&file_name)
        .last() // Take the last match, often more specific for versions/numbers
        .and_then(|cap| {
            let capture = cap.get(1).or_else(|| cap.get(0))?.as_str();
            let capture = capture.trim_end_matches('.');
            if capture.contains('.') {
                capture.parse::<f64>().ok()
            } else {
                let trimmed = capture.trim_start_matches('0');
                if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    trimmed.parse::<f64>().ok()
                }
            }
        })
}

/// Plain string comparison of file names.
pub fn compare_paths_by_name(a: &Path, b: &Path) -> Ordering {
    get_file_name_lossy(a).cmp(&get_file_name_lossy(b))
}

/// Numeric-aware comparison of file names: the last number in each name decides,
/// names without a number sort first, and equal numbers fall back to the name.
pub fn compare_paths_natural(a: &Path, b: &Path) -> Ordering {
    let a_num = extract_number_from_filename_safe(a, &DEFAULT_NUMBER_REGEX);
    let b_num = extract_number_from_filename_safe(b, &DEFAULT_NUMBER_REGEX);

    match (a_num, b_num) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| compare_paths_by_name(a, b))
}

/// Percent-encodes every component of a relative path, for use as URL segments.
pub fn url_segments(relative: &Path) -> Vec<String> {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => {
                Some(urlencoding::encode(&segment.to_string_lossy()).into_owned())
            }
            _ => None,
        })
        .collect()
}

/// Joins a public base path with the encoded segments of a root-relative file path.
pub fn public_url(base: &str, relative: &Path) -> String {
    let base = base.trim_end_matches('/');
    format!("{}/{}", base, url_segments(relative).join("/"))
}
