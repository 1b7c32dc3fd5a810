//! Input validation helpers shared by request DTOs and upload handling

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

/// Longest filename the upload tables store
pub const MAX_FILENAME_LEN: usize = 255;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid hex color regex"));

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid filename regex"));

/// Validator hook for `#RRGGBB` colors.
pub fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    if HEX_COLOR.is_match(color) {
        Ok(())
    } else {
        let mut err = ValidationError::new("hex_color");
        err.message = Some("Color must be in #RRGGBB format".into());
        Err(err)
    }
}

/// Reduce a client-supplied filename to a safe basename.
///
/// Path components are dropped, whitespace becomes `_`, anything outside
/// `[A-Za-z0-9_.-]` is removed and leading dots are stripped. Names longer than
/// [`MAX_FILENAME_LEN`] are cut down, keeping the extension.
pub fn secure_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&base, "");
    truncate_filename(cleaned.trim_start_matches('.'))
}

// Input is ASCII after cleaning, so byte offsets are char boundaries
fn truncate_filename(name: &str) -> String {
    if name.len() <= MAX_FILENAME_LEN {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if ext.len() + 1 < MAX_FILENAME_LEN => {
            let keep = MAX_FILENAME_LEN - ext.len() - 1;
            format!("{}.{}", &stem[..keep.min(stem.len())], ext)
        }
        _ => name[..MAX_FILENAME_LEN].to_string(),
    }
}

/// Lowercased extension of a filename, without the dot.
pub fn file_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}
