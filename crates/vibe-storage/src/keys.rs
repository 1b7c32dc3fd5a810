//! Object key generation shared by the cloud backends

use uuid::Uuid;

/// `.ext` (lowercased) of a filename, or an empty string
pub(crate) fn dotted_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!(".{}", ext.to_lowercase()),
        _ => String::new(),
    }
}

/// Backblaze layout: `{user_id}/{file_type}/{uuid}{.ext}`
pub(crate) fn user_scoped_key(user_id: i64, file_type: &str, filename: &str) -> String {
    format!(
        "{}/{}/{}{}",
        user_id,
        file_type,
        Uuid::new_v4(),
        dotted_extension(filename)
    )
}

/// Firebase layout: `{file_type}/{user_id}/{uuid}{.ext}`
pub(crate) fn type_scoped_key(user_id: i64, file_type: &str, filename: &str) -> String {
    format!(
        "{}/{}/{}{}",
        file_type,
        user_id,
        Uuid::new_v4(),
        dotted_extension(filename)
    )
}

/// Keys must stay relative and free of traversal sequences
pub(crate) fn is_safe_key(key: &str) -> bool {
    !key.is_empty() && !key.contains("..") && !key.starts_with('/') && !key.contains('\\')
}
