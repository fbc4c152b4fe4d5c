use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// Image formats accepted by the upload form
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "tif", "tiff"];

fn unsafe_chars() -> &'static Regex {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid filename regex"))
}

/// Check the last extension of `filename` against `ALLOWED_EXTENSIONS`
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// Reduce a client-supplied filename to a flat, filesystem-safe name.
///
/// Accented letters fold to their ASCII base (NFKD, combining marks dropped),
/// path separators become spaces, whitespace runs collapse to `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped and leading/trailing `._` are trimmed.
/// Returns `None` when nothing usable remains.
pub fn secure_filename(filename: &str) -> Option<String> {
    let folded: String = filename.nfkd().filter(char::is_ascii).collect();
    let flattened = folded.replace(['/', '\\'], " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = unsafe_chars().replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Content type for a stored upload, by extension
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}
