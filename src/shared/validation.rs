use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    /// Characters kept in a sanitized upload filename
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();

    /// Runs of whitespace collapse to a single underscore
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    /// Names produced by the photo naming scheme: 16 hex chars plus optional extension
    pub static ref STORED_PHOTO_NAME_REGEX: Regex =
        Regex::new(r"^[0-9a-f]{16}(\.[a-z0-9]+)?$").unwrap();

    /// Username for admin accounts
    /// - Valid: "admin", "city_ops", "Ops2"
    /// - Invalid: "2ops", "ops-team", "ops team"
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
}

/// Reduce a user supplied filename to a safe ASCII basename.
///
/// Path components are dropped and accented letters lose their marks
/// (`café` becomes `cafe`). Whitespace becomes `_`, any other character
/// outside `[A-Za-z0-9_.-]` is removed and leading/trailing dots and
/// underscores are trimmed.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let folded: String = base.nfkd().filter(char::is_ascii).collect();
    let spaced = WHITESPACE.replace_all(folded.trim(), "_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&spaced, "");
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Lower-cased extension after the last dot, if any
pub fn file_extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
}
