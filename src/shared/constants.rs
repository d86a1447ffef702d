/// Photo extensions accepted on issue submission (compared lower-cased)
pub const ALLOWED_PHOTO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Maximum photo size in bytes (16MB)
pub const MAX_PHOTO_SIZE: usize = 16 * 1024 * 1024;

/// Number of hex characters kept from the SHA-256 digest for stored photo names
pub const PHOTO_HASH_LEN: usize = 16;

/// Timestamp layout used by the tabular export
pub const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp layout embedded in export attachment names
pub const EXPORT_FILENAME_DATE_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Expected token type in the Authorization header
pub const TOKEN_TYPE_BEARER: &str = "Bearer";
