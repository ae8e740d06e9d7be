// ndmigrate Constants
// These values mirror what Navidrome writes. Do not change without checking its schema.

// List fields (album.paths, album.image_files) are joined with a zero width space
pub const LIST_SEPARATOR: char = '\u{200b}';

// Annotation rows pointing at a track carry this item_type
pub const MEDIA_FILE_ITEM_TYPE: &str = "media_file";

// Property keys that embed a library path
pub const LAST_SCAN_PROPERTY_PREFIX: &str = "LastScan-";

// Environment
pub const DEFAULT_LOG_FILTER: &str = "info";

// Status lines
pub const DRY_RUN_TAG: &str = "[Dry Run]";
pub const SUCCESS_MESSAGE: &str = "Migration ran successfully. Make sure to do a full rescan";
pub const DRY_RUN_SUCCESS_MESSAGE: &str = "[Dry Run] Migration ran successfully";

// Tables covered by the dry-run snapshot digest
pub const SNAPSHOT_TABLES: [&str; 8] = [
    "media_file",
    "annotation",
    "media_file_genres",
    "playlist_tracks",
    "scrobble_buffer",
    "album",
    "playlist",
    "property",
];
