// Destination existence sampling
// Read-only. Confirms rewritten media file paths point at real files before anything is written.

use std::path::Path;

use rusqlite::Connection;

use crate::codec::PathRewrite;
use crate::config::ValidationMode;
use crate::db::schema;
use crate::error::{MigrateError, Result};
use crate::fs::Filesystem;

/// Check the media files under the old prefix at the requested thoroughness.
///
/// With `rewrite` set, each path is checked at its rewritten location; without
/// it, the stored path itself is checked (used when nothing has moved yet).
/// Returns how many files were checked.
pub fn sample_destinations(
    conn: &Connection,
    old_prefix: &str,
    rewrite: Option<&PathRewrite>,
    mode: ValidationMode,
    fs: &dyn Filesystem,
) -> Result<usize> {
    let paths = match mode {
        ValidationMode::None => return Ok(0),
        ValidationMode::Full => schema::list_media_file_paths_with_prefix(conn, old_prefix)?,
        ValidationMode::Short => schema::first_media_file_path_with_prefix(conn, old_prefix)?
            .into_iter()
            .collect(),
    };

    for path in &paths {
        let candidate = match rewrite {
            Some(rewrite) => rewrite.apply(path).unwrap_or_else(|| path.clone()),
            None => path.clone(),
        };

        if !fs.is_file(Path::new(&candidate)) {
            return Err(MigrateError::DestinationNotFound(candidate));
        }
    }

    log::info!("Checked {} file(s) at their destination", paths.len());
    Ok(paths.len())
}
